pub mod client;
pub mod retry;
pub mod pool;
pub mod history;
pub mod fuzzy;
pub mod suggest;
pub mod results;
pub mod orchestrator;
