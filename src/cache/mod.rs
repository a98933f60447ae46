pub mod entry;
pub mod key;
pub mod memory;
pub mod disk;
pub mod store;
