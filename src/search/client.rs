use std::panic::{self, AssertUnwindSafe};
use crate::core::error::ClientError;
use crate::core::types::{CachePayload, Domain, ExerciseItem, FoodItem};

/// Blocking lookup against one external domain (food or exercise API).
///
/// Implementations own their timeouts; a timeout bounds one call, and the
/// orchestrator decides whether to try again.
pub trait SearchClient<T>: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<T>, ClientError>;
}

impl<T, F> SearchClient<T> for F
where
    F: Fn(&str) -> Result<Vec<T>, ClientError> + Send + Sync,
{
    fn search(&self, query: &str) -> Result<Vec<T>, ClientError> {
        self(query)
    }
}

/// Item type served by a search domain, and how it is cached.
pub trait DomainItem: Clone + Send + Sync + 'static {
    const DOMAIN: Domain;

    fn into_payload(items: Vec<Self>) -> CachePayload;

    fn from_payload(payload: CachePayload) -> Option<Vec<Self>>;
}

impl DomainItem for FoodItem {
    const DOMAIN: Domain = Domain::Food;

    fn into_payload(items: Vec<Self>) -> CachePayload {
        CachePayload::Foods(items)
    }

    fn from_payload(payload: CachePayload) -> Option<Vec<Self>> {
        match payload {
            CachePayload::Foods(items) => Some(items),
            _ => None,
        }
    }
}

impl DomainItem for ExerciseItem {
    const DOMAIN: Domain = Domain::Exercise;

    fn into_payload(items: Vec<Self>) -> CachePayload {
        CachePayload::Exercises(items)
    }

    fn from_payload(payload: CachePayload) -> Option<Vec<Self>> {
        match payload {
            CachePayload::Exercises(items) => Some(items),
            _ => None,
        }
    }
}

/// Call `client`, turning a panic inside it into a non-retryable error.
pub fn call_guarded<T>(client: &dyn SearchClient<T>, query: &str) -> Result<Vec<T>, ClientError> {
    match panic::catch_unwind(AssertUnwindSafe(|| client.search(query))) {
        Ok(result) => result,
        Err(cause) => {
            let message = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ClientError::Other(format!("client panicked: {}", message)))
        }
    }
}
