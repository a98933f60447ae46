use std::fmt;
use sha2::{Digest, Sha256};
use crate::core::types::Domain;

/// Normalized, hashed address of a cache entry.
///
/// Food and exercise identifiers are lower-cased and trimmed before hashing,
/// so "Rice " and "rice" share an entry. Nutrition keys are food ids and only
/// get trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: Domain,
    pub digest: String,
}

impl CacheKey {
    pub fn new(domain: Domain, identifier: &str) -> Self {
        let normalized = Self::normalize(domain, identifier);
        let digest = hex::encode(Sha256::digest(normalized.as_bytes()));
        CacheKey { domain, digest }
    }

    pub fn food(name: &str) -> Self {
        Self::new(Domain::Food, name)
    }

    pub fn exercise(name: &str) -> Self {
        Self::new(Domain::Exercise, name)
    }

    pub fn nutrition(food_id: &str) -> Self {
        Self::new(Domain::Nutrition, food_id)
    }

    pub fn normalize(domain: Domain, identifier: &str) -> String {
        match domain {
            Domain::Nutrition => identifier.trim().to_string(),
            Domain::Food | Domain::Exercise => identifier.trim().to_lowercase(),
        }
    }

    /// Key stored inside the entry, unique across domains.
    pub fn namespaced(&self) -> String {
        format!("{}:{}", self.domain, self.digest)
    }

    /// `<prefix><digest>.cache`, relative to the domain directory.
    pub fn file_name(&self) -> String {
        format!("{}{}.cache", self.domain.file_prefix(), self.digest)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Short form for logs
        write!(f, "{}:{}", self.domain, &self.digest[..12])
    }
}
