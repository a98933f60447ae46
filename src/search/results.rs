use std::collections::HashMap;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::core::types::{ExerciseItem, FoodItem};

/// Merged outcome of one query across both domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub food_results: Vec<FoodItem>,
    pub exercise_results: Vec<ExerciseItem>,
    pub search_time: Duration,
    pub cache_hit: bool,
    pub suggestions: Vec<String>,
    pub total_results: usize,
}

impl SearchResult {
    pub fn new(
        query: impl Into<String>,
        food_results: Vec<FoodItem>,
        exercise_results: Vec<ExerciseItem>,
    ) -> Self {
        let total_results = food_results.len() + exercise_results.len();
        SearchResult {
            query: query.into(),
            food_results,
            exercise_results,
            search_time: Duration::ZERO,
            cache_hit: false,
            suggestions: Vec::new(),
            total_results,
        }
    }

    /// Placeholder for a query that failed outright.
    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new(), Vec::new())
    }

    pub fn has_results(&self) -> bool {
        self.total_results > 0
    }
}

/// Outcome of a batch, one entry per distinct query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSearchResult {
    pub queries: Vec<String>,
    pub results: HashMap<String, SearchResult>,
    pub total_time: Duration,
    pub success_count: usize,
    pub failure_count: usize,
    /// Percentage of all submitted queries served entirely from cache
    pub cache_hit_rate: f64,
}

impl BatchSearchResult {
    pub fn total_queries(&self) -> usize {
        self.queries.len()
    }

    pub fn get(&self, query: &str) -> Option<&SearchResult> {
        self.results.get(query)
    }
}

/// Running counters kept by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub total_searches: u64,
    pub cache_hits: u64,
    pub api_calls: u64,
    pub failed_searches: u64,
    pub average_response_time: Duration,
}

impl SearchStats {
    /// Fold one completed search into the running average.
    pub fn record(&mut self, elapsed: Duration, cache_hit: bool) {
        self.total_searches += 1;
        if cache_hit {
            self.cache_hits += 1;
        }
        let n = self.total_searches as f64;
        let average = self.average_response_time.as_secs_f64();
        let updated = average + (elapsed.as_secs_f64() - average) / n;
        self.average_response_time =
            Duration::try_from_secs_f64(updated).unwrap_or(self.average_response_time);
    }
}

/// Snapshot returned by `SearchOrchestrator::search_stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStatsReport {
    pub search: SearchStats,
    pub cache: crate::core::stats::StatisticsInfo,
    pub popular_searches: Vec<(String, u64)>,
    pub history_size: usize,
    pub max_workers: usize,
    pub domain_concurrency: usize,
}
