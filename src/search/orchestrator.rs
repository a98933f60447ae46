use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use crate::cache::store::CacheStore;
use crate::core::config::SearchConfig;
use crate::core::error::{Error, Result};
use crate::core::stats::{ClearReport, OptimizeReport, StatisticsInfo};
use crate::core::types::{ExerciseItem, FoodItem};
use crate::search::client::{call_guarded, DomainItem, SearchClient};
use crate::search::history::SearchHistory;
use crate::search::pool::WorkerPool;
use crate::search::results::{BatchSearchResult, SearchResult, SearchStats, SearchStatsReport};
use crate::search::retry::RetryPolicy;
use crate::search::suggest::SuggestionEngine;

/// Popularity entries kept by `optimize`.
const POPULAR_KEEP: usize = 100;

/// Searches the food and exercise domains concurrently behind a shared cache.
///
/// A query is served from cache when both domains hold a non-empty entry.
/// Otherwise the missing domains are dispatched in parallel, each with its
/// own retry loop, and a failing domain contributes an empty list instead of
/// failing the query.
pub struct SearchOrchestrator {
    food_client: Arc<dyn SearchClient<FoodItem>>,
    exercise_client: Arc<dyn SearchClient<ExerciseItem>>,
    cache: Arc<CacheStore>,
    config: SearchConfig,
    retry: RetryPolicy,
    suggester: SuggestionEngine,
    history: Mutex<SearchHistory>,
    stats: Mutex<SearchStats>,
    dispatch_pool: WorkerPool,
    batch_pool: WorkerPool,
}

#[derive(Debug, Clone)]
pub struct SearchOptimizeReport {
    pub cache: OptimizeReport,
    pub popular_terms_dropped: usize,
}

impl SearchOrchestrator {
    pub fn new(
        food_client: Arc<dyn SearchClient<FoodItem>>,
        exercise_client: Arc<dyn SearchClient<ExerciseItem>>,
        cache: Arc<CacheStore>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;

        // Every batch worker gets its own domain fan-out width
        let dispatch_pool = WorkerPool::new(
            "domain",
            config.max_workers.saturating_mul(config.effective_domain_concurrency()),
        )?;
        let batch_pool = WorkerPool::new("batch", config.max_workers)?;

        info!(
            "Search orchestrator ready: {} batch workers, {} domain workers ({} per query), {} attempts per domain",
            config.max_workers,
            dispatch_pool.workers,
            config.effective_domain_concurrency(),
            config.retry_count,
        );

        Ok(SearchOrchestrator {
            food_client,
            exercise_client,
            cache,
            retry: RetryPolicy::new(config.retry_count, config.retry_delay()),
            suggester: SuggestionEngine::from_config(&config),
            history: Mutex::new(SearchHistory::new(
                config.history_capacity,
                config.history_evict_batch,
            )),
            stats: Mutex::new(SearchStats::default()),
            dispatch_pool,
            batch_pool,
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Search both domains for `query`.
    ///
    /// Only a blank query is an error; collaborator failures degrade to
    /// empty lists for the affected domain.
    pub fn search(&self, query: &str) -> Result<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            self.stats.lock().failed_searches += 1;
            return Err(Error::invalid_input("search query must not be empty"));
        }

        let start = Instant::now();
        self.history.lock().record(query);

        let cached_food = self.cached::<FoodItem>(query);
        let cached_exercise = self.cached::<ExerciseItem>(query);
        let cache_hit = cached_food.is_some() && cached_exercise.is_some();

        let (food_results, exercise_results) = if cache_hit {
            debug!("Cache hit for '{}'", query);
            (cached_food.unwrap_or_default(), cached_exercise.unwrap_or_default())
        } else {
            let food_client = self.food_client.as_ref();
            let exercise_client = self.exercise_client.as_ref();
            self.dispatch_pool.join(
                || cached_food.unwrap_or_else(|| self.fetch(food_client, query)),
                || cached_exercise.unwrap_or_else(|| self.fetch(exercise_client, query)),
            )
        };

        let mut result = SearchResult::new(query, food_results, exercise_results);
        result.cache_hit = cache_hit;
        result.suggestions = self.suggestions(query);
        result.search_time = start.elapsed();

        self.stats.lock().record(result.search_time, cache_hit);

        info!(
            "Search '{}': {} foods, {} exercises in {:?}{}",
            query,
            result.food_results.len(),
            result.exercise_results.len(),
            result.search_time,
            if cache_hit { " (cached)" } else { "" },
        );

        Ok(result)
    }

    /// Run many queries on the batch pool.
    ///
    /// Each query is isolated: an error or panic marks it failed and stores
    /// an empty result under its text. `success_count + failure_count` always
    /// equals the number of queries given.
    pub fn batch_search<S>(&self, queries: &[S]) -> BatchSearchResult
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let outcomes: Vec<(String, Option<SearchResult>)> = self.batch_pool.map(queries, |q| {
            let q = q.as_ref();
            match panic::catch_unwind(AssertUnwindSafe(|| self.search(q))) {
                Ok(Ok(result)) => (q.to_string(), Some(result)),
                Ok(Err(e)) => {
                    warn!("Batch query '{}' failed: {}", q, e);
                    (q.to_string(), None)
                }
                Err(_) => {
                    warn!("Batch query '{}' panicked", q);
                    self.stats.lock().failed_searches += 1;
                    (q.to_string(), None)
                }
            }
        });

        let mut results = HashMap::with_capacity(outcomes.len());
        let mut success_count = 0;
        let mut failure_count = 0;
        let mut cache_hits = 0;
        for (query, outcome) in outcomes {
            match outcome {
                Some(result) => {
                    success_count += 1;
                    if result.cache_hit {
                        cache_hits += 1;
                    }
                    results.insert(query, result);
                }
                None => {
                    failure_count += 1;
                    results.entry(query.clone()).or_insert_with(|| SearchResult::empty(query));
                }
            }
        }

        let cache_hit_rate = if queries.is_empty() {
            0.0
        } else {
            cache_hits as f64 / queries.len() as f64 * 100.0
        };

        let batch = BatchSearchResult {
            queries: queries.iter().map(|q| q.as_ref().to_string()).collect(),
            results,
            total_time: start.elapsed(),
            success_count,
            failure_count,
            cache_hit_rate,
        };

        info!(
            "Batch of {} queries: {} succeeded, {} failed, {:.1}% cached, {:?}",
            batch.total_queries(),
            success_count,
            failure_count,
            cache_hit_rate,
            batch.total_time,
        );

        batch
    }

    /// Food lookup only: one attempt, cached, empty on any failure.
    pub fn search_food(&self, name: &str) -> Vec<FoodItem> {
        self.lookup(self.food_client.as_ref(), name)
    }

    /// Exercise lookup only: one attempt, cached, empty on any failure.
    pub fn search_exercise(&self, name: &str) -> Vec<ExerciseItem> {
        self.lookup(self.exercise_client.as_ref(), name)
    }

    pub fn suggestions(&self, partial: &str) -> Vec<String> {
        let history = self.history.lock();
        self.suggester.suggest(partial, &history)
    }

    pub fn search_stats(&self) -> SearchStatsReport {
        let search = self.stats.lock().clone();
        let (popular_searches, history_size) = {
            let history = self.history.lock();
            (history.top(10), history.len())
        };

        SearchStatsReport {
            search,
            cache: StatisticsInfo::from(&self.cache.stats()),
            popular_searches,
            history_size,
            max_workers: self.config.max_workers,
            domain_concurrency: self.config.effective_domain_concurrency(),
        }
    }

    /// Drop every cached entry and the search history.
    pub fn clear_search_cache(&self) -> ClearReport {
        let report = self.cache.clear_all();
        self.history.lock().clear();
        info!(
            "Search cache cleared: {} memory entries, {} disk files",
            report.memory_entries, report.disk_files,
        );
        report
    }

    pub fn optimize(&self) -> SearchOptimizeReport {
        let cache = self.cache.optimize();
        let popular_terms_dropped = self.history.lock().trim_popularity(POPULAR_KEEP);
        debug!("Optimize dropped {} popularity entries", popular_terms_dropped);
        SearchOptimizeReport { cache, popular_terms_dropped }
    }

    /// Non-empty cached list for `query`, if any.
    fn cached<T: DomainItem>(&self, query: &str) -> Option<Vec<T>> {
        self.cache
            .get(T::DOMAIN, query)
            .and_then(T::from_payload)
            .filter(|items| !items.is_empty())
    }

    /// Dispatch one domain with retries; never fails.
    fn fetch<T: DomainItem>(&self, client: &dyn SearchClient<T>, query: &str) -> Vec<T> {
        let label = format!("{} '{}'", T::DOMAIN, query);
        let outcome = self.retry.run(&label, || call_guarded(client, query));
        self.stats.lock().api_calls += outcome.attempts as u64;

        match outcome.result {
            Ok(items) => {
                self.store(query, &items);
                items
            }
            Err(e) => {
                warn!("{} failed after {} attempt(s): {}", label, outcome.attempts, e);
                Vec::new()
            }
        }
    }

    fn lookup<T: DomainItem>(&self, client: &dyn SearchClient<T>, query: &str) -> Vec<T> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.history.lock().record(query);

        if let Some(items) = self.cached::<T>(query) {
            return items;
        }

        self.stats.lock().api_calls += 1;
        match call_guarded(client, query) {
            Ok(items) => {
                self.store(query, &items);
                items
            }
            Err(e) if e.is_no_results() => Vec::new(),
            Err(e) => {
                warn!("{} '{}' failed: {}", T::DOMAIN, query, e);
                Vec::new()
            }
        }
    }

    fn store<T: DomainItem>(&self, query: &str, items: &[T]) {
        if !items.is_empty() {
            self.cache.put(T::DOMAIN, query, T::into_payload(items.to_vec()), None);
        }
    }
}
