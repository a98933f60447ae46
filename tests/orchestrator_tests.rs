use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use Nutrix::cache::store::CacheStore;
use Nutrix::core::config::{CacheConfig, SearchConfig};
use Nutrix::core::error::{ClientError, ErrorKind};
use Nutrix::core::types::{ExerciseItem, FoodItem};
use Nutrix::search::client::SearchClient;
use Nutrix::search::orchestrator::SearchOrchestrator;

/// Fails the first `fail_first` calls with `error`, then returns `items`.
struct ScriptedClient<T> {
    items: Vec<T>,
    fail_first: usize,
    error: ClientError,
    calls: AtomicUsize,
}

impl<T> ScriptedClient<T> {
    fn ok(items: Vec<T>) -> Arc<Self> {
        Self::failing(items, 0, ClientError::NoResults)
    }

    fn failing(items: Vec<T>, fail_first: usize, error: ClientError) -> Arc<Self> {
        Arc::new(ScriptedClient {
            items,
            fail_first,
            error,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + Sync> SearchClient<T> for ScriptedClient<T> {
    fn search(&self, _query: &str) -> Result<Vec<T>, ClientError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.fail_first {
            Err(self.error.clone())
        } else {
            Ok(self.items.clone())
        }
    }
}

struct PanickingClient;

impl SearchClient<ExerciseItem> for PanickingClient {
    fn search(&self, _query: &str) -> Result<Vec<ExerciseItem>, ClientError> {
        panic!("exercise backend exploded")
    }
}

fn foods() -> Vec<FoodItem> {
    vec![FoodItem::new("F001", "white rice"), FoodItem::new("F002", "brown rice")]
}

fn exercises() -> Vec<ExerciseItem> {
    vec![ExerciseItem::new("walking", "slow walk", 3.5)]
}

fn fast_config() -> SearchConfig {
    SearchConfig {
        retry_delay_ms: 1,
        ..Default::default()
    }
}

fn orchestrator(
    food: Arc<dyn SearchClient<FoodItem>>,
    exercise: Arc<dyn SearchClient<ExerciseItem>>,
) -> SearchOrchestrator {
    let cache = Arc::new(CacheStore::new(CacheConfig::memory_only(100)));
    SearchOrchestrator::new(food, exercise, cache, fast_config()).unwrap()
}

#[test]
fn test_search_merges_domains_then_hits_cache() {
    let food = ScriptedClient::ok(foods());
    let exercise = ScriptedClient::ok(exercises());
    let search = orchestrator(food.clone(), exercise.clone());

    let first = search.search("rice").unwrap();
    assert!(!first.cache_hit);
    assert_eq!(first.food_results.len(), 2);
    assert_eq!(first.exercise_results.len(), 1);
    assert_eq!(first.total_results, 3);

    let second = search.search("  RICE ").unwrap();
    assert!(second.cache_hit);
    assert_eq!(second.total_results, 3);
    assert_eq!(food.calls(), 1);
    assert_eq!(exercise.calls(), 1);

    let stats = search.search_stats();
    assert_eq!(stats.search.total_searches, 2);
    assert_eq!(stats.search.cache_hits, 1);
    assert_eq!(stats.search.api_calls, 2);
}

#[test]
fn test_retries_network_errors_until_success() {
    let food = ScriptedClient::failing(foods(), 2, ClientError::Network("reset".to_string()));
    let exercise = ScriptedClient::ok(exercises());
    let search = orchestrator(food.clone(), exercise.clone());

    let result = search.search("rice").unwrap();
    assert_eq!(result.food_results.len(), 2);
    assert_eq!(food.calls(), 3);
    assert_eq!(exercise.calls(), 1);
    assert_eq!(search.search_stats().search.api_calls, 4);
}

#[test]
fn test_no_results_is_not_retried() {
    let food = ScriptedClient::failing(foods(), usize::MAX, ClientError::NoResults);
    let exercise = ScriptedClient::ok(exercises());
    let search = orchestrator(food.clone(), exercise);

    let result = search.search("unobtainium").unwrap();
    assert!(result.food_results.is_empty());
    assert_eq!(result.exercise_results.len(), 1);
    assert_eq!(food.calls(), 1);
}

#[test]
fn test_non_retryable_error_aborts_domain() {
    let food = ScriptedClient::failing(foods(), usize::MAX, ClientError::Other("HTTP 500".to_string()));
    let exercise = ScriptedClient::ok(exercises());
    let search = orchestrator(food.clone(), exercise);

    let result = search.search("rice").unwrap();
    assert!(result.food_results.is_empty());
    assert_eq!(food.calls(), 1);
}

#[test]
fn test_failing_domain_degrades_and_cached_domain_is_reused() {
    let food = ScriptedClient::failing(foods(), usize::MAX, ClientError::Timeout("10s".to_string()));
    let exercise = ScriptedClient::ok(exercises());
    let search = orchestrator(food.clone(), exercise.clone());

    let first = search.search("rice").unwrap();
    assert!(first.food_results.is_empty());
    assert_eq!(first.exercise_results.len(), 1);
    assert_eq!(food.calls(), 3);

    let second = search.search("rice").unwrap();
    assert!(!second.cache_hit);
    assert_eq!(second.exercise_results.len(), 1);
    assert_eq!(food.calls(), 6);
    assert_eq!(exercise.calls(), 1);
}

#[test]
fn test_panicking_client_degrades_to_empty() {
    let food = ScriptedClient::ok(foods());
    let search = orchestrator(food, Arc::new(PanickingClient));

    let result = search.search("rice").unwrap();
    assert_eq!(result.food_results.len(), 2);
    assert!(result.exercise_results.is_empty());
}

#[test]
fn test_blank_query_is_rejected() {
    let search = orchestrator(ScriptedClient::ok(foods()), ScriptedClient::ok(exercises()));

    let err = search.search("   ").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert_eq!(search.search_stats().search.failed_searches, 1);
}

#[test]
fn test_domains_are_dispatched_concurrently() {
    struct Rendezvous {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl Rendezvous {
        fn meet(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let deadline = Instant::now() + Duration::from_secs(2);
            while self.in_flight.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(1));
            }
            self.peak.fetch_max(self.in_flight.load(Ordering::SeqCst), Ordering::SeqCst);
        }
    }

    impl SearchClient<FoodItem> for Rendezvous {
        fn search(&self, _query: &str) -> Result<Vec<FoodItem>, ClientError> {
            self.meet();
            Ok(foods())
        }
    }

    impl SearchClient<ExerciseItem> for Rendezvous {
        fn search(&self, _query: &str) -> Result<Vec<ExerciseItem>, ClientError> {
            self.meet();
            Ok(exercises())
        }
    }

    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let food = Arc::new(Rendezvous { in_flight: in_flight.clone(), peak: peak.clone() });
    let exercise = Arc::new(Rendezvous { in_flight, peak: peak.clone() });
    let search = orchestrator(food, exercise);

    let result = search.search("rice").unwrap();
    assert_eq!(result.total_results, 3);
    assert_eq!(peak.load(Ordering::SeqCst), 2);
}

#[test]
fn test_batch_queries_overlap_their_domain_calls() {
    struct SlowClient {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl SlowClient {
        fn wait(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(200));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl SearchClient<FoodItem> for SlowClient {
        fn search(&self, _query: &str) -> Result<Vec<FoodItem>, ClientError> {
            self.wait();
            Ok(foods())
        }
    }

    impl SearchClient<ExerciseItem> for SlowClient {
        fn search(&self, _query: &str) -> Result<Vec<ExerciseItem>, ClientError> {
            self.wait();
            Ok(exercises())
        }
    }

    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let food = Arc::new(SlowClient { in_flight: in_flight.clone(), peak: peak.clone() });
    let exercise = Arc::new(SlowClient { in_flight, peak: peak.clone() });
    let search = orchestrator(food, exercise);

    let batch = search.batch_search(&["a1", "b2", "c3", "d4", "e5"]);

    assert_eq!(batch.success_count, 5);
    assert!(batch.results.values().all(|r| r.total_results == 3));
    assert!(peak.load(Ordering::SeqCst) > 2, "peak in flight {}", peak.load(Ordering::SeqCst));
}

#[test]
fn test_batch_counts_every_query() {
    let search = orchestrator(ScriptedClient::ok(foods()), Arc::new(PanickingClient));
    let queries = vec!["rice", "  ", "kimchi", "rice", ""];

    let batch = search.batch_search(&queries);

    assert_eq!(batch.total_queries(), 5);
    assert_eq!(batch.success_count + batch.failure_count, 5);
    assert_eq!(batch.failure_count, 2);
    assert!(batch.get("kimchi").is_some_and(|r| r.food_results.len() == 2));
    assert!(batch.get("  ").is_some_and(|r| !r.has_results()));
    assert!(batch.get("").is_some());
}

#[test]
fn test_batch_cache_hit_rate_is_percent() {
    let search = orchestrator(ScriptedClient::ok(foods()), ScriptedClient::ok(exercises()));
    search.search("rice").unwrap();
    search.search("tofu").unwrap();

    let batch = search.batch_search(&["rice", "tofu", "egg", "kale"]);
    assert_eq!(batch.success_count, 4);
    assert_eq!(batch.failure_count, 0);
    assert!((batch.cache_hit_rate - 50.0).abs() < 1e-9);
}

#[test]
fn test_empty_batch() {
    let search = orchestrator(ScriptedClient::ok(foods()), ScriptedClient::ok(exercises()));
    let batch = search.batch_search::<&str>(&[]);
    assert_eq!(batch.success_count + batch.failure_count, 0);
    assert_eq!(batch.cache_hit_rate, 0.0);
}

#[test]
fn test_single_domain_lookups_try_once() {
    let food = ScriptedClient::failing(foods(), 1, ClientError::Network("reset".to_string()));
    let exercise = ScriptedClient::ok(exercises());
    let search = orchestrator(food.clone(), exercise.clone());

    assert!(search.search_food("rice").is_empty());
    assert_eq!(food.calls(), 1);

    assert_eq!(search.search_food("rice").len(), 2);
    assert_eq!(search.search_food("rice").len(), 2);
    assert_eq!(food.calls(), 2);

    assert_eq!(search.search_exercise("walk").len(), 1);
    assert!(search.search_exercise(" ").is_empty());
    assert_eq!(exercise.calls(), 1);
}

#[test]
fn test_suggestions_come_from_history() {
    let search = orchestrator(ScriptedClient::ok(foods()), ScriptedClient::ok(exercises()));
    search.search("fried rice").unwrap();
    search.search("rice cake").unwrap();
    search.search("rice cake").unwrap();

    let suggestions = search.suggestions("rice");
    assert_eq!(suggestions[0], "rice cake");
    assert_eq!(suggestions[1], "fried rice");
    assert!(suggestions.len() <= 5);
    assert!(search.suggestions("r").is_empty());

    let stats = search.search_stats();
    assert_eq!(stats.popular_searches[0], ("rice cake".to_string(), 2));
    assert_eq!(stats.history_size, 2);
}

#[test]
fn test_clear_search_cache_forgets_results_and_history() {
    let food = ScriptedClient::ok(foods());
    let search = orchestrator(food.clone(), ScriptedClient::ok(exercises()));
    search.search("rice").unwrap();

    let report = search.clear_search_cache();
    assert_eq!(report.memory_entries, 2);
    assert_eq!(search.search_stats().history_size, 0);

    let again = search.search("rice").unwrap();
    assert!(!again.cache_hit);
    assert_eq!(food.calls(), 2);
}

#[test]
fn test_optimize_trims_popularity() {
    let search = orchestrator(ScriptedClient::ok(foods()), ScriptedClient::ok(exercises()));
    for i in 0..120 {
        search.search(&format!("food {}", i)).unwrap();
    }

    let report = search.optimize();
    assert_eq!(report.popular_terms_dropped, 20);
}

#[test]
fn test_invalid_config_is_rejected() {
    let cache = Arc::new(CacheStore::new(CacheConfig::memory_only(10)));
    let config = SearchConfig { max_workers: 0, ..Default::default() };
    let food: Arc<dyn SearchClient<FoodItem>> = ScriptedClient::ok(foods());
    let exercise: Arc<dyn SearchClient<ExerciseItem>> = ScriptedClient::ok(exercises());

    let err = SearchOrchestrator::new(food, exercise, cache, config).err().unwrap();
    assert_eq!(err.kind, ErrorKind::InvalidConfig);
}
