/// Nutrix cached search demo
///
/// Runs the orchestrator against in-process food and exercise backends:
/// - First search goes to the backends, the second is served from cache
/// - A flaky backend is retried
/// - Batch search and suggestions
/// - Cache and search statistics
///
/// RUST_LOG=debug shows the cache and retry decisions.

use Nutrix::cache::store::CacheStore;
use Nutrix::core::config::{CacheConfig, SearchConfig};
use Nutrix::core::error::ClientError;
use Nutrix::core::types::{ExerciseItem, FoodItem};
use Nutrix::search::client::SearchClient;
use Nutrix::search::orchestrator::SearchOrchestrator;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

const FOODS: &[(&str, &str, &str)] = &[
    ("D000001", "white rice", "grains"),
    ("D000002", "brown rice", "grains"),
    ("D000003", "fried rice", "dishes"),
    ("D000004", "kimchi", "side dishes"),
    ("D000005", "chicken breast", "meat"),
];

const EXERCISES: &[(&str, &str, f64)] = &[
    ("walking", "walking at a moderate pace", 3.5),
    ("running", "running at 8 km/h", 8.3),
    ("cycling", "leisure cycling", 4.0),
];

struct FoodBackend;

impl SearchClient<FoodItem> for FoodBackend {
    fn search(&self, query: &str) -> Result<Vec<FoodItem>, ClientError> {
        let query = query.to_lowercase();
        let items: Vec<FoodItem> = FOODS
            .iter()
            .filter(|(_, name, _)| name.contains(&query))
            .map(|(id, name, category)| FoodItem {
                category: Some(category.to_string()),
                ..FoodItem::new(*id, *name)
            })
            .collect();
        if items.is_empty() {
            Err(ClientError::NoResults)
        } else {
            Ok(items)
        }
    }
}

/// Times out on every other call.
struct FlakyExerciseBackend {
    calls: AtomicUsize,
}

impl SearchClient<ExerciseItem> for FlakyExerciseBackend {
    fn search(&self, query: &str) -> Result<Vec<ExerciseItem>, ClientError> {
        if self.calls.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
            return Err(ClientError::Timeout("exercise backend did not answer".to_string()));
        }
        let query = query.to_lowercase();
        Ok(EXERCISES
            .iter()
            .filter(|(name, _, _)| name.contains(&query) || query.contains("cardio"))
            .map(|(name, description, met)| ExerciseItem::new(*name, *description, *met))
            .collect())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║        Nutrix - Cached Search Demo            ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // Step 1: Build cache and orchestrator
    let cache_dir = std::env::temp_dir().join("nutrix-demo-cache");
    let cache = Arc::new(CacheStore::new(CacheConfig::with_dir(&cache_dir)));
    let config = SearchConfig {
        retry_delay_ms: 50,
        ..Default::default()
    };
    let search = SearchOrchestrator::new(
        Arc::new(FoodBackend),
        Arc::new(FlakyExerciseBackend { calls: AtomicUsize::new(0) }),
        cache.clone(),
        config,
    )?;
    println!("Cache directory: {}\n", cache_dir.display());

    // Step 2: Search twice
    for round in 1..=2 {
        let result = search.search("rice")?;
        println!(
            "Round {}: {} foods, {} exercises, cache_hit={}, {:?}",
            round,
            result.food_results.len(),
            result.exercise_results.len(),
            result.cache_hit,
            result.search_time,
        );
        for food in &result.food_results {
            println!("  - {} ({})", food.name, food.food_id);
        }
    }

    // Step 3: Batch
    println!("\nBatch search...");
    let batch = search.batch_search(&["kimchi", "running", "cardio", "  "]);
    println!(
        "  {} ok, {} failed, {:.1}% cached in {:?}",
        batch.success_count, batch.failure_count, batch.cache_hit_rate, batch.total_time,
    );

    // Step 4: Suggestions
    println!("\nSuggestions for 'ric': {:?}", search.suggestions("ric"));
    println!("Suggestions for 'cardio': {:?}", search.suggestions("cardio"));

    // Step 5: Statistics
    let stats = search.search_stats();
    println!("\nSearch stats:\n{}", serde_json::to_string_pretty(&stats)?);
    println!("\nCache info:\n{}", serde_json::to_string_pretty(&cache.info())?);

    let report = search.clear_search_cache();
    println!(
        "\nCleared {} memory entries and {} disk files",
        report.memory_entries, report.disk_files,
    );

    Ok(())
}
