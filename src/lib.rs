pub mod core;
pub mod cache;
pub mod search;

/*
┌────────────────────────────────────────────────────────────────────────────────────────────┐
│                              NUTRIX STRUCT ARCHITECTURE                                     │
└────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── SEARCH LAYER ────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                          struct SearchOrchestrator                                  │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ food_client: Arc<dyn SearchClient<FoodItem>>         // External food API    │ │    │
│  │  │ exercise_client: Arc<dyn SearchClient<ExerciseItem>> // External exercise API│ │    │
│  │  │ cache: Arc<CacheStore>            // Shared two-tier cache                   │ │    │
│  │  │ retry: RetryPolicy                // Attempts + linear backoff               │ │    │
│  │  │ suggester: SuggestionEngine       // History / popularity / fuzzy ranking    │ │    │
│  │  │ history: Mutex<SearchHistory>     // Recent terms + popularity counts        │ │    │
│  │  │ stats: Mutex<SearchStats>         // Searches, hits, API calls, failures     │ │    │
│  │  │ dispatch_pool: WorkerPool         // Domain fan-out, width per batch worker  │ │    │
│  │  │ batch_pool: WorkerPool            // Batch fan-out (par_iter)                │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│   search(q) ──► history.record ──► cache probe (food, exercise)                             │
│                                      │ both hit ──────────────────────► SearchResult        │
│                                      │ otherwise                                            │
│                                      ▼                                                      │
│                        dispatch_pool.join(fetch food, fetch exercise)                       │
│                          each: RetryPolicy.run ──► cache.put ──► Vec<T> (empty on error)    │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── CACHE LAYER ─────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                               struct CacheStore                                     │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ inner: Mutex<CacheInner>                                                     │ │    │
│  │  │   memory: MemoryTier              // LruCache<CacheKey, CacheEntry>          │ │    │
│  │  │   disk: Option<DiskTier>          // <dir>/<domain>/<prefix><sha256>.cache   │ │    │
│  │  │   stats: CacheStats               // requests, hits, misses, expired, evicted│ │    │
│  │  │ config: CacheConfig                                                          │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│   get(key) ──► memory ──hit──► access() ──► payload                                         │
│                  │ miss/expired                                                             │
│                  ▼                                                                          │
│                disk ──hit──► promote (if room) ──► payload                                  │
│                  │ missing / expired / corrupt                                              │
│                  ▼                                                                          │
│                miss                                                                         │
│                                                                                              │
│   Disk file: [NXC1][crc32 LE][len LE][bincode(CacheEntry)]                                  │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── CORE LAYER ──────────────────────────────────────────┐
│  Config { cache: CacheConfig, search: SearchConfig }                                        │
│  Error { kind: ErrorKind, context }     ClientError { NoResults, Network, Timeout, Other }  │
│  Domain { Food, Exercise, Nutrition }   CachePayload { Foods, Exercises, Nutrition }        │
└──────────────────────────────────────────────────────────────────────────────────────────────┘
*/
