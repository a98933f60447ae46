use std::collections::HashMap;
use lru::LruCache;

/// Recently searched terms plus a popularity count per term.
///
/// Terms are stored trimmed and lowercased. When more than `capacity`
/// distinct terms are held, the oldest are evicted in batches from both
/// the recency list and the popularity table.
pub struct SearchHistory {
    recent: LruCache<String, ()>,
    popularity: HashMap<String, u64>,
    capacity: usize,
    evict_batch: usize,
}

impl SearchHistory {
    pub fn new(capacity: usize, evict_batch: usize) -> Self {
        SearchHistory {
            recent: LruCache::unbounded(),
            popularity: HashMap::new(),
            capacity: capacity.max(1),
            evict_batch: evict_batch.max(1),
        }
    }

    pub fn normalize(term: &str) -> String {
        term.trim().to_lowercase()
    }

    pub fn record(&mut self, term: &str) {
        let term = Self::normalize(term);
        if term.is_empty() {
            return;
        }
        *self.popularity.entry(term.clone()).or_insert(0) += 1;
        self.recent.put(term, ());

        if self.recent.len() > self.capacity {
            let excess = self.recent.len() - self.capacity;
            for _ in 0..excess.max(self.evict_batch) {
                match self.recent.pop_lru() {
                    Some((old, ())) => {
                        self.popularity.remove(&old);
                    }
                    None => break,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.recent.contains(&Self::normalize(term))
    }

    pub fn popularity_of(&self, term: &str) -> u64 {
        self.popularity.get(&Self::normalize(term)).copied().unwrap_or(0)
    }

    /// Terms, most recently searched first.
    pub fn recent_terms(&self) -> Vec<String> {
        self.recent.iter().map(|(term, _)| term.clone()).collect()
    }

    /// All counted terms, most frequent first; ties break alphabetically.
    pub fn popular_terms(&self) -> Vec<(String, u64)> {
        let mut terms: Vec<(String, u64)> = self
            .popularity
            .iter()
            .map(|(term, count)| (term.clone(), *count))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms
    }

    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut terms = self.popular_terms();
        terms.truncate(n);
        terms
    }

    /// Every distinct term known to either table.
    pub fn known_terms(&self) -> Vec<String> {
        let mut terms = self.recent_terms();
        for term in self.popularity.keys() {
            if !self.recent.contains(term) {
                terms.push(term.clone());
            }
        }
        terms
    }

    /// Keep only the `keep` most popular counts. Returns how many were dropped.
    pub fn trim_popularity(&mut self, keep: usize) -> usize {
        if self.popularity.len() <= keep {
            return 0;
        }
        let kept: HashMap<String, u64> = self.top(keep).into_iter().collect();
        let dropped = self.popularity.len() - kept.len();
        self.popularity = kept;
        dropped
    }

    pub fn clear(&mut self) {
        self.recent.clear();
        self.popularity.clear();
    }
}
