use std::collections::HashSet;
use crate::core::config::SearchConfig;
use crate::search::fuzzy::FuzzyMatcher;
use crate::search::history::SearchHistory;

/// Keywords appended when a query touches one of these topics.
const RELATED_KEYWORDS: &[(&str, &[&str])] = &[
    ("rice", &["brown rice", "fried rice", "rice cake"]),
    ("chicken", &["chicken breast", "fried chicken", "chicken salad"]),
    ("egg", &["boiled egg", "egg white", "fried egg"]),
    ("noodle", &["ramen", "udon", "cold noodles"]),
    ("salad", &["green salad", "chicken salad", "potato salad"]),
    ("cardio", &["running", "cycling", "swimming", "jump rope"]),
    ("running", &["jogging", "treadmill", "sprint"]),
    ("walk", &["brisk walking", "hiking", "stair climbing"]),
    ("swim", &["freestyle", "backstroke", "water aerobics"]),
    ("weight", &["squat", "deadlift", "bench press"]),
    ("밥", &["현미밥", "볶음밥", "김밥"]),
    ("달리기", &["조깅", "러닝머신", "인터벌"]),
];

/// Ranks completions for a partial query from recorded search history.
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    max_suggestions: usize,
    threshold: f64,
    min_len: usize,
}

impl SuggestionEngine {
    pub fn new(max_suggestions: usize, threshold: f64, min_len: usize) -> Self {
        SuggestionEngine { max_suggestions, threshold, min_len }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.max_suggestions,
            config.suggestion_threshold,
            config.min_suggestion_len,
        )
    }

    /// Suggestions for `partial`, best first, at most `max_suggestions`.
    ///
    /// Order: recent history containing the query, then popular terms
    /// containing it, then fuzzy matches by similarity. Related keywords
    /// fill whatever room is left. The query itself is never suggested.
    pub fn suggest(&self, partial: &str, history: &SearchHistory) -> Vec<String> {
        let query = SearchHistory::normalize(partial);
        if self.max_suggestions == 0 || query.chars().count() < self.min_len {
            return Vec::new();
        }

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(query.clone());
        let mut out = Vec::with_capacity(self.max_suggestions);

        for term in history.recent_terms() {
            if term.contains(&query) && seen.insert(term.clone()) {
                out.push(term);
            }
        }

        for (term, _) in history.popular_terms() {
            if term.contains(&query) && seen.insert(term.clone()) {
                out.push(term);
            }
        }

        let matcher = FuzzyMatcher::new(&query, self.threshold);
        let mut fuzzy: Vec<(String, f64)> = history
            .known_terms()
            .into_iter()
            .filter(|term| !seen.contains(term))
            .filter_map(|term| matcher.matches(&term).map(|score| (term, score)))
            .collect();
        fuzzy.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (term, _) in fuzzy {
            if seen.insert(term.clone()) {
                out.push(term);
            }
        }

        out.truncate(self.max_suggestions);

        for keyword in related_keywords(&query) {
            if out.len() >= self.max_suggestions {
                break;
            }
            if seen.insert(keyword.to_string()) {
                out.push(keyword.to_string());
            }
        }

        out
    }
}

fn related_keywords(query: &str) -> impl Iterator<Item = &'static str> + '_ {
    RELATED_KEYWORDS
        .iter()
        .filter(move |(topic, _)| query.contains(*topic) || topic.contains(query))
        .flat_map(|(_, keywords)| keywords.iter().copied())
}
