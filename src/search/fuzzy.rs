/// Scores candidate terms against a fixed term by normalized edit distance.
pub struct FuzzyMatcher {
    /// The term candidates are compared against
    term: Vec<char>,

    /// Minimum similarity in [0, 1] for a candidate to match
    threshold: f64,

    /// Count adjacent swaps as a single edit (teh -> the)
    transpositions: bool,
}

impl FuzzyMatcher {
    pub fn new(term: &str, threshold: f64) -> Self {
        Self {
            term: term.chars().collect(),
            threshold,
            transpositions: true,
        }
    }

    /// Similarity ratio in [0, 1]; identical terms score 1.0.
    pub fn score(&self, candidate: &str) -> f64 {
        let other: Vec<char> = candidate.chars().collect();
        let longest = self.term.len().max(other.len());
        if longest == 0 {
            return 1.0;
        }
        let distance = edit_distance(&self.term, &other, self.transpositions);
        1.0 - distance as f64 / longest as f64
    }

    /// Score if `candidate` reaches the threshold.
    pub fn matches(&self, candidate: &str) -> Option<f64> {
        let score = self.score(candidate);
        (score >= self.threshold).then_some(score)
    }
}

/// Edit distance over chars, optionally with adjacent transpositions
/// (optimal string alignment).
pub fn edit_distance(a: &[char], b: &[char], transpositions: bool) -> usize {
    let len_a = a.len();
    let len_b = b.len();

    if len_a == 0 {
        return len_b;
    }
    if len_b == 0 {
        return len_a;
    }

    let mut before_prev: Vec<usize> = vec![0; len_b + 1];
    let mut prev_row: Vec<usize> = (0..=len_b).collect();
    let mut curr_row = vec![0; len_b + 1];

    for i in 1..=len_a {
        curr_row[0] = i;

        for j in 1..=len_b {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };

            curr_row[j] = std::cmp::min(
                std::cmp::min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost,  // substitution
            );

            if transpositions && i > 1 && j > 1
                && a[i - 1] == b[j - 2]
                && a[i - 2] == b[j - 1]
            {
                curr_row[j] = std::cmp::min(curr_row[j], before_prev[j - 2] + 1);
            }
        }

        std::mem::swap(&mut before_prev, &mut prev_row);
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len_b]
}
