// Trigram similarity compatible with PostgreSQL's pg_trgm `similarity()`
//
// Each alphanumeric word is lower-cased and padded with two leading spaces and
// one trailing space before trigrams are taken. Similarity is the size of the
// shared trigram set over the size of the union.

use std::collections::HashSet;

pub fn trigrams(value: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    for word in value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = format!("  {} ", word.to_lowercase()).chars().collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }
    set
}

pub fn similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
}

/// Candidates at or above `threshold`, best first, at most `max_results`
pub fn rank_by_similarity<'a, I>(needle: &str, candidates: I, threshold: f64, max_results: usize) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<(&'a str, f64)> = candidates
        .into_iter()
        .map(|candidate| (candidate, similarity(needle, candidate)))
        .filter(|(_, score)| *score >= threshold)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_results);
    ranked
}
