use std::cmp::Ordering;

/// Order (entity key, share) pairs for a Top-N answer: share descending,
/// ties broken by ascending lexicographic key. The ordering is total as
/// long as keys are distinct (the normalizer rejects duplicates), so the
/// output never depends on source row order. Fewer entities than `limit`
/// returns all of them; `limit` itself is validated upstream.
pub fn rank_entries(mut entries: Vec<(String, f64)>, limit: usize) -> Vec<(String, f64)> {
    entries.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
    entries.truncate(limit);
    entries
}
