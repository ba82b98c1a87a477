use chrono::{DateTime, Utc};

/// Number of items each dashboard panel shows.
pub const DASHBOARD_LIMIT: usize = 5;

/// A record that can be ordered by recency.
pub trait Recent {
    fn id(&self) -> i64;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Returns the `limit` most recently created items, newest first.
///
/// Items created at the same instant are ordered by id, highest first, so the
/// result is stable across calls as long as the collection does not change.
pub fn recent<T: Recent + Clone>(items: &[T], limit: usize) -> Vec<T> {
    if limit == 0 {
        return Vec::new();
    }

    let newest_first = |a: &&T, b: &&T| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    };

    let mut selected: Vec<&T> = items.iter().collect();
    // Partition the newest `limit` to the front, then only sort those
    if selected.len() > limit {
        selected.select_nth_unstable_by(limit - 1, newest_first);
        selected.truncate(limit);
    }
    selected.sort_by(newest_first);

    selected.into_iter().cloned().collect()
}
