//! Dense rank resequencing.
//!
//! A rank is a 1-based position inside a scope (a home grid column, or the
//! pinned favorites of one folder). Ranks drift when rows are deleted or
//! written by older code paths; [`resequence`] closes gaps and resolves
//! duplicates without changing relative order.

use std::cmp::Ordering;

/// An entity carrying a position inside some scope.
pub trait Ranked {
    /// Current rank, if any.
    fn rank(&self) -> Option<i32>;

    /// Overwrite the rank.
    fn set_rank(&mut self, rank: i32);

    /// Stable key used to order entities sharing a rank.
    fn tiebreak(&self) -> i64;
}

/// Ordering used for every scope: rank ascending, unranked rows last,
/// ties broken by the entity key.
pub fn rank_order<T: Ranked>(a: &T, b: &T) -> Ordering {
    match (a.rank(), b.rank()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.tiebreak().cmp(&b.tiebreak()))
}

/// Sort a scope into rank order.
pub fn sort_by_rank<T: Ranked>(items: &mut [T]) {
    items.sort_by(rank_order);
}

/// Assign ranks `1..=N` to `items` in their given order.
///
/// Input order defines output order; nothing is reordered. Returns the
/// indices whose rank actually changed, so callers persist only those.
/// A second call on the same slice returns an empty list.
pub fn resequence<T: Ranked>(items: &mut [T]) -> Vec<usize> {
    let mut changed = Vec::new();
    for (index, item) in items.iter_mut().enumerate() {
        let rank = index as i32 + 1;
        if item.rank() != Some(rank) {
            item.set_rank(rank);
            changed.push(index);
        }
    }
    changed
}

/// Highest rank present in a scope, or 0 when empty.
pub fn max_rank<T: Ranked>(items: &[T]) -> i32 {
    items.iter().filter_map(Ranked::rank).max().unwrap_or(0)
}
