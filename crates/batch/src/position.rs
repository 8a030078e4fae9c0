//! Fractional position allocation for kanban views.
//!
//! Vikunja orders tasks within a view by a fractional `position` value.
//! Inserting between two neighbors takes their midpoint, so a sequence
//! of insertions never forces renumbering of existing tasks.

use crate::sort::SortKey;

/// Position of the first task in an empty bucket.
pub const FIRST_POSITION: f64 = 1000.0;

/// Gap left after the current tail when appending.
pub const POSITION_GAP: f64 = 1000.0;

/// Position used when inserting before a head that is already at or
/// below zero, where halving would stop making room.
pub const HEAD_FLOOR: f64 = -1000.0;

/// Sorted ladder of (sort key, position) pairs for one bucket.
///
/// Each [`allocate`](Self::allocate) call both returns a fresh position
/// for the given key and records it, so sequential insertions spread out
/// between each other the same way they would against the live view.
#[derive(Debug, Default)]
pub struct PositionLadder {
    entries: Vec<(SortKey, f64)>,
}

impl PositionLadder {
    /// Builds a ladder from a bucket's existing tasks. Entries are
    /// ordered by key, with position as a tiebreaker so equal keys keep
    /// their current relative order.
    #[must_use]
    pub fn new(mut entries: Vec<(SortKey, f64)>) -> Self {
        entries.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });
        Self { entries }
    }

    /// Number of entries currently on the ladder.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ladder is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocates a position that places `key` before the first existing
    /// entry with a greater-or-equal key, and records the new entry.
    pub fn allocate(&mut self, key: SortKey) -> f64 {
        let idx = self.entries.partition_point(|(k, _)| *k < key);
        let position = if self.entries.is_empty() {
            FIRST_POSITION
        } else if idx == 0 {
            let first = self.entries[0].1;
            if first > 0.0 {
                first / 2.0
            } else {
                HEAD_FLOOR
            }
        } else if idx == self.entries.len() {
            self.entries[idx - 1].1 + POSITION_GAP
        } else {
            (self.entries[idx - 1].1 + self.entries[idx].1) / 2.0
        };
        self.entries.insert(idx, (key, position));
        position
    }
}
