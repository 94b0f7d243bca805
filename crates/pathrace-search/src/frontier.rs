use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::SearchGrid;

/// Reference into the cell array, ordered by rank then insertion order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Entry {
    rank: i32,
    seq: u64,
    idx: usize,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest rank first, and the
        // earliest insertion among equal ranks.
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority frontier with lazy deletion.
///
/// An improved cell is pushed again at its new rank instead of being updated
/// in place. Entries are only trusted on pop: closed cells, cells no longer
/// open, and entries whose rank differs from the cell's live `f` are skipped.
#[derive(Clone, Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<Entry>,
    seq: u64,
}

impl Frontier {
    pub(crate) fn push(&mut self, idx: usize, rank: i32) {
        self.heap.push(Entry {
            rank,
            seq: self.seq,
            idx,
        });
        self.seq += 1;
    }

    /// Pop the best live entry.
    pub(crate) fn pop_live(&mut self, grid: &SearchGrid) -> Option<usize> {
        while let Some(e) = self.heap.pop() {
            if Self::is_live(e, grid) {
                return Some(e.idx);
            }
        }
        None
    }

    /// Drop stale entries at the head; returns whether a live entry remains.
    pub(crate) fn has_live(&mut self, grid: &SearchGrid) -> bool {
        while let Some(&e) = self.heap.peek() {
            if Self::is_live(e, grid) {
                return true;
            }
            self.heap.pop();
        }
        false
    }

    /// Number of stored entries, stale ones included.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    fn is_live(e: Entry, grid: &SearchGrid) -> bool {
        let c = grid.cell(e.idx);
        c.open && !c.closed && c.f == e.rank
    }
}
