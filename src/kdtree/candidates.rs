use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::r#type::IndexableNum;

/// A point and its squared distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate<N: IndexableNum> {
    dist: N,
    id: u32,
}

impl<N: IndexableNum> Eq for Candidate<N> {}

impl<N: IndexableNum> Ord for Candidate<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Coordinates are validated as finite, so distances are always comparable
        self.dist
            .partial_cmp(&other.dist)
            .unwrap_or(Ordering::Equal)
            .then(self.id.cmp(&other.id))
    }
}

impl<N: IndexableNum> PartialOrd for Candidate<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The `capacity` best candidates seen so far, ordered by `(distance, id)`.
///
/// Backed by a max-heap so the worst accepted candidate is always at the top. Equal distances are
/// allowed; the larger id loses.
#[derive(Debug)]
pub(crate) struct Candidates<N: IndexableNum> {
    heap: BinaryHeap<Candidate<N>>,
    capacity: usize,
}

impl<N: IndexableNum> Candidates<N> {
    /// `capacity` should already be clamped to the number of items in the tree.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            heap: BinaryHeap::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Offer a point, returning whether it was accepted.
    pub(crate) fn offer(&mut self, dist: N, id: u32) -> bool {
        let candidate = Candidate { dist, id };
        if self.heap.len() < self.capacity {
            self.heap.push(candidate);
            return true;
        }

        match self.heap.peek() {
            Some(worst) if candidate < *worst => {
                self.heap.push(candidate);
                self.heap.pop();
                true
            }
            _ => false,
        }
    }

    /// The worst accepted distance, or `None` while fewer than `capacity` candidates are held.
    pub(crate) fn bound(&self) -> Option<N> {
        if self.heap.len() < self.capacity {
            None
        } else {
            self.heap.peek().map(|worst| worst.dist)
        }
    }

    /// Whether a region at squared distance `dist` could still hold an accepted candidate.
    #[inline]
    pub(crate) fn admits(&self, dist: N) -> bool {
        self.bound().map_or(true, |bound| dist <= bound)
    }

    /// Candidate ids ascending by `(distance, id)`.
    pub(crate) fn into_sorted_ids(self) -> Vec<u32> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|candidate| candidate.id)
            .collect()
    }
}
