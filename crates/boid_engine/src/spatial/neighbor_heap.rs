//! Bounded max-heap of neighbour candidates
//!
//! Keeps the `k` smallest squared distances seen so far. The root is always
//! the current worst of the kept candidates, so a new candidate only has to
//! beat the root to get in.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A point index paired with its squared distance to the query
#[derive(Debug, Clone, Copy)]
pub struct NeighborCandidate {
    /// Index into the tick's point set
    pub index: usize,
    /// Squared Euclidean distance to the query point
    pub distance_squared: f32,
}

impl NeighborCandidate {
    /// Create a new candidate
    pub fn new(index: usize, distance_squared: f32) -> Self {
        Self {
            index,
            distance_squared,
        }
    }
}

// Ordered by distance, then index, so heap order is total and deterministic.
impl Ord for NeighborCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_squared
            .total_cmp(&other.distance_squared)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for NeighborCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NeighborCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NeighborCandidate {}

/// Fixed-capacity max-heap retaining the closest candidates
#[derive(Debug, Clone)]
pub struct BoundedMaxHeap {
    capacity: usize,
    heap: BinaryHeap<NeighborCandidate>,
}

impl BoundedMaxHeap {
    /// Create an empty heap holding at most `capacity` candidates
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Maximum number of candidates kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of candidates currently kept
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when no candidate has been kept yet
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// True once `capacity` candidates are held
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// The farthest kept candidate
    pub fn peek_max(&self) -> Option<&NeighborCandidate> {
        self.heap.peek()
    }

    /// Squared distance of the farthest kept candidate
    pub fn worst_distance_squared(&self) -> Option<f32> {
        self.heap.peek().map(|c| c.distance_squared)
    }

    /// Offer a candidate, returning whether it was kept
    ///
    /// Below capacity every candidate is kept. At capacity the candidate
    /// replaces the current maximum only if it orders strictly before it:
    /// closer, or equally close with a lower index. The kept set is then
    /// independent of the order candidates arrive in.
    pub fn offer(&mut self, candidate: NeighborCandidate) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if self.heap.len() < self.capacity {
            self.heap.push(candidate);
            return true;
        }

        match self.heap.peek() {
            Some(worst) if candidate < *worst => {
                self.heap.pop();
                self.heap.push(candidate);
                true
            }
            _ => false,
        }
    }

    /// Consume the heap, yielding candidates in no particular order
    pub fn into_vec(self) -> Vec<NeighborCandidate> {
        self.heap.into_vec()
    }

    /// Consume the heap, yielding candidates nearest first
    pub fn into_sorted_vec(self) -> Vec<NeighborCandidate> {
        self.heap.into_sorted_vec()
    }
}
