//! Abstract neighbour search interface
//!
//! The aggregator only needs "the k nearest points to here", so it talks to
//! this trait rather than to the KD-tree directly. A linear scan implements
//! the same contract and serves as the reference the tree is checked against.

use crate::foundation::math::{distance_squared, Vec3};

use super::kd_tree::{KdTree, SelfExclusion};
use super::neighbor_heap::NeighborCandidate;

/// Bounded k-nearest-neighbour lookup over one tick's point set
///
/// Implementations are read-only once built, so a single instance can be
/// shared by every worker of a tick.
pub trait NeighborSearch: Send + Sync {
    /// Up to `k` nearest points to `query`, in no particular order
    fn k_nearest(&self, query: &Vec3, k: usize, exclusion: SelfExclusion) -> Vec<NeighborCandidate>;

    /// Number of searchable points
    fn len(&self) -> usize;

    /// True when nothing can be found
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NeighborSearch for KdTree {
    fn k_nearest(&self, query: &Vec3, k: usize, exclusion: SelfExclusion) -> Vec<NeighborCandidate> {
        self.query(query, k, exclusion)
    }

    fn len(&self) -> usize {
        KdTree::len(self)
    }
}

/// Linear-scan search over a borrowed point set
///
/// O(N log N) per query. Results are ordered nearest first with ties broken
/// by index.
#[derive(Debug, Clone, Copy)]
pub struct BruteForceSearch<'a> {
    points: &'a [Vec3],
}

impl<'a> BruteForceSearch<'a> {
    /// Wrap a point set
    pub fn new(points: &'a [Vec3]) -> Self {
        Self { points }
    }
}

impl NeighborSearch for BruteForceSearch<'_> {
    fn k_nearest(&self, query: &Vec3, k: usize, exclusion: SelfExclusion) -> Vec<NeighborCandidate> {
        if k == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<NeighborCandidate> = self
            .points
            .iter()
            .enumerate()
            .filter(|&(index, point)| !exclusion.excludes(index, point, query))
            .map(|(index, point)| NeighborCandidate::new(index, distance_squared(point, query)))
            .collect();

        candidates.sort_unstable();
        candidates.truncate(k);
        candidates
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
