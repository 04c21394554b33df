//! Spatial indexing for per-tick neighbour queries
//!
//! Provides the KD-tree rebuilt every tick, the bounded heap its k-NN search
//! accumulates into, and the search trait the flocking code consumes.

mod kd_tree;
mod neighbor_heap;
pub mod spatial_query;

pub use kd_tree::{Axis, KdNode, KdTree, NodeId, SelfExclusion};
pub use neighbor_heap::{BoundedMaxHeap, NeighborCandidate};
pub use spatial_query::{BruteForceSearch, NeighborSearch};
