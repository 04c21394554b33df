//! Neighbour aggregation
//!
//! Reduces an agent's k nearest neighbours to the three boid rule inputs:
//! where the local group is (cohesion), which way it is heading (alignment)
//! and what is too close (separation).

use crate::core::config::{PerceptionConfig, SelfExclusionPolicy};
use crate::foundation::math::Vec3;
use crate::spatial::{NeighborSearch, SelfExclusion};

use super::agent::AgentState;

/// Rule inputs derived from one agent's neighbourhood
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborSummary {
    /// Mean position of in-vision neighbours, or the agent's own position
    pub cohesion_target: Vec3,
    /// Sum of in-vision neighbours' forward headings
    pub alignment_direction: Vec3,
    /// Inverse-square push away from neighbours inside the separation radius
    pub separation_direction: Vec3,
    /// Neighbours within the vision radius
    pub in_vision_count: usize,
    /// Neighbours returned by the k-NN query, in vision or not
    pub perceived_count: usize,
}

impl NeighborSummary {
    /// Summary of an empty neighbourhood
    pub fn alone(position: Vec3) -> Self {
        Self {
            cohesion_target: position,
            alignment_direction: Vec3::zeros(),
            separation_direction: Vec3::zeros(),
            in_vision_count: 0,
            perceived_count: 0,
        }
    }
}

/// Queries the neighbour search and folds results into a [`NeighborSummary`]
#[derive(Debug, Clone)]
pub struct NeighborAggregator {
    vision_radius_sq: f32,
    separation_radius_sq: f32,
    max_perceivable: usize,
    self_exclusion: SelfExclusionPolicy,
}

impl NeighborAggregator {
    /// Aggregator for the given perception settings
    pub fn new(perception: &PerceptionConfig) -> Self {
        Self {
            vision_radius_sq: perception.vision_radius * perception.vision_radius,
            separation_radius_sq: perception.separation_radius * perception.separation_radius,
            max_perceivable: perception.max_perceivable,
            self_exclusion: perception.self_exclusion,
        }
    }

    /// Summarise the neighbourhood of agent `index`
    ///
    /// `search` must have been built from the positions in `agents`, in the
    /// same order.
    pub fn aggregate<S>(&self, index: usize, agents: &[AgentState], search: &S) -> NeighborSummary
    where
        S: NeighborSearch + ?Sized,
    {
        let position = agents[index].position;
        let exclusion = match self.self_exclusion {
            SelfExclusionPolicy::Coordinate => SelfExclusion::Coordinate,
            SelfExclusionPolicy::Index => SelfExclusion::Index(index),
        };

        let neighbors = search.k_nearest(&position, self.max_perceivable, exclusion);
        let mut summary = NeighborSummary::alone(position);
        summary.perceived_count = neighbors.len();

        let mut position_sum = Vec3::zeros();
        for candidate in &neighbors {
            // Index exclusion already filters this; coordinate exclusion may not
            if candidate.index == index || candidate.distance_squared >= self.vision_radius_sq {
                continue;
            }

            let other = &agents[candidate.index];
            position_sum += other.position;
            summary.alignment_direction += other.forward;
            summary.in_vision_count += 1;

            // Coincident neighbours give no direction to push along
            if candidate.distance_squared > 0.0 && candidate.distance_squared < self.separation_radius_sq {
                summary.separation_direction += (position - other.position) / candidate.distance_squared;
            }
        }

        if summary.in_vision_count > 0 {
            summary.cohesion_target = position_sum / summary.in_vision_count as f32;
        }

        summary
    }
}
