//! Obstacle-avoidance heading candidates
//!
//! A fixed Fibonacci-sphere sampling of unit directions in agent-local space,
//! computed once. Direction 0 is straight ahead (+Z) and later directions
//! spiral outward toward straight behind, so scanning in index order tries
//! the smallest turns first.

use log::{debug, trace};

use crate::core::config::{AvoidanceConfig, PerceptionConfig};
use crate::error::{BoidError, BoidResult};
use crate::foundation::math::constants::{GOLDEN_RATIO, TAU};
use crate::foundation::math::Vec3;
use crate::physics::CollisionQuery;

use super::agent::AgentState;

/// Swept-sphere probe settings shared by the forward check and the heading scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleProbe {
    /// Radius of the swept sphere
    pub probe_radius: f32,
    /// Reach of each candidate heading probe
    pub look_ahead: f32,
    /// The forward probe reaches `look_ahead * forward_multiplier`
    pub forward_multiplier: f32,
}

impl ObstacleProbe {
    /// Probe settings from configuration
    pub fn from_config(perception: &PerceptionConfig, avoidance: &AvoidanceConfig) -> Self {
        Self {
            probe_radius: avoidance.probe_radius,
            look_ahead: perception.obstacle_vision_radius,
            forward_multiplier: avoidance.forward_probe_multiplier,
        }
    }

    /// Whether the agent's current heading runs into an obstacle
    pub fn is_heading_for_collision<C>(&self, agent: &AgentState, collision: &C) -> bool
    where
        C: CollisionQuery + ?Sized,
    {
        collision.cast(
            agent.position,
            self.probe_radius,
            agent.forward,
            self.look_ahead * self.forward_multiplier,
        )
    }
}

/// Precomputed avoidance directions
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingSampler {
    directions: Vec<Vec3>,
}

impl HeadingSampler {
    /// Sample `ray_count` directions; zero is rejected
    pub fn new(ray_count: usize) -> BoidResult<Self> {
        if ray_count == 0 {
            return Err(BoidError::invalid("ray_count", "must be at least 1"));
        }

        let count = ray_count as f32;
        let azimuth_step = TAU * GOLDEN_RATIO;
        let directions = (0..ray_count)
            .map(|i| {
                let t = i as f32 / count;
                let inclination = (1.0 - 2.0 * t).acos();
                let azimuth = azimuth_step * i as f32;
                Vec3::new(
                    inclination.sin() * azimuth.cos(),
                    inclination.sin() * azimuth.sin(),
                    inclination.cos(),
                )
            })
            .collect();

        Ok(Self { directions })
    }

    /// Directions in agent-local space
    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    /// Number of directions (R)
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// Always false; a sampler holds at least one direction
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// First world-space heading whose probe reports no obstacle
    ///
    /// Falls back to the agent's current forward when every direction is
    /// blocked.
    pub fn find_open_heading<C>(&self, agent: &AgentState, probe: &ObstacleProbe, collision: &C) -> Vec3
    where
        C: CollisionQuery + ?Sized,
    {
        let open = self
            .directions
            .iter()
            .map(|local| agent.orientation * local)
            .enumerate()
            .find(|(_, world)| {
                !collision.cast(agent.position, probe.probe_radius, *world, probe.look_ahead)
            });

        match open {
            Some((index, heading)) => {
                trace!("open heading found at sample {index} of {}", self.directions.len());
                heading
            }
            None => {
                debug!(
                    "all {} avoidance headings blocked at {:?}; keeping forward",
                    self.directions.len(),
                    agent.position
                );
                agent.forward
            }
        }
    }
}
