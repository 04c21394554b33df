//! # Flock Configuration
//!
//! Every tunable the flocking core reads, grouped by the subsystem that
//! consumes it. All structs are serde-backed so a host can keep them in a
//! TOML or RON file next to its own settings.
//!
//! ## Configuration Categories
//!
//! - **Perception**: how far an agent sees and how many neighbours it tracks
//! - **Avoidance**: the obstacle probe and the number of candidate headings
//! - **Weights**: relative strength of each steering rule
//!
//! Validation happens once, in [`FlockConfig::validate`], before any tick.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{BoidError, BoidResult};

/// How an agent's own entry is kept out of its neighbour query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelfExclusionPolicy {
    /// Skip every point whose coordinates equal the query position.
    ///
    /// Coincident but distinct agents hide each other under this policy.
    #[default]
    Coordinate,
    /// Skip only the querying agent's own index.
    Index,
}

/// # Perception Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Neighbours farther than this contribute no force
    pub vision_radius: f32,
    /// Neighbours closer than this push the agent away
    pub separation_radius: f32,
    /// Look-ahead distance used when probing for obstacles
    pub obstacle_vision_radius: f32,
    /// Number of nearest neighbours queried per agent (k)
    pub max_perceivable: usize,
    /// Self-exclusion rule for the k-NN query
    pub self_exclusion: SelfExclusionPolicy,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            vision_radius: 2.5,
            separation_radius: 1.0,
            obstacle_vision_radius: 5.0,
            max_perceivable: 7,
            self_exclusion: SelfExclusionPolicy::Coordinate,
        }
    }
}

/// # Avoidance Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Number of precomputed candidate headings (R)
    pub ray_count: usize,
    /// Radius of the swept sphere used by every probe
    pub probe_radius: f32,
    /// The forward probe reaches `obstacle_vision_radius * forward_probe_multiplier`
    pub forward_probe_multiplier: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            ray_count: 300,
            probe_radius: 0.75,
            forward_probe_multiplier: 1.25,
        }
    }
}

/// # Steering Weights
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringWeights {
    /// Pull toward the neighbours' centre
    pub cohesion: f32,
    /// Match the neighbours' heading
    pub alignment: f32,
    /// Push away from close neighbours
    pub separation: f32,
    /// Turn toward an open heading when an obstacle is ahead
    pub avoidance: f32,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self {
            cohesion: 1.0,
            alignment: 1.0,
            separation: 2.5,
            avoidance: 10.0,
        }
    }
}

/// # Complete Flock Configuration
///
/// Top-level configuration the host hands to
/// [`FlockSystem::new`](crate::flocking::FlockSystem::new).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    /// Perception settings
    pub perception: PerceptionConfig,
    /// Obstacle avoidance settings
    pub avoidance: AvoidanceConfig,
    /// Steering rule weights
    pub weights: SteeringWeights,
    /// Upper bound on each individual steering term
    pub max_steer_force: f32,
    /// Agent cruise speed; steering targets are scaled to this before clamping
    pub max_speed: f32,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            perception: PerceptionConfig::default(),
            avoidance: AvoidanceConfig::default(),
            weights: SteeringWeights::default(),
            max_steer_force: 3.0,
            max_speed: 5.0,
        }
    }
}

impl FlockConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vision and separation radii
    pub fn with_radii(mut self, vision_radius: f32, separation_radius: f32) -> Self {
        self.perception.vision_radius = vision_radius;
        self.perception.separation_radius = separation_radius;
        self
    }

    /// Set the number of neighbours queried per agent
    pub fn with_max_perceivable(mut self, k: usize) -> Self {
        self.perception.max_perceivable = k;
        self
    }

    /// Set the self-exclusion policy
    pub fn with_self_exclusion(mut self, policy: SelfExclusionPolicy) -> Self {
        self.perception.self_exclusion = policy;
        self
    }

    /// Set the number of candidate avoidance headings
    pub fn with_ray_count(mut self, ray_count: usize) -> Self {
        self.avoidance.ray_count = ray_count;
        self
    }

    /// Set the steering weights
    pub fn with_weights(mut self, weights: SteeringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the speed and force limits
    pub fn with_limits(mut self, max_speed: f32, max_steer_force: f32) -> Self {
        self.max_speed = max_speed;
        self.max_steer_force = max_steer_force;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> BoidResult<()> {
        if self.perception.max_perceivable == 0 {
            return Err(BoidError::invalid("max_perceivable", "must be at least 1"));
        }
        if self.avoidance.ray_count == 0 {
            return Err(BoidError::invalid("ray_count", "must be at least 1"));
        }

        non_negative("vision_radius", self.perception.vision_radius)?;
        non_negative("separation_radius", self.perception.separation_radius)?;
        non_negative("obstacle_vision_radius", self.perception.obstacle_vision_radius)?;
        non_negative("probe_radius", self.avoidance.probe_radius)?;
        non_negative("forward_probe_multiplier", self.avoidance.forward_probe_multiplier)?;
        non_negative("weights.cohesion", self.weights.cohesion)?;
        non_negative("weights.alignment", self.weights.alignment)?;
        non_negative("weights.separation", self.weights.separation)?;
        non_negative("weights.avoidance", self.weights.avoidance)?;
        non_negative("max_steer_force", self.max_steer_force)?;
        non_negative("max_speed", self.max_speed)?;

        Ok(())
    }
}

impl Config for FlockConfig {}

fn non_negative(field: &'static str, value: f32) -> BoidResult<()> {
    if !value.is_finite() {
        return Err(BoidError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(BoidError::invalid(field, format!("must not be negative, got {value}")));
    }
    Ok(())
}
