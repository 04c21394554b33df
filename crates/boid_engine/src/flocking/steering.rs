//! Steering engine
//!
//! Turns a [`NeighborSummary`] and an obstacle flag into one acceleration.
//! Each rule is scaled to cruise speed, clamped to the steering force limit
//! and weighted independently; the weighted terms are then summed without a
//! final clamp, so the total may exceed the per-term limit.

use log::trace;

use crate::core::config::{FlockConfig, SteeringWeights};
use crate::error::BoidResult;
use crate::foundation::math::{clamp_magnitude, Vec3};
use crate::physics::CollisionQuery;

use super::agent::AgentState;
use super::aggregator::NeighborSummary;
use super::heading_sampler::{HeadingSampler, ObstacleProbe};

/// Steering force toward `target`
///
/// Zero only for the exact zero vector; any other `target` is normalized,
/// scaled to `max_speed` and clamped to `max_force`, however short it is.
pub fn steer_towards(target: Vec3, max_speed: f32, max_force: f32) -> Vec3 {
    if target == Vec3::zeros() {
        return Vec3::zeros();
    }
    // Rescale by the largest component first so tiny targets don't underflow
    let direction = (target / target.amax()).normalize();
    clamp_magnitude(direction * max_speed, max_force)
}

/// Combines the boid rules and obstacle avoidance into an acceleration
#[derive(Debug, Clone)]
pub struct SteeringEngine {
    weights: SteeringWeights,
    max_speed: f32,
    max_steer_force: f32,
    probe: ObstacleProbe,
    sampler: HeadingSampler,
}

impl SteeringEngine {
    /// Engine for a validated configuration
    ///
    /// Builds the heading sampler, so a zero ray count is rejected here.
    pub fn new(config: &FlockConfig) -> BoidResult<Self> {
        Ok(Self {
            weights: config.weights,
            max_speed: config.max_speed,
            max_steer_force: config.max_steer_force,
            probe: ObstacleProbe::from_config(&config.perception, &config.avoidance),
            sampler: HeadingSampler::new(config.avoidance.ray_count)?,
        })
    }

    /// Avoidance heading candidates
    pub fn sampler(&self) -> &HeadingSampler {
        &self.sampler
    }

    /// Obstacle probe settings
    pub fn probe(&self) -> &ObstacleProbe {
        &self.probe
    }

    /// Whether `agent` is about to run into something
    pub fn is_heading_for_collision<C>(&self, agent: &AgentState, collision: &C) -> bool
    where
        C: CollisionQuery + ?Sized,
    {
        self.probe.is_heading_for_collision(agent, collision)
    }

    /// `steer_towards` with this engine's limits
    pub fn steer(&self, target: Vec3) -> Vec3 {
        steer_towards(target, self.max_speed, self.max_steer_force)
    }

    /// Acceleration for one agent
    ///
    /// `obstacle_hit` comes from the forward probe; when set, the first open
    /// avoidance heading is steered toward with the avoidance weight.
    pub fn compute<C>(
        &self,
        agent: &AgentState,
        summary: &NeighborSummary,
        obstacle_hit: bool,
        collision: &C,
    ) -> Vec3
    where
        C: CollisionQuery + ?Sized,
    {
        let mut acceleration = Vec3::zeros();

        if obstacle_hit {
            let heading = self.sampler.find_open_heading(agent, &self.probe, collision);
            trace!("avoiding obstacle at {:?}, turning toward {:?}", agent.position, heading);
            acceleration += self.steer(heading) * self.weights.avoidance;
        }

        acceleration += self.steer(summary.alignment_direction) * self.weights.alignment;
        acceleration += self.steer(summary.separation_direction) * self.weights.separation;
        acceleration += self.steer(summary.cohesion_target - agent.position) * self.weights.cohesion;

        acceleration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::NoObstacles;
    use approx::assert_relative_eq;

    fn config() -> FlockConfig {
        FlockConfig::new()
            .with_ray_count(32)
            .with_limits(5.0, 3.0)
            .with_weights(SteeringWeights {
                cohesion: 1.0,
                alignment: 1.0,
                separation: 1.0,
                avoidance: 1.0,
            })
    }

    #[test]
    fn test_zero_target_gives_zero_force() {
        assert_eq!(steer_towards(Vec3::zeros(), 5.0, 3.0), Vec3::zeros());
    }

    #[test]
    fn test_tiny_nonzero_target_still_steers() {
        for scale in [1e-7_f32, 1e-20, 1e-30] {
            let force = steer_towards(Vec3::new(scale, 0.0, 0.0), 5.0, 3.0);
            assert_relative_eq!(force, Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
        }

        let force = steer_towards(Vec3::new(-1e-30, 1e-30, 0.0), 5.0, 3.0);
        assert_relative_eq!(force.norm(), 3.0, epsilon = 1e-5);
        assert_relative_eq!(force.normalize(), Vec3::new(-1.0, 1.0, 0.0).normalize(), epsilon = 1e-5);
    }

    #[test]
    fn test_steer_clamps_to_max_force_along_target() {
        let targets = [
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::new(1e-3, -1e-3, 2e-3),
            Vec3::new(300.0, -200.0, 100.0),
        ];
        for target in targets {
            let force = steer_towards(target, 5.0, 3.0);
            assert!(force.norm() <= 3.0 + 1e-5);
            assert_relative_eq!(force.normalize(), target.normalize(), epsilon = 1e-5);
            assert_relative_eq!(force.norm(), 3.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_steer_below_limit_is_scaled_to_speed() {
        let force = steer_towards(Vec3::new(0.0, 0.0, 0.1), 2.0, 3.0);
        assert_relative_eq!(force, Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_zero_neighbor_cohesion_is_zero() {
        let engine = SteeringEngine::new(&config()).unwrap();
        let agent = AgentState::new(Vec3::new(2.0, -1.0, 4.0), Vec3::x());
        let summary = NeighborSummary::alone(agent.position);

        let acceleration = engine.compute(&agent, &summary, false, &NoObstacles);
        assert_eq!(acceleration, Vec3::zeros());
    }

    #[test]
    fn test_terms_are_clamped_independently() {
        let engine = SteeringEngine::new(&config()).unwrap();
        let agent = AgentState::new(Vec3::zeros(), Vec3::z());
        let summary = NeighborSummary {
            cohesion_target: Vec3::new(0.0, 10.0, 0.0),
            alignment_direction: Vec3::new(10.0, 0.0, 0.0),
            separation_direction: Vec3::new(0.0, 0.0, -10.0),
            in_vision_count: 2,
            perceived_count: 2,
        };

        let acceleration = engine.compute(&agent, &summary, false, &NoObstacles);
        assert_relative_eq!(acceleration, Vec3::new(3.0, 3.0, -3.0), epsilon = 1e-5);
        assert!(acceleration.norm() > 3.0);
    }

    #[test]
    fn test_obstacle_hit_adds_avoidance_term() {
        let engine = SteeringEngine::new(&config()).unwrap();
        let agent = AgentState::new(Vec3::zeros(), Vec3::z());
        let summary = NeighborSummary::alone(agent.position);

        // Nothing blocks candidate probes, so sample 0 (straight ahead) wins
        let acceleration = engine.compute(&agent, &summary, true, &NoObstacles);
        assert_relative_eq!(acceleration, Vec3::new(0.0, 0.0, 3.0), epsilon = 1e-5);

        let everything_blocked = |_: Vec3, _: f32, _: Vec3, _: f32| true;
        let acceleration = engine.compute(&agent, &summary, true, &everything_blocked);
        assert_relative_eq!(acceleration, Vec3::new(0.0, 0.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_engine_rejects_zero_rays() {
        assert!(SteeringEngine::new(&FlockConfig::new().with_ray_count(0)).is_err());
    }
}
