//! Per-tick flock update
//!
//! One tick: snapshot positions, build the KD-tree once, then for every agent
//! query, aggregate and steer against that frozen tree. Agents only read the
//! snapshot and the tree, so the per-agent pass can run in parallel (enable
//! the `parallel` feature).

use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::config::FlockConfig;
use crate::error::BoidResult;
use crate::foundation::math::Vec3;
use crate::physics::CollisionQuery;
use crate::spatial::{KdTree, NeighborSearch};

use super::agent::{AgentState, KinematicsSink, PositionSource};
use super::aggregator::{NeighborAggregator, NeighborSummary};
use super::steering::SteeringEngine;

/// Steering outcome for one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSteering {
    /// Acceleration to hand to kinematics
    pub acceleration: Vec3,
    /// Neighbours that contributed to the rule forces
    pub in_vision_count: usize,
    /// Whether the forward probe triggered obstacle avoidance
    pub avoiding: bool,
}

/// Everything computed in one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Per-agent results, indexed like the snapshot
    pub agents: Vec<AgentSteering>,
    /// Depth of the tick's KD-tree
    pub tree_depth: usize,
}

impl TickReport {
    /// Accelerations in snapshot order
    pub fn accelerations(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.agents.iter().map(|a| a.acceleration)
    }

    /// Number of agents that steered around an obstacle
    pub fn avoiding_count(&self) -> usize {
        self.agents.iter().filter(|a| a.avoiding).count()
    }

    /// Mean number of in-vision neighbours
    pub fn mean_in_vision(&self) -> f32 {
        if self.agents.is_empty() {
            return 0.0;
        }
        let total: usize = self.agents.iter().map(|a| a.in_vision_count).sum();
        total as f32 / self.agents.len() as f32
    }
}

/// Flocking pipeline configured once and run every tick
#[derive(Debug, Clone)]
pub struct FlockSystem {
    config: FlockConfig,
    aggregator: NeighborAggregator,
    steering: SteeringEngine,
}

impl FlockSystem {
    /// Validate `config` and precompute the avoidance headings
    pub fn new(config: FlockConfig) -> BoidResult<Self> {
        config.validate()?;

        let aggregator = NeighborAggregator::new(&config.perception);
        let steering = SteeringEngine::new(&config)?;

        info!(
            "Flock system ready: k = {}, {} avoidance rays, {:?} self exclusion",
            config.perception.max_perceivable,
            steering.sampler().len(),
            config.perception.self_exclusion
        );

        Ok(Self {
            config,
            aggregator,
            steering,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Steering engine
    pub fn steering(&self) -> &SteeringEngine {
        &self.steering
    }

    /// Compute every agent's acceleration for this tick
    pub fn tick<C>(&self, agents: &[AgentState], collision: &C) -> TickReport
    where
        C: CollisionQuery + ?Sized,
    {
        let positions: Vec<Vec3> = agents.iter().map(|a| a.position).collect();
        let tree = KdTree::build(&positions);
        let tree_depth = tree.depth();

        debug!(
            "tick: {} agents, kd-tree depth {}, {} nodes",
            agents.len(),
            tree_depth,
            tree.node_count()
        );

        TickReport {
            agents: self.steer_all(agents, &tree, collision),
            tree_depth,
        }
    }

    /// Pull a snapshot from `source`, tick, and push accelerations to `sink`
    pub fn step<P, C, K>(&self, source: &P, collision: &C, sink: &mut K) -> TickReport
    where
        P: PositionSource + ?Sized,
        C: CollisionQuery + ?Sized,
        K: KinematicsSink + ?Sized,
    {
        let agents = source.snapshot();
        let report = self.tick(&agents, collision);
        for (index, acceleration) in report.accelerations().enumerate() {
            sink.apply_acceleration(index, acceleration);
        }
        report
    }

    /// Steering for a single agent against an already built search
    pub fn steer_agent<S, C>(
        &self,
        index: usize,
        agents: &[AgentState],
        search: &S,
        collision: &C,
    ) -> AgentSteering
    where
        S: NeighborSearch + ?Sized,
        C: CollisionQuery + ?Sized,
    {
        let agent = &agents[index];
        let summary: NeighborSummary = self.aggregator.aggregate(index, agents, search);
        let avoiding = self.steering.is_heading_for_collision(agent, collision);

        AgentSteering {
            acceleration: self.steering.compute(agent, &summary, avoiding, collision),
            in_vision_count: summary.in_vision_count,
            avoiding,
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn steer_all<C>(&self, agents: &[AgentState], tree: &KdTree, collision: &C) -> Vec<AgentSteering>
    where
        C: CollisionQuery + ?Sized,
    {
        (0..agents.len())
            .map(|index| self.steer_agent(index, agents, tree, collision))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn steer_all<C>(&self, agents: &[AgentState], tree: &KdTree, collision: &C) -> Vec<AgentSteering>
    where
        C: CollisionQuery + ?Sized,
    {
        (0..agents.len())
            .into_par_iter()
            .map(|index| self.steer_agent(index, agents, tree, collision))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SteeringWeights;
    use crate::physics::{BoundingSphere, NoObstacles, ObstacleField};
    use crate::spatial::BruteForceSearch;
    use approx::assert_relative_eq;

    fn small_config() -> FlockConfig {
        FlockConfig::new().with_ray_count(64).with_max_perceivable(4)
    }

    fn ring(count: usize, radius: f32) -> Vec<AgentState> {
        (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                AgentState::new(
                    Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius),
                    Vec3::new(-angle.sin(), 0.0, angle.cos()),
                )
            })
            .collect()
    }

    #[test]
    fn test_invalid_config_rejected_before_any_tick() {
        assert!(FlockSystem::new(FlockConfig::new().with_ray_count(0)).is_err());
        assert!(FlockSystem::new(FlockConfig::new().with_max_perceivable(0)).is_err());
    }

    #[test]
    fn test_empty_flock_ticks_cleanly() {
        let system = FlockSystem::new(small_config()).unwrap();
        let report = system.tick(&[], &NoObstacles);
        assert!(report.agents.is_empty());
        assert_eq!(report.tree_depth, 0);
        assert_eq!(report.mean_in_vision(), 0.0);
    }

    #[test]
    fn test_lone_agent_has_no_rule_forces() {
        let system = FlockSystem::new(small_config()).unwrap();
        let agents = [AgentState::new(Vec3::new(1.0, 2.0, 3.0), Vec3::x())];
        let report = system.tick(&agents, &NoObstacles);

        assert_eq!(report.agents.len(), 1);
        assert_eq!(report.agents[0].acceleration, Vec3::zeros());
        assert_eq!(report.agents[0].in_vision_count, 0);
    }

    #[test]
    fn test_tick_matches_brute_force_pipeline() {
        let system = FlockSystem::new(small_config()).unwrap();
        let agents = ring(24, 4.0);
        let report = system.tick(&agents, &NoObstacles);

        let positions: Vec<Vec3> = agents.iter().map(|a| a.position).collect();
        let brute = BruteForceSearch::new(&positions);
        for (index, steering) in report.agents.iter().enumerate() {
            let expected = system.steer_agent(index, &agents, &brute, &NoObstacles);
            assert_eq!(steering.in_vision_count, expected.in_vision_count);
            assert_relative_eq!(steering.acceleration, expected.acceleration, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_obstacle_ahead_triggers_avoidance() {
        let config = small_config().with_weights(SteeringWeights {
            cohesion: 0.0,
            alignment: 0.0,
            separation: 0.0,
            avoidance: 1.0,
        });
        let system = FlockSystem::new(config).unwrap();
        let agents = [AgentState::new(Vec3::zeros(), Vec3::z())];
        let wall = ObstacleField::from_spheres(vec![BoundingSphere::new(Vec3::new(0.0, 0.0, 4.0), 1.0)]);

        let report = system.tick(&agents, &wall);
        assert_eq!(report.avoiding_count(), 1);

        let turn = report.agents[0].acceleration;
        assert!(turn.norm() > 0.0);
        // The chosen heading no longer points at the obstacle
        assert!(!wall.cast(Vec3::zeros(), 0.75, turn, 5.0));
    }

    #[test]
    fn test_step_feeds_sink() {
        let system = FlockSystem::new(small_config()).unwrap();
        let agents = ring(8, 1.0);
        let mut sink: Vec<Vec3> = Vec::new();

        let report = system.step(&agents, &NoObstacles, &mut sink);
        assert_eq!(sink.len(), 8);
        assert!(sink.iter().zip(report.accelerations()).all(|(a, b)| *a == b));
    }
}
