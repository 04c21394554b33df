//! # Boid Engine
//!
//! Per-tick flocking core for large agent counts in 3D.
//!
//! ## Features
//!
//! - **KD-tree neighbour search**: rebuilt every tick, bounded k-NN queries
//! - **Boid rules**: cohesion, alignment and separation from the k nearest
//! - **Obstacle avoidance**: Fibonacci-sphere heading scan with swept probes
//! - **Parallel ticks**: per-agent work on rayon with the `parallel` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boid_engine::prelude::*;
//!
//! fn main() -> Result<(), BoidError> {
//!     let system = FlockSystem::new(FlockConfig::default())?;
//!     let agents = vec![
//!         AgentState::new(Vec3::new(0.0, 0.0, 0.0), Vec3::z()),
//!         AgentState::new(Vec3::new(1.0, 0.0, 0.0), Vec3::z()),
//!     ];
//!     let report = system.tick(&agents, &NoObstacles);
//!     for acceleration in report.accelerations() {
//!         println!("{acceleration:?}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod core;
pub mod config;
pub mod error;
pub mod foundation;

// Flocking pipeline
pub mod spatial;
pub mod physics;
pub mod flocking;

pub use error::{BoidError, BoidResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        BoidError, BoidResult,
        config::Config,
        core::config::{AvoidanceConfig, FlockConfig, PerceptionConfig, SelfExclusionPolicy, SteeringWeights},
        flocking::{AgentState, FlockSystem, KinematicsSink, PositionSource, TickReport},
        foundation::math::{Quat, Vec3},
        physics::{BoundingSphere, CollisionQuery, NoObstacles, ObstacleField},
        spatial::{KdTree, NeighborSearch},
    };
}
