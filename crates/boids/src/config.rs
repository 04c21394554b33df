//! Simulation configuration
//!
//! Loaded from a TOML or RON file given on the command line; every field
//! falls back to its default when omitted.

use boid_engine::config::Config;
use boid_engine::core::config::FlockConfig;
use boid_engine::physics::BoundingSphere;
use boid_engine::{BoidError, BoidResult};
use serde::{Deserialize, Serialize};

/// Wrap-around world extents
///
/// Agents live in `[-x_max/2, x_max/2) x [0, y_max) x [-z_max/2, z_max/2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    /// Width along X
    pub x_max: f32,
    /// Height along Y, measured up from the ground
    pub y_max: f32,
    /// Depth along Z
    pub z_max: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            x_max: 60.0,
            y_max: 30.0,
            z_max: 60.0,
        }
    }
}

/// Integration settings owned by the host side of the flock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Fixed timestep in seconds
    pub dt: f32,
    /// Scale applied to acceleration before it reaches velocity
    pub accel_mult: f32,
    /// Scale applied to velocity before it reaches position
    pub speed_mult: f32,
    /// Lower speed bound
    pub min_speed: f32,
    /// Speed every agent starts with
    pub initial_speed: f32,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            accel_mult: 1.0,
            speed_mult: 1.0,
            min_speed: 2.0,
            initial_speed: 5.0,
        }
    }
}

/// # Simulation Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of agents to spawn
    pub spawn_count: usize,
    /// Number of ticks to run
    pub ticks: u32,
    /// Log flock statistics every this many ticks (0 logs only the summary)
    pub log_every: u32,
    /// Seed for spawning
    pub seed: u64,
    /// Default log filter; `RUST_LOG` overrides it
    pub log_level: String,
    /// World extents
    pub world: WorldBounds,
    /// Integration settings
    pub kinematics: KinematicsConfig,
    /// Static spherical obstacles
    pub obstacles: Vec<BoundingSphere>,
    /// Flocking core settings
    pub flock: FlockConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spawn_count: 500,
            ticks: 600,
            log_every: 60,
            seed: 0x5eed,
            log_level: "info".to_string(),
            world: WorldBounds::default(),
            kinematics: KinematicsConfig::default(),
            obstacles: Vec::new(),
            flock: FlockConfig::default(),
        }
    }
}

impl Config for SimulationConfig {}

impl SimulationConfig {
    /// Validate host-side settings and the nested flock configuration
    pub fn validate(&self) -> BoidResult<()> {
        positive("world.x_max", self.world.x_max)?;
        positive("world.y_max", self.world.y_max)?;
        positive("world.z_max", self.world.z_max)?;
        non_negative("kinematics.dt", self.kinematics.dt)?;
        non_negative("kinematics.accel_mult", self.kinematics.accel_mult)?;
        non_negative("kinematics.speed_mult", self.kinematics.speed_mult)?;
        non_negative("kinematics.min_speed", self.kinematics.min_speed)?;
        non_negative("kinematics.initial_speed", self.kinematics.initial_speed)?;

        if self.kinematics.min_speed > self.flock.max_speed {
            return Err(BoidError::InvalidConfig {
                field: "kinematics.min_speed",
                reason: format!("exceeds flock.max_speed ({})", self.flock.max_speed),
            });
        }

        for obstacle in &self.obstacles {
            non_negative("obstacles.radius", obstacle.radius)?;
        }

        self.flock.validate()
    }
}

fn non_negative(field: &'static str, value: f32) -> BoidResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BoidError::InvalidConfig {
            field,
            reason: format!("must be finite and non-negative, got {value}"),
        })
    }
}

fn positive(field: &'static str, value: f32) -> BoidResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BoidError::InvalidConfig {
            field,
            reason: format!("must be finite and positive, got {value}"),
        })
    }
}
