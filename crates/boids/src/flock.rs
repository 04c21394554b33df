//! Host-side flock state and kinematics
//!
//! The engine only produces accelerations. Velocity integration, the speed
//! band and the wrap-around world live here.

use boid_engine::flocking::{AgentState, KinematicsSink, PositionSource};
use boid_engine::foundation::math::{normalize_or_zero, Vec3};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{KinematicsConfig, WorldBounds};

/// One simulated agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    /// World position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Unit heading; follows the velocity direction
    pub forward: Vec3,
}

impl Boid {
    /// Boid moving along `velocity`
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        let forward = normalize_or_zero(velocity);
        Self {
            position,
            velocity,
            forward: if forward == Vec3::zeros() { Vec3::z() } else { forward },
        }
    }

    /// Current speed
    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }
}

/// All agents plus the rules that move them
#[derive(Debug, Clone)]
pub struct Flock {
    boids: Vec<Boid>,
    world: WorldBounds,
    kinematics: KinematicsConfig,
    max_speed: f32,
}

impl Flock {
    /// Flock over existing boids
    pub fn new(boids: Vec<Boid>, world: WorldBounds, kinematics: KinematicsConfig, max_speed: f32) -> Self {
        Self {
            boids,
            world,
            kinematics,
            max_speed,
        }
    }

    /// Spawn `count` boids at random positions with random headings
    ///
    /// The same seed always yields the same flock.
    pub fn spawn(
        count: usize,
        seed: u64,
        world: WorldBounds,
        kinematics: KinematicsConfig,
        max_speed: f32,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let boids = (0..count)
            .map(|_| {
                let position = Vec3::new(
                    rng.gen_range(-0.5..0.5) * world.x_max,
                    rng.gen::<f32>() * world.y_max,
                    rng.gen_range(-0.5..0.5) * world.z_max,
                );
                let direction = Vec3::new(
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                );
                let direction = normalize_or_zero(direction);
                let direction = if direction == Vec3::zeros() { Vec3::z() } else { direction };
                Boid::new(position, direction * kinematics.initial_speed)
            })
            .collect();

        debug!("spawned {count} boids with seed {seed}");
        Self::new(boids, world, kinematics, max_speed)
    }

    /// Current boids
    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    /// Number of boids
    pub fn len(&self) -> usize {
        self.boids.len()
    }

    /// True when there are no boids
    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    /// Clamp speeds, move every boid one timestep and wrap it back into the world
    pub fn advance(&mut self) {
        let min_speed = self.kinematics.min_speed;
        let step = self.kinematics.dt * self.kinematics.speed_mult;

        for boid in &mut self.boids {
            let direction = normalize_or_zero(boid.velocity);
            // A stalled boid restarts along its last heading
            let direction = if direction == Vec3::zeros() { boid.forward } else { direction };
            let speed = boid.velocity.norm().max(min_speed).min(self.max_speed);

            boid.velocity = direction * speed;
            boid.forward = direction;
            boid.position = self.world.wrap(boid.position + boid.velocity * step);
        }
    }
}

impl PositionSource for Flock {
    fn snapshot(&self) -> Vec<AgentState> {
        self.boids
            .iter()
            .map(|boid| AgentState::new(boid.position, boid.forward))
            .collect()
    }
}

impl KinematicsSink for Flock {
    fn apply_acceleration(&mut self, index: usize, acceleration: Vec3) {
        let scale = self.kinematics.dt * self.kinematics.accel_mult;
        if let Some(boid) = self.boids.get_mut(index) {
            boid.velocity += acceleration * scale;
        }
    }
}

impl WorldBounds {
    /// Wrap `position` into the world: Y into `[0, y_max)`, X and Z into
    /// `[-max/2, max/2)`
    pub fn wrap(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            wrap_centered(position.x, self.x_max),
            wrap_from_zero(position.y, self.y_max),
            wrap_centered(position.z, self.z_max),
        )
    }
}

/// `value` modulo `max`, always in `[0, max)`
fn wrap_from_zero(value: f32, max: f32) -> f32 {
    let wrapped = value.rem_euclid(max);
    // rem_euclid can round up to `max` for tiny negative inputs
    if wrapped >= max {
        0.0
    } else {
        wrapped
    }
}

fn wrap_centered(value: f32, max: f32) -> f32 {
    let half = max * 0.5;
    wrap_from_zero(value + half, max) - half
}
