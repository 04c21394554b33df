//! Collision query capability consumed by obstacle avoidance
//!
//! The flocking core never owns obstacle geometry. It only asks "would a
//! sphere of this radius, swept from here along this direction, hit anything
//! within this distance?" through [`CollisionQuery`].

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

use super::collision::BoundingSphere;

/// Swept-sphere hit test against the host's obstacle geometry
pub trait CollisionQuery: Send + Sync {
    /// True when a sphere of `probe_radius` swept from `origin` along
    /// `direction` hits an obstacle within `max_distance`
    fn cast(&self, origin: Vec3, probe_radius: f32, direction: Vec3, max_distance: f32) -> bool;
}

/// A world without obstacles
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstacles;

impl CollisionQuery for NoObstacles {
    fn cast(&self, _origin: Vec3, _probe_radius: f32, _direction: Vec3, _max_distance: f32) -> bool {
        false
    }
}

impl<F> CollisionQuery for F
where
    F: Fn(Vec3, f32, Vec3, f32) -> bool + Send + Sync,
{
    fn cast(&self, origin: Vec3, probe_radius: f32, direction: Vec3, max_distance: f32) -> bool {
        self(origin, probe_radius, direction, max_distance)
    }
}

/// Static set of spherical obstacles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleField {
    obstacles: Vec<BoundingSphere>,
}

impl ObstacleField {
    /// Create an empty field
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field from a list of spheres
    pub fn from_spheres(obstacles: Vec<BoundingSphere>) -> Self {
        Self { obstacles }
    }

    /// Add an obstacle
    pub fn add(&mut self, obstacle: BoundingSphere) {
        self.obstacles.push(obstacle);
    }

    /// All obstacles
    pub fn obstacles(&self) -> &[BoundingSphere] {
        &self.obstacles
    }

    /// Number of obstacles
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// True when the field holds no obstacles
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl CollisionQuery for ObstacleField {
    fn cast(&self, origin: Vec3, probe_radius: f32, direction: Vec3, max_distance: f32) -> bool {
        self.obstacles
            .iter()
            .any(|sphere| sphere.sphere_cast(origin, probe_radius, direction, max_distance))
    }
}
