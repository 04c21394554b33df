//! Physics module for obstacle probing
//!
//! Provides the ray and sphere primitives and the collision query contract
//! used by obstacle avoidance. Movement integration is left to the host.

pub mod collision;
pub mod collision_query;

pub use collision::{BoundingSphere, Ray};
pub use collision_query::{CollisionQuery, NoObstacles, ObstacleField};
