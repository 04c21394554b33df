//! Collision primitives for obstacle probing
//!
//! Rays and bounding spheres, plus the swept-sphere test the obstacle
//! probes are built on.

use crate::foundation::math::{normalize_or_zero, Vec3};

/// A ray for ray casting
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized, or zero for a degenerate ray)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: normalize_or_zero(direction),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// True when the direction had no length
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::zeros()
    }
}

/// A bounding sphere obstacle
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if a point lies inside or on the sphere
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Test ray intersection with this sphere
    ///
    /// Returns the distance along the ray to the first surface crossing in
    /// front of the origin. A ray starting inside the sphere reports its exit.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if ray.is_degenerate() {
            return None;
        }

        // Direction is unit length, so the quadratic's `a` term is 1
        let oc = ray.origin - self.center;
        let b = oc.dot(&ray.direction);
        let c = oc.magnitude_squared() - self.radius * self.radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = -b - sqrt_discriminant;
        let t2 = -b + sqrt_discriminant;

        if t1 >= 0.0 {
            Some(t1)
        } else if t2 >= 0.0 {
            Some(t2)
        } else {
            None
        }
    }

    /// Sweep a sphere of `probe_radius` from `origin` along `direction`
    ///
    /// Hits when the swept sphere touches this one within `max_distance`.
    /// A probe that starts overlapping the obstacle counts as a hit.
    pub fn sphere_cast(&self, origin: Vec3, probe_radius: f32, direction: Vec3, max_distance: f32) -> bool {
        let inflated = Self::new(self.center, self.radius + probe_radius.max(0.0));
        if inflated.contains_point(&origin) {
            return true;
        }

        inflated
            .intersect_ray(&Ray::new(origin, direction))
            .is_some_and(|t| t <= max_distance)
    }
}
