//! Math utilities and types
//!
//! Provides the vector and rotation types used by the flocking core, plus the
//! handful of vector helpers the steering code leans on.

pub use nalgebra::{Unit, UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Rotation type (agent orientation)
pub type Quat = UnitQuaternion<f32>;

/// Squared lengths at or below this are treated as zero-length vectors
pub const EPSILON: f32 = 1.0e-12;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Golden ratio, (1 + sqrt 5) / 2
    pub const GOLDEN_RATIO: f32 = 1.618_034;
}

/// Normalize `v`, returning the zero vector when `v` has no length
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    v.try_normalize(EPSILON.sqrt()).unwrap_or_else(Vec3::zeros)
}

/// Clamp the magnitude of `v` to `max_magnitude`, keeping its direction
///
/// A non-positive limit yields the zero vector.
pub fn clamp_magnitude(v: Vec3, max_magnitude: f32) -> Vec3 {
    if max_magnitude <= 0.0 {
        return Vec3::zeros();
    }

    let mag_sq = v.magnitude_squared();
    if mag_sq <= max_magnitude * max_magnitude {
        return v;
    }

    v * (max_magnitude / mag_sq.sqrt())
}

/// Rotation mapping local +Z onto `forward`
///
/// Identity for a zero-length forward. The world up axis is swapped for +X
/// when the forward is (nearly) vertical so the basis stays well defined.
pub fn orientation_from_forward(forward: Vec3) -> Quat {
    let forward = normalize_or_zero(forward);
    if forward == Vec3::zeros() {
        return Quat::identity();
    }

    let up = if forward.y.abs() > 0.999 {
        Vec3::x()
    } else {
        Vec3::y()
    };
    Quat::face_towards(&forward, &up)
}

/// Squared distance between two points
#[inline]
pub fn distance_squared(a: &Vec3, b: &Vec3) -> f32 {
    (a - b).magnitude_squared()
}
