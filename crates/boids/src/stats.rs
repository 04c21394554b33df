//! Flock statistics for the tick log

use std::fmt;

use boid_engine::flocking::TickReport;
use boid_engine::foundation::math::Vec3;

use crate::flock::Boid;

/// Aggregate flock measurements for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlockStats {
    /// Mean boid speed
    pub mean_speed: f32,
    /// Length of the mean heading: 1 when every boid faces the same way,
    /// near 0 when headings cancel out
    pub polarization: f32,
    /// Mean number of in-vision neighbours
    pub mean_in_vision: f32,
    /// Boids that steered around an obstacle this tick
    pub avoiding: usize,
}

impl FlockStats {
    /// Measure `boids` after the tick described by `report`
    pub fn measure(boids: &[Boid], report: &TickReport) -> Self {
        if boids.is_empty() {
            return Self::default();
        }

        let count = boids.len() as f32;
        let speed_sum: f32 = boids.iter().map(Boid::speed).sum();
        let heading_sum: Vec3 = boids.iter().map(|b| b.forward).sum();

        Self {
            mean_speed: speed_sum / count,
            polarization: heading_sum.norm() / count,
            mean_in_vision: report.mean_in_vision(),
            avoiding: report.avoiding_count(),
        }
    }
}

impl fmt::Display for FlockStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "speed {:.2}, polarization {:.3}, neighbours {:.2}, avoiding {}",
            self.mean_speed, self.polarization, self.mean_in_vision, self.avoiding
        )
    }
}
