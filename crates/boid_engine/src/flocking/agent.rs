//! Agent snapshot and the host-side boundary traits

use crate::foundation::math::{normalize_or_zero, orientation_from_forward, Quat, Vec3};

/// One agent as captured at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    /// World position
    pub position: Vec3,
    /// Unit forward heading (zero if the agent has no heading)
    pub forward: Vec3,
    /// Local-to-world rotation; local +Z is forward
    pub orientation: Quat,
}

impl AgentState {
    /// Snapshot from a position and a heading; the orientation is derived
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        let forward = normalize_or_zero(forward);
        Self {
            position,
            forward,
            orientation: orientation_from_forward(forward),
        }
    }

    /// Snapshot from a position and an explicit orientation
    pub fn with_orientation(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            forward: orientation * Vec3::z(),
            orientation,
        }
    }
}

/// Supplies the per-tick agent snapshot
///
/// Indices `0..N` in the returned snapshot identify agents for this tick
/// only.
pub trait PositionSource {
    /// Current position and heading of every agent
    fn snapshot(&self) -> Vec<AgentState>;
}

impl PositionSource for [AgentState] {
    fn snapshot(&self) -> Vec<AgentState> {
        self.to_vec()
    }
}

impl PositionSource for Vec<AgentState> {
    fn snapshot(&self) -> Vec<AgentState> {
        self.clone()
    }
}

/// Consumes the acceleration computed for each agent
///
/// Velocity integration, speed limits and world wrapping belong to the
/// implementor.
pub trait KinematicsSink {
    /// Apply the acceleration computed for agent `index` this tick
    fn apply_acceleration(&mut self, index: usize, acceleration: Vec3);
}

impl KinematicsSink for Vec<Vec3> {
    fn apply_acceleration(&mut self, index: usize, acceleration: Vec3) {
        if index >= self.len() {
            self.resize(index + 1, Vec3::zeros());
        }
        self[index] = acceleration;
    }
}
