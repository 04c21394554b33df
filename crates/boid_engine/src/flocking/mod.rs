//! Flocking behaviour
//!
//! Neighbour aggregation, obstacle-avoidance heading sampling and the
//! steering engine, tied together by [`FlockSystem`].

pub mod agent;
pub mod aggregator;
pub mod heading_sampler;
pub mod steering;
pub mod system;

pub use agent::{AgentState, KinematicsSink, PositionSource};
pub use aggregator::{NeighborAggregator, NeighborSummary};
pub use heading_sampler::{HeadingSampler, ObstacleProbe};
pub use steering::{steer_towards, SteeringEngine};
pub use system::{AgentSteering, FlockSystem, TickReport};
