//! # Core Module
//!
//! Shared configuration used by every flocking subsystem.
//!
//! ## Organization
//!
//! - **Config**: Flock configuration and eager validation
//! - **Foundation**: Low-level utilities (math, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    AvoidanceConfig,
    FlockConfig,
    PerceptionConfig,
    SelfExclusionPolicy,
    SteeringWeights,
};
