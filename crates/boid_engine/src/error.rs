//! Crate-level error type

use crate::config::ConfigError;

/// Errors raised while setting up a flock
///
/// Ticks themselves never fail: empty neighbourhoods, short populations,
/// zero-length steering targets and fully blocked avoidance all resolve to
/// fallback values. Only configuration is rejected, and only up front.
#[derive(thiserror::Error, Debug)]
pub enum BoidError {
    /// A configuration value is out of range
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Loading or saving configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BoidError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience result alias
pub type BoidResult<T> = Result<T, BoidError>;
