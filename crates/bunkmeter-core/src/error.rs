//! Error types for the statistics engine.
//!
//! The engine itself never fails on counts (a zero total has a defined
//! result); the only rejected input is an attendance target that would
//! make the budget search meaningless or unbounded.

use thiserror::Error;

/// Errors raised when configuring the statistics engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// The target ratio is outside the open interval (0, 1).
    #[error("invalid attendance target {0}: must be strictly between 0 and 1")]
    InvalidTarget(f64),

    /// The target percentage is outside the open interval (0, 100).
    #[error("invalid attendance target {0}%: must be strictly between 0 and 100")]
    InvalidTargetPercent(f64),
}
