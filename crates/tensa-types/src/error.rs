//! Error types for the Tensa engine.
//!
//! All crates return `TensaResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the Tensa engine.
#[derive(Debug, Error)]
pub enum TensaError {
    /// A goal was constructed with invalid parameters.
    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A goal reached the solver before its particles were assigned.
    #[error("Goal {goal} ({name}) has no particle indices; call assign_index before stepping")]
    UnassignedGoal {
        goal: usize,
        name: String,
    },

    /// A particle index does not exist in the particle store.
    #[error("Particle index {index} out of bounds (count: {count})")]
    ParticleOutOfBounds {
        index: usize,
        count: usize,
    },

    /// A goal returned move/weight arrays that do not match its indices.
    #[error("Goal {goal} returned {moves} moves and {weights} weights for {expected} particles")]
    ContributionMismatch {
        goal: usize,
        expected: usize,
        moves: usize,
        weights: usize,
    },

    /// A goal produced a NaN/infinite move or a NaN/negative weight.
    #[error("Goal {goal} produced a non-finite contribution at point {point}")]
    NonFiniteContribution {
        goal: usize,
        point: usize,
    },

    /// The averaged step would write a NaN/infinite position or measure.
    #[error("Step update for particle {particle} is not finite; positions left unchanged")]
    NonFiniteUpdate {
        particle: usize,
    },

    /// A live session was ticked before it was ever reset.
    #[error("Live session has not been initialized; call reset first")]
    SessionNotInitialized,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, TensaError>`.
pub type TensaResult<T> = Result<T, TensaError>;
