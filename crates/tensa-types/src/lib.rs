//! # tensa-types
//!
//! Shared types, identifiers, error types, and numeric constants
//! for the Tensa relaxation engine.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other Tensa crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{TensaError, TensaResult};
pub use ids::ParticleId;
