//! # tensa-io
//!
//! Scene contract, scene validation, and result/state serialization.
//!
//! Defines the boundary types that external systems (CLI, scripts,
//! other tools) use to hand goal setups to the Tensa solver and to read
//! relaxed geometry back.

pub mod contract;
pub mod output;
pub mod snapshot;
pub mod validator;

pub use contract::{GoalSpec, Scene};
pub use output::RelaxationOutput;
pub use snapshot::StateSnapshot;
pub use validator::{validate_scene, SceneSummary};
