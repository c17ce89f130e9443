//! # tensa-solver
//!
//! Goal-based particle relaxation.
//!
//! ## Key Types
//!
//! - [`ParticleStore`]: dense particle buffers with tolerance-based merging
//! - [`Goal`]: open trait for local constraints; built-ins live in [`goals`]
//! - [`PhysicalSystem`]: index assignment and the Jacobi step
//! - [`ZombieSolver`]: bounded offline relaxation
//! - [`LiveSession`]: tick-driven interactive relaxation
//! - [`SolverConfig`]: tolerance, threshold, caps and metric
//! - [`elements`]: goal groups built from polylines and points

pub mod config;
pub mod elements;
pub mod goal;
pub mod goals;
pub mod hooks;
pub mod live;
pub mod particles;
pub mod system;
pub mod zombie;

pub use config::{ConvergenceMetric, SolverConfig};
pub use goal::{AxisLocks, Contribution, Goal, GoalNode, GoalOutput, GoalTopology, LabeledOutput, ParticleRef};
pub use hooks::{NoopHook, StepHook, TelemetryHook};
pub use live::{Controls, LiveSession, SessionState, SystemData, TickReport};
pub use particles::ParticleStore;
pub use system::{PhysicalSystem, StepResult};
pub use zombie::{RelaxReport, Relaxation, ZombieSolver};
