//! # tensa-telemetry
//!
//! Event bus for relaxation telemetry. Emits structured events
//! (resets, steps, convergence, live session transitions) that can be
//! consumed by pluggable sinks (in-memory buffers, `tracing` logs, etc.).

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::{EventBus, EventFilter};
pub use events::{EventKind, RelaxEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
