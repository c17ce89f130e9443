//! Relaxation event types.
//!
//! Events are lightweight value types emitted by the solver at defined
//! points of a run. They carry just enough data to be useful for
//! monitoring and debugging.

use serde::{Deserialize, Serialize};

/// A relaxation event, tagged with the solver iteration it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxEvent {
    /// Solver iteration counter when the event was emitted.
    pub iteration: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// The particle store and goal list were rebuilt.
    Reset {
        /// Particles after index assignment.
        particle_count: usize,
        /// Goals after flattening.
        goal_count: usize,
    },

    /// One relaxation step completed.
    Step {
        /// Displacement measure of this step.
        v_sum: f64,
        /// Particles that received at least one weighted move.
        moved: usize,
        /// Wall-clock time for the step (seconds).
        wall_time: f64,
    },

    /// A bounded run finished.
    Convergence {
        /// Total iterations used.
        iterations: u32,
        /// Final displacement measure.
        v_sum: f64,
        /// Whether the measure dropped below the threshold.
        converged: bool,
    },

    /// The live session changed state.
    SessionState {
        /// State name (`reset`, `running`, `paused`).
        state: String,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl RelaxEvent {
    /// Creates a new event for the given iteration.
    pub fn new(iteration: u32, kind: EventKind) -> Self {
        Self { iteration, kind }
    }
}
