//! Step hooks for monitoring relaxation runs.
//!
//! Hooks are called by the drivers at defined points of a run to capture
//! metrics without modifying the solver.
//!
//! # Lifecycle
//!
//! ```text
//! hook.on_reset(particles, goals)
//! for each step:
//!   hook.on_step(result)
//! hook.on_finish(iterations, v_sum, converged)   // bounded runs
//! hook.on_state(iteration, state)                // live sessions
//! ```

use tensa_telemetry::{EventBus, EventKind, RelaxEvent};

use crate::live::SessionState;
use crate::system::StepResult;

/// Trait for relaxation hooks. Every callback defaults to a no-op.
pub trait StepHook: Send {
    /// Called after the system was rebuilt and goals assigned.
    fn on_reset(&mut self, particle_count: usize, goal_count: usize) {
        let _ = (particle_count, goal_count);
    }

    /// Called after each step.
    fn on_step(&mut self, result: &StepResult) {
        let _ = result;
    }

    /// Called when a bounded run stops.
    fn on_finish(&mut self, iterations: u32, v_sum: f64, converged: bool) {
        let _ = (iterations, v_sum, converged);
    }

    /// Called when a live session changes state.
    fn on_state(&mut self, iteration: u32, state: SessionState) {
        let _ = (iteration, state);
    }

    /// Returns the hook's name for logging.
    fn name(&self) -> &str;
}

/// A hook that does nothing.
#[derive(Debug, Default)]
pub struct NoopHook;

impl StepHook for NoopHook {
    fn name(&self) -> &str {
        "noop_hook"
    }
}

/// Hook that translates lifecycle calls into telemetry events.
///
/// Events are buffered; drain them or forward them to an [`EventBus`].
#[derive(Debug, Default)]
pub struct TelemetryHook {
    events: Vec<RelaxEvent>,
}

impl TelemetryHook {
    /// Creates a new telemetry hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains collected events for dispatch.
    pub fn drain_events(&mut self) -> Vec<RelaxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Emits every buffered event on `bus`.
    pub fn forward(&mut self, bus: &EventBus) {
        for event in self.drain_events() {
            bus.emit(event);
        }
    }
}

impl StepHook for TelemetryHook {
    fn on_reset(&mut self, particle_count: usize, goal_count: usize) {
        self.events.push(RelaxEvent::new(
            0,
            EventKind::Reset {
                particle_count,
                goal_count,
            },
        ));
    }

    fn on_step(&mut self, result: &StepResult) {
        self.events.push(RelaxEvent::new(
            result.iteration,
            EventKind::Step {
                v_sum: result.v_sum,
                moved: result.moved,
                wall_time: result.wall_time,
            },
        ));
    }

    fn on_finish(&mut self, iterations: u32, v_sum: f64, converged: bool) {
        self.events.push(RelaxEvent::new(
            iterations,
            EventKind::Convergence {
                iterations,
                v_sum,
                converged,
            },
        ));
    }

    fn on_state(&mut self, iteration: u32, state: SessionState) {
        self.events.push(RelaxEvent::new(
            iteration,
            EventKind::SessionState {
                state: state.as_str().to_string(),
            },
        ));
    }

    fn name(&self) -> &str {
        "telemetry_hook"
    }
}
