//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them
//! (buffer in memory, log through `tracing`, write to file, etc.).

use std::sync::{Arc, Mutex};

use crate::events::{EventKind, RelaxEvent};

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &RelaxEvent);

    /// Called when the run ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// A sink that collects events into a shared `Vec` for testing and inspection.
///
/// The buffer is shared, so events stay readable after the sink has been
/// boxed into a bus.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<RelaxEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out the events collected so far.
    pub fn events(&self) -> Vec<RelaxEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of events collected so far.
    pub fn len(&self) -> usize {
        self.events().len()
    }

    /// Returns true if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &RelaxEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
///
/// Step events go out at `debug`, everything else at `info`.
pub struct TracingSink;

impl TracingSink {
    /// Creates a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &RelaxEvent) {
        match &event.kind {
            EventKind::Step { v_sum, moved, wall_time } => tracing::debug!(
                iteration = event.iteration,
                v_sum,
                moved,
                wall_time,
                "relax_step"
            ),
            kind => tracing::info!(
                iteration = event.iteration,
                event = ?kind,
                "relax_event"
            ),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
