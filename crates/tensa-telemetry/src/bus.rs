//! Event bus: routes relaxation events to filtered sinks.
//!
//! Producers `emit` into a `std::sync::mpsc` queue. `flush` drains the
//! queue and hands each event to every sink whose [`EventFilter`]
//! accepts it. A `Convergence` event ends a bounded run, so sinks are
//! finalized right after it is delivered.

use std::sync::mpsc;

use crate::events::{EventKind, RelaxEvent};
use crate::sinks::EventSink;

/// Which events a sink receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Every event.
    #[default]
    All,
    /// Resets, convergence, session changes and custom events; no steps.
    Lifecycle,
    /// Lifecycle events plus steps whose iteration is a multiple of `n`.
    /// `0` drops every step.
    StepsEvery(u32),
}

impl EventFilter {
    /// Returns true if a sink with this filter should see `event`.
    pub fn accepts(&self, event: &RelaxEvent) -> bool {
        match (self, &event.kind) {
            (EventFilter::Lifecycle, EventKind::Step { .. }) => false,
            (EventFilter::StepsEvery(n), EventKind::Step { .. }) => {
                *n > 0 && event.iteration % n == 0
            }
            _ => true,
        }
    }
}

struct Route {
    sink: Box<dyn EventSink>,
    filter: EventFilter,
}

/// Event bus for relaxation telemetry.
pub struct EventBus {
    sender: mpsc::Sender<RelaxEvent>,
    receiver: mpsc::Receiver<RelaxEvent>,
    routes: Vec<Route>,
}

impl EventBus {
    /// Creates a bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            routes: Vec::new(),
        }
    }

    /// Registers a sink that receives every event.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.add_filtered_sink(sink, EventFilter::All);
    }

    /// Registers a sink behind a filter.
    pub fn add_filtered_sink(&mut self, sink: Box<dyn EventSink>, filter: EventFilter) {
        self.routes.push(Route { sink, filter });
    }

    /// Queues an event until the next `flush`.
    pub fn emit(&self, event: RelaxEvent) {
        // The receiver lives as long as the bus, so send cannot fail.
        let _ = self.sender.send(event);
    }

    /// Delivers queued events in emission order, sinks in registration
    /// order. Returns the number of (event, sink) deliveries.
    pub fn flush(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.receiver.try_recv() {
            for route in &mut self.routes {
                if route.filter.accepts(&event) {
                    route.sink.handle(&event);
                    delivered += 1;
                }
            }
            if matches!(event.kind, EventKind::Convergence { .. }) {
                self.close();
            }
        }
        delivered
    }

    /// Finalizes every sink. Live sessions call this when they stop;
    /// bounded runs close on their `Convergence` event.
    pub fn close(&mut self) {
        for route in &mut self.routes {
            route.sink.finalize();
        }
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.routes.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
