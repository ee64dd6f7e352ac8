//! Captured occurrences and the sink trackers deliver them to.

use std::time::SystemTime;

use eventscope_foundation::{Inspectable, NULL_TYPE_NAME, ObjectRef, Payload};

use crate::kind::EventKind;
use crate::scope::{RaisedEvent, RouteStop};

/// One observed event instance.
///
/// The originating element and route stops are held by weak reference. The
/// handler and the argument payload are shared with the host for as long as
/// the occurrence lives.
#[derive(Clone, Debug)]
pub struct CapturedOccurrence {
    /// Logical arrival order, assigned at capture.
    pub sequence: u64,
    /// Wall-clock capture time.
    pub captured_at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// The element the event was raised on.
    pub origin: ObjectRef,
    /// The object that processed the event, or `None` once degraded.
    pub handler: Option<Payload>,
    /// The event's argument payload.
    pub args: Payload,
    /// Whether the handler marked the event handled.
    pub handled: bool,
    /// The handlers the event visited, source first.
    pub route: Vec<RouteStop>,
}

impl CapturedOccurrence {
    /// Captures a raised event.
    #[must_use]
    pub fn capture(sequence: u64, kind: &EventKind, event: &RaisedEvent) -> Self {
        Self {
            sequence,
            captured_at: SystemTime::now(),
            kind: kind.clone(),
            origin: ObjectRef::new(&event.source),
            handler: Some(Payload::clone(&event.handler)),
            args: Payload::clone(&event.args),
            handled: event.handled,
            route: event.route.clone(),
        }
    }

    /// Returns the argument payload's type name.
    #[must_use]
    pub fn args_type(&self) -> &str {
        self.args.type_name()
    }

    /// Returns the handler's type name, or `<null>` without a handler.
    #[must_use]
    pub fn handler_type(&self) -> &str {
        self.handler
            .as_deref()
            .map_or(NULL_TYPE_NAME, Inspectable::type_name)
    }

    /// Returns true if the handler was disposed after the event was raised.
    #[must_use]
    pub fn handler_disposed(&self) -> bool {
        self.handler.as_deref().is_some_and(Inspectable::is_disposed)
    }

    /// Returns a copy with the handler removed.
    #[must_use]
    pub fn without_handler(mut self) -> Self {
        self.handler = None;
        self
    }
}

/// Receives occurrences from trackers, on whatever thread raised them.
pub trait OccurrenceSink: Send + Sync {
    /// Returns the next logical sequence number.
    fn next_sequence(&self) -> u64;

    /// Accepts one captured occurrence.
    fn on_occurrence(&self, occurrence: CapturedOccurrence);
}
