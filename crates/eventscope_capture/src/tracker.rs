//! Per-kind event trackers.
//!
//! An [`EventTracker`] owns at most one [`Subscription`]: it holds one
//! exactly while enabled. Dropping a tracker drops its subscription, so a
//! torn-down tracker never starts another delivery.

use std::fmt;
use std::sync::Arc;

use eventscope_foundation::{Error, Result};

use crate::catalog::EventCatalog;
use crate::kind::EventKind;
use crate::occurrence::{CapturedOccurrence, OccurrenceSink};
use crate::scope::{RaisedEvent, Subscription, TargetScope};

// =============================================================================
// Event Tracker
// =============================================================================

/// Binds one event kind to a target scope.
pub struct EventTracker {
    kind: EventKind,
    scope: Arc<TargetScope>,
    sink: Arc<dyn OccurrenceSink>,
    subscription: Option<Subscription>,
}

impl EventTracker {
    /// Creates a disabled tracker.
    #[must_use]
    pub fn new(kind: EventKind, scope: Arc<TargetScope>, sink: Arc<dyn OccurrenceSink>) -> Self {
        Self {
            kind,
            scope,
            sink,
            subscription: None,
        }
    }

    /// Returns the tracked kind.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Returns the kind's category.
    #[must_use]
    pub fn category(&self) -> &str {
        self.kind.category()
    }

    /// Returns the kind's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Returns whether the tracker is subscribed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    /// Attaches or detaches the tracker's listener.
    pub fn set_enabled(&mut self, enabled: bool) {
        match (enabled, self.subscription.is_some()) {
            (true, false) => {
                let kind = self.kind.clone();
                let sink = Arc::clone(&self.sink);
                let listener = Arc::new(move |event: &RaisedEvent| {
                    let sequence = sink.next_sequence();
                    sink.on_occurrence(CapturedOccurrence::capture(sequence, &kind, event));
                });
                self.subscription = Some(self.scope.subscribe(self.kind.id(), listener));
                tracing::debug!("tracker {} enabled", self.kind);
            }
            (false, true) => {
                self.subscription = None;
                tracing::debug!("tracker {} disabled", self.kind);
            }
            _ => {}
        }
    }
}

impl fmt::Debug for EventTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTracker")
            .field("kind", &self.kind.identifier())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

// =============================================================================
// Tracker Registry
// =============================================================================

/// One tracker per catalog kind, in catalog declaration order.
#[derive(Debug, Default)]
pub struct TrackerRegistry {
    trackers: Vec<EventTracker>,
}

impl TrackerRegistry {
    /// Creates a tracker for every kind, enabling the default-enabled ones.
    #[must_use]
    pub fn new(
        catalog: &EventCatalog,
        scope: &Arc<TargetScope>,
        sink: &Arc<dyn OccurrenceSink>,
    ) -> Self {
        let trackers = catalog
            .iter()
            .map(|kind| {
                let mut tracker =
                    EventTracker::new(kind.clone(), Arc::clone(scope), Arc::clone(sink));
                tracker.set_enabled(kind.default_enabled());
                tracker
            })
            .collect();
        Self { trackers }
    }

    /// Returns the number of trackers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// Returns true if there are no trackers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Iterates trackers in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &EventTracker> {
        self.trackers.iter()
    }

    /// Looks up a tracker by kind identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&EventTracker> {
        self.trackers
            .iter()
            .find(|t| t.kind.identifier() == identifier)
    }

    /// Enables or disables the tracker for a kind.
    ///
    /// # Errors
    ///
    /// Returns an unknown-kind error if no tracker has this identifier.
    pub fn set_enabled(&mut self, identifier: &str, enabled: bool) -> Result<()> {
        let tracker = self
            .trackers
            .iter_mut()
            .find(|t| t.kind.identifier() == identifier)
            .ok_or_else(|| Error::unknown_kind(identifier))?;
        tracker.set_enabled(enabled);
        Ok(())
    }

    /// Enables every tracker.
    pub fn enable_all(&mut self) {
        for tracker in &mut self.trackers {
            tracker.set_enabled(true);
        }
    }

    /// Disables every tracker.
    pub fn disable_all(&mut self) {
        for tracker in &mut self.trackers {
            tracker.set_enabled(false);
        }
    }

    /// Returns the kinds whose trackers are enabled, in catalog order.
    #[must_use]
    pub fn enabled_kinds(&self) -> Vec<&EventKind> {
        self.trackers
            .iter()
            .filter(|t| t.is_enabled())
            .map(EventTracker::kind)
            .collect()
    }

    /// Returns trackers in presentation order (category, then name; stable).
    #[must_use]
    pub fn sorted(&self) -> Vec<&EventTracker> {
        let mut trackers: Vec<_> = self.trackers.iter().collect();
        trackers.sort_by(|a, b| a.kind.presentation_cmp(&b.kind));
        trackers
    }

    /// Returns trackers in presentation order, grouped by category.
    ///
    /// Categories differing only in case share a group, named after the
    /// first spelling encountered.
    #[must_use]
    pub fn grouped(&self) -> Vec<(String, Vec<&EventTracker>)> {
        let mut groups: Vec<(String, Vec<&EventTracker>)> = Vec::new();
        for tracker in self.sorted() {
            match groups.last_mut() {
                Some((category, members)) if category.eq_ignore_ascii_case(tracker.category()) => {
                    members.push(tracker);
                }
                _ => groups.push((tracker.category().to_string(), vec![tracker])),
            }
        }
        groups
    }

    /// Detaches and drops every tracker.
    pub fn teardown(&mut self) {
        self.disable_all();
        self.trackers.clear();
    }
}
