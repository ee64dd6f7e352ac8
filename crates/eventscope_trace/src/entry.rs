//! Trace entries and the targets a user can select within them.
//!
//! An entry is an admitted occurrence plus a selection flag. Within the
//! presentation tree the user can select either the entry itself or one of
//! its route stops; each resolves to a different [`InspectionTarget`].

use eventscope_capture::{CapturedOccurrence, EventKind, RouteStop};
use eventscope_foundation::{ObjectRef, Payload};

// =============================================================================
// Trace Entry
// =============================================================================

/// A buffered occurrence.
#[derive(Clone, Debug)]
pub struct TraceEntry {
    /// Buffer-assigned ID, monotonically increasing, never reused.
    pub id: u64,
    /// The admitted occurrence.
    pub occurrence: CapturedOccurrence,
    /// True if the handler was disposed at admission and was dropped.
    pub degraded: bool,
    pub(crate) selected: bool,
}

impl TraceEntry {
    pub(crate) fn new(id: u64, occurrence: CapturedOccurrence, degraded: bool) -> Self {
        Self {
            id,
            occurrence,
            degraded,
            selected: false,
        }
    }

    /// Returns whether this entry is selected for export.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns the event kind.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.occurrence.kind
    }

    /// Returns the argument payload's type name.
    #[must_use]
    pub fn args_type(&self) -> &str {
        self.occurrence.args_type()
    }

    /// Returns the handler's type name (`<null>` for a degraded entry).
    #[must_use]
    pub fn handler_type(&self) -> &str {
        self.occurrence.handler_type()
    }

    /// Returns whether the event was handled.
    #[must_use]
    pub fn handled(&self) -> bool {
        self.occurrence.handled
    }

    /// Returns the route the event took.
    #[must_use]
    pub fn route(&self) -> &[RouteStop] {
        &self.occurrence.route
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Something the user can select in the trace view.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selectable {
    /// The occurrence as a whole.
    Event(u64),
    /// One stop along the occurrence's route.
    Stop {
        /// The entry ID.
        entry: u64,
        /// Index into the entry's route.
        index: usize,
    },
}

impl Selectable {
    /// Returns the entry this selection belongs to.
    #[must_use]
    pub fn entry_id(self) -> u64 {
        match self {
            Self::Event(id) | Self::Stop { entry: id, .. } => id,
        }
    }
}

/// What to open in the inspector for a selection.
#[derive(Clone, Debug)]
pub enum InspectionTarget {
    /// A handler object.
    Handler(ObjectRef),
    /// An event argument payload.
    Args(Payload),
}

/// Anything that can be opened in the inspector.
pub trait InspectionSource {
    /// Returns the object to inspect.
    fn inspection_target(&self) -> InspectionTarget;
}

impl InspectionSource for TraceEntry {
    fn inspection_target(&self) -> InspectionTarget {
        InspectionTarget::Args(Payload::clone(&self.occurrence.args))
    }
}

impl InspectionSource for RouteStop {
    fn inspection_target(&self) -> InspectionTarget {
        InspectionTarget::Handler(self.handler.clone())
    }
}

/// A resolved selection: borrows either an entry or one of its stops.
#[derive(Clone, Copy, Debug)]
pub enum SelectedNode<'a> {
    /// The whole entry.
    Event(&'a TraceEntry),
    /// One route stop of an entry.
    Stop(&'a RouteStop),
}

impl InspectionSource for SelectedNode<'_> {
    fn inspection_target(&self) -> InspectionTarget {
        match self {
            Self::Event(entry) => entry.inspection_target(),
            Self::Stop(stop) => stop.inspection_target(),
        }
    }
}
