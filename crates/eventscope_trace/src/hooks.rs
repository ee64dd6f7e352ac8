//! Collaborators the trace core calls out to.
//!
//! - [`DisplayMembership`] answers whether an object belongs to the tool's
//!   own display, so the tool never traces itself.
//! - [`PrettyPrinter`] renders objects for export.
//! - [`Presenter`] receives advisory notifications; the core never waits on it.

use std::fmt;
use std::sync::{Arc, Weak};

use eventscope_foundation::{Element, Inspectable, RenderError};

use crate::entry::{InspectionTarget, TraceEntry};

// =============================================================================
// Display Membership
// =============================================================================

/// Pure query: does `object` belong to the tracing tool's display subtree?
pub trait DisplayMembership: Send + Sync {
    /// Returns true if the object is part of the tool's own display.
    fn belongs_to_tool_display(&self, object: &dyn Inspectable) -> bool;
}

impl<F> DisplayMembership for F
where
    F: Fn(&dyn Inspectable) -> bool + Send + Sync,
{
    fn belongs_to_tool_display(&self, object: &dyn Inspectable) -> bool {
        self(object)
    }
}

/// Membership for a tool with no display of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDisplay;

impl DisplayMembership for NoDisplay {
    fn belongs_to_tool_display(&self, _object: &dyn Inspectable) -> bool {
        false
    }
}

/// Membership defined by the subtree under the tool's root element.
#[derive(Clone, Debug)]
pub struct SubtreeMembership {
    root: Weak<Element>,
}

impl SubtreeMembership {
    /// Treats `root` and everything beneath it as the tool's display.
    #[must_use]
    pub fn new(root: &Arc<Element>) -> Self {
        Self {
            root: Arc::downgrade(root),
        }
    }
}

impl DisplayMembership for SubtreeMembership {
    fn belongs_to_tool_display(&self, object: &dyn Inspectable) -> bool {
        match (object.as_element(), self.root.upgrade()) {
            (Some(element), Some(root)) => element.is_within(&root),
            _ => false,
        }
    }
}

// =============================================================================
// Pretty Printer
// =============================================================================

/// Renders an object as (possibly multi-line) text.
pub trait PrettyPrinter: Send + Sync {
    /// Renders one object.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if this object cannot be rendered. The
    /// failure only affects this call.
    fn render(&self, object: &dyn Inspectable) -> Result<String, RenderError>;
}

impl<F> PrettyPrinter for F
where
    F: Fn(&dyn Inspectable) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, object: &dyn Inspectable) -> Result<String, RenderError> {
        self(object)
    }
}

/// Renders objects with their alternate `Debug` representation.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugPrinter;

impl PrettyPrinter for DebugPrinter {
    fn render(&self, object: &dyn Inspectable) -> Result<String, RenderError> {
        Ok(format!("{object:#?}"))
    }
}

// =============================================================================
// Presenter
// =============================================================================

/// Receives advisory notifications on the trace thread.
///
/// All methods default to doing nothing.
pub trait Presenter: Send + Sync {
    /// A new entry was admitted and should be brought into view.
    fn entry_admitted(&self, _entry: &TraceEntry) {}

    /// An entry's selection flag changed.
    fn selection_changed(&self, _entry: &TraceEntry) {}

    /// The buffer was emptied.
    fn cleared(&self) {}

    /// The user asked to inspect a target.
    fn on_inspect(&self, _target: &InspectionTarget) {}
}

/// A presenter that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

/// Shared presenter handle.
#[derive(Clone)]
pub(crate) struct PresenterHandle(pub(crate) Arc<dyn Presenter>);

impl Default for PresenterHandle {
    fn default() -> Self {
        Self(Arc::new(NullPresenter))
    }
}

impl fmt::Debug for PresenterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Presenter")
    }
}
