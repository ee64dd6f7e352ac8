//! Trace-thread state: the buffer plus its presentation hooks.
//!
//! A [`TraceLog`] is owned by exactly one thread. Every method takes
//! `&mut self` or `&self` without interior locking; the pipeline is what
//! guarantees the log is only ever touched from the trace thread.

use std::sync::Arc;

use eventscope_capture::CapturedOccurrence;
use eventscope_foundation::Result;

use crate::buffer::{Capacity, TraceBuffer, TraceBufferStats};
use crate::entry::{InspectionSource, InspectionTarget, Selectable, TraceEntry};
use crate::format::{ExportFormatter, TextExporter};
use crate::hooks::{PrettyPrinter, Presenter, PresenterHandle};

/// The trace thread's view of captured events.
#[derive(Debug, Default)]
pub struct TraceLog {
    buffer: TraceBuffer,
    presenter: PresenterHandle,
}

impl TraceLog {
    /// Creates a log with the given capacity and no presenter.
    #[must_use]
    pub fn new(capacity: impl Into<Capacity>) -> Self {
        Self {
            buffer: TraceBuffer::new(capacity),
            presenter: PresenterHandle::default(),
        }
    }

    /// Builder method to attach a presenter.
    #[must_use]
    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = PresenterHandle(presenter);
        self
    }

    /// Replaces the presenter.
    pub fn set_presenter(&mut self, presenter: Arc<dyn Presenter>) {
        self.presenter = PresenterHandle(presenter);
    }

    /// Returns the underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.buffer.stats()
    }

    // -------------------------------------------------------------------------
    // Admission
    // -------------------------------------------------------------------------

    /// Admits an occurrence at the tail of the buffer.
    ///
    /// If the handler has been disposed since capture, the entry is
    /// admitted with a null handler instead. Returns the entry ID if the
    /// entry is still buffered afterwards (it is not when the capacity is
    /// zero).
    pub fn admit(&mut self, occurrence: CapturedOccurrence) -> Option<u64> {
        let (occurrence, degraded) = if occurrence.handler_disposed() {
            tracing::warn!(
                sequence = occurrence.sequence,
                kind = %occurrence.kind,
                "handler {} was disposed, admitting without it",
                occurrence.handler_type()
            );
            (occurrence.without_handler(), true)
        } else {
            (occurrence, false)
        };

        let id = self.buffer.push(occurrence, degraded);
        let entry = self.buffer.get(id)?;
        self.presenter.0.entry_admitted(entry);
        Some(id)
    }

    // -------------------------------------------------------------------------
    // Capacity
    // -------------------------------------------------------------------------

    /// Changes the capacity. Negative values clamp to zero; zero empties
    /// the buffer.
    pub fn set_capacity(&mut self, capacity: impl Into<Capacity>) {
        let capacity = capacity.into();
        let before = self.buffer.len();
        self.buffer.set_capacity(capacity);
        tracing::debug!(
            capacity = capacity.get(),
            evicted = before - self.buffer.len(),
            "trace capacity changed"
        );
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        let dropped = self.buffer.len();
        self.buffer.clear();
        tracing::debug!(dropped, "trace cleared");
        self.presenter.0.cleared();
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Sets an entry's selection flag.
    ///
    /// # Errors
    ///
    /// Returns an unknown-entry error if the entry is not buffered.
    pub fn select(&mut self, id: u64, selected: bool) -> Result<()> {
        if self.buffer.select(id, selected)? {
            self.notify_selection(id);
        }
        Ok(())
    }

    /// Flips an entry's selection flag, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns an unknown-entry error if the entry is not buffered.
    pub fn toggle(&mut self, id: u64) -> Result<bool> {
        let selected = self.buffer.toggle(id)?;
        self.notify_selection(id);
        Ok(selected)
    }

    /// Selects every buffered entry.
    pub fn select_all(&mut self) {
        for id in self.buffer.select_all() {
            self.notify_selection(id);
        }
    }

    /// Deselects every buffered entry.
    pub fn clear_selection(&mut self) {
        for id in self.buffer.clear_selection() {
            self.notify_selection(id);
        }
    }

    fn notify_selection(&self, id: u64) {
        if let Some(entry) = self.buffer.get(id) {
            self.presenter.0.selection_changed(entry);
        }
    }

    /// Returns the selected entries, in buffer order.
    #[must_use]
    pub fn selected(&self) -> Vec<&TraceEntry> {
        self.buffer.selected()
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Resolves a selection to the object the inspector should open.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry or route stop is not buffered.
    pub fn inspection_target(&self, selection: Selectable) -> Result<InspectionTarget> {
        Ok(self.buffer.resolve(selection)?.inspection_target())
    }

    /// Resolves a selection and hands the result to the presenter.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry or route stop is not buffered.
    pub fn inspect(&self, selection: Selectable) -> Result<InspectionTarget> {
        let target = self.inspection_target(selection)?;
        self.presenter.0.on_inspect(&target);
        Ok(target)
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Exports the selected entries as text blocks, in buffer order.
    #[must_use]
    pub fn export_selected(&self, printer: &dyn PrettyPrinter) -> String {
        self.export_selected_with(&TextExporter::new(), printer)
    }

    /// Exports the selected entries with a specific formatter.
    #[must_use]
    pub fn export_selected_with(
        &self,
        formatter: &dyn ExportFormatter,
        printer: &dyn PrettyPrinter,
    ) -> String {
        formatter.format_many(&self.buffer.selected(), printer)
    }
}

// =============================================================================
// Tests
// =============================================================================
