//! Export formatters for selected trace entries.
//!
//! Object bodies come from a [`PrettyPrinter`]. A printer failure on one
//! object becomes an inline marker in that entry's block; the rest of the
//! export is unaffected.

use std::fmt::Write;

use eventscope_foundation::{Inspectable, Payload};
use serde_json::{Value, json};

use crate::entry::TraceEntry;
use crate::hooks::PrettyPrinter;

/// Marker written in place of a handler dropped at admission.
pub const UNAVAILABLE_MARKER: &str = "<unavailable>";

/// Renders an object, turning a failure into an inline marker.
fn render_or_marker(printer: &dyn PrettyPrinter, object: &dyn Inspectable) -> String {
    printer.render(object).unwrap_or_else(|err| {
        tracing::warn!("export: {err}");
        format!("<render failed: {err}>")
    })
}

fn render_handler(printer: &dyn PrettyPrinter, handler: Option<&Payload>) -> String {
    match handler {
        Some(object) => render_or_marker(printer, object.as_ref()),
        None => UNAVAILABLE_MARKER.to_string(),
    }
}

// =============================================================================
// Export Formatter Trait
// =============================================================================

/// Trait for exporting trace entries.
pub trait ExportFormatter {
    /// Formats a single entry.
    fn format(&self, entry: &TraceEntry, printer: &dyn PrettyPrinter) -> String;

    /// Formats entries in the given order.
    fn format_many(&self, entries: &[&TraceEntry], printer: &dyn PrettyPrinter) -> String {
        entries.iter().map(|e| self.format(e, printer)).collect()
    }
}

// =============================================================================
// Text Exporter
// =============================================================================

/// Exports entries as indented text blocks.
///
/// ```text
/// KeyEventArgs handled by Button (true):
///     Handled By:
///         <printer output for the handler>
///     Args:
///         <printer output for the args>
/// ```
#[derive(Clone, Debug)]
pub struct TextExporter {
    /// Spaces per nesting level.
    pub indent_width: usize,
}

impl Default for TextExporter {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

impl TextExporter {
    /// Creates a text exporter with four-space indentation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the indentation width.
    #[must_use]
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    fn indent(&self, depth: usize) -> String {
        " ".repeat(self.indent_width * depth)
    }

    /// Writes `body` at `depth`, re-indenting its embedded newlines.
    fn write_body(&self, out: &mut String, depth: usize, body: &str) {
        let pad = self.indent(depth);
        for line in body.lines() {
            let _ = writeln!(out, "{pad}{line}");
        }
        if body.is_empty() {
            out.push('\n');
        }
    }
}

impl ExportFormatter for TextExporter {
    fn format(&self, entry: &TraceEntry, printer: &dyn PrettyPrinter) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} handled by {} ({}):",
            entry.args_type(),
            entry.handler_type(),
            entry.handled()
        );

        let _ = writeln!(out, "{}Handled By:", self.indent(1));
        self.write_body(
            &mut out,
            2,
            &render_handler(printer, entry.occurrence.handler.as_ref()),
        );

        let _ = writeln!(out, "{}Args:", self.indent(1));
        self.write_body(
            &mut out,
            2,
            &render_or_marker(printer, entry.occurrence.args.as_ref()),
        );

        out
    }
}

// =============================================================================
// JSON Exporter
// =============================================================================

/// Exports entries as a JSON array.
#[derive(Clone, Debug, Default)]
pub struct JsonExporter {
    /// Whether to pretty-print JSON.
    pub pretty: bool,
}

impl JsonExporter {
    /// Creates a new JSON exporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method for pretty printing.
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn to_value(entry: &TraceEntry, printer: &dyn PrettyPrinter) -> Value {
        let route: Vec<_> = entry
            .route()
            .iter()
            .map(|stop| json!({ "handler": stop.handler.type_name(), "handled": stop.handled }))
            .collect();

        json!({
            "id": entry.id,
            "sequence": entry.occurrence.sequence,
            "kind": entry.kind().identifier(),
            "args_type": entry.args_type(),
            "handler_type": entry.handler_type(),
            "handled": entry.handled(),
            "degraded": entry.degraded,
            "handled_by": render_handler(printer, entry.occurrence.handler.as_ref()),
            "args": render_or_marker(printer, entry.occurrence.args.as_ref()),
            "route": route,
        })
    }

    fn write(&self, value: &Value) -> String {
        if self.pretty {
            format!("{value:#}")
        } else {
            value.to_string()
        }
    }
}

impl ExportFormatter for JsonExporter {
    fn format(&self, entry: &TraceEntry, printer: &dyn PrettyPrinter) -> String {
        self.write(&Self::to_value(entry, printer))
    }

    fn format_many(&self, entries: &[&TraceEntry], printer: &dyn PrettyPrinter) -> String {
        let values = entries.iter().map(|e| Self::to_value(e, printer)).collect();
        self.write(&Value::Array(values))
    }
}

// =============================================================================
// Tests
// =============================================================================
