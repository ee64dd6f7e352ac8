//! The inspection capability shared by traced objects and event payloads.

use std::fmt;
use std::sync::Arc;

use crate::element::Element;

// =============================================================================
// Inspectable
// =============================================================================

/// An object that can appear in a trace: as an event source, as the handler
/// that processed an event, or as an event's argument payload.
///
/// `Debug` is required so that a printer always has a fallback rendering.
pub trait Inspectable: fmt::Debug + Send + Sync + 'static {
    /// Returns the fully qualified type name shown in trace headers.
    fn type_name(&self) -> &str;

    /// Returns this object as a tree element, if it is one.
    ///
    /// Subtree-membership checks only apply to elements.
    fn as_element(&self) -> Option<&Element> {
        None
    }

    /// Returns true once the object has been disposed by its owner.
    ///
    /// A disposed object is still readable but should no longer be shown
    /// as the handler of new trace entries.
    fn is_disposed(&self) -> bool {
        false
    }
}

/// An event argument payload, shared between an occurrence and its entry.
pub type Payload = Arc<dyn Inspectable>;

// =============================================================================
// Event Args
// =============================================================================

/// A generic event argument payload: a type name plus named fields.
///
/// Hosts with their own argument types implement [`Inspectable`] directly;
/// this type covers the common case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventArgs {
    type_name: String,
    fields: Vec<(String, String)>,
}

impl EventArgs {
    /// Creates an empty payload of the given type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder method to add a named field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.push((name.into(), value.to_string()));
        self
    }

    /// Returns the fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Returns the value of a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Wraps this payload for attachment to an event.
    #[must_use]
    pub fn into_payload(self) -> Payload {
        Arc::new(self)
    }
}

impl Inspectable for EventArgs {
    fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl fmt::Display for EventArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        if !self.fields.is_empty() {
            let fields: Vec<_> = self.fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, " {{{}}}", fields.join(", "))?;
        }
        Ok(())
    }
}
