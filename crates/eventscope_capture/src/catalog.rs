//! The catalog of trackable event kinds.
//!
//! A catalog is built once, before any tracker exists, and never changes
//! afterwards. Which kinds start enabled is decided by the caller at build
//! time rather than by process-wide state.

use std::collections::HashSet;

use crate::kind::{EventKind, KindId};

/// Kinds enabled by default: keyboard down/up, text composition, mouse
/// down/preview-down/up, and command execution.
pub const DEFAULT_ENABLED_KINDS: [&str; 7] = [
    "Keyboard.KeyDown",
    "Keyboard.KeyUp",
    "TextCompositionManager.TextInput",
    "Mouse.MouseDown",
    "Mouse.PreviewMouseDown",
    "Mouse.MouseUp",
    "CommandManager.Executed",
];

/// Routed events of a typical desktop UI toolkit, grouped by owner.
const STANDARD_KINDS: &[(&str, &[&str])] = &[
    (
        "Keyboard",
        &[
            "PreviewKeyDown",
            "KeyDown",
            "PreviewKeyUp",
            "KeyUp",
            "PreviewGotKeyboardFocus",
            "GotKeyboardFocus",
            "PreviewLostKeyboardFocus",
            "LostKeyboardFocus",
        ],
    ),
    (
        "Mouse",
        &[
            "PreviewMouseDown",
            "MouseDown",
            "PreviewMouseUp",
            "MouseUp",
            "PreviewMouseMove",
            "MouseMove",
            "PreviewMouseWheel",
            "MouseWheel",
            "MouseEnter",
            "MouseLeave",
            "GotMouseCapture",
            "LostMouseCapture",
        ],
    ),
    (
        "TextCompositionManager",
        &[
            "PreviewTextInputStart",
            "TextInputStart",
            "PreviewTextInput",
            "TextInput",
        ],
    ),
    (
        "CommandManager",
        &[
            "PreviewCanExecute",
            "CanExecute",
            "PreviewExecuted",
            "Executed",
        ],
    ),
    ("FocusManager", &["GotFocus", "LostFocus"]),
    ("ButtonBase", &["Click"]),
    (
        "Stylus",
        &["PreviewStylusDown", "StylusDown", "PreviewStylusUp", "StylusUp"],
    ),
    ("ScrollViewer", &["ScrollChanged"]),
    ("Selector", &["SelectionChanged"]),
];

// =============================================================================
// Catalog
// =============================================================================

/// An ordered, immutable set of event kinds.
#[derive(Clone, Debug, Default)]
pub struct EventCatalog {
    kinds: Vec<EventKind>,
}

impl EventCatalog {
    /// Starts building a catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Creates an empty catalog. Nothing will be captured.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the standard desktop UI catalog, enabling the given kinds.
    #[must_use]
    pub fn standard<I, S>(default_enabled: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CatalogBuilder::standard().build(default_enabled)
    }

    /// Returns the number of kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterates kinds in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &EventKind> {
        self.kinds.iter()
    }

    /// Returns a kind by ID.
    #[must_use]
    pub fn get(&self, id: KindId) -> Option<&EventKind> {
        self.kinds.get(id.0 as usize)
    }

    /// Looks up a kind by its `Category.Name` identifier.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&EventKind> {
        self.kinds.iter().find(|k| k.identifier() == identifier)
    }

    /// Returns kinds in presentation order (category, then name; stable).
    #[must_use]
    pub fn sorted(&self) -> Vec<&EventKind> {
        let mut kinds: Vec<_> = self.kinds.iter().collect();
        kinds.sort_by(|a, b| a.presentation_cmp(b));
        kinds
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects kind declarations for an [`EventCatalog`].
#[derive(Clone, Debug, Default)]
pub struct CatalogBuilder {
    declared: Vec<(String, String)>,
}

impl CatalogBuilder {
    /// Starts from the standard desktop UI kinds.
    #[must_use]
    pub fn standard() -> Self {
        let mut builder = Self::default();
        for (category, names) in STANDARD_KINDS {
            for name in *names {
                builder = builder.declare(*category, *name);
            }
        }
        builder
    }

    /// Returns the number of declared kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    /// Returns true if nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Declares a kind. Redeclaring an existing `Category.Name` is ignored.
    #[must_use]
    pub fn declare(mut self, category: impl Into<String>, name: impl Into<String>) -> Self {
        let category = category.into();
        let name = name.into();
        if !self
            .declared
            .iter()
            .any(|(c, n)| *c == category && *n == name)
        {
            self.declared.push((category, name));
        }
        self
    }

    /// Finishes the catalog, marking the listed identifiers default-enabled.
    ///
    /// Identifiers that match no declared kind are reported and skipped.
    #[must_use]
    pub fn build<I, S>(self, default_enabled: I) -> EventCatalog
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let defaults: HashSet<String> = default_enabled
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let kinds: Vec<_> = self
            .declared
            .iter()
            .enumerate()
            .map(|(index, (category, name))| {
                let enabled = defaults.contains(&format!("{category}.{name}"));
                let id = KindId(u32::try_from(index).unwrap_or(u32::MAX));
                EventKind::new(id, category, name, enabled)
            })
            .collect();

        for identifier in &defaults {
            if !kinds.iter().any(|k| k.identifier() == identifier) {
                tracing::warn!("default-enabled event kind {identifier} is not in the catalog");
            }
        }

        EventCatalog { kinds }
    }
}
