//! Event kind identity.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Index of an [`EventKind`] within its catalog, in declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(pub(crate) u32);

impl KindId {
    /// Returns the raw index of this kind.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A trackable event type.
///
/// Kinds are created once when the catalog is built and are cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventKind {
    id: KindId,
    category: Arc<str>,
    name: Arc<str>,
    identifier: Arc<str>,
    default_enabled: bool,
}

impl EventKind {
    pub(crate) fn new(id: KindId, category: &str, name: &str, default_enabled: bool) -> Self {
        Self {
            id,
            category: Arc::from(category),
            name: Arc::from(name),
            identifier: Arc::from(format!("{category}.{name}")),
            default_enabled,
        }
    }

    /// Returns this kind's catalog ID.
    #[must_use]
    pub fn id(&self) -> KindId {
        self.id
    }

    /// Returns the grouping key (the type that owns the event).
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the event name within its category.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unique identifier, `Category.Name`.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns whether a tracker for this kind starts enabled.
    #[must_use]
    pub fn default_enabled(&self) -> bool {
        self.default_enabled
    }

    /// Presentation order: category, then name, both case-insensitive.
    ///
    /// Equal keys compare equal, so a stable sort keeps declaration order.
    #[must_use]
    pub fn presentation_cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_case(&self.category, &other.category)
            .then_with(|| cmp_ignore_case(&self.name, &other.name))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}
