//! UI-like object tree nodes.
//!
//! Elements own their children and hold a weak back-reference to their
//! parent, so dropping a subtree's last strong reference releases it.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::inspect::Inspectable;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// Element ID
// =============================================================================

/// Process-unique identifier of an [`Element`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value of this ID.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// =============================================================================
// Element
// =============================================================================

/// A node in an observed object tree.
pub struct Element {
    id: ElementId,
    type_name: String,
    name: Option<String>,
    parent: RwLock<Weak<Element>>,
    children: RwLock<Vec<Arc<Element>>>,
    disposed: AtomicBool,
}

impl Element {
    /// Creates a detached element of the given type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: ElementId::next(),
            type_name: type_name.into(),
            name: None,
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            disposed: AtomicBool::new(false),
        })
    }

    /// Creates a detached, named element of the given type.
    #[must_use]
    pub fn named(type_name: impl Into<String>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: ElementId::next(),
            type_name: type_name.into(),
            name: Some(name.into()),
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            disposed: AtomicBool::new(false),
        })
    }

    /// Returns this element's ID.
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Returns this element's name, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the parent element, if attached and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<Element>> {
        self.parent.read().upgrade()
    }

    /// Returns a snapshot of this element's children.
    #[must_use]
    pub fn children(&self) -> Vec<Arc<Element>> {
        self.children.read().clone()
    }

    /// Attaches `child` as the last child of this element.
    ///
    /// The child is first detached from any previous parent. Returns false
    /// (and does nothing) if the attachment would create a cycle.
    pub fn append_child(self: &Arc<Self>, child: &Arc<Element>) -> bool {
        if self.is_within(child) {
            return false;
        }

        child.detach();
        *child.parent.write() = Arc::downgrade(self);
        self.children.write().push(Arc::clone(child));
        true
    }

    /// Removes the child with the given ID, returning it.
    pub fn remove_child(&self, id: ElementId) -> Option<Arc<Element>> {
        let mut children = self.children.write();
        let index = children.iter().position(|c| c.id == id)?;
        let child = children.remove(index);
        *child.parent.write() = Weak::new();
        Some(child)
    }

    /// Detaches this element from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self.id);
        }
    }

    /// Returns this element followed by each ancestor up to the root.
    #[must_use]
    pub fn ancestors(self: &Arc<Self>) -> Vec<Arc<Element>> {
        let mut chain = vec![Arc::clone(self)];
        let mut current = self.parent();
        while let Some(element) = current {
            current = element.parent();
            chain.push(element);
        }
        chain
    }

    /// Marks this element disposed and detaches it from its parent.
    ///
    /// Existing references stay valid; only the flag changes.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        self.detach();
    }

    /// Returns true if this element is `root` or lies beneath it.
    #[must_use]
    pub fn is_within(&self, root: &Element) -> bool {
        if self.id == root.id {
            return true;
        }
        let mut current = self.parent();
        while let Some(element) = current {
            if element.id == root.id {
                return true;
            }
            current = element.parent();
        }
        false
    }

    /// Finds a descendant (or this element) by ID.
    #[must_use]
    pub fn find(self: &Arc<Self>, id: ElementId) -> Option<Arc<Element>> {
        if self.id == id {
            return Some(Arc::clone(self));
        }
        self.children().iter().find_map(|child| child.find(id))
    }
}

impl Inspectable for Element {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn as_element(&self) -> Option<&Element> {
        Some(self)
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .field("name", &self.name)
            .field("children", &self.children.read().len())
            .finish()
    }
}
