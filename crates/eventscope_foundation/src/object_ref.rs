//! Non-owning references to inspectable objects.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::inspect::Inspectable;

/// Placeholder type name for a reference that never pointed at anything.
pub const NULL_TYPE_NAME: &str = "<null>";

/// A weak back-reference to an inspectable object.
///
/// An `ObjectRef` never keeps its target alive. It remembers the target's
/// type name and identity so a trace can still describe an object after the
/// object itself has been dropped.
#[derive(Clone)]
pub struct ObjectRef {
    target: Option<Weak<dyn Inspectable>>,
    type_name: Arc<str>,
    addr: usize,
}

impl ObjectRef {
    /// Creates a reference to a shared object.
    #[must_use]
    pub fn new<T: Inspectable>(object: &Arc<T>) -> Self {
        let type_name: Arc<str> = Arc::from(object.type_name());
        let object: Arc<dyn Inspectable> = Arc::clone(object) as Arc<dyn Inspectable>;
        Self::from_dyn_named(&object, type_name)
    }

    /// Creates a reference from an already type-erased object.
    #[must_use]
    pub fn from_dyn(object: &Arc<dyn Inspectable>) -> Self {
        Self::from_dyn_named(object, Arc::from(object.type_name()))
    }

    fn from_dyn_named(object: &Arc<dyn Inspectable>, type_name: Arc<str>) -> Self {
        Self {
            addr: Arc::as_ptr(object).cast::<()>() as usize,
            target: Some(Arc::downgrade(object)),
            type_name,
        }
    }

    /// Creates the null reference used when a handler is unavailable.
    #[must_use]
    pub fn null() -> Self {
        Self {
            target: None,
            type_name: Arc::from(NULL_TYPE_NAME),
            addr: 0,
        }
    }

    /// Returns true if this is the null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }

    /// Returns true if the target is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.target.as_ref().is_some_and(|w| w.strong_count() > 0)
    }

    /// Returns a strong reference to the target, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<dyn Inspectable>> {
        self.target.as_ref().and_then(Weak::upgrade)
    }

    /// Returns the type name recorded when the reference was created.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns true if both references point at the same object.
    ///
    /// Two null references are not considered the same object.
    #[must_use]
    pub fn same_object(&self, other: &ObjectRef) -> bool {
        !self.is_null() && self.addr == other.addr
    }

    /// Returns true if this reference points at `object`.
    #[must_use]
    pub fn refers_to<T: Inspectable>(&self, object: &Arc<T>) -> bool {
        !self.is_null() && self.addr == Arc::as_ptr(object).cast::<()>() as usize
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "ObjectRef(null)");
        }
        let state = if self.is_alive() { "alive" } else { "dropped" };
        write!(f, "ObjectRef({} @ {:#x}, {state})", self.type_name, self.addr)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}
