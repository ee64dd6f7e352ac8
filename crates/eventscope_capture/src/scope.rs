//! The observed object graph and its class-level listener registry.
//!
//! A [`TargetScope`] stands in for the host toolkit's event system: the host
//! raises events on elements, and the scope delivers each one to every
//! listener subscribed to that kind, provided the source element lies within
//! the scope's root. Listeners are attached per kind rather than per object,
//! so elements added to the tree later are covered automatically.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use eventscope_foundation::{Element, Inspectable, ObjectRef, Payload};
use parking_lot::RwLock;

use crate::kind::KindId;

/// A callback attached to one event kind.
pub type Listener = Arc<dyn Fn(&RaisedEvent) + Send + Sync>;

// =============================================================================
// Raised Event
// =============================================================================

/// One handler the event visited on its way from the source to the root.
#[derive(Clone, Debug)]
pub struct RouteStop {
    /// The element that saw the event.
    pub handler: ObjectRef,
    /// Whether this element marked the event handled.
    pub handled: bool,
}

/// An event as raised by the host, before capture.
pub struct RaisedEvent {
    /// The kind of event.
    pub kind: KindId,
    /// The element the event was raised on.
    pub source: Arc<Element>,
    /// The object that processed the event.
    pub handler: Arc<dyn Inspectable>,
    /// The event's argument payload.
    pub args: Payload,
    /// Whether the handler marked the event handled.
    pub handled: bool,
    /// The route the event took; filled in by [`TargetScope::raise`].
    pub route: Vec<RouteStop>,
}

impl RaisedEvent {
    /// Creates an unhandled event whose handler is its source.
    #[must_use]
    pub fn new(kind: KindId, source: &Arc<Element>, args: Payload) -> Self {
        Self {
            kind,
            source: Arc::clone(source),
            handler: Arc::clone(source) as Arc<dyn Inspectable>,
            args,
            handled: false,
            route: Vec::new(),
        }
    }

    /// Builder method: the event was handled by `element`.
    #[must_use]
    pub fn handled_by(mut self, element: &Arc<Element>) -> Self {
        self.handler = Arc::clone(element) as Arc<dyn Inspectable>;
        self.handled = true;
        self
    }

    /// Builder method: the event was processed by an arbitrary object.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn Inspectable>, handled: bool) -> Self {
        self.handler = handler;
        self.handled = handled;
        self
    }
}

impl fmt::Debug for RaisedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaisedEvent")
            .field("kind", &self.kind)
            .field("source", &self.source.id())
            .field("handler", &self.handler.type_name())
            .field("args", &self.args.type_name())
            .field("handled", &self.handled)
            .field("route", &self.route.len())
            .finish()
    }
}

// =============================================================================
// Target Scope
// =============================================================================

struct Slot {
    id: u64,
    active: Arc<AtomicBool>,
    listener: Listener,
}

/// The root of an observed object graph plus its listener registry.
pub struct TargetScope {
    root: Arc<Element>,
    listeners: RwLock<HashMap<KindId, Vec<Slot>>>,
    next_listener: AtomicU64,
}

impl TargetScope {
    /// Creates a scope observing `root` and everything beneath it.
    #[must_use]
    pub fn new(root: Arc<Element>) -> Arc<Self> {
        Arc::new(Self {
            root,
            listeners: RwLock::new(HashMap::new()),
            next_listener: AtomicU64::new(0),
        })
    }

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> &Arc<Element> {
        &self.root
    }

    /// Returns true if `element` is observed by this scope.
    #[must_use]
    pub fn contains(&self, element: &Element) -> bool {
        element.is_within(&self.root)
    }

    /// Attaches a listener for one kind. The listener stays attached until
    /// the returned [`Subscription`] is dropped.
    pub fn subscribe(self: &Arc<Self>, kind: KindId, listener: Listener) -> Subscription {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.listeners.write().entry(kind).or_default().push(Slot {
            id,
            active: Arc::clone(&active),
            listener,
        });

        Subscription {
            scope: Arc::downgrade(self),
            kind,
            id,
            active,
        }
    }

    /// Returns the number of listeners attached to a kind.
    #[must_use]
    pub fn listener_count(&self, kind: KindId) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }

    /// Raises an event, delivering it synchronously on the calling thread.
    ///
    /// Returns the number of listeners that received it. Events whose source
    /// is outside the scope are not delivered.
    pub fn raise(&self, mut event: RaisedEvent) -> usize {
        if !self.contains(&event.source) {
            return 0;
        }

        let listeners: Vec<_> = match self.listeners.read().get(&event.kind) {
            Some(slots) => slots
                .iter()
                .map(|s| (Arc::clone(&s.active), Arc::clone(&s.listener)))
                .collect(),
            None => return 0,
        };

        event.route = self.route_for(&event);

        let mut delivered = 0;
        for (active, listener) in listeners {
            if active.load(Ordering::Acquire) {
                listener(&event);
                delivered += 1;
            }
        }
        delivered
    }

    /// Walks from the source toward the root, stopping at the handler.
    fn route_for(&self, event: &RaisedEvent) -> Vec<RouteStop> {
        let handler = ObjectRef::from_dyn(&event.handler);
        let mut route = Vec::new();
        for element in event.source.ancestors() {
            let reached_handler = handler.refers_to(&element);
            let at_root = element.id() == self.root.id();
            route.push(RouteStop {
                handler: ObjectRef::new(&element),
                handled: reached_handler && event.handled,
            });
            if reached_handler || at_root {
                break;
            }
        }
        route
    }

    fn detach(&self, kind: KindId, id: u64) {
        let mut listeners = self.listeners.write();
        if let Some(slots) = listeners.get_mut(&kind) {
            slots.retain(|s| s.id != id);
            if slots.is_empty() {
                listeners.remove(&kind);
            }
        }
    }
}

impl fmt::Debug for TargetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetScope")
            .field("root", &self.root.id())
            .field("kinds", &self.listeners.read().len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// An attached listener. Dropping it detaches the listener.
///
/// After `drop` returns, the listener is never invoked again by a new
/// `raise`. A delivery already in progress on another thread may finish.
#[must_use = "dropping a subscription detaches its listener"]
pub struct Subscription {
    scope: Weak<TargetScope>,
    kind: KindId,
    id: u64,
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Returns the kind this subscription listens to.
    #[must_use]
    pub fn kind(&self) -> KindId {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(scope) = self.scope.upgrade() {
            scope.detach(self.kind, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}
