//! Target scope tests
//!
//! Tests listener delivery, routing, and subscription lifetime.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use eventscope_capture::{EventCatalog, Listener, RaisedEvent, TargetScope};
use eventscope_foundation::{Element, EventArgs, Payload};
use parking_lot::Mutex;

fn catalog() -> EventCatalog {
    EventCatalog::builder()
        .declare("Mouse", "MouseDown")
        .declare("Mouse", "MouseUp")
        .build(Vec::<String>::new())
}

/// Window > Panel > Button
fn tree() -> (Arc<Element>, Arc<Element>, Arc<Element>) {
    let window = Element::named("Window", "main");
    let panel = Element::new("StackPanel");
    let button = Element::named("Button", "ok");
    window.append_child(&panel);
    panel.append_child(&button);
    (window, panel, button)
}

fn mouse_args() -> Payload {
    EventArgs::new("MouseButtonEventArgs").into_payload()
}

fn counting_listener(count: &Arc<AtomicUsize>) -> Listener {
    let count = Arc::clone(count);
    Arc::new(move |_event: &RaisedEvent| {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

// =============================================================================
// Delivery
// =============================================================================

#[test]
fn delivers_only_to_matching_kind() {
    let catalog = catalog();
    let (window, _, button) = tree();
    let scope = TargetScope::new(window);
    let down = catalog.find("Mouse.MouseDown").unwrap().id();
    let up = catalog.find("Mouse.MouseUp").unwrap().id();

    let count = Arc::new(AtomicUsize::new(0));
    let _subscription = scope.subscribe(down, counting_listener(&count));

    assert_eq!(scope.raise(RaisedEvent::new(down, &button, mouse_args())), 1);
    assert_eq!(scope.raise(RaisedEvent::new(up, &button, mouse_args())), 0);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn elements_added_later_are_covered() {
    let catalog = catalog();
    let (window, panel, _) = tree();
    let scope = TargetScope::new(window);
    let down = catalog.find("Mouse.MouseDown").unwrap().id();

    let count = Arc::new(AtomicUsize::new(0));
    let _subscription = scope.subscribe(down, counting_listener(&count));

    let late = Element::new("CheckBox");
    panel.append_child(&late);
    scope.raise(RaisedEvent::new(down, &late, mouse_args()));

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn sources_outside_scope_are_ignored() {
    let catalog = catalog();
    let (window, _, _) = tree();
    let scope = TargetScope::new(window);
    let down = catalog.find("Mouse.MouseDown").unwrap().id();

    let count = Arc::new(AtomicUsize::new(0));
    let _subscription = scope.subscribe(down, counting_listener(&count));

    let stranger = Element::new("Button");
    assert_eq!(scope.raise(RaisedEvent::new(down, &stranger, mouse_args())), 0);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Routing
// =============================================================================

#[test]
fn unhandled_route_runs_to_root() {
    let catalog = catalog();
    let (window, _, button) = tree();
    let scope = TargetScope::new(Arc::clone(&window));
    let down = catalog.find("Mouse.MouseDown").unwrap().id();

    let routes = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&routes);
    let _subscription = scope.subscribe(
        down,
        Arc::new(move |event: &RaisedEvent| {
            let names: Vec<String> = event
                .route
                .iter()
                .map(|s| s.handler.type_name().to_string())
                .collect();
            seen.lock().push(names);
        }),
    );

    scope.raise(RaisedEvent::new(down, &button, mouse_args()));
    assert_eq!(*routes.lock(), vec![vec!["Button", "StackPanel", "Window"]]);
}

#[test]
fn handled_route_stops_at_handler() {
    let catalog = catalog();
    let (window, panel, button) = tree();
    let scope = TargetScope::new(window);
    let down = catalog.find("Mouse.MouseDown").unwrap().id();

    let routes = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&routes);
    let _subscription = scope.subscribe(
        down,
        Arc::new(move |event: &RaisedEvent| {
            let stops: Vec<(String, bool)> = event
                .route
                .iter()
                .map(|s| (s.handler.type_name().to_string(), s.handled))
                .collect();
            seen.lock().push(stops);
        }),
    );

    scope.raise(
        RaisedEvent::new(down, &button, mouse_args())
            .handled_by(&panel),
    );

    let routes = routes.lock();
    assert_eq!(
        routes[0],
        vec![("Button".to_string(), false), ("StackPanel".to_string(), true)]
    );
}

// =============================================================================
// Subscription Lifetime
// =============================================================================

#[test]
fn dropping_subscription_stops_delivery() {
    let catalog = catalog();
    let (window, _, button) = tree();
    let scope = TargetScope::new(window);
    let down = catalog.find("Mouse.MouseDown").unwrap().id();

    let count = Arc::new(AtomicUsize::new(0));
    let subscription = scope.subscribe(down, counting_listener(&count));
    assert_eq!(subscription.kind(), down);
    assert_eq!(scope.listener_count(down), 1);

    drop(subscription);
    assert_eq!(scope.listener_count(down), 0);
    scope.raise(RaisedEvent::new(down, &button, mouse_args()));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn subscription_outliving_scope_is_harmless() {
    let catalog = catalog();
    let (window, _, _) = tree();
    let scope = TargetScope::new(window);
    let down = catalog.find("Mouse.MouseDown").unwrap().id();

    let count = Arc::new(AtomicUsize::new(0));
    let subscription = scope.subscribe(down, counting_listener(&count));
    drop(scope);
    drop(subscription);
}
