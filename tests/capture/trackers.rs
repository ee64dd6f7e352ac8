//! Tracker tests
//!
//! Tests per-kind ordering and concurrent delivery across trackers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use eventscope_capture::{
    CapturedOccurrence, EventCatalog, OccurrenceSink, RaisedEvent, TargetScope, TrackerRegistry,
};
use eventscope_foundation::{Element, EventArgs};
use parking_lot::Mutex;

#[derive(Default)]
struct RecordingSink {
    sequence: AtomicU64,
    seen: Mutex<Vec<CapturedOccurrence>>,
}

impl OccurrenceSink for RecordingSink {
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    fn on_occurrence(&self, occurrence: CapturedOccurrence) {
        self.seen.lock().push(occurrence);
    }
}

#[test]
fn trackers_deliver_concurrently_without_reordering() {
    let catalog = EventCatalog::builder()
        .declare("Keyboard", "KeyDown")
        .declare("Mouse", "MouseMove")
        .build(["Keyboard.KeyDown", "Mouse.MouseMove"]);
    let root = Element::new("Window");
    let scope = TargetScope::new(Arc::clone(&root));
    let sink = Arc::new(RecordingSink::default());
    let dyn_sink: Arc<dyn OccurrenceSink> = sink.clone();
    let _registry = TrackerRegistry::new(&catalog, &scope, &dyn_sink);

    thread::scope(|s| {
        for identifier in ["Keyboard.KeyDown", "Mouse.MouseMove"] {
            let kind = catalog.find(identifier).unwrap().id();
            let scope = &scope;
            let root = &root;
            s.spawn(move || {
                for i in 0..200 {
                    let args = EventArgs::new("RoutedEventArgs").with_field("n", i).into_payload();
                    scope.raise(RaisedEvent::new(kind, root, args));
                }
            });
        }
    });

    let seen = sink.seen.lock();
    assert_eq!(seen.len(), 400);

    let mut per_kind: HashMap<&str, Vec<u64>> = HashMap::new();
    for occurrence in seen.iter() {
        per_kind
            .entry(occurrence.kind.identifier())
            .or_default()
            .push(occurrence.sequence);
    }

    for sequences in per_kind.values() {
        assert_eq!(sequences.len(), 200);
        assert!(sequences.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn disabled_tracker_captures_nothing() {
    let catalog = EventCatalog::builder()
        .declare("Keyboard", "KeyDown")
        .build(Vec::<String>::new());
    let root = Element::new("Window");
    let scope = TargetScope::new(Arc::clone(&root));
    let sink = Arc::new(RecordingSink::default());
    let dyn_sink: Arc<dyn OccurrenceSink> = sink.clone();
    let mut registry = TrackerRegistry::new(&catalog, &scope, &dyn_sink);

    let kind = catalog.find("Keyboard.KeyDown").unwrap().id();
    scope.raise(RaisedEvent::new(kind, &root, EventArgs::new("KeyEventArgs").into_payload()));
    assert!(sink.seen.lock().is_empty());

    registry.set_enabled("Keyboard.KeyDown", true).unwrap();
    scope.raise(RaisedEvent::new(kind, &root, EventArgs::new("KeyEventArgs").into_payload()));
    assert_eq!(sink.seen.lock().len(), 1);
}
