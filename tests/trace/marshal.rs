//! Marshaling tests
//!
//! Tests that work from any thread lands on the trace thread, in order.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use eventscope_capture::{CapturedOccurrence, EventCatalog, OccurrenceSink, RaisedEvent};
use eventscope_foundation::{Element, EventArgs};
use eventscope_trace::{NoDisplay, TraceConsumer, TraceLog, TraceThread};

use crate::Occurrences;

const WAIT: Duration = Duration::from_secs(5);

fn spawn(capacity: usize) -> TraceThread {
    TraceThread::spawn("marshal-test", TraceLog::new(capacity), Arc::new(NoDisplay)).unwrap()
}

#[test]
fn many_producers_lose_nothing() {
    let trace = spawn(10_000);

    let mut sources: Vec<_> = (0..4).map(|_| Occurrences::new()).collect();
    thread::scope(|s| {
        for (producer, occ) in sources.iter_mut().enumerate() {
            let pipeline = trace.pipeline().clone();
            s.spawn(move || {
                for i in 0..250 {
                    pipeline.on_occurrence(occ.next(&format!("P{producer}-{i}")));
                }
            });
        }
    });

    let log = trace.shutdown().unwrap();
    assert_eq!(log.buffer().len(), 1_000);
    assert_eq!(log.stats().degraded, 0);

    // Each producer's occurrences keep their relative order
    for producer in 0..4 {
        let prefix = format!("P{producer}-");
        let order: Vec<u32> = log
            .buffer()
            .iter()
            .filter_map(|e| e.args_type().strip_prefix(&prefix))
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(order, (0..250).collect::<Vec<_>>());
    }
}

#[test]
fn capture_during_a_task_is_queued_behind_it() {
    let trace = spawn(10);
    let pipeline = trace.pipeline().clone();

    let mut occ = Occurrences::new();
    let first = occ.next("A");
    let second = occ.next("B");
    let inner = pipeline.clone();
    let len = trace
        .query(move |log| {
            inner.on_occurrence(first);
            inner.on_occurrence(second);
            log.buffer().len()
        })
        .unwrap()
        .recv_timeout(WAIT)
        .unwrap();

    // The log was in use by the query, so both were queued behind it
    assert_eq!(len, 0);
    let len = trace.query(|log| log.buffer().len()).unwrap().recv_timeout(WAIT).unwrap();
    assert_eq!(len, 2);
    assert_eq!(pipeline.stats().posted, 4);
}

#[test]
fn degraded_admission_keeps_capturing() {
    let trace = spawn(10);
    let pipeline = trace.pipeline().clone();

    let mut occ = Occurrences::new();
    let orphaned = occ.next("Orphaned");
    occ.button.dispose();
    occ.button = Element::new("Button");
    pipeline.on_occurrence(orphaned);
    pipeline.on_occurrence(occ.next("Fine"));

    let log = trace.shutdown().unwrap();
    let entries: Vec<_> = log.buffer().iter().collect();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].degraded);
    assert_eq!(entries[0].handler_type(), "<null>");
    assert!(!entries[1].degraded);
    assert_eq!(log.stats().degraded, 1);
}

#[test]
fn unretained_handler_is_admitted_intact_from_any_thread() {
    let trace = spawn(10);
    let pipeline = trace.pipeline().clone();
    let catalog = EventCatalog::standard(Vec::<String>::new());
    let kind = catalog.find("CommandManager.Executed").unwrap();
    let window = Element::new("Window");

    thread::scope(|s| {
        s.spawn(|| {
            // Nothing but the event holds the command binding
            let args = EventArgs::new("ExecutedRoutedEventArgs").into_payload();
            let event = RaisedEvent::new(kind.id(), &window, args)
                .with_handler(Arc::new(EventArgs::new("CommandBinding")), true);
            let occurrence = CapturedOccurrence::capture(pipeline.next_sequence(), kind, &event);
            drop(event);
            pipeline.on_occurrence(occurrence);
        });
    });

    let log = trace.shutdown().unwrap();
    let entry = log.buffer().iter().next().unwrap();
    assert!(!entry.degraded);
    assert_eq!(entry.handler_type(), "CommandBinding");
    assert_eq!(log.stats().degraded, 0);
}

#[test]
fn host_driven_consumer() {
    let (pipeline, consumer) =
        TraceConsumer::bind_current(TraceLog::new(10usize), Arc::new(NoDisplay));

    let remote = pipeline.clone();
    thread::spawn(move || {
        let mut occ = Occurrences::new();
        for label in ["A", "B", "C"] {
            remote.on_occurrence(occ.next(label));
        }
    })
    .join()
    .unwrap();

    assert_eq!(consumer.with_log(|log| log.buffer().len()), 0);
    assert_eq!(consumer.pump(), 3);
    assert_eq!(consumer.with_log(|log| log.buffer().len()), 3);

    let stats = pipeline.stats();
    assert_eq!(stats.posted, 3);
    assert_eq!(stats.inline, 0);
}
