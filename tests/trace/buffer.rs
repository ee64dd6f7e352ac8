//! Trace log capacity and eviction tests

use eventscope_trace::{TraceEntry, TraceLog};

use crate::Occurrences;

fn labels(log: &TraceLog) -> Vec<&str> {
    log.buffer().iter().map(TraceEntry::args_type).collect()
}

// =============================================================================
// Eviction
// =============================================================================

#[test]
fn capacity_three_keeps_last_three() {
    let mut occ = Occurrences::new();
    let mut log = TraceLog::new(3usize);
    for label in ["A", "B", "C", "D"] {
        log.admit(occ.next(label));
    }
    assert_eq!(labels(&log), vec!["B", "C", "D"]);

    log.set_capacity(1);
    assert_eq!(labels(&log), vec!["D"]);

    log.set_capacity(5);
    assert_eq!(labels(&log), vec!["D"]);
}

#[test]
fn zero_capacity_never_accumulates() {
    let mut occ = Occurrences::new();
    let mut log = TraceLog::new(10usize);
    log.admit(occ.next("A"));
    log.admit(occ.next("B"));

    log.set_capacity(0);
    assert!(log.buffer().is_empty());

    for _ in 0..20 {
        assert!(log.admit(occ.next("X")).is_none());
        assert!(log.buffer().is_empty());
    }

    log.set_capacity(2);
    log.admit(occ.next("Y"));
    assert_eq!(labels(&log), vec!["Y"]);
}

#[test]
fn default_capacity_is_one_hundred() {
    let mut occ = Occurrences::new();
    let mut log = TraceLog::default();
    for i in 0..150 {
        log.admit(occ.next(&format!("E{i}")));
    }
    assert_eq!(log.buffer().len(), 100);
    assert_eq!(log.buffer().iter().next().unwrap().args_type(), "E50");
    assert_eq!(log.stats().evicted, 50);
}

#[test]
fn clear_twice_is_clear_once() {
    let mut occ = Occurrences::new();
    let mut log = TraceLog::new(10usize);
    log.admit(occ.next("A"));

    log.clear();
    let once = log.stats();
    log.clear();
    let twice = log.stats();

    assert_eq!(once.entry_count, 0);
    assert_eq!(twice.entry_count, 0);
    assert_eq!(once.admitted, twice.admitted);
}

#[test]
fn selection_survives_eviction_of_others() {
    let mut occ = Occurrences::new();
    let mut log = TraceLog::new(3usize);
    let ids: Vec<_> = ["A", "B", "C"]
        .iter()
        .filter_map(|l| log.admit(occ.next(l)))
        .collect();
    log.select(ids[2], true).unwrap();

    log.admit(occ.next("D"));
    log.admit(occ.next("E"));

    let selected: Vec<_> = log.selected().iter().map(|e| e.args_type()).collect();
    assert_eq!(selected, vec!["C"]);
    assert!(log.select(ids[0], true).is_err());
}
