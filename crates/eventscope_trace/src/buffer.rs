//! Bounded buffer for trace entries.
//!
//! Keeps the most recent entries under a live capacity, evicting the oldest
//! first. Entry IDs increase monotonically, so lookup by ID is a binary
//! search.

use std::collections::{HashMap, VecDeque};

use eventscope_capture::CapturedOccurrence;
use eventscope_foundation::{Error, Result};
use serde::Serialize;

use crate::entry::{SelectedNode, Selectable, TraceEntry};

// =============================================================================
// Capacity
// =============================================================================

/// A buffer capacity. Negative requests clamp to zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capacity(usize);

impl Capacity {
    /// The default capacity (100 entries).
    pub const DEFAULT: Capacity = Capacity(100);

    /// Returns the capacity as a count.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Clamps a signed request to a capacity.
    #[must_use]
    pub fn clamped(requested: i64) -> Self {
        Self(usize::try_from(requested.max(0)).unwrap_or(usize::MAX))
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<usize> for Capacity {
    fn from(n: usize) -> Self {
        Self(n)
    }
}

impl From<u32> for Capacity {
    fn from(n: u32) -> Self {
        Self::clamped(i64::from(n))
    }
}

impl From<i32> for Capacity {
    fn from(n: i32) -> Self {
        Self::clamped(i64::from(n))
    }
}

impl From<i64> for Capacity {
    fn from(n: i64) -> Self {
        Self::clamped(n)
    }
}

// =============================================================================
// Trace Buffer
// =============================================================================

/// An ordered, capacity-limited store of trace entries.
///
/// Insertion order is arrival order on the trace thread. After every push
/// and every capacity change, `len() <= capacity()`.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    /// The entries, oldest first.
    entries: VecDeque<TraceEntry>,
    /// Maximum number of entries to keep.
    capacity: usize,
    /// Next entry ID to assign.
    next_id: u64,
    /// Entries ever admitted.
    admitted: u64,
    /// Entries removed to honour the capacity.
    evicted: u64,
    /// Entries admitted without their handler.
    degraded: u64,
}

impl TraceBuffer {
    /// Creates a new buffer with the given capacity.
    #[must_use]
    pub fn new(capacity: impl Into<Capacity>) -> Self {
        let capacity = capacity.into().get();
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            next_id: 0,
            admitted: 0,
            evicted: 0,
            degraded: 0,
        }
    }

    /// Creates a buffer with the default capacity (100 entries).
    #[must_use]
    pub fn default_size() -> Self {
        Self::new(Capacity::DEFAULT)
    }

    /// Appends an occurrence, then evicts from the head until within capacity.
    ///
    /// Returns the assigned entry ID. With a capacity of zero the entry is
    /// evicted immediately.
    pub fn push(&mut self, occurrence: CapturedOccurrence, degraded: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.admitted += 1;
        if degraded {
            self.degraded += 1;
        }

        self.entries
            .push_back(TraceEntry::new(id, occurrence, degraded));
        self.enforce_capacity();

        id
    }

    /// Changes the capacity, evicting the oldest entries if needed.
    ///
    /// A capacity of zero empties the buffer immediately. Raising the
    /// capacity never brings evicted entries back.
    pub fn set_capacity(&mut self, capacity: impl Into<Capacity>) {
        self.capacity = capacity.into().get();
        self.enforce_capacity();
    }

    /// Evicts exactly `len - capacity` entries, oldest first.
    fn enforce_capacity(&mut self) {
        let excess = self.entries.len().saturating_sub(self.capacity);
        if excess > 0 {
            self.entries.drain(..excess);
            self.evicted += excess as u64;
        }
    }

    /// Returns the capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of entries in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the buffer holds `capacity` entries.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Clears all entries from the buffer.
    pub fn clear(&mut self) {
        self.entries.clear();
        // Don't reset next_id - keep it monotonically increasing
    }

    /// Returns an iterator over all entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    /// Returns the entry with the given ID.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&TraceEntry> {
        let index = self.index_of(id)?;
        self.entries.get(index)
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut TraceEntry> {
        let index = self.index_of(id).ok_or_else(|| Error::unknown_entry(id))?;
        self.entries
            .get_mut(index)
            .ok_or_else(|| Error::unknown_entry(id))
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Returns the most recent N entries.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceEntry> {
        let start = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(start).collect()
    }

    /// Returns entries matching a predicate.
    pub fn filter<F>(&self, predicate: F) -> Vec<&TraceEntry>
    where
        F: Fn(&TraceEntry) -> bool,
    {
        self.entries.iter().filter(|e| predicate(e)).collect()
    }

    /// Returns entries of a specific kind, by `Category.Name` identifier.
    #[must_use]
    pub fn by_kind(&self, identifier: &str) -> Vec<&TraceEntry> {
        self.filter(|e| e.kind().identifier() == identifier)
    }

    /// Returns the oldest entry ID in the buffer.
    #[must_use]
    pub fn oldest_id(&self) -> Option<u64> {
        self.entries.front().map(|e| e.id)
    }

    /// Returns the newest entry ID in the buffer.
    #[must_use]
    pub fn newest_id(&self) -> Option<u64> {
        self.entries.back().map(|e| e.id)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Sets an entry's selection flag. Returns whether the flag changed.
    ///
    /// # Errors
    ///
    /// Returns an unknown-entry error if the entry is not buffered.
    pub fn select(&mut self, id: u64, selected: bool) -> Result<bool> {
        let entry = self.get_mut(id)?;
        let changed = entry.selected != selected;
        entry.selected = selected;
        Ok(changed)
    }

    /// Flips an entry's selection flag, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns an unknown-entry error if the entry is not buffered.
    pub fn toggle(&mut self, id: u64) -> Result<bool> {
        let entry = self.get_mut(id)?;
        entry.selected = !entry.selected;
        Ok(entry.selected)
    }

    /// Selects every entry. Returns the IDs whose flag changed.
    pub fn select_all(&mut self) -> Vec<u64> {
        self.set_all(true)
    }

    /// Deselects every entry. Returns the IDs whose flag changed.
    pub fn clear_selection(&mut self) -> Vec<u64> {
        self.set_all(false)
    }

    fn set_all(&mut self, selected: bool) -> Vec<u64> {
        self.entries
            .iter_mut()
            .filter(|e| e.selected != selected)
            .map(|e| {
                e.selected = selected;
                e.id
            })
            .collect()
    }

    /// Returns the selected entries, oldest first.
    #[must_use]
    pub fn selected(&self) -> Vec<&TraceEntry> {
        self.filter(TraceEntry::is_selected)
    }

    /// Resolves a selection to the entry or route stop it names.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is gone or the stop index is out of range.
    pub fn resolve(&self, selection: Selectable) -> Result<SelectedNode<'_>> {
        let id = selection.entry_id();
        let entry = self.get(id).ok_or_else(|| Error::unknown_entry(id))?;
        match selection {
            Selectable::Event(_) => Ok(SelectedNode::Event(entry)),
            Selectable::Stop { index, .. } => entry
                .route()
                .get(index)
                .map(SelectedNode::Stop)
                .ok_or_else(|| Error::unknown_route_stop(id, index)),
        }
    }

    /// Returns statistics about the buffer.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        let mut kind_counts = HashMap::new();
        for entry in &self.entries {
            *kind_counts
                .entry(entry.kind().identifier().to_string())
                .or_insert(0) += 1;
        }

        TraceBufferStats {
            entry_count: self.entries.len(),
            capacity: self.capacity,
            admitted: self.admitted,
            evicted: self.evicted,
            degraded: self.degraded,
            selected: self.entries.iter().filter(|e| e.selected).count(),
            oldest_id: self.oldest_id(),
            newest_id: self.newest_id(),
            kind_counts,
        }
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::default_size()
    }
}

// =============================================================================
// Buffer Statistics
// =============================================================================

/// Statistics about a trace buffer.
#[derive(Clone, Debug, Serialize)]
pub struct TraceBufferStats {
    /// Number of entries currently in the buffer.
    pub entry_count: usize,
    /// Buffer capacity.
    pub capacity: usize,
    /// Entries ever admitted.
    pub admitted: u64,
    /// Entries evicted to honour the capacity.
    pub evicted: u64,
    /// Entries admitted with a null handler.
    pub degraded: u64,
    /// Entries currently selected.
    pub selected: usize,
    /// Oldest entry ID in the buffer.
    pub oldest_id: Option<u64>,
    /// Newest entry ID in the buffer.
    pub newest_id: Option<u64>,
    /// Count of each event kind currently buffered.
    pub kind_counts: HashMap<String, usize>,
}

// =============================================================================
// Tests
// =============================================================================
