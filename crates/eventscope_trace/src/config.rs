//! Trace configuration.

use std::collections::BTreeSet;

use eventscope_capture::DEFAULT_ENABLED_KINDS;

use crate::buffer::Capacity;

/// Default name for the dedicated trace thread.
pub const DEFAULT_THREAD_NAME: &str = "eventscope-trace";

/// Configuration supplied when a trace session starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceConfig {
    /// Maximum entries to keep in the buffer.
    pub capacity: usize,
    /// Kind identifiers (`Category.Name`) whose trackers start enabled.
    pub default_enabled: BTreeSet<String>,
    /// Name of the dedicated trace thread.
    pub thread_name: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            capacity: Capacity::DEFAULT.get(),
            default_enabled: DEFAULT_ENABLED_KINDS.iter().map(ToString::to_string).collect(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl TraceConfig {
    /// Creates a configuration with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the buffer capacity. Negative values clamp to zero.
    #[must_use]
    pub fn with_capacity(mut self, capacity: impl Into<Capacity>) -> Self {
        self.capacity = capacity.into().get();
        self
    }

    /// Builder method to replace the default-enabled kinds.
    #[must_use]
    pub fn with_default_enabled<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_enabled = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to add one kind to the default-enabled set.
    #[must_use]
    pub fn enable_by_default(mut self, kind: impl Into<String>) -> Self {
        self.default_enabled.insert(kind.into());
        self
    }

    /// Builder method to name the trace thread.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}
