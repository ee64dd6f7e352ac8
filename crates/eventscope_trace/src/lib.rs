//! Capture pipeline, trace thread, and bounded trace buffer for eventscope.
//!
//! This crate provides:
//! - [`CapturePipeline`] - Self-exclusion filter and marshaling onto the trace thread
//! - [`TraceConsumer`] / [`TraceThread`] - The single consumer of captured work
//! - [`TraceLog`] / [`TraceBuffer`] - Bounded, oldest-first trace storage with selection
//! - [`TextExporter`] / [`JsonExporter`] - Export of selected entries
//! - [`TraceSession`] - Trackers, pipeline, and thread wired together
//!
//! # Threading
//!
//! Trackers deliver on any thread. All buffer mutation happens on one
//! thread, the trace thread; work from other threads is queued to it.
//!
//! ```text
//! (any thread)                         (trace thread)
//! EventTracker ──► CapturePipeline ──► TraceConsumer ──► TraceLog
//!                                                          └──► Presenter
//!                        │
//!                        └─ tool's own display? ──► discarded
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod buffer;
pub mod config;
pub mod entry;
pub mod format;
pub mod hooks;
pub mod log;
pub mod pipeline;
pub mod session;
pub mod thread;

pub use buffer::{Capacity, TraceBuffer, TraceBufferStats};
pub use config::{DEFAULT_THREAD_NAME, TraceConfig};
pub use entry::{InspectionSource, InspectionTarget, Selectable, SelectedNode, TraceEntry};
pub use format::{ExportFormatter, JsonExporter, TextExporter, UNAVAILABLE_MARKER};
pub use hooks::{
    DebugPrinter, DisplayMembership, NoDisplay, NullPresenter, Presenter, PrettyPrinter,
    SubtreeMembership,
};
pub use log::TraceLog;
pub use pipeline::{CapturePipeline, PipelineStats, TraceConsumer};
pub use session::{TraceHooks, TraceSession};
pub use thread::TraceThread;
