//! Eventscope - Live event tracing for UI-like object trees
//!
//! This crate re-exports all layers of the eventscope system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: eventscope_trace      - Capture pipeline, trace thread, bounded buffer, export
//! Layer 1: eventscope_capture    - Event catalog, target scope, per-kind trackers
//! Layer 0: eventscope_foundation - Core types (Element, ObjectRef, EventArgs, Error)
//! ```

pub use eventscope_capture as capture;
pub use eventscope_foundation as foundation;
pub use eventscope_trace as trace;
