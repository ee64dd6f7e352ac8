//! Error types for eventscope.
//!
//! Uses `thiserror` for ergonomic error definition. Nothing here is fatal to
//! the host process: the worst outcome of any failure is a gap or placeholder
//! in a single trace entry.

use std::fmt;

use thiserror::Error;

/// Result type alias using the eventscope [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for eventscope operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an unknown trace entry error.
    #[must_use]
    pub fn unknown_entry(id: u64) -> Self {
        Self::new(ErrorKind::UnknownEntry(id))
    }

    /// Creates an unknown event kind error.
    #[must_use]
    pub fn unknown_kind(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownKind(name.into()))
    }

    /// Creates an unknown route stop error.
    #[must_use]
    pub fn unknown_route_stop(entry: u64, stop: usize) -> Self {
        Self::new(ErrorKind::UnknownRouteStop { entry, stop })
    }

    /// Creates an error for a trace thread that is no longer running.
    #[must_use]
    pub fn trace_thread_gone() -> Self {
        Self::new(ErrorKind::TraceThreadGone)
    }

    /// Returns true if this error means the trace thread has exited.
    #[must_use]
    pub fn is_trace_thread_gone(&self) -> bool {
        matches!(self.kind, ErrorKind::TraceThreadGone)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        Self::new(ErrorKind::Render(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Spawn(err))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// No trace entry with this ID is currently buffered.
    #[error("unknown trace entry: #{0}")]
    UnknownEntry(u64),

    /// No event kind is registered under this identifier.
    #[error("unknown event kind: {0}")]
    UnknownKind(String),

    /// The entry exists but has no route stop at this index.
    #[error("unknown route stop {stop} on trace entry #{entry}")]
    UnknownRouteStop {
        /// The entry that was queried.
        entry: u64,
        /// The requested stop index.
        stop: usize,
    },

    /// The trace thread has exited and can no longer accept work.
    #[error("trace thread is no longer running")]
    TraceThreadGone,

    /// The trace thread could not be spawned.
    #[error("failed to spawn trace thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// A pretty-printer failure.
    #[error(transparent)]
    Render(RenderError),
}

/// A pretty-printer failure for a single object.
///
/// Failures are per call; callers turn them into inline markers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub struct RenderError {
    /// Type name of the object that failed to render.
    pub type_name: String,
    /// Printer-supplied description of the failure.
    pub message: String,
}

impl RenderError {
    /// Creates a new render error.
    #[must_use]
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot render {}: {}", self.type_name, self.message)
    }
}
