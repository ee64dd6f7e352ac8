//! The capture pipeline: filters occurrences and marshals them onto the
//! trace thread.
//!
//! Trackers call [`CapturePipeline::on_occurrence`] from whatever thread
//! raised the event. Work for the [`TraceLog`] travels through a single
//! unbounded channel to one [`TraceConsumer`]; when the caller already is
//! the trace thread the work runs in place instead, after any work still
//! queued ahead of it.
//!
//! ```text
//! tracker thread ──► filter ──► channel ──► TraceConsumer ──► TraceLog
//! trace thread   ──► filter ──► (drain channel) ──► TraceLog
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use crossbeam_channel::{Receiver, Sender};
use eventscope_capture::{CapturedOccurrence, OccurrenceSink};
use eventscope_foundation::{Error, Result};
use serde::Serialize;

use crate::hooks::DisplayMembership;
use crate::log::TraceLog;

static NEXT_PIPELINE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_pipeline_id() -> u64 {
    NEXT_PIPELINE.fetch_add(1, Ordering::Relaxed)
}

thread_local! {
    /// Consumers living on this thread, by pipeline ID.
    static RESIDENT: RefCell<HashMap<u64, Weak<ConsumerCore>>> = RefCell::new(HashMap::new());
}

fn resident(pipeline: u64) -> Option<Rc<ConsumerCore>> {
    RESIDENT
        .try_with(|cores| cores.borrow().get(&pipeline).and_then(Weak::upgrade))
        .ok()
        .flatten()
}

// =============================================================================
// Tasks
// =============================================================================

/// A unit of work for the trace thread.
pub(crate) enum TraceTask {
    Admit(CapturedOccurrence),
    Invoke(Box<dyn FnOnce(&mut TraceLog) + Send>),
    Shutdown,
}

impl TraceTask {
    fn describe(&self) -> &'static str {
        match self {
            Self::Admit(_) => "admission",
            Self::Invoke(_) => "task",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Counters the consuming side updates.
#[derive(Debug, Default)]
pub(crate) struct ConsumerCounters {
    lost: AtomicU64,
    failed: AtomicU64,
}

/// Turns a panic payload into a message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// =============================================================================
// Capture Pipeline
// =============================================================================

struct Shared {
    id: u64,
    trace_thread: ThreadId,
    sender: Sender<TraceTask>,
    membership: Arc<dyn DisplayMembership>,
    sequence: AtomicU64,
    discarded: AtomicU64,
    inline: AtomicU64,
    posted: AtomicU64,
    counters: Arc<ConsumerCounters>,
}

/// Counters describing what the pipeline did with its input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Sequence numbers handed out to trackers.
    pub captured: u64,
    /// Occurrences dropped because they came from the tool's own display.
    pub discarded: u64,
    /// Tasks run in place on the trace thread.
    pub inline: u64,
    /// Tasks queued for the trace thread.
    pub posted: u64,
    /// Tasks that could not be delivered because the trace thread was gone,
    /// or were still queued when the consumer went away.
    pub lost: u64,
    /// Tasks that panicked on the trace thread.
    pub failed: u64,
}

/// Cloneable handle to the single entry point trackers deliver into.
#[derive(Clone)]
pub struct CapturePipeline {
    shared: Arc<Shared>,
}

impl CapturePipeline {
    pub(crate) fn new(
        id: u64,
        trace_thread: ThreadId,
        sender: Sender<TraceTask>,
        membership: Arc<dyn DisplayMembership>,
        counters: Arc<ConsumerCounters>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                id,
                trace_thread,
                sender,
                membership,
                sequence: AtomicU64::new(0),
                discarded: AtomicU64::new(0),
                inline: AtomicU64::new(0),
                posted: AtomicU64::new(0),
                counters,
            }),
        }
    }

    /// Returns the designated trace thread.
    #[must_use]
    pub fn trace_thread(&self) -> ThreadId {
        self.shared.trace_thread
    }

    /// Returns true if the calling thread is the trace thread.
    #[must_use]
    pub fn is_trace_thread(&self) -> bool {
        thread::current().id() == self.shared.trace_thread
    }

    /// Returns this pipeline as a tracker sink.
    #[must_use]
    pub fn sink(&self) -> Arc<dyn OccurrenceSink> {
        Arc::new(self.clone())
    }

    /// Runs `f` against the trace log on the trace thread.
    ///
    /// Runs in place when called on the trace thread and the log is not
    /// already in use; otherwise queues it.
    ///
    /// # Errors
    ///
    /// Returns a trace-thread-gone error if the consumer no longer exists.
    pub fn invoke<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut TraceLog) + Send + 'static,
    {
        self.submit(TraceTask::Invoke(Box::new(f)))
    }

    /// Runs `f` on the trace thread and returns a receiver for its result.
    ///
    /// The caller decides whether to wait. Waiting on the trace thread
    /// itself for a queued query never completes, so callers there should
    /// use `try_recv`.
    ///
    /// # Errors
    ///
    /// Returns a trace-thread-gone error if the consumer no longer exists.
    pub fn query<F, R>(&self, f: F) -> Result<Receiver<R>>
    where
        F: FnOnce(&mut TraceLog) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.invoke(move |log| {
            let _ = tx.send(f(log));
        })?;
        Ok(rx)
    }

    /// Asks the consumer to stop after the work queued so far.
    pub(crate) fn request_shutdown(&self) -> bool {
        self.shared.sender.send(TraceTask::Shutdown).is_ok()
    }

    /// Returns the pipeline counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        let s = &self.shared;
        PipelineStats {
            captured: s.sequence.load(Ordering::Relaxed),
            discarded: s.discarded.load(Ordering::Relaxed),
            inline: s.inline.load(Ordering::Relaxed),
            posted: s.posted.load(Ordering::Relaxed),
            lost: s.counters.lost.load(Ordering::Relaxed),
            failed: s.counters.failed.load(Ordering::Relaxed),
        }
    }

    fn is_self_originated(&self, occurrence: &CapturedOccurrence) -> bool {
        occurrence
            .handler
            .as_deref()
            .is_some_and(|handler| self.shared.membership.belongs_to_tool_display(handler))
    }

    fn submit(&self, task: TraceTask) -> Result<()> {
        let Some(task) = self.try_inline(task) else {
            self.shared.inline.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(pipeline = self.shared.id, "ran inline");
            return Ok(());
        };

        if self.shared.sender.send(task).is_err() {
            self.shared.counters.lost.fetch_add(1, Ordering::Relaxed);
            return Err(Error::trace_thread_gone());
        }
        self.shared.posted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(pipeline = self.shared.id, "posted");
        Ok(())
    }

    /// Runs the task in place if possible; hands it back otherwise.
    fn try_inline(&self, task: TraceTask) -> Option<TraceTask> {
        if !self.is_trace_thread() {
            return Some(task);
        }
        let Some(core) = resident(self.shared.id) else {
            return Some(task);
        };
        let Ok(mut log) = core.log.try_borrow_mut() else {
            // Re-entered from a task that is already using the log
            return Some(task);
        };
        core.drain(&mut log);
        core.apply(&mut log, task);
        None
    }
}

impl OccurrenceSink for CapturePipeline {
    fn next_sequence(&self) -> u64 {
        self.shared.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn on_occurrence(&self, occurrence: CapturedOccurrence) {
        if self.is_self_originated(&occurrence) {
            self.shared.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let sequence = occurrence.sequence;
        if let Err(err) = self.submit(TraceTask::Admit(occurrence)) {
            tracing::warn!(sequence, "occurrence dropped: {err}");
        }
    }
}

impl fmt::Debug for CapturePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturePipeline")
            .field("id", &self.shared.id)
            .field("trace_thread", &self.shared.trace_thread)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Trace Consumer
// =============================================================================

struct ConsumerCore {
    pipeline: u64,
    log: RefCell<TraceLog>,
    receiver: Receiver<TraceTask>,
    counters: Arc<ConsumerCounters>,
    stopped: Cell<bool>,
}

impl ConsumerCore {
    /// Applies one task. A panic inside it is counted and logged; the
    /// consumer keeps going.
    fn apply(&self, log: &mut TraceLog, task: TraceTask) {
        let what = task.describe();
        let result = panic::catch_unwind(AssertUnwindSafe(|| match task {
            TraceTask::Admit(occurrence) => {
                log.admit(occurrence);
            }
            TraceTask::Invoke(f) => f(log),
            TraceTask::Shutdown => self.stopped.set(true),
        }));
        if let Err(payload) = result {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                pipeline = self.pipeline,
                "{what} panicked on the trace thread: {}",
                panic_message(payload.as_ref())
            );
        }
    }

    /// Applies queued tasks until the queue is empty.
    ///
    /// Work queued behind a shutdown request is still applied.
    fn drain(&self, log: &mut TraceLog) -> usize {
        let mut handled = 0;
        while let Ok(task) = self.receiver.try_recv() {
            self.apply(log, task);
            handled += 1;
        }
        handled
    }
}

impl Drop for ConsumerCore {
    fn drop(&mut self) {
        let mut lost = 0u64;
        while let Ok(task) = self.receiver.try_recv() {
            match task {
                TraceTask::Admit(occurrence) => {
                    tracing::warn!(
                        pipeline = self.pipeline,
                        sequence = occurrence.sequence,
                        "consumer gone, occurrence dropped"
                    );
                }
                TraceTask::Invoke(_) => {}
                TraceTask::Shutdown => continue,
            }
            lost += 1;
        }
        if lost > 0 {
            self.counters.lost.fetch_add(lost, Ordering::Relaxed);
        }
    }
}

/// The single consumer of a pipeline's work, resident on the trace thread.
///
/// A consumer cannot leave the thread it was created on. Either hand it to
/// a dedicated thread via [`TraceThread`](crate::TraceThread), or bind it
/// to a host-driven thread (a UI loop) and call [`pump`](Self::pump)
/// periodically.
pub struct TraceConsumer {
    core: Rc<ConsumerCore>,
}

impl TraceConsumer {
    /// Makes the calling thread the trace thread for a new pipeline.
    #[must_use]
    pub fn bind_current(
        log: TraceLog,
        membership: Arc<dyn DisplayMembership>,
    ) -> (CapturePipeline, TraceConsumer) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let id = next_pipeline_id();
        let counters = Arc::new(ConsumerCounters::default());
        let pipeline = CapturePipeline::new(
            id,
            thread::current().id(),
            sender,
            membership,
            Arc::clone(&counters),
        );
        (pipeline, Self::install(id, log, receiver, counters))
    }

    pub(crate) fn install(
        pipeline: u64,
        log: TraceLog,
        receiver: Receiver<TraceTask>,
        counters: Arc<ConsumerCounters>,
    ) -> Self {
        let core = Rc::new(ConsumerCore {
            pipeline,
            log: RefCell::new(log),
            receiver,
            counters,
            stopped: Cell::new(false),
        });
        let _ = RESIDENT.try_with(|cores| {
            cores.borrow_mut().insert(pipeline, Rc::downgrade(&core));
        });
        Self { core }
    }

    /// Applies every task queued so far without blocking, including work
    /// queued after a shutdown request.
    ///
    /// Returns the number of tasks applied.
    pub fn pump(&self) -> usize {
        match self.core.log.try_borrow_mut() {
            Ok(mut log) => self.core.drain(&mut log),
            Err(_) => 0,
        }
    }

    /// Blocks applying tasks until shutdown is requested or every
    /// pipeline handle is dropped, then applies whatever is still queued.
    pub fn run(&self) {
        while !self.core.stopped.get() {
            let Ok(task) = self.core.receiver.recv() else {
                break;
            };
            let mut log = self.core.log.borrow_mut();
            self.core.apply(&mut log, task);
        }
        self.core.drain(&mut self.core.log.borrow_mut());
    }

    /// Returns true once a shutdown request has been applied.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.core.stopped.get()
    }

    /// Runs `f` with the trace log.
    pub fn with_log<R>(&self, f: impl FnOnce(&mut TraceLog) -> R) -> R {
        f(&mut self.core.log.borrow_mut())
    }

    /// Consumes the consumer, returning its log.
    #[must_use]
    pub fn into_log(self) -> TraceLog {
        self.core.log.take()
    }
}

impl Drop for TraceConsumer {
    fn drop(&mut self) {
        let pipeline = self.core.pipeline;
        let _ = RESIDENT.try_with(|cores| {
            cores.borrow_mut().remove(&pipeline);
        });
    }
}

impl fmt::Debug for TraceConsumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceConsumer")
            .field("pipeline", &self.core.pipeline)
            .field("pending", &self.core.receiver.len())
            .field("stopped", &self.core.stopped.get())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
