//! A dedicated trace thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use eventscope_foundation::{Error, Result};

use crate::hooks::DisplayMembership;
use crate::log::TraceLog;
use crate::pipeline::{CapturePipeline, ConsumerCounters, TraceConsumer, next_pipeline_id};

/// A named thread running a [`TraceConsumer`] until shut down.
///
/// Dropping the handle asks the thread to stop but does not wait for it;
/// use [`shutdown`](Self::shutdown) to join and get the final log back.
#[derive(Debug)]
pub struct TraceThread {
    name: String,
    pipeline: CapturePipeline,
    handle: Option<JoinHandle<TraceLog>>,
}

impl TraceThread {
    /// Spawns a trace thread owning `log`.
    ///
    /// # Errors
    ///
    /// Returns a spawn error if the OS refuses to create the thread.
    pub fn spawn(
        name: impl Into<String>,
        log: TraceLog,
        membership: Arc<dyn DisplayMembership>,
    ) -> Result<Self> {
        let name = name.into();
        let (sender, receiver) = crossbeam_channel::unbounded();
        let id = next_pipeline_id();
        let counters = Arc::new(ConsumerCounters::default());
        let consumer_counters = Arc::clone(&counters);

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let consumer = TraceConsumer::install(id, log, receiver, consumer_counters);
                tracing::debug!(pipeline = id, "trace thread started");
                consumer.run();
                tracing::debug!(pipeline = id, "trace thread stopped");
                consumer.into_log()
            })?;

        let pipeline =
            CapturePipeline::new(id, handle.thread().id(), sender, membership, counters);
        Ok(Self {
            name,
            pipeline,
            handle: Some(handle),
        })
    }

    /// Returns the thread's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a handle to the thread's pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &CapturePipeline {
        &self.pipeline
    }

    /// Posts a closure to run against the log.
    ///
    /// # Errors
    ///
    /// Returns a trace-thread-gone error if the thread has exited.
    pub fn invoke<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut TraceLog) + Send + 'static,
    {
        self.pipeline.invoke(f)
    }

    /// Posts a closure and returns a receiver for its result.
    ///
    /// # Errors
    ///
    /// Returns a trace-thread-gone error if the thread has exited.
    pub fn query<F, R>(&self, f: F) -> Result<Receiver<R>>
    where
        F: FnOnce(&mut TraceLog) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.pipeline.query(f)
    }

    /// Stops the thread after the work queued so far and returns its log.
    ///
    /// Work that arrives while the thread is winding down is still applied.
    ///
    /// # Errors
    ///
    /// Returns a trace-thread-gone error if the thread panicked.
    pub fn shutdown(mut self) -> Result<TraceLog> {
        self.pipeline.request_shutdown();
        let handle = self.handle.take().ok_or_else(Error::trace_thread_gone)?;
        handle.join().map_err(|_| Error::trace_thread_gone())
    }
}

impl Drop for TraceThread {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.pipeline.request_shutdown();
            // Not joined here, to avoid blocking
        }
    }
}
