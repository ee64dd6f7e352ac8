//! A complete tracing session: trackers, pipeline, and trace thread.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use eventscope_capture::{CatalogBuilder, EventCatalog, TargetScope, TrackerRegistry};
use eventscope_foundation::Result;

use crate::buffer::Capacity;
use crate::config::TraceConfig;
use crate::hooks::{DisplayMembership, NoDisplay, Presenter};
use crate::log::TraceLog;
use crate::pipeline::{CapturePipeline, PipelineStats};
use crate::thread::TraceThread;

/// The collaborators a session calls out to.
#[derive(Clone)]
pub struct TraceHooks {
    /// Decides which occurrences come from the tool itself.
    pub membership: Arc<dyn DisplayMembership>,
    /// Receives advisory notifications, if any.
    pub presenter: Option<Arc<dyn Presenter>>,
}

impl Default for TraceHooks {
    fn default() -> Self {
        Self {
            membership: Arc::new(NoDisplay),
            presenter: None,
        }
    }
}

impl TraceHooks {
    /// Creates hooks with no display and no presenter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the display membership query.
    #[must_use]
    pub fn with_membership(mut self, membership: impl DisplayMembership + 'static) -> Self {
        self.membership = Arc::new(membership);
        self
    }

    /// Builder method to attach a presenter.
    #[must_use]
    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }
}

/// A running tracing session.
///
/// Trackers are declared before the trace thread, so dropping a session
/// detaches every tracker before the thread is asked to stop.
#[derive(Debug)]
pub struct TraceSession {
    trackers: TrackerRegistry,
    thread: TraceThread,
    catalog: EventCatalog,
    scope: Arc<TargetScope>,
}

impl TraceSession {
    /// Builds the catalog, spawns the trace thread, and enables the
    /// configured default trackers.
    ///
    /// # Errors
    ///
    /// Returns a spawn error if the trace thread cannot be created.
    pub fn start(
        config: &TraceConfig,
        catalog: CatalogBuilder,
        scope: Arc<TargetScope>,
        hooks: TraceHooks,
    ) -> Result<Self> {
        let catalog = catalog.build(&config.default_enabled);

        let mut log = TraceLog::new(config.capacity);
        if let Some(presenter) = hooks.presenter {
            log.set_presenter(presenter);
        }
        let thread = TraceThread::spawn(config.thread_name.as_str(), log, hooks.membership)?;

        let trackers = TrackerRegistry::new(&catalog, &scope, &thread.pipeline().sink());
        tracing::debug!(
            kinds = catalog.len(),
            enabled = trackers.enabled_kinds().len(),
            capacity = config.capacity,
            "trace session started"
        );

        Ok(Self {
            trackers,
            thread,
            catalog,
            scope,
        })
    }

    /// Starts a session over the standard desktop UI catalog.
    ///
    /// # Errors
    ///
    /// Returns a spawn error if the trace thread cannot be created.
    pub fn standard(
        config: &TraceConfig,
        scope: Arc<TargetScope>,
        hooks: TraceHooks,
    ) -> Result<Self> {
        Self::start(config, CatalogBuilder::standard(), scope, hooks)
    }

    /// Returns the event catalog.
    #[must_use]
    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Returns the observed scope.
    #[must_use]
    pub fn scope(&self) -> &Arc<TargetScope> {
        &self.scope
    }

    /// Returns the trackers.
    #[must_use]
    pub fn trackers(&self) -> &TrackerRegistry {
        &self.trackers
    }

    /// Returns the trackers for toggling.
    pub fn trackers_mut(&mut self) -> &mut TrackerRegistry {
        &mut self.trackers
    }

    /// Enables or disables the tracker for a kind identifier.
    ///
    /// # Errors
    ///
    /// Returns an unknown-kind error if the catalog has no such kind.
    pub fn set_enabled(&mut self, identifier: &str, enabled: bool) -> Result<()> {
        self.trackers.set_enabled(identifier, enabled)
    }

    /// Returns the capture pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &CapturePipeline {
        self.thread.pipeline()
    }

    /// Returns the pipeline counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.pipeline().stats()
    }

    /// Changes the buffer capacity on the trace thread.
    ///
    /// # Errors
    ///
    /// Returns a trace-thread-gone error if the thread has exited.
    pub fn set_capacity(&self, capacity: impl Into<Capacity>) -> Result<()> {
        let capacity = capacity.into();
        self.thread.invoke(move |log| log.set_capacity(capacity))
    }

    /// Empties the buffer on the trace thread.
    ///
    /// # Errors
    ///
    /// Returns a trace-thread-gone error if the thread has exited.
    pub fn clear(&self) -> Result<()> {
        self.thread.invoke(TraceLog::clear)
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
        self.thread.invoke(f)
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
        self.thread.query(f)
    }

    /// Detaches every tracker, then stops the trace thread and returns
    /// the final log.
    ///
    /// # Errors
    ///
    /// Returns a trace-thread-gone error if the thread panicked.
    pub fn shutdown(self) -> Result<TraceLog> {
        let Self {
            mut trackers,
            thread,
            ..
        } = self;
        trackers.teardown();
        tracing::debug!("trace session stopping");
        thread.shutdown()
    }
}
