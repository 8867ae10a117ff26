//! Explicit filter run handles.
//!
//! The caller keeps a [`RunTracker`] and asks it for a [`FilterRun`] each time
//! it starts filtering. Beginning a run cancels the one before it, so at most
//! one run is current; a superseded run may keep draining its in-flight
//! fetches but its output must not be applied.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct FilterRun {
    id: u64,
    token: CancellationToken,
}

impl FilterRun {
    /// A run no tracker knows about; only cancelled by hand.
    pub fn detached() -> Self {
        Self { id: 0, token: CancellationToken::new() }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the run has been cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

#[derive(Debug, Default)]
pub struct RunTracker {
    issued: u64,
    current: Option<FilterRun>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, cancelling whichever run was current.
    pub fn begin(&mut self) -> FilterRun {
        if let Some(previous) = self.current.take() {
            tracing::debug!("Cancelling filter run {}", previous.id);
            previous.cancel();
        }
        self.issued += 1;
        let run = FilterRun { id: self.issued, token: CancellationToken::new() };
        self.current = Some(run.clone());
        run
    }

    /// True while `run` is the latest run and has not been cancelled.
    pub fn is_current(&self, run: &FilterRun) -> bool {
        !run.is_cancelled() && self.current.as_ref().is_some_and(|c| c.id == run.id)
    }

    /// Drop `run` once its result has been handled. No-op for stale runs.
    pub fn finish(&mut self, run: &FilterRun) {
        if self.current.as_ref().is_some_and(|c| c.id == run.id) {
            self.current = None;
        }
    }

    pub fn cancel_current(&mut self) {
        if let Some(run) = self.current.take() {
            run.cancel();
        }
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current.as_ref().map(FilterRun::id)
    }
}
