//! A model that answers late.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use coach_core::{async_trait, CoachError, GenerationRequest, GenerativeModel};
use tokio::time::sleep;

/// Holds every request for `latency` before passing it to the wrapped model.
///
/// Counts calls that started and calls that got past the wait, so a test can
/// tell whether an analysis was abandoned mid-flight or finished after its
/// capture was closed. Pair it with a paused tokio clock.
pub struct DelayedModel<M: GenerativeModel> {
    inner: M,
    latency: Duration,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl<M: GenerativeModel> DelayedModel<M> {
    pub fn new(inner: M, latency: Duration) -> Self {
        Self {
            inner,
            latency,
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn with_millis(inner: M, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Requests received so far.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Requests that waited out the latency and reached the wrapped model.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<M: GenerativeModel> GenerativeModel for DelayedModel<M> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoachError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        sleep(self.latency).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        self.inner.generate(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
