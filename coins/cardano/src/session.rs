use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

/// Runs lookups one at a time for a single caller.
///
/// Starting a lookup aborts the previous one, and a result is only handed
/// back if no newer lookup started (and no cancel happened) while it ran.
#[derive(Debug, Default)]
pub struct LookupSession {
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl LookupSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lookups started or cancelled so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Spawns `lookup`, superseding any lookup in flight.
    ///
    /// Returns `None` when this lookup was itself superseded or cancelled.
    pub async fn run<F, T>(&self, lookup: F) -> Option<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (ticket, handle) = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(previous) = in_flight.take() {
                previous.abort();
            }
            let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let handle = tokio::spawn(lookup);
            *in_flight = Some(handle.abort_handle());
            (ticket, handle)
        };

        match handle.await {
            Ok(value) if self.generation() == ticket => Some(value),
            Ok(_) => {
                debug!(ticket, current = self.generation(), "discarding superseded lookup result");
                None
            }
            Err(err) if err.is_cancelled() => {
                debug!(ticket, "lookup aborted");
                None
            }
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }

    /// Aborts the lookup in flight, if any
    pub async fn cancel(&self) {
        let mut in_flight = self.in_flight.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
    }
}
