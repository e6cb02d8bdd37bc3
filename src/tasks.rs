// Registry of outstanding network calls. Each call runs as a spawned task keyed by
// a request token so owners can abort it on teardown instead of ignoring the result.

use crate::error::ApiError;
use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    #[error("Request was cancelled")]
    Cancelled,

    #[error("Request task panicked")]
    Panicked,
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Cancelled => ApiError::Cancelled,
            TaskError::Panicked => ApiError::NetworkError(err.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct TaskRegistry {
    next_token: AtomicU64,
    in_flight: Arc<DashMap<RequestToken, AbortHandle>>,
}

// Removes the registry entry when the awaiting caller finishes or is dropped.
// Dropping the caller early also aborts the task.
struct InFlightGuard<'a> {
    registry: &'a TaskRegistry,
    token: RequestToken,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.registry.in_flight.remove(&self.token) {
            handle.abort();
        }
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_token(&self) -> RequestToken {
        RequestToken(self.next_token.fetch_add(1, Ordering::SeqCst) + 1)
    }

    // Spawns `future` and waits for it. Must be called within a tokio runtime.
    pub async fn run<F, T>(&self, future: F) -> Result<T, TaskError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let token = self.issue_token();
        let handle = tokio::spawn(future);
        self.in_flight.insert(token, handle.abort_handle());
        let _guard = InFlightGuard {
            registry: self,
            token,
        };
        tracing::trace!(?token, "request task started");

        match handle.await {
            Ok(value) => Ok(value),
            Err(err) if err.is_cancelled() => {
                tracing::debug!(?token, "request task cancelled");
                Err(TaskError::Cancelled)
            }
            Err(_) => Err(TaskError::Panicked),
        }
    }

    // Spawns `future` in the background. It stays registered, and cancellable, until
    // it finishes. Must be called within a tokio runtime.
    pub fn spawn<F>(&self, future: F) -> RequestToken
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.issue_token();
        let in_flight = Arc::clone(&self.in_flight);
        let (registered_tx, registered_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            // Wait for the entry so the removal below cannot run ahead of the insert
            let _ = registered_rx.await;
            future.await;
            in_flight.remove(&token);
        });
        self.in_flight.insert(token, handle.abort_handle());
        let _ = registered_tx.send(());
        tracing::trace!(?token, "background task started");
        token
    }

    pub fn cancel(&self, token: RequestToken) -> bool {
        match self.in_flight.remove(&token) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    // Aborts everything outstanding; returns how many tasks were aborted
    pub fn cancel_all(&self) -> usize {
        let tokens: Vec<RequestToken> = self.in_flight.iter().map(|entry| *entry.key()).collect();
        tokens
            .into_iter()
            .filter(|token| self.cancel(*token))
            .count()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
