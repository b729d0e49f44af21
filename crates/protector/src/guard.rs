//! Deadline enforcement for decryption.
//!
//! [`TimeoutGuard::run`] moves CPU-bound work onto Tokio's blocking pool and
//! races it against a timer. Whatever the outcome, the timer is dropped and the
//! work's [`CancellationToken`] is cancelled before `run` returns, so an
//! abandoned worker stops at its next checkpoint instead of running on.

use std::time::Duration;

use common::ProtectError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Runs one unit of work under a wall-clock deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutGuard {
    timeout: Duration,
}

impl TimeoutGuard {
    /// A guard that allows `timeout` for each call to [`run`](Self::run).
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `work` on the blocking pool, failing with [`ProtectError::Timeout`]
    /// if it has not finished within the deadline.
    ///
    /// `work` receives a token that is cancelled once the caller stops waiting;
    /// long-running work should poll [`CancellationToken::is_cancelled`] between
    /// stages and return early.
    ///
    /// # Errors
    ///
    /// - [`ProtectError::Timeout`] if the deadline passes first.
    /// - [`ProtectError::DecryptionFailure`] if the worker panics or is aborted.
    /// - Any error returned by `work` itself.
    pub async fn run<T, F>(&self, work: F) -> Result<T, ProtectError>
    where
        F: FnOnce(CancellationToken) -> Result<T, ProtectError> + Send + 'static,
        T: Send + 'static,
    {
        let token = CancellationToken::new();
        // Cancels on every exit from this function, including the timeout path.
        let _cancel_on_exit = token.clone().drop_guard();

        let worker = tokio::task::spawn_blocking({
            let token = token.child_token();
            move || work(token)
        });

        match tokio::time::timeout(self.timeout, worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(error = %e, "decryption worker did not complete");
                Err(ProtectError::DecryptionFailure)
            }
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                debug!(timeout_ms, "deadline elapsed; abandoning worker");
                Err(ProtectError::Timeout { timeout_ms })
            }
        }
    }
}

/// Bail out of a cancelled worker.
///
/// The returned error is never observed by the waiting caller, who has
/// already received [`ProtectError::Timeout`].
pub fn checkpoint(token: &CancellationToken) -> Result<(), ProtectError> {
    if token.is_cancelled() {
        return Err(ProtectError::Timeout { timeout_ms: 0 });
    }
    Ok(())
}
