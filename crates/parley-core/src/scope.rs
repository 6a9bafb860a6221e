// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-supplied deadline and cancellation for I/O-bound operations.
//!
//! A [`CallScope`] is passed by reference into every store and memory
//! operation. Futures run through [`CallScope::run`] are raced against the
//! scope's cancellation token and deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ParleyError;

/// Deadline and cancellation signal for a single caller request.
#[derive(Debug, Clone, Default)]
pub struct CallScope {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    started: Option<Instant>,
}

impl CallScope {
    /// A scope with no deadline that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// A scope that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(now + timeout),
            started: Some(now),
        }
    }

    /// Attach an external cancellation token (for example a shutdown signal).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Tighten the deadline. A later deadline than the current one is ignored.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self.started.get_or_insert_with(Instant::now);
        self
    }

    /// Derive a scope bounded by both this scope and `timeout` from now.
    ///
    /// Cancelling the parent cancels the child; cancelling the child does not
    /// reach the parent.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let now = Instant::now();
        let deadline = match self.deadline {
            Some(existing) => existing.min(now + timeout),
            None => now + timeout,
        };
        Self {
            cancel: self.cancel.child_token(),
            deadline: Some(deadline),
            started: Some(now),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast when the scope is already cancelled or expired.
    pub fn check(&self) -> Result<(), ParleyError> {
        if self.cancel.is_cancelled() {
            return Err(ParleyError::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(self.expired());
        }
        Ok(())
    }

    /// Run `fut` to completion unless the scope is cancelled or expires first.
    ///
    /// When interrupted, `fut` is dropped. Work already handed to a storage
    /// thread may still complete; the caller only learns that it did not wait.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ParleyError>
    where
        F: Future<Output = Result<T, ParleyError>>,
    {
        self.check()?;

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(ParleyError::Cancelled),
                    _ = tokio::time::sleep_until(deadline) => Err(self.expired()),
                    result = fut => result,
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(ParleyError::Cancelled),
                    result = fut => result,
                }
            }
        }
    }

    fn expired(&self) -> ParleyError {
        let after = match (self.started, self.deadline) {
            (Some(started), Some(deadline)) => deadline.saturating_duration_since(started),
            _ => Duration::ZERO,
        };
        ParleyError::DeadlineExceeded { after }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_scope_runs_to_completion() {
        let scope = CallScope::background();
        let value = scope.run(async { Ok::<_, ParleyError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn cancelled_scope_never_polls_the_future() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let scope = CallScope::background();
        scope.cancel();
        let polled = Arc::new(AtomicBool::new(false));
        let flag = polled.clone();
        let result = scope
            .run(async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<_, ParleyError>(())
            })
            .await;
        assert!(matches!(result, Err(ParleyError::Cancelled)));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_slow_future() {
        let scope = CallScope::with_timeout(Duration::from_millis(50));
        let result = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ParleyError>(())
            })
            .await;
        assert!(matches!(
            result,
            Err(ParleyError::DeadlineExceeded { after }) if after == Duration::from_millis(50)
        ));
    }

    #[tokio::test]
    async fn external_token_cancels_in_flight_work() {
        let token = CancellationToken::new();
        let scope = CallScope::background().with_cancellation(token.clone());
        let handle = tokio::spawn({
            let scope = scope.clone();
            async move {
                scope
                    .run(async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok::<_, ParleyError>(())
                    })
                    .await
            }
        });
        token.cancel();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ParleyError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn child_scope_is_bounded_by_parent_deadline() {
        let parent = CallScope::with_timeout(Duration::from_millis(10));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test]
    async fn cancelling_child_leaves_parent_running() {
        let parent = CallScope::background();
        let child = parent.child_with_timeout(Duration::from_secs(60));
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
        assert!(parent.check().is_ok());
    }
}
