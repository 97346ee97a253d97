//! Per-call cancellation and deadlines
//!
//! Every repository operation runs inside [`CallContext::run`]. When the
//! caller cancels or the deadline passes first, the operation future is
//! dropped. Dropping releases any pooled connection it holds, so a cancelled
//! call never leaks a pool slot.
//!
//! ```rust
//! use domain_notes::CallContext;
//! use std::time::Duration;
//!
//! # async fn demo() {
//! let (ctx, handle) = CallContext::cancellable();
//! let ctx = ctx.with_timeout(Duration::from_secs(2));
//! handle.cancel();
//! assert!(ctx.is_cancelled());
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{CancelReason, NotesError, NotesResult};

/// Caller-owned handle that cancels every context cloned from its pair
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation; idempotent
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Cancellation signal and optional deadline for one or more calls
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl CallContext {
    /// A context that never cancels and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// A context plus the handle that cancels it
    pub fn cancellable() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancel: Some(receiver),
        };
        (ctx, CancelHandle { sender })
    }

    /// Adds a deadline `timeout` from now, keeping an earlier existing one
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Adds an absolute deadline, keeping an earlier existing one
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True when the handle fired or the deadline has passed
    pub fn is_cancelled(&self) -> bool {
        self.cancel_reason().is_some()
    }

    fn cancel_reason(&self) -> Option<CancelReason> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(CancelReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(CancelReason::DeadlineExceeded);
        }
        None
    }

    /// Runs `operation` unless the context ends first
    ///
    /// A context that is already cancelled fails immediately without polling
    /// the operation.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::Cancelled` tagged with `name` when the context
    /// ends first, otherwise whatever the operation returns.
    pub async fn run<T, F>(&self, name: &'static str, operation: F) -> NotesResult<T>
    where
        F: Future<Output = NotesResult<T>>,
    {
        if let Some(reason) = self.cancel_reason() {
            return Err(NotesError::cancelled(name, reason));
        }

        let cancelled = wait_cancelled(self.cancel.clone());
        let expired = wait_deadline(self.deadline);

        tokio::select! {
            biased;
            result = operation => result,
            _ = cancelled => Err(NotesError::cancelled(name, CancelReason::Cancelled)),
            _ = expired => Err(NotesError::cancelled(name, CancelReason::DeadlineExceeded)),
        }
    }
}

async fn wait_cancelled(receiver: Option<watch::Receiver<bool>>) {
    let Some(mut receiver) = receiver else {
        return std::future::pending().await;
    };

    // A dropped handle can never fire, so the call just runs to completion.
    if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_operation() {
        let ctx = CallContext::background();
        let value = ctx.run("op", async { Ok::<_, NotesError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_precancelled_skips_operation() {
        let (ctx, handle) = CallContext::cancellable();
        handle.cancel();

        let mut polled = false;
        let result = ctx
            .run("op", async {
                polled = true;
                Ok::<_, NotesError>(())
            })
            .await;

        assert!(matches!(
            result,
            Err(NotesError::Cancelled { reason: CancelReason::Cancelled, .. })
        ));
        assert!(!polled);
    }

    #[tokio::test]
    async fn test_deadline_interrupts_slow_operation() {
        let ctx = CallContext::background().with_timeout(Duration::from_millis(20));
        let result = ctx
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, NotesError>(())
            })
            .await;

        match result {
            Err(NotesError::Cancelled { operation, reason }) => {
                assert_eq!(operation, "slow");
                assert_eq!(reason, CancelReason::DeadlineExceeded);
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_interrupts_in_flight_operation() {
        let (ctx, handle) = CallContext::cancellable();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let result = ctx
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, NotesError>(())
            })
            .await;

        canceller.await.unwrap();
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_handle_never_cancels() {
        let (ctx, handle) = CallContext::cancellable();
        drop(handle);
        let value = ctx
            .run("op", async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, NotesError>("done")
            })
            .await
            .unwrap();
        assert_eq!(value, "done");
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = CallContext::background()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
