//! Cancellation sources for request attempts.
//!
//! Two independent sources can cancel an attempt:
//!
//! - a [`CancellationHandle`] owned by the caller and shared by every attempt
//!   of one logical call
//! - a fixed timeout, started fresh for every attempt
//!
//! [`ComposedCancellation`] merges both into a single signal that resolves
//! with the reason of whichever source fires first.

use std::fmt;
use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Sleep;

/// Reason used by [`CancellationHandle::cancel`].
pub const DEFAULT_ABORT_REASON: &str = "aborted";

/// Why an attempt was cancelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// The per-attempt timeout elapsed.
    Timeout,
    /// The caller cancelled through a [`CancellationHandle`].
    External(String),
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::External(reason) => f.write_str(reason),
        }
    }
}

/// A caller-owned, clonable cancellation signal.
///
/// Clones share state: cancelling any clone cancels them all. Only the first
/// cancellation is recorded; later calls keep the original reason.
///
/// # Example
///
/// ```rust
/// use taskmaster_sdk::clients::CancellationHandle;
///
/// let handle = CancellationHandle::new();
/// let shared = handle.clone();
/// assert!(!shared.is_cancelled());
///
/// handle.cancel_with_reason("user closed the window");
/// assert!(shared.is_cancelled());
/// assert_eq!(shared.reason().as_deref(), Some("user closed the window"));
/// ```
#[derive(Clone, Debug)]
pub struct CancellationHandle {
    state: Arc<watch::Sender<Option<String>>>,
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationHandle {
    /// Creates a handle that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state: Arc::new(state),
        }
    }

    /// Cancels with [`DEFAULT_ABORT_REASON`].
    pub fn cancel(&self) {
        self.cancel_with_reason(DEFAULT_ABORT_REASON);
    }

    /// Cancels with a custom reason. No-op if already cancelled.
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.state.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
    }

    /// Returns `true` once any clone has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Returns the recorded cancellation reason, if cancelled.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.state.borrow().clone()
    }

    /// Waits until the handle is cancelled and returns the reason.
    pub async fn cancelled(&self) -> String {
        let mut receiver = self.state.subscribe();
        loop {
            let current = receiver.borrow_and_update().clone();
            if let Some(reason) = current {
                return reason;
            }
            // The sender lives in `self`, so `changed` cannot observe a closed channel here.
            if receiver.changed().await.is_err() {
                pending::<()>().await;
            }
        }
    }
}

/// A timeout and an optional [`CancellationHandle`] merged into one signal.
///
/// Build one per attempt. The timer starts at construction and is released
/// when the composer is dropped, so it can never fire after the attempt it
/// guards has settled.
#[derive(Debug)]
pub struct ComposedCancellation<'a> {
    timer: Option<Pin<Box<Sleep>>>,
    external: Option<&'a CancellationHandle>,
}

impl<'a> ComposedCancellation<'a> {
    /// Starts the timeout (if any) and subscribes to `external` (if any).
    #[must_use]
    pub fn new(timeout: Option<Duration>, external: Option<&'a CancellationHandle>) -> Self {
        Self {
            timer: timeout.map(|duration| Box::pin(tokio::time::sleep(duration))),
            external,
        }
    }

    /// Returns the external reason if the handle was cancelled before the attempt began.
    #[must_use]
    pub fn pre_cancelled(&self) -> Option<CancelReason> {
        self.external
            .and_then(CancellationHandle::reason)
            .map(CancelReason::External)
    }

    /// Resolves when the first source fires. Never resolves without sources.
    ///
    /// When both sources are ready at the same poll, the external reason wins.
    pub async fn fired(&mut self) -> CancelReason {
        let Self { timer, external } = self;

        let timed_out = async {
            match timer.as_mut() {
                Some(sleep) => sleep.as_mut().await,
                None => pending::<()>().await,
            }
        };
        let cancelled = async {
            match external {
                Some(handle) => handle.cancelled().await,
                None => pending::<String>().await,
            }
        };

        tokio::select! {
            biased;
            reason = cancelled => CancelReason::External(reason),
            () = timed_out => CancelReason::Timeout,
        }
    }
}
