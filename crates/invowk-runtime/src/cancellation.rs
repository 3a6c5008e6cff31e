//! Cancellation tokens (§5): one per top-level invocation, checked
//! before each alternative resolution and each runtime invocation,
//! with an optional deadline and SIGINT wiring.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use invowk_core::{InvowkError, Result};

#[derive(Clone)]
pub struct CancellationToken {
    canceled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            canceled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            canceled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Registers a SIGINT handler that cancels this token. Installs a
    /// process-wide `ctrlc` handler, so this should only be called
    /// once per process (typically from the CLI's `main`).
    pub fn install_sigint_handler(&self) -> Result<()> {
        let canceled = self.canceled.clone();
        ctrlc::set_handler(move || {
            canceled.store(true, Ordering::SeqCst);
        })
        .map_err(|e| InvowkError::Other(anyhow::anyhow!("failed to install SIGINT handler: {e}")))
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    fn is_past_deadline(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    /// Returns an error if canceled or past the deadline; `Ok(())`
    /// otherwise. Called before each alternative resolution and each
    /// runtime invocation (§5).
    pub fn check(&self) -> Result<()> {
        if self.is_canceled() {
            return Err(InvowkError::Canceled);
        }
        if self.is_past_deadline() {
            let seconds = self
                .deadline
                .map(|d| d.saturating_duration_since(Instant::now()).as_secs())
                .unwrap_or(0);
            return Err(InvowkError::DeadlineExceeded { seconds });
        }
        Ok(())
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Derives a child token sharing this token's cancellation flag
    /// (so an outer SIGINT/cancel still propagates) but with a
    /// deadline no later than `timeout` from now — the narrower of
    /// the two deadlines wins. Used for per-implementation timeouts
    /// (§5): the derived context's deadline never outlives the
    /// invocation's own.
    pub fn with_derived_deadline(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => Some(existing),
            _ => Some(candidate),
        };
        Self {
            canceled: self.canceled.clone(),
            deadline,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_canceled() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_is_observed() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(token.check(), Err(InvowkError::Canceled)));
    }

    #[test]
    fn expired_deadline_is_observed() {
        let token = CancellationToken::with_timeout(Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(
            token.check(),
            Err(InvowkError::DeadlineExceeded { .. })
        ));
    }

    #[test]
    fn derived_deadline_does_not_outlive_parent() {
        let parent = CancellationToken::with_timeout(Duration::from_millis(0));
        let child = parent.with_derived_deadline(Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(child.check(), Err(InvowkError::DeadlineExceeded { .. })));
    }

    #[test]
    fn derived_deadline_shares_cancel_flag_with_parent() {
        let parent = CancellationToken::new();
        let child = parent.with_derived_deadline(Duration::from_secs(60));
        parent.cancel();
        assert!(matches!(child.check(), Err(InvowkError::Canceled)));
    }
}
