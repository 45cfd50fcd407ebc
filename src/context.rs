use std::error::Error;
use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;


/// Why a context stopped being live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextError {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "context canceled"),
            Self::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

impl Error for ContextError {}


/// Cancellation context handed to every upgrade, rollback and instance setup action.
///
/// Clones share the same token, so cancelling any clone cancels all of them.
/// A deadline, if set, is carried by value.
#[derive(Clone, Debug)]
pub struct UpgradeContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for UpgradeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl UpgradeContext {
    pub fn new() -> Self {
        UpgradeContext { token: CancellationToken::new(), deadline: None }
    }

    pub fn with_token(token: CancellationToken) -> Self {
        UpgradeContext { token, deadline: None }
    }

    /// Sets a deadline `timeout` from now. An earlier deadline already in place wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `None` while the context is live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => ContextError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_live() {
        let ctx = UpgradeContext::new();
        assert_eq!(ctx.err(), None);
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn cancelling_a_clone_cancels_the_original() {
        let ctx = UpgradeContext::new();
        let clone = ctx.clone();
        clone.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn expired_deadline_reports_deadline_exceeded() {
        let ctx = UpgradeContext::new().with_timeout(Duration::ZERO);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
    }

    #[tokio::test]
    async fn cancellation_takes_precedence_over_deadline() {
        let ctx = UpgradeContext::new().with_timeout(Duration::ZERO);
        ctx.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn earlier_deadline_is_kept() {
        let ctx = UpgradeContext::new().with_timeout(Duration::from_secs(1));
        let first = ctx.deadline();
        let ctx = ctx.with_timeout(Duration::from_secs(3600));
        assert_eq!(ctx.deadline(), first);
    }

    #[tokio::test]
    async fn done_resolves_on_cancel() {
        let token = CancellationToken::new();
        let ctx = UpgradeContext::with_token(token.clone());
        token.cancel();
        assert_eq!(ctx.done().await, ContextError::Cancelled);
    }

    #[test]
    fn context_error_messages() {
        assert_eq!(ContextError::Cancelled.to_string(), "context canceled");
        assert_eq!(ContextError::DeadlineExceeded.to_string(), "context deadline exceeded");
    }
}
