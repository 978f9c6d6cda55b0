use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;

/// Caller-driven abort for one resolution call.
///
/// Bundles the caller's cancellation token with an absolute deadline.
/// Every suspension point in the engine runs through [`guard`](Self::guard),
/// so an in-flight call fails promptly with [`ResolveError::Cancelled`] or
/// [`ResolveError::Timeout`] instead of completing or retrying. The two
/// conditions stay distinguishable; cancellation wins when both fire.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Interrupt {
    /// Build from a cancellation token and an optional timeout, with the
    /// deadline anchored at the current instant.
    pub fn new(cancel: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// An interrupt that never fires.
    pub fn none() -> Self {
        Self::default()
    }

    /// Synchronous checkpoint between suspension points.
    pub fn check(&self) -> Result<(), ResolveError> {
        if self.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ResolveError::Timeout);
            }
        }
        Ok(())
    }

    /// Run a fallible future, racing it against cancellation and the
    /// deadline.
    pub async fn guard<T, E>(
        &self,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ResolveError>
    where
        ResolveError: From<E>,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ResolveError::Cancelled),
            _ = deadline => Err(ResolveError::Timeout),
            res = fut => res.map_err(ResolveError::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn never() -> Result<(), ResolveError> {
        std::future::pending().await
    }

    #[tokio::test]
    async fn test_guard_passes_results_through() {
        let interrupt = Interrupt::none();
        let out = interrupt.guard(async { Ok::<_, ResolveError>(42) }).await;
        assert_eq!(out.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let interrupt = Interrupt::new(token, None);

        let out = interrupt.guard(never()).await;
        assert!(matches!(out, Err(ResolveError::Cancelled)));
        assert!(matches!(interrupt.check(), Err(ResolveError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_with_timeout() {
        let interrupt = Interrupt::new(CancellationToken::new(), Some(Duration::from_millis(10)));

        let out = interrupt.guard(never()).await;
        assert!(matches!(out, Err(ResolveError::Timeout)));
    }

    #[tokio::test]
    async fn test_cancellation_wins_over_deadline() {
        let token = CancellationToken::new();
        token.cancel();
        let interrupt = Interrupt::new(token, Some(Duration::ZERO));

        let out = interrupt.guard(never()).await;
        assert!(matches!(out, Err(ResolveError::Cancelled)));
    }
}
