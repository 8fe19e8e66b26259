//! Gate every remote call passes through: bounded concurrency plus
//! cooperative cancellation.

use crate::errors::{AppError, AppResult};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ResponseHandler {
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl ResponseHandler {
    pub fn new(max_concurrent_requests: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
            cancel: CancellationToken::new(),
        }
    }

    /// Handler sharing the same permits whose token is a child of this one.
    /// Cancelling the child leaves the parent running; cancelling the parent
    /// cancels every child.
    pub fn child(&self) -> Self {
        Self {
            permits: Arc::clone(&self.permits),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run one remote call, waiting for a permit first. Either wait is
    /// abandoned as soon as the token fires.
    pub async fn call<T, F>(&self, request: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
            permit = self.permits.acquire() => permit
                .map_err(|_| AppError::Other("request gate closed".to_string()))?,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("remote call cancelled");
                Err(AppError::Cancelled)
            }
            result = request => {
                if let Err(e) = &result {
                    warn!(error = %e, "remote call failed");
                }
                result
            }
        }
    }
}

impl Default for ResponseHandler {
    fn default() -> Self {
        Self::new(4)
    }
}
