//! Timeout enforcement.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// A deadline expired before the wrapped operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Run `future` under an optional deadline. `None` waits indefinitely.
pub async fn with_deadline<F>(deadline: Option<Duration>, future: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| DeadlineExceeded(limit)),
        None => Ok(future.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_deadline() {
        let result = with_deadline(Some(Duration::from_secs(1)), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn expires() {
        let result = with_deadline(
            Some(Duration::from_millis(20)),
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;
        assert_eq!(result, Err(DeadlineExceeded(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn no_deadline_waits() {
        let result = with_deadline(None, async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            "done"
        })
        .await;
        assert_eq!(result, Ok("done"));
    }
}
