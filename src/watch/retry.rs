use tokio::time::sleep;
use tokio::time::timeout;
use tracing::debug;
use tracing::warn;

use crate::Error;
use crate::Result;
use crate::ResultStore;
use crate::RetryPolicy;
use crate::StoreError;

/// Reads the result count, absorbing transient failures.
///
/// Every attempt is bounded by `policy.timeout_ms`; attempts are separated by
/// a fixed `policy.backoff_ms`. Once `max_attempts` are used up the last
/// failure is returned inside [`Error::StoreUnavailable`].
pub(crate) async fn count_with_retry<S>(
    store: &S,
    policy: &RetryPolicy,
) -> Result<u64>
where
    S: ResultStore + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let timeout_duration = policy.timeout();
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        debug!("Attempt {} of {}", attempt, max_attempts);
        match timeout(timeout_duration, store.current_count()).await {
            Ok(Ok(count)) => {
                return Ok(count);
            }
            Ok(Err(e)) => {
                warn!(attempt, "count query failed: {}", e);
                last_error = Some(e);
            }
            Err(_elapsed) => {
                warn!(attempt, "count query timed out after {:?}", timeout_duration);
                last_error = Some(StoreError::QueryTimeout(timeout_duration));
            }
        }

        if attempt < max_attempts {
            debug!("Retrying in {:?}...", policy.backoff());
            sleep(policy.backoff()).await;
        }
    }

    warn!("count query failed after {} attempts", max_attempts);
    Err(Error::StoreUnavailable {
        attempts: max_attempts,
        source: last_error.unwrap_or_else(|| StoreError::Unavailable("no attempt was made".into())),
    })
}
