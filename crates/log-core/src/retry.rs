use crate::error::{Error, Result};
use exponential_backoff::Backoff;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff for transient Storage Adapter errors
/// (spec.md §7 "Local recovery"). Only `Error::Unavailable` and
/// `Error::Io` are worth retrying; every other variant reflects a decision
/// the adapter has already made (`Full`, `NotPrimary`, `Truncated`, ...) and
/// is returned immediately. Mirrors the teacher's
/// `journal_client::read::uncommitted::retry` module, scoped down to the
/// one policy the server needs rather than a pluggable `Retry` trait.
const MAX_RETRIES: u32 = 5;
const MIN_BACKOFF: Duration = Duration::from_millis(20);
const MAX_BACKOFF: Duration = Duration::from_secs(2);

fn is_transient(err: &Error) -> bool {
    matches!(err, Error::Unavailable | Error::Io(_))
}

/// Run `op`, retrying with bounded exponential backoff while it fails with
/// a transient error. Returns the first non-transient error, or the last
/// transient error once retries are exhausted.
pub async fn retry_transient<F, Fut, T>(mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let backoff = Backoff::new(MAX_RETRIES, MIN_BACKOFF, Some(MAX_BACKOFF));
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) => {
                attempt += 1;
                match backoff.next(attempt) {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => return Err(err),
                }
            }
            Err(err) => return Err(err),
        }
    }
}
