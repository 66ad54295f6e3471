//! Per-turn timeout and abort racing.

use std::future::Future;
use std::time::Duration;

use crate::session::AbortSignal;

/// How a guarded turn ended.
#[derive(Debug)]
pub(crate) enum Guarded<T> {
    Completed(T),
    TimedOut,
    Aborted,
}

/// Races `turn` against `limit` and the session's abort signal.
///
/// The turn future is dropped on timeout or abort, cancelling it at its
/// current suspension point. An abort wins ties.
pub(crate) async fn guard<F>(limit: Duration, abort: &AbortSignal, turn: F) -> Guarded<F::Output>
where
    F: Future,
{
    if abort.is_aborted() {
        return Guarded::Aborted;
    }
    tokio::select! {
        biased;
        _ = abort.aborted() => Guarded::Aborted,
        result = tokio::time::timeout(limit, turn) => match result {
            Ok(output) => Guarded::Completed(output),
            Err(_) => Guarded::TimedOut,
        },
    }
}
