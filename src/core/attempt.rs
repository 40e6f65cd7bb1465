//! # Run a single attempt of an operation.
//!
//! Drives one attempt future against the session's cancellation token.
//!
//! ```text
//! operation.call(attempt) ──► Ok(v)   → Succeeded(v)
//!                         ──► Err(e)  → Failed(e)
//! session token cancelled ──────────► Canceled (attempt future dropped)
//! ```
//!
//! ## Rules
//! - The attempt gets a **child token**; cancelling the session cancels it too.
//! - Cancellation is checked first on every poll, so an error produced *because*
//!   the operation saw its token fire is reported as `Canceled`, never as a
//!   retriable failure.
//! - No deadline here: a running attempt is never pre-empted by the session timeout.

use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::operation::{Attempt, Operation};

/// Result of one attempt.
#[derive(Debug)]
pub(crate) enum AttemptOutcome<T, E> {
    Succeeded(T),
    Failed(E),
    Canceled,
}

/// Executes a single attempt of `operation` under `session` cancellation.
pub(crate) async fn run_attempt<T, E, Op>(
    operation: &mut Op,
    attempt: Attempt,
    session: &CancellationToken,
) -> AttemptOutcome<T, E>
where
    Op: Operation<T, E> + ?Sized,
{
    if session.is_cancelled() {
        return AttemptOutcome::Canceled;
    }
    let fut = operation.call(attempt);

    select! {
        biased;
        _ = session.cancelled() => AttemptOutcome::Canceled,
        res = fut => match res {
            Ok(v) => AttemptOutcome::Succeeded(v),
            Err(e) => AttemptOutcome::Failed(e),
        },
    }
}
