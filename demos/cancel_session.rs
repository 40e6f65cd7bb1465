//! # Example: cancel_session
//!
//! Spawns a session whose operation keeps failing, then cancels it from the
//! outside while it waits between attempts. A second session is tied to a parent
//! token and stops when the parent is cancelled.
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_session
//! ```

use std::time::Duration;

use retrying::{Always, Attempt, RetryConfig, RetryError, Retrying, retrying};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cfg = RetryConfig::default()
        .unbounded()
        .with_retry_delay(Duration::from_millis(300));

    // 1. Handle-driven cancellation
    let handle = retrying(cfg.clone(), Always, |a: Attempt| async move {
        println!("[poller] attempt {}", a.index());
        Err::<(), _>(std::io::Error::other("not ready"))
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.cancel();
    match handle.await {
        Err(RetryError::Canceled) => println!("[main] poller cancelled"),
        other => println!("[main] unexpected outcome: {other:?}"),
    }

    // 2. Parent-token cancellation; the operation watches its attempt token
    let parent = CancellationToken::new();
    let watcher = Retrying::new(cfg, Always, |a: Attempt| async move {
        println!("[watcher] attempt {} waiting", a.index());
        a.token().cancelled().await;
        Err::<(), _>(std::io::Error::other("stopped"))
    })
    .with_cancellation(&parent)
    .spawn();

    tokio::time::sleep(Duration::from_millis(500)).await;
    parent.cancel();
    let outcome = watcher.await;
    println!("[main] watcher: {}", outcome.map_or_else(|e| e.as_label(), |_| "ok"));
}
