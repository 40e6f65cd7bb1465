//! # Example: flaky_fetch
//!
//! Retries a fetch that fails twice with a transient error, then succeeds.
//! Session events are written through `tracing` by the built-in [`LogWriter`].
//!
//! ## Flow
//! ```text
//! Session::run()
//!   ├─► publish(SessionStarting)
//!   ├─► fetch(attempt=0) → Err(Unavailable)
//!   ├─► publish(AttemptFailed, BackoffScheduled{200ms})
//!   ├─► fetch(attempt=1) → Err(Unavailable)
//!   ├─► publish(AttemptFailed, BackoffScheduled{200ms})
//!   ├─► fetch(attempt=2) → Ok("payload")
//!   └─► publish(AttemptSucceeded)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example flaky_fetch
//! ```

use std::sync::Arc;
use std::time::Duration;

use retrying::{Attempt, Bus, LogWriter, Priority, RetryConfig, Retrying, Subscribe, SubscriberSet};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("upstream unavailable")]
    Unavailable,
    #[error("resource gone")]
    Gone,
}

async fn fetch(attempt: Attempt) -> Result<&'static str, FetchError> {
    println!("[fetch] attempt {}", attempt.index());
    tokio::time::sleep(Duration::from_millis(50)).await;
    if attempt.index() < 2 {
        Err(FetchError::Unavailable)
    } else {
        Ok("payload")
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    // 1. Bus + log subscriber
    let bus = Bus::new(128);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let set = SubscriberSet::attach(subs, &bus);

    // 2. Up to 4 retries, 200ms apart, 5s for the whole session
    let cfg = RetryConfig::default()
        .with_max_retry_count(4)
        .with_retry_delay_secs(0.2)?
        .with_timeout(Duration::from_secs(5))
        .with_priority(Priority::HIGH);

    // 3. Retry only transient failures
    let value = Retrying::new(cfg, |e: &FetchError| matches!(e, FetchError::Unavailable), fetch)
        .with_name("fetch")
        .with_bus(bus.clone())
        .run()
        .await?;
    println!("[main] got {value}");

    // 4. A permanent failure is handed back unchanged
    let err = Retrying::new(
        RetryConfig::default(),
        |e: &FetchError| matches!(e, FetchError::Unavailable),
        |_a: Attempt| async { Err::<(), _>(FetchError::Gone) },
    )
    .with_name("gone")
    .with_bus(bus.clone())
    .run()
    .await
    .err();
    println!("[main] second session: {err:?}");

    set.shutdown().await;
    Ok(())
}
