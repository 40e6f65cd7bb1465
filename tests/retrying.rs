use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use retrying::{Attempt, Never, Priority, RetryConfig, RetryError, Retrying, Unindexed, retrying};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, PartialEq, thiserror::Error)]
enum FetchError {
    #[error("unavailable (attempt {0})")]
    Unavailable(usize),
    #[error("not found")]
    NotFound,
}

fn transient(e: &FetchError) -> bool {
    matches!(e, FetchError::Unavailable(_))
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

#[tokio::test(start_paused = true)]
async fn single_attempt_when_first_call_succeeds() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default().with_max_retry_count(0);

    let out = retrying(cfg, transient, move |_a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, FetchError>("ok") }
    })
    .await;

    assert_eq!(out.ok(), Some("ok"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_two_failures_without_trailing_delay() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default()
        .with_max_retry_count(5)
        .with_retry_delay(Duration::from_secs(1));

    let start = Instant::now();
    let out = retrying(cfg, transient, move |a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async move {
            if a.index() < 2 {
                Err(FetchError::Unavailable(a.index()))
            } else {
                Ok(a.index())
            }
        }
    })
    .await;

    assert_eq!(out.ok(), Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2), "elapsed: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "elapsed: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn exhausts_budget_with_latest_error() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default()
        .with_max_retry_count(3)
        .with_retry_delay(Duration::from_millis(100));

    let err = retrying(cfg, transient, move |a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async move { Err::<(), _>(FetchError::Unavailable(a.index())) }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), Some(4));
    assert_eq!(err.into_last_error(), Some(FetchError::Unavailable(3)));
}

#[tokio::test(start_paused = true)]
async fn non_retriable_error_is_returned_unchanged() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default().with_max_retry_count(5);

    let err = retrying(cfg, transient, move |a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async move {
            if a.is_first() {
                Err::<(), _>(FetchError::Unavailable(0))
            } else {
                Err(FetchError::NotFound)
            }
        }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(err.is_aborted());
    assert_eq!(err.to_string(), "not found");
    assert_eq!(err.into_operation_error().ok(), Some(FetchError::NotFound));
}

#[tokio::test(start_paused = true)]
async fn never_condition_stops_after_first_failure() {
    let calls = counter();
    let c = Arc::clone(&calls);

    let err = retrying(RetryConfig::default(), Never, move |_a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async { Err::<(), _>(FetchError::Unavailable(0)) }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(err.is_aborted());
}

#[tokio::test(start_paused = true)]
async fn slow_attempt_past_deadline_times_out_without_retry() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default()
        .with_max_retry_count(5)
        .with_retry_delay(Duration::from_secs(1))
        .with_timeout(Duration::from_secs(3));

    let err = retrying(cfg, transient, move |a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async move {
            time::sleep(Duration::from_secs(3)).await;
            Err::<(), _>(FetchError::Unavailable(a.index()))
        }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let RetryError::TimedOut {
        timeout,
        attempts,
        last_error,
    } = err
    else {
        panic!("expected TimedOut");
    };
    assert_eq!(timeout, Duration::from_secs(3));
    assert_eq!(attempts, 1);
    assert_eq!(last_error, Some(FetchError::Unavailable(0)));
}

#[tokio::test(start_paused = true)]
async fn last_attempt_past_deadline_reports_exhaustion() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default()
        .with_max_retry_count(0)
        .with_timeout(Duration::from_secs(1));

    let err = retrying(cfg, transient, move |a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async move {
            time::sleep(Duration::from_secs(2)).await;
            Err::<(), _>(FetchError::Unavailable(a.index()))
        }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), Some(1));
    assert_eq!(err.into_last_error(), Some(FetchError::Unavailable(0)));
}

#[tokio::test(start_paused = true)]
async fn expired_deadline_skips_the_delay() {
    let cfg = RetryConfig::default()
        .with_max_retry_count(5)
        .with_retry_delay(Duration::from_secs(3600))
        .with_timeout(Duration::from_secs(1));

    let start = Instant::now();
    let err = retrying(cfg, transient, |a: Attempt| async move {
        time::sleep(Duration::from_secs(2)).await;
        Err::<(), _>(FetchError::Unavailable(a.index()))
    })
    .await
    .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.attempts(), Some(1));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2), "elapsed: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "elapsed: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_never_calls_operation() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default().with_timeout(Duration::ZERO);

    let err = retrying(cfg, transient, move |_a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, FetchError>(()) }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(err.is_timeout());
    assert_eq!(err.attempts(), Some(0));
    assert!(err.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn timeout_reports_most_recent_failure() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default()
        .unbounded()
        .with_retry_delay(Duration::from_secs(1))
        .with_timeout(Duration::from_millis(2500));

    let err = retrying(cfg, transient, move |a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async move { Err::<(), _>(FetchError::Unavailable(a.index())) }
    })
    .await
    .unwrap_err();

    // Attempts start at 0s, 1s and 2s; the deadline is noticed after the third delay.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(err.is_timeout());
    assert_eq!(err.attempts(), Some(3));
    assert_eq!(err.last_error(), Some(&FetchError::Unavailable(2)));
}

#[tokio::test(start_paused = true)]
async fn unbounded_retries_until_condition_refuses() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default()
        .unbounded()
        .with_retry_delay(Duration::ZERO);

    let err = retrying(
        cfg,
        |e: &FetchError| matches!(e, FetchError::Unavailable(n) if *n < 10),
        move |a: Attempt| {
            c.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(FetchError::Unavailable(a.index())) }
        },
    )
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 11);
    assert_eq!(
        err.into_operation_error().ok(),
        Some(FetchError::Unavailable(10))
    );
}

#[tokio::test(start_paused = true)]
async fn attempts_see_index_priority_and_deadline() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let cfg = RetryConfig::default()
        .with_max_retry_count(2)
        .with_retry_delay(Duration::from_secs(1))
        .with_timeout(Duration::from_secs(10))
        .with_priority(Priority::HIGH);

    let _ = retrying(cfg, transient, move |a: Attempt| {
        if let Ok(mut seen) = s.lock() {
            seen.push((a.index(), a.priority(), a.remaining()));
        }
        async move { Err::<(), _>(FetchError::Unavailable(a.index())) }
    })
    .await;

    let seen = seen.lock().map(|s| s.clone()).unwrap_or_default();
    assert_eq!(
        seen,
        vec![
            (0, Some(Priority::HIGH), Some(Duration::from_secs(10))),
            (1, Some(Priority::HIGH), Some(Duration::from_secs(9))),
            (2, Some(Priority::HIGH), Some(Duration::from_secs(8))),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn unindexed_factory_is_retried() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default().with_retry_delay(Duration::from_millis(5));

    let out = retrying(
        cfg,
        transient,
        Unindexed::new(move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(FetchError::Unavailable(n))
                } else {
                    Ok(n)
                }
            }
        }),
    )
    .await;

    assert_eq!(out.ok(), Some(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_attempt() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default();

    let handle = retrying(cfg, transient, move |_a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, FetchError>(())
        }
    });

    time::sleep(Duration::from_secs(1)).await;
    handle.cancel();

    let err = handle.await.unwrap_err();
    assert!(err.is_canceled());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_delay() {
    let calls = counter();
    let c = Arc::clone(&calls);
    let cfg = RetryConfig::default().with_retry_delay(Duration::from_secs(3600));

    let handle = retrying(cfg, transient, move |a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async move { Err::<(), _>(FetchError::Unavailable(a.index())) }
    });

    time::sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    handle.cancel();

    let err = handle.await.unwrap_err();
    assert!(err.is_canceled());
    assert!(err.last_error().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cooperative_operation_observes_attempt_token() {
    let cfg = RetryConfig::default();

    let handle = retrying(cfg, transient, |a: Attempt| async move {
        a.token().cancelled().await;
        Err::<(), _>(FetchError::Unavailable(a.index()))
    });
    let token = handle.cancellation_token();

    time::sleep(Duration::from_millis(10)).await;
    token.cancel();

    assert!(handle.await.unwrap_err().is_canceled());
}

#[tokio::test(start_paused = true)]
async fn abort_resolves_to_canceled() {
    let handle = retrying(RetryConfig::default(), transient, |_a: Attempt| {
        std::future::pending::<Result<(), FetchError>>()
    });

    time::sleep(Duration::from_millis(10)).await;
    handle.abort();

    assert!(handle.await.unwrap_err().is_canceled());
}

#[tokio::test(start_paused = true)]
async fn parent_token_cancels_session_but_not_the_reverse() {
    let parent = CancellationToken::new();

    let first = Retrying::new(RetryConfig::default(), transient, |_a: Attempt| {
        std::future::pending::<Result<(), FetchError>>()
    })
    .with_cancellation(&parent)
    .spawn();
    let second = Retrying::new(RetryConfig::default(), transient, |_a: Attempt| {
        std::future::pending::<Result<(), FetchError>>()
    })
    .with_cancellation(&parent)
    .spawn();

    first.cancel();
    assert!(first.await.unwrap_err().is_canceled());
    assert!(!parent.is_cancelled());
    assert!(!second.is_finished());

    parent.cancel();
    assert!(second.await.unwrap_err().is_canceled());
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_runs_nothing() {
    let calls = counter();
    let c = Arc::clone(&calls);

    let session = Retrying::new(RetryConfig::default(), transient, move |_a: Attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, FetchError>(()) }
    });
    session.cancellation_token().cancel();

    assert!(session.run().await.unwrap_err().is_canceled());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
#[should_panic(expected = "kaboom")]
async fn operation_panic_reaches_the_awaiting_task() {
    let handle = retrying(RetryConfig::default(), transient, |_a: Attempt| async {
        if true {
            panic!("kaboom");
        }
        Ok::<(), FetchError>(())
    });
    let _ = handle.await;
}

#[tokio::test(start_paused = true)]
async fn sessions_are_independent() {
    let cfg = RetryConfig::default()
        .with_max_retry_count(2)
        .with_retry_delay(Duration::from_millis(50));

    let ok = retrying(cfg.clone(), transient, |a: Attempt| async move {
        if a.index() == 0 {
            Err(FetchError::Unavailable(0))
        } else {
            Ok(a.index())
        }
    });
    let failed = retrying(cfg, transient, |_a: Attempt| async {
        Err::<usize, _>(FetchError::NotFound)
    });

    let (ok, failed) = tokio::join!(ok, failed);
    assert_eq!(ok.ok(), Some(1));
    assert!(failed.unwrap_err().is_aborted());
}
