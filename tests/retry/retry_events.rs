//! Event system tests.
//!
//! Tests event emission including:
//! - Success event on first try
//! - Retry events with attempt numbers and delays
//! - Error event after exhaustion
//! - Generic listeners see the executor name
//! - A panicking listener does not disturb the sequence
//! - Log lines carry the executor name

use retry_backoff::{RecordingSleeper, RetryEvent, RetryExecutor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::io;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct TestError;

#[tokio::test]
async fn success_event_on_first_try() {
    let success_count = Arc::new(AtomicUsize::new(0));
    let retry_count = Arc::new(AtomicUsize::new(0));
    let error_count = Arc::new(AtomicUsize::new(0));

    let sc = Arc::clone(&success_count);
    let rc = Arc::clone(&retry_count);
    let ec = Arc::clone(&error_count);

    let executor = RetryExecutor::builder()
        .sleeper(RecordingSleeper::new())
        .on_success(move |attempts| {
            assert_eq!(attempts, 1);
            sc.fetch_add(1, Ordering::SeqCst);
        })
        .on_retry(move |_, _| {
            rc.fetch_add(1, Ordering::SeqCst);
        })
        .on_error(move |_| {
            ec.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let _ = executor.execute(|| async { Ok::<_, TestError>(()) }).await;

    assert_eq!(success_count.load(Ordering::SeqCst), 1);
    assert_eq!(retry_count.load(Ordering::SeqCst), 0);
    assert_eq!(error_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn retry_events_carry_attempt_and_delay() {
    let retries = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&retries);
    let success_attempts = Arc::new(AtomicUsize::new(0));
    let sa = Arc::clone(&success_attempts);
    let call_count = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&call_count);

    let executor = RetryExecutor::builder()
        .max_attempts(3)
        .base_delay(Duration::from_millis(1000))
        .sleeper(RecordingSleeper::new())
        .on_retry(move |attempt, delay| r.lock().unwrap().push((attempt, delay)))
        .on_success(move |attempts| sa.store(attempts, Ordering::SeqCst))
        .build()
        .unwrap();

    let result = executor
        .execute(move || {
            let call = cc.fetch_add(1, Ordering::SeqCst) + 1;
            async move { if call < 3 { Err(TestError) } else { Ok(call) } }
        })
        .await;

    assert_eq!(result, Ok(3));
    assert_eq!(
        *retries.lock().unwrap(),
        vec![
            (1, Duration::from_millis(1000)),
            (2, Duration::from_millis(2000))
        ]
    );
    assert_eq!(success_attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn error_event_after_exhaustion() {
    let error_attempts = Arc::new(AtomicUsize::new(0));
    let ea = Arc::clone(&error_attempts);
    let success_count = Arc::new(AtomicUsize::new(0));
    let sc = Arc::clone(&success_count);

    let executor = RetryExecutor::builder()
        .max_attempts(4)
        .base_delay(Duration::from_millis(1))
        .sleeper(RecordingSleeper::new())
        .on_error(move |attempts| ea.store(attempts, Ordering::SeqCst))
        .on_success(move |_| {
            sc.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let result = executor.execute(|| async { Err::<(), _>(TestError) }).await;

    assert_eq!(result, Err(TestError));
    assert_eq!(error_attempts.load(Ordering::SeqCst), 4);
    assert_eq!(success_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn listener_sees_ordered_events_with_name() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&events);

    let executor = RetryExecutor::builder()
        .name("home-page")
        .max_attempts(3)
        .sleeper(RecordingSleeper::new())
        .listener(move |event: &RetryEvent| {
            e.lock()
                .unwrap()
                .push((event.event_type(), event.pattern_name().to_string()));
        })
        .build()
        .unwrap();

    let _ = executor.execute(|| async { Err::<(), _>(TestError) }).await;

    let events = events.lock().unwrap();
    let types: Vec<_> = events.iter().map(|(t, _)| *t).collect();
    assert_eq!(types, vec!["Retry", "Retry", "Error"]);
    assert!(events.iter().all(|(_, name)| name == "home-page"));
}

#[tokio::test]
async fn panicking_listener_does_not_break_retry() {
    let success_count = Arc::new(AtomicUsize::new(0));
    let sc = Arc::clone(&success_count);
    let call_count = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&call_count);

    let executor = RetryExecutor::builder()
        .max_attempts(3)
        .sleeper(RecordingSleeper::new())
        .on_retry(|_, _| panic!("listener blew up"))
        .on_success(move |_| {
            sc.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let result = executor
        .execute(move || {
            let call = cc.fetch_add(1, Ordering::SeqCst) + 1;
            async move { if call < 2 { Err(TestError) } else { Ok(call) } }
        })
        .await;

    assert_eq!(result, Ok(2));
    assert_eq!(success_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn event_timestamps_are_monotonic() {
    let stamps = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&stamps);

    let executor = RetryExecutor::builder()
        .max_attempts(3)
        .sleeper(RecordingSleeper::new())
        .listener(move |event: &RetryEvent| s.lock().unwrap().push(event.timestamp()))
        .build()
        .unwrap();

    let _ = executor.execute(|| async { Err::<(), _>(TestError) }).await;

    let stamps = stamps.lock().unwrap();
    assert_eq!(stamps.len(), 3);
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn emits_tracing_output_when_subscriber_installed() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    // The default test runtime is single-threaded, so the scoped subscriber
    // stays in effect across awaits.
    let _guard = tracing::subscriber::set_default(subscriber);

    let executor = RetryExecutor::builder()
        .name("traced")
        .max_attempts(2)
        .sleeper(RecordingSleeper::new())
        .build()
        .unwrap();

    let result = executor.execute(|| async { Err::<(), _>(TestError) }).await;
    assert_eq!(result, Err(TestError));

    let output = logs.contents();
    assert!(output.contains("retry=traced"), "log output: {output}");
    assert!(output.contains("running attempt"), "log output: {output}");
    assert!(output.contains("attempt failed, retry scheduled"), "log output: {output}");
    assert!(output.contains("attempt budget exhausted"), "log output: {output}");
    assert_eq!(output.matches("running attempt").count(), 2);
}
