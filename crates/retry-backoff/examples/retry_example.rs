use retry_backoff::{RetryExecutor, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{Service, ServiceExt};

#[derive(Debug, Clone)]
struct ElementNotVisible(&'static str);

impl std::fmt::Display for ElementNotVisible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element not visible: {}", self.0)
    }
}

impl std::error::Error for ElementNotVisible {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("Retry With Backoff Example");
    println!("==========================\n");

    // Example 1: exponential backoff, succeeds on the third attempt
    println!("Example 1: exponential backoff");
    let executor = RetryExecutor::builder()
        .name("search-button")
        .max_attempts(3)
        .base_delay(Duration::from_millis(100))
        .on_retry(|attempt, delay| {
            println!("  attempt {} failed, waiting {:?}", attempt, delay);
        })
        .on_success(|attempts| println!("  succeeded after {} attempt(s)", attempts))
        .build()?;

    let calls = AtomicUsize::new(0);
    let result = executor
        .execute(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(ElementNotVisible("#submit_search"))
                } else {
                    Ok("search results")
                }
            }
        })
        .await?;
    println!("  result: {}\n", result);

    // Example 2: fixed interval, budget exhausted
    println!("Example 2: fixed interval, attempts exhausted");
    let executor = RetryExecutor::builder()
        .name("subscribe-button")
        .max_attempts(3)
        .fixed_backoff(Duration::from_millis(50))
        .on_error(|attempts| println!("  gave up after {} attempts", attempts))
        .build()?;

    let result: Result<(), _> = executor
        .execute(|| async { Err(ElementNotVisible("#subscribe")) })
        .await;
    println!("  error: {}\n", result.unwrap_err());

    // Example 3: policy loaded from JSON, applied to a Tower service
    println!("Example 3: Tower service with a configured policy");
    let policy: RetryPolicy = serde_json::from_str(r#"{"max_attempts": 4, "base_delay_ms": 20}"#)?;
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let service = tower::service_fn(move |path: String| {
        let hit = h.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if hit < 2 {
                Err(ElementNotVisible("products grid"))
            } else {
                Ok(format!("loaded {}", path))
            }
        }
    });

    let mut service = tower::ServiceBuilder::new()
        .layer(RetryExecutor::new(policy).layer())
        .service(service);
    let page = service
        .ready()
        .await?
        .call("/products".to_string())
        .await?;
    println!("  {} after {} call(s)", page, hits.load(Ordering::SeqCst));

    Ok(())
}
