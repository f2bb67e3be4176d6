// Request pacing and retry with exponential backoff.
//
// The lyrics provider throttles bursts and occasionally times out. Each
// client call goes through a Pacer (minimum gap between requests) and
// `with_retry`, which retries transient failures (429, 5xx, timeouts)
// with exponentially growing, jittered delays.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

/// Enforces a minimum delay between consecutive requests.
///
/// Shared by every task using one client, so the lock only guards the
/// timestamp and is never held across an await.
pub struct Pacer {
    min_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until `min_delay` has passed since the previous request, then
    /// claim the slot.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
                let now = Instant::now();
                match *last {
                    Some(prev) if now.duration_since(prev) < self.min_delay => {
                        Some(self.min_delay - now.duration_since(prev))
                    }
                    _ => {
                        *last = Some(now);
                        None
                    }
                }
            };
            match wait {
                None => return,
                Some(wait) => tokio::time::sleep(wait).await,
            }
        }
    }
}

/// How many times, and how patiently, to retry a failing request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based): base * 2^attempt,
    /// capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_backoff)
    }
}

/// Whether an error looks transient: rate limiting, a server-side
/// failure or a timeout. Checked against the whole error chain.
pub fn is_transient_error(err: &anyhow::Error) -> bool {
    let text = format!("{err:?}").to_lowercase();
    text.contains("429")
        || text.contains("rate limit")
        || text.contains("ratelimit")
        || text.contains("timed out")
        || text.contains("timeout")
        || ["500", "502", "503", "504"]
            .iter()
            .any(|code| text.contains(&format!("returned {code}")))
}

/// Run `operation`, pacing each attempt and retrying transient errors up
/// to `policy.max_retries` times. Other errors are returned immediately.
pub async fn with_retry<F, Fut, T>(pacer: &Pacer, policy: RetryPolicy, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0u32;

    loop {
        pacer.acquire().await;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_transient_error(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;

                // +/- 25% jitter from the clock's nanoseconds
                let nanos = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .subsec_nanos();
                let jitter_factor = 0.75 + (nanos % 500) as f64 / 1000.0;
                let delay =
                    Duration::from_secs_f64(policy.backoff(attempt).as_secs_f64() * jitter_factor);

                warn!(
                    attempt = attempt,
                    max_retries = policy.max_retries,
                    backoff_secs = delay.as_secs_f64(),
                    error = %err,
                    "Request failed, retrying in {:.1}s",
                    delay.as_secs_f64(),
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    // ── Pacer ───────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_pacer_first_request_is_immediate() {
        let pacer = Pacer::new(Duration::from_millis(500));
        let start = tokio::time::Instant::now();
        pacer.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_pacer_enforces_min_delay() {
        let pacer = Pacer::new(Duration::from_millis(40));
        let start = Instant::now();
        pacer.acquire().await;
        pacer.acquire().await;
        pacer.acquire().await;
        assert!(
            start.elapsed() >= Duration::from_millis(70),
            "Expected two ~40ms gaps, got {:?}",
            start.elapsed()
        );
    }

    // ── is_transient_error ──────────────────────────────────────────

    #[test]
    fn test_transient_errors() {
        assert!(is_transient_error(&anyhow::anyhow!("GET /songs/1 returned 429 Too Many Requests")));
        assert!(is_transient_error(&anyhow::anyhow!("GET /search returned 503 Service Unavailable")));
        assert!(is_transient_error(&anyhow::anyhow!("operation timed out")));
        assert!(is_transient_error(
            &anyhow::anyhow!("HTTP 429").context("Failed to fetch song")
        ));
    }

    #[test]
    fn test_permanent_errors() {
        assert!(!is_transient_error(&anyhow::anyhow!("GET /songs/1 returned 404 Not Found")));
        assert!(!is_transient_error(&anyhow::anyhow!("GET /search returned 401 Unauthorized")));
        assert!(!is_transient_error(&anyhow::anyhow!("invalid JSON")));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(4));
        assert_eq!(policy.backoff(2), Duration::from_secs(8));
        assert_eq!(policy.backoff(10), Duration::from_secs(60));
    }

    // ── with_retry ──────────────────────────────────────────────────
    // Paused time skips the backoff sleeps; only call counts are checked.

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_succeeds_immediately() {
        let pacer = Pacer::new(Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result = with_retry(&pacer, RetryPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_recovers_from_transient_failures() {
        let pacer = Pacer::new(Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result = with_retry(&pacer, RetryPolicy::default(), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(anyhow::anyhow!("returned 503 Service Unavailable"))
                } else {
                    Ok("lyrics")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "lyrics");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_passes_through_permanent_errors() {
        let pacer = Pacer::new(Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<i32> = with_retry(&pacer, RetryPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("returned 404 Not Found")) }
        })
        .await;

        assert!(result.unwrap_err().to_string().contains("404"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_gives_up_after_max_retries() {
        let pacer = Pacer::new(Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<i32> = with_retry(&pacer, RetryPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("returned 429 Too Many Requests")) }
        })
        .await;

        assert!(result.is_err());
        // 1 initial attempt + 3 retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
