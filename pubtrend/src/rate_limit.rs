use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, instrument};

/// Minimum-interval rate limiter for NCBI E-utilities
///
/// NCBI guest limit is 3 requests per second, 10 with an API key; exceeding
/// it can get the caller's IP blocked. The limiter remembers when the last
/// request was released and makes the next caller sleep for the remainder of
/// the interval. The wait and the timestamp update happen under one lock, so
/// concurrent callers sharing a clone are released strictly one at a time.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter that releases at most one request per `min_interval`
    ///
    /// # Example
    ///
    /// ```
    /// use pubtrend::rate_limit::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::new(Duration::from_millis(340));
    /// assert_eq!(limiter.min_interval(), Duration::from_millis(340));
    /// ```
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a limiter from a requests-per-second rate
    pub fn per_second(rate: f64) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 3.0 };
        Self::new(Duration::from_secs_f64(1.0 / rate))
    }

    /// Limiter matching the NCBI guest limit (~0.34s between requests)
    pub fn ncbi_default() -> Self {
        Self::new(Duration::from_millis(340))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a request may be issued, then record it
    #[instrument(skip(self))]
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Sleeping to respect rate limit");
                sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Time of the most recently released request
    pub async fn last_request(&self) -> Option<Instant> {
        *self.last_request.lock().await
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::ncbi_default()
    }
}
