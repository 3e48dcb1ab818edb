//! Network-layer resilience for the HTTP client: retry with backoff and
//! rate-limit tracking. The provider layer never retries on its own.

use crate::config::{RateLimitConfig, RetryConfig};
use crate::errors::{HostingError, HostingErrorKind, HostingResult, RateLimitInfo};
use crate::observability::TracingHooks;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// Retry executor with exponential backoff.
pub struct RetryExecutor {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
    jitter: f64,
}

impl RetryExecutor {
    /// Creates a retry executor from configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: if config.enabled { config.max_attempts.max(1) } else { 1 },
            initial_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
            jitter: config.jitter,
        }
    }

    /// Executes an operation, retrying retryable failures.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> HostingResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = HostingResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if !e.is_retryable() || attempt >= self.max_attempts {
                        return Err(e);
                    }

                    let delay = match e.retry_after() {
                        Some(secs) => Duration::from_secs(secs).min(self.max_backoff),
                        None => self.calculate_backoff(attempt),
                    };

                    TracingHooks::on_retry(attempt, delay, &e);
                    sleep(delay).await;
                }
            }
        }
    }

    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff.as_millis() as f64
            * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = base.min(self.max_backoff.as_millis() as f64);

        let jitter_range = capped * self.jitter;
        let jitter_value = rand_jitter() * jitter_range * 2.0 - jitter_range;
        Duration::from_millis((capped + jitter_value).max(0.0) as u64)
    }
}

/// Pseudo-random value in `[0.0, 1.0]` from the clock's sub-second nanos.
fn rand_jitter() -> f64 {
    let nanos = Utc::now().timestamp_subsec_nanos();
    f64::from(nanos) / 1_000_000_000.0
}

/// Tracks the upstream rate-limit budget from response headers.
pub struct RateLimitTracker {
    limit: AtomicU32,
    remaining: AtomicU32,
    reset_at: AtomicI64,
    wait_on_exhaustion: bool,
    enabled: bool,
}

impl RateLimitTracker {
    /// Creates a tracker from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            limit: AtomicU32::new(5000),
            remaining: AtomicU32::new(5000),
            reset_at: AtomicI64::new(0),
            wait_on_exhaustion: config.wait_on_exhaustion,
            enabled: config.enabled,
        }
    }

    /// Updates the tracked budget.
    pub fn update(&self, info: &RateLimitInfo) {
        if !self.enabled {
            return;
        }
        self.limit.store(info.limit, Ordering::SeqCst);
        self.remaining.store(info.remaining, Ordering::SeqCst);
        self.reset_at.store(info.reset_at.timestamp(), Ordering::SeqCst);
        TracingHooks::on_rate_limit_update(info);
    }

    /// Gets the remaining requests.
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Gets the rate limit.
    pub fn limit(&self) -> u32 {
        self.limit.load(Ordering::SeqCst)
    }

    /// Gets the reset time.
    pub fn reset_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset_at.load(Ordering::SeqCst), 0).unwrap_or_else(Utc::now)
    }

    /// Time to wait before the next request, if the budget is spent.
    pub fn wait_time(&self) -> Option<Duration> {
        if !self.enabled || self.remaining() > 0 {
            return None;
        }
        let now = Utc::now();
        let reset_at = self.reset_at();
        (reset_at > now).then(|| (reset_at - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// Waits for the reset, or fails fast when waiting is disabled.
    pub async fn acquire(&self) -> HostingResult<()> {
        let Some(wait) = self.wait_time() else {
            return Ok(());
        };
        if !self.wait_on_exhaustion {
            return Err(HostingError::new(
                HostingErrorKind::PrimaryRateLimitExceeded,
                format!("Rate limit exhausted; resets in {}s", wait.as_secs()),
            ));
        }
        TracingHooks::on_rate_limit_exhausted(self.limit(), wait);
        sleep(wait).await;
        Ok(())
    }
}

/// Retry plus rate-limit tracking, wrapped around each HTTP call.
pub struct Resilience {
    retry: RetryExecutor,
    rate_limit: RateLimitTracker,
}

impl Resilience {
    /// Creates the resilience layer.
    pub fn new(retry: RetryExecutor, rate_limit: RateLimitTracker) -> Self {
        Self { retry, rate_limit }
    }

    /// Gets the rate limit tracker.
    pub fn rate_limit(&self) -> &RateLimitTracker {
        &self.rate_limit
    }

    /// Executes an operation with rate-limit gating and retry.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> HostingResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = HostingResult<T>>,
    {
        self.rate_limit.acquire().await?;
        self.retry.execute(operation).await
    }
}
