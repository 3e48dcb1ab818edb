//! Structured logging hooks for the client and provider.

use crate::errors::{HostingError, RateLimitInfo};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Tracing hooks for hosting API operations.
pub struct TracingHooks;

impl TracingHooks {
    /// Logs the start of an API request.
    pub fn on_request_start(method: &str, url: &str) {
        debug!(method = %method, url = %url, "Hosting API request started");
    }

    /// Logs the completion of an API request.
    pub fn on_request_complete(method: &str, url: &str, status: u16, duration: Duration) {
        debug!(
            method = %method,
            url = %url,
            status = status,
            duration_ms = duration.as_millis() as u64,
            "Hosting API request completed"
        );
    }

    /// Logs a request error.
    ///
    /// Not-found responses are routine on read paths and only logged at debug.
    pub fn on_request_error(method: &str, url: &str, error: &HostingError) {
        if error.is_not_found() {
            debug!(method = %method, url = %url, "Hosting API resource not found");
        } else {
            warn!(
                method = %method,
                url = %url,
                kind = %error.kind(),
                error = %error,
                "Hosting API request failed"
            );
        }
    }

    /// Logs a retry attempt.
    pub fn on_retry(attempt: u32, delay: Duration, error: &HostingError) {
        warn!(
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Retrying hosting API request"
        );
    }

    /// Logs rate limit info.
    pub fn on_rate_limit_update(info: &RateLimitInfo) {
        trace!(
            limit = info.limit,
            remaining = info.remaining,
            reset_at = %info.reset_at,
            resource = info.resource.as_deref().unwrap_or("core"),
            "Rate limit updated"
        );
    }

    /// Logs a wait for rate-limit reset.
    pub fn on_rate_limit_exhausted(limit: u32, wait: Duration) {
        warn!(
            limit = limit,
            wait_secs = wait.as_secs(),
            "Rate limit exhausted, waiting for reset"
        );
    }

    /// Logs a full team-cache refresh.
    pub fn on_team_cache_refresh(organization: &str, teams: usize) {
        debug!(organization = %organization, teams = teams, "Team cache refreshed");
    }

    /// Logs removal of a single team-cache entry.
    pub fn on_team_cache_invalidate(name: &str) {
        trace!(team = %name, "Team cache entry invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_accept_not_found_and_failures() {
        // Hooks must be callable without a subscriber installed.
        TracingHooks::on_request_error("GET", "/repos/a/b", &HostingError::not_found("x"));
        TracingHooks::on_request_error("GET", "/repos/a/b", &HostingError::timeout("slow"));
        TracingHooks::on_team_cache_refresh("acme", 3);
        TracingHooks::on_team_cache_invalidate("devs");
    }
}
