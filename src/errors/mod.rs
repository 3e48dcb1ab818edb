//! Error types for the hosting provider and its HTTP client.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Result type alias for hosting operations.
pub type HostingResult<T> = Result<T, HostingError>;

/// Error kinds for categorizing hosting errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostingErrorKind {
    // Configuration errors
    /// Missing authentication configuration.
    MissingAuth,
    /// More than one credential mode, or an incomplete one.
    ConflictingCredentials,
    /// Invalid base URL.
    InvalidBaseUrl,
    /// Invalid configuration.
    InvalidConfiguration,

    // Caller contract errors
    /// Repository name is empty or has too many namespace separators.
    InvalidName,
    /// Branch reference does not match `namespace/repo:branch`.
    InvalidReference,
    /// Source and destination of a pull request are different repositories.
    CrossRepoMismatch,
    /// Permission token is not part of the recognized vocabulary.
    InvalidPermission,
    /// A required option was not supplied.
    MissingOption,
    /// A membership update did not carry a role.
    MissingRole,
    /// Invalid parameter.
    InvalidParameter,

    // Resolution errors
    /// Team is absent even after a forced cache refresh.
    TeamNotFound,
    /// Upstream resource lacks a field the domain model requires.
    MalformedResource,

    // Authentication / authorization errors
    /// Bad credentials (401).
    BadCredentials,
    /// Access forbidden (403).
    Forbidden,

    // Request errors
    /// Request validation failed (400).
    ValidationError,
    /// Unprocessable entity (422).
    UnprocessableEntity,

    // Resource errors
    /// Resource not found (404).
    NotFound,
    /// Resource is gone (410).
    Gone,
    /// Resource conflict (409).
    Conflict,

    // Rate limit errors
    /// Primary rate limit exceeded.
    PrimaryRateLimitExceeded,
    /// Secondary rate limit exceeded.
    SecondaryRateLimitExceeded,

    // Network errors
    /// Connection failed.
    ConnectionFailed,
    /// Request timeout.
    Timeout,

    // Server errors
    /// Internal server error (500).
    InternalError,
    /// Bad gateway (502).
    BadGateway,
    /// Service unavailable (503).
    ServiceUnavailable,

    // Response errors
    /// Failed to deserialize response.
    DeserializationError,

    /// Unknown error.
    Unknown,
}

impl fmt::Display for HostingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingAuth => "missing_auth",
            Self::ConflictingCredentials => "conflicting_credentials",
            Self::InvalidBaseUrl => "invalid_base_url",
            Self::InvalidConfiguration => "invalid_configuration",
            Self::InvalidName => "invalid_name",
            Self::InvalidReference => "invalid_reference",
            Self::CrossRepoMismatch => "cross_repo_mismatch",
            Self::InvalidPermission => "invalid_permission",
            Self::MissingOption => "missing_option",
            Self::MissingRole => "missing_role",
            Self::InvalidParameter => "invalid_parameter",
            Self::TeamNotFound => "team_not_found",
            Self::MalformedResource => "malformed_resource",
            Self::BadCredentials => "bad_credentials",
            Self::Forbidden => "forbidden",
            Self::ValidationError => "validation_error",
            Self::UnprocessableEntity => "unprocessable_entity",
            Self::NotFound => "not_found",
            Self::Gone => "gone",
            Self::Conflict => "conflict",
            Self::PrimaryRateLimitExceeded => "primary_rate_limit_exceeded",
            Self::SecondaryRateLimitExceeded => "secondary_rate_limit_exceeded",
            Self::ConnectionFailed => "connection_failed",
            Self::Timeout => "timeout",
            Self::InternalError => "internal_error",
            Self::BadGateway => "bad_gateway",
            Self::ServiceUnavailable => "service_unavailable",
            Self::DeserializationError => "deserialization_error",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Rate limit information extracted from response headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Maximum requests allowed.
    pub limit: u32,
    /// Remaining requests in current window.
    pub remaining: u32,
    /// Time when the rate limit resets.
    pub reset_at: DateTime<Utc>,
    /// Retry-After header value in seconds (if present).
    pub retry_after: Option<u64>,
    /// Resource category.
    pub resource: Option<String>,
}

/// Hosting error with detailed information.
#[derive(Error, Debug)]
pub struct HostingError {
    kind: HostingErrorKind,
    message: String,
    status_code: Option<u16>,
    request_id: Option<String>,
    documentation_url: Option<String>,
    rate_limit: Option<RateLimitInfo>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for HostingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request_id: {}]", id)?;
        }
        Ok(())
    }
}

impl HostingError {
    /// Creates a new hosting error.
    pub fn new(kind: HostingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            documentation_url: None,
            rate_limit: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the upstream request ID.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the documentation URL.
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Sets the rate limit info.
    pub fn with_rate_limit(mut self, info: RateLimitInfo) -> Self {
        self.rate_limit = Some(info);
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &HostingErrorKind {
        &self.kind
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Gets the documentation URL.
    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }

    /// Gets the rate limit info.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Returns true when the upstream reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        self.kind == HostingErrorKind::NotFound
    }

    /// Returns the retry-after duration in seconds.
    pub fn retry_after(&self) -> Option<u64> {
        let rl = self.rate_limit.as_ref()?;
        rl.retry_after.or_else(|| {
            let now = Utc::now();
            (rl.reset_at > now).then(|| (rl.reset_at - now).num_seconds() as u64)
        })
    }

    /// Returns true if the HTTP layer may retry this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            HostingErrorKind::PrimaryRateLimitExceeded
                | HostingErrorKind::SecondaryRateLimitExceeded
                | HostingErrorKind::ConnectionFailed
                | HostingErrorKind::Timeout
                | HostingErrorKind::InternalError
                | HostingErrorKind::BadGateway
                | HostingErrorKind::ServiceUnavailable
        )
    }

    /// Creates an error from an HTTP status code and upstream error body.
    pub fn from_response(
        status: u16,
        message: String,
        documentation_url: Option<String>,
        request_id: Option<String>,
    ) -> Self {
        let kind = Self::kind_from_status(status);
        let mut error = Self::new(kind, message).with_status(status);

        if let Some(url) = documentation_url {
            error = error.with_documentation_url(url);
        }
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }

        error
    }

    fn kind_from_status(status: u16) -> HostingErrorKind {
        match status {
            400 => HostingErrorKind::ValidationError,
            401 => HostingErrorKind::BadCredentials,
            403 => HostingErrorKind::Forbidden,
            404 => HostingErrorKind::NotFound,
            409 => HostingErrorKind::Conflict,
            410 => HostingErrorKind::Gone,
            422 => HostingErrorKind::UnprocessableEntity,
            429 => HostingErrorKind::SecondaryRateLimitExceeded,
            500 => HostingErrorKind::InternalError,
            502 => HostingErrorKind::BadGateway,
            503 => HostingErrorKind::ServiceUnavailable,
            _ => HostingErrorKind::Unknown,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(HostingErrorKind::InvalidConfiguration, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HostingErrorKind::NotFound, message).with_status(404)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(info: RateLimitInfo) -> Self {
        Self::new(HostingErrorKind::PrimaryRateLimitExceeded, "Rate limit exceeded")
            .with_status(403)
            .with_rate_limit(info)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(HostingErrorKind::Timeout, message)
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(HostingErrorKind::DeserializationError, message)
    }

    /// Creates an invalid repository name error.
    pub fn invalid_name(name: &str, reason: &str) -> Self {
        Self::new(
            HostingErrorKind::InvalidName,
            format!("Invalid repository name '{}': {}", name, reason),
        )
    }

    /// Creates an invalid branch reference error.
    pub fn invalid_reference(reference: &str) -> Self {
        Self::new(
            HostingErrorKind::InvalidReference,
            format!(
                "Invalid reference '{}' (expected `namespace/repo:branch`)",
                reference
            ),
        )
    }

    /// Creates an invalid permission error carrying the offending token.
    pub fn invalid_permission(token: &str) -> Self {
        Self::new(
            HostingErrorKind::InvalidPermission,
            format!("Invalid permission '{}'", token),
        )
    }

    /// Creates a missing option error.
    pub fn missing_option(option: &str) -> Self {
        Self::new(
            HostingErrorKind::MissingOption,
            format!("Missing required option '{}'", option),
        )
    }

    /// Creates a cross-repository pull request error.
    pub fn cross_repo_mismatch(source: &str, target: &str) -> Self {
        Self::new(
            HostingErrorKind::CrossRepoMismatch,
            format!(
                "Cannot open a pull request from '{}' to '{}': not the same repository or a fork",
                source, target
            ),
        )
    }

    /// Creates a missing role error.
    pub fn missing_role() -> Self {
        Self::new(HostingErrorKind::MissingRole, "Missing required option 'role'")
    }

    /// Creates a team not found error.
    pub fn team_not_found(name: &str) -> Self {
        Self::new(HostingErrorKind::TeamNotFound, format!("No such team '{}'", name))
    }

    /// Creates a malformed resource error.
    pub fn malformed(resource: &str, field: &str) -> Self {
        Self::new(
            HostingErrorKind::MalformedResource,
            format!("Malformed {} resource: missing '{}'", resource, field),
        )
    }
}

/// Checks if an error is a rate limit error.
pub fn is_rate_limit_error(error: &HostingError) -> bool {
    matches!(
        error.kind(),
        HostingErrorKind::PrimaryRateLimitExceeded | HostingErrorKind::SecondaryRateLimitExceeded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = HostingError::new(HostingErrorKind::NotFound, "Repository not found")
            .with_status(404)
            .with_request_id("abc123");

        let display = format!("{}", error);
        assert!(display.contains("not_found"));
        assert!(display.contains("Repository not found"));
        assert!(display.contains("404"));
        assert!(display.contains("abc123"));
    }

    #[test]
    fn test_is_retryable() {
        let retryable = HostingError::new(HostingErrorKind::Timeout, "timeout");
        assert!(retryable.is_retryable());

        let not_retryable = HostingError::not_found("not found");
        assert!(!not_retryable.is_retryable());

        // Caller contract violations are never retried.
        assert!(!HostingError::team_not_found("devs").is_retryable());
        assert!(!HostingError::invalid_reference("x").is_retryable());
    }

    #[test]
    fn test_from_response() {
        let error = HostingError::from_response(
            404,
            "Not Found".to_string(),
            Some("https://docs.github.com".to_string()),
            Some("req-123".to_string()),
        );

        assert_eq!(*error.kind(), HostingErrorKind::NotFound);
        assert!(error.is_not_found());
        assert_eq!(error.status_code(), Some(404));
        assert_eq!(error.documentation_url(), Some("https://docs.github.com"));
        assert_eq!(error.request_id(), Some("req-123"));
    }

    #[test]
    fn test_domain_errors_name_the_subject() {
        let error = HostingError::invalid_permission("bogus");
        assert_eq!(*error.kind(), HostingErrorKind::InvalidPermission);
        assert!(error.message().contains("bogus"));

        let error = HostingError::team_not_found("release-managers");
        assert!(error.to_string().contains("release-managers"));

        let error = HostingError::missing_option("team_name");
        assert!(error.to_string().contains("team_name"));
    }

    #[test]
    fn test_rate_limit_errors() {
        let info = RateLimitInfo {
            limit: 5000,
            remaining: 0,
            reset_at: Utc::now() + chrono::Duration::seconds(30),
            retry_after: Some(12),
            resource: None,
        };
        let error = HostingError::rate_limited(info);
        assert!(is_rate_limit_error(&error));
        assert_eq!(error.retry_after(), Some(12));
        assert_eq!(error.rate_limit().map(|r| r.remaining), Some(0));

        let secondary = HostingError::from_response(429, "slow down".into(), None, None);
        assert!(is_rate_limit_error(&secondary));
    }
}
