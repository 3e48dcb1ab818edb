//! Configuration types for the hosting client and provider.

use crate::auth::AuthMethod;
use crate::errors::{HostingError, HostingErrorKind};
use serde::Deserialize;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default API version (date-based).
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = "integrations-hosting/0.1.0";

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,
    /// Initial backoff delay.
    pub initial_backoff: Duration,
    /// Maximum backoff delay.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
    /// Jitter factor (0.0 to 1.0).
    pub jitter: f64,
    /// Enable retries.
    pub enabled: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: 0.1,
            enabled: true,
        }
    }
}

/// Rate limit configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Wait for the reset time when the remaining budget hits zero.
    pub wait_on_exhaustion: bool,
    /// Enable rate limit tracking.
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            wait_on_exhaustion: true,
            enabled: true,
        }
    }
}

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections per host.
    pub max_idle_per_host: usize,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 20,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Hosting client configuration.
#[derive(Debug, Clone)]
pub struct HostingConfig {
    /// API base URL.
    pub base_url: String,
    /// API version header.
    pub api_version: String,
    /// Authentication method.
    pub auth: Option<AuthMethod>,
    /// Default namespace for unqualified repository names.
    pub organization: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Rate limit configuration.
    pub rate_limit: RateLimitConfig,
    /// Connection pool configuration.
    pub pool: PoolConfig,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            auth: None,
            organization: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl HostingConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> HostingConfigBuilder {
        HostingConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), HostingError> {
        if self.base_url.is_empty() {
            return Err(HostingError::new(
                HostingErrorKind::InvalidBaseUrl,
                "Base URL cannot be empty",
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(HostingError::new(
                HostingErrorKind::InvalidBaseUrl,
                "Base URL must start with http:// or https://",
            ));
        }

        if self.user_agent.is_empty() {
            return Err(HostingError::configuration("User-Agent is required by the API"));
        }

        if matches!(self.organization.as_deref(), Some(org) if org.is_empty() || org.contains('/'))
        {
            return Err(HostingError::configuration(
                "Organization must be a single non-empty namespace",
            ));
        }

        Ok(())
    }
}

/// Builder for HostingConfig.
#[derive(Debug, Default)]
pub struct HostingConfigBuilder {
    base_url: Option<String>,
    api_version: Option<String>,
    auth: Option<AuthMethod>,
    organization: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    retry: Option<RetryConfig>,
    rate_limit: Option<RateLimitConfig>,
    pool: Option<PoolConfig>,
}

impl HostingConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the default organization.
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Disables retries.
    pub fn no_retry(mut self) -> Self {
        self.retry = Some(RetryConfig {
            enabled: false,
            ..Default::default()
        });
        self
    }

    /// Sets the rate limit configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Sets the connection pool configuration.
    pub fn pool(mut self, config: PoolConfig) -> Self {
        self.pool = Some(config);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<HostingConfig, HostingError> {
        let config = HostingConfig {
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            auth: self.auth,
            organization: self.organization,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            retry: self.retry.unwrap_or_default(),
            rate_limit: self.rate_limit.unwrap_or_default(),
            pool: self.pool.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Flat provider settings, as read from a settings file or map.
///
/// Exactly one credential mode may be present: `access_token`,
/// `login` + `password`, or `client_id` + `client_secret`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    /// Access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Account login.
    #[serde(default)]
    pub login: Option<String>,
    /// Account password.
    #[serde(default)]
    pub password: Option<String>,
    /// OAuth application client ID.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth application client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Default namespace.
    #[serde(default)]
    pub organization: Option<String>,
    /// API base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderSettings {
    /// Resolves the credential mode and builds a validated configuration.
    pub fn into_config(self) -> Result<HostingConfig, HostingError> {
        let auth = self.credentials()?;
        let mut builder = HostingConfig::builder().auth(auth);
        if let Some(org) = self.organization {
            builder = builder.organization(org);
        }
        if let Some(url) = self.base_url {
            builder = builder.base_url(url);
        }
        builder.build()
    }

    fn credentials(&self) -> Result<AuthMethod, HostingError> {
        let token = self.access_token.as_ref().map(AuthMethod::token);
        let basic = pair(&self.login, &self.password, "login", "password")?
            .map(|(l, p)| AuthMethod::basic(l, p));
        let app = pair(&self.client_id, &self.client_secret, "client_id", "client_secret")?
            .map(|(id, secret)| AuthMethod::oauth_app(id, secret));

        let mut modes = [token, basic, app].into_iter().flatten();
        match (modes.next(), modes.next()) {
            (Some(method), None) => Ok(method),
            (None, _) => Err(HostingError::new(
                HostingErrorKind::MissingAuth,
                "One of access_token, login/password or client_id/client_secret is required",
            )),
            (Some(_), Some(_)) => Err(HostingError::new(
                HostingErrorKind::ConflictingCredentials,
                "Credential modes are mutually exclusive",
            )),
        }
    }
}

fn pair<'a>(
    first: &'a Option<String>,
    second: &'a Option<String>,
    first_name: &str,
    second_name: &str,
) -> Result<Option<(&'a str, &'a str)>, HostingError> {
    match (first, second) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        _ => Err(HostingError::new(
            HostingErrorKind::ConflictingCredentials,
            format!("'{}' and '{}' must be supplied together", first_name, second_name),
        )),
    }
}
