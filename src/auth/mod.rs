//! Authentication mechanisms for the hosting API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Authentication method for the hosting API.
///
/// The three variants are mutually exclusive credential modes.
#[derive(Clone)]
pub enum AuthMethod {
    /// Personal or OAuth access token.
    Token(SecretString),
    /// Username and password.
    Basic {
        /// Account login.
        login: String,
        /// Account password.
        password: SecretString,
    },
    /// OAuth application credentials.
    OAuthApp {
        /// Application client ID.
        client_id: String,
        /// Application client secret.
        client_secret: SecretString,
    },
}

impl AuthMethod {
    /// Creates a token authentication method.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SecretString::new(token.into()))
    }

    /// Creates a basic (login/password) authentication method.
    pub fn basic(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            login: login.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Creates an OAuth application authentication method.
    pub fn oauth_app(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::OAuthApp {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }

    /// Gets a redacted label for logging.
    pub fn token_prefix(&self) -> &'static str {
        match self {
            Self::Token(t) => {
                let exposed = t.expose_secret();
                if exposed.starts_with("ghp_") {
                    "ghp_***"
                } else if exposed.starts_with("github_pat_") {
                    "github_pat_***"
                } else if exposed.starts_with("gho_") {
                    "gho_***"
                } else {
                    "***"
                }
            }
            Self::Basic { .. } => "basic",
            Self::OAuthApp { .. } => "oauth_app",
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&self.token_prefix()).finish(),
            Self::Basic { login, .. } => f
                .debug_struct("Basic")
                .field("login", login)
                .finish_non_exhaustive(),
            Self::OAuthApp { client_id, .. } => f
                .debug_struct("OAuthApp")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

/// Renders the `Authorization` header for a configured method.
pub struct AuthManager {
    method: AuthMethod,
}

impl AuthManager {
    /// Creates a new authentication manager.
    pub fn new(method: AuthMethod) -> Self {
        Self { method }
    }

    /// Gets the authentication method.
    pub fn method(&self) -> &AuthMethod {
        &self.method
    }

    /// Generates the Authorization header value.
    pub fn auth_header(&self) -> String {
        match &self.method {
            AuthMethod::Token(token) => format!("Bearer {}", token.expose_secret()),
            AuthMethod::Basic { login, password } => basic_header(login, password),
            AuthMethod::OAuthApp {
                client_id,
                client_secret,
            } => basic_header(client_id, client_secret),
        }
    }
}

fn basic_header(user: &str, secret: &SecretString) -> String {
    let raw = format!("{}:{}", user, secret.expose_secret());
    format!("Basic {}", STANDARD.encode(raw))
}
