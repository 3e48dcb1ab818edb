//! # Hosting Integration Library
//!
//! Provider-agnostic management of repositories, teams, team membership,
//! access permissions and pull requests on a git hosting platform:
//! - A [`HostingProvider`] contract with a GitHub implementation
//! - Repository name resolution against a default organization
//! - Normalized permission vocabulary (`read`/`write`/`admin`)
//! - A read-through team cache (teams are addressed by name)
//! - Bulk pagination toggled around whole-collection reads
//! - Labels exposed as tags through [`TaggingProvider`]
//! - Retry and rate-limit tracking on the HTTP client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_hosting::{AuthMethod, GitHubHostingProvider, HostingConfig, HostingProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HostingConfig::builder()
//!         .auth(AuthMethod::token("ghp_xxxxxxxxxxxx"))
//!         .organization("acme")
//!         .build()?;
//!
//!     let provider = GitHubHostingProvider::from_config(config)?;
//!
//!     // "widgets" resolves to "acme/widgets"
//!     if let Some(repo) = provider.read_repo("widgets").await? {
//!         println!("{}", repo.full_name);
//!     }
//!
//!     provider.set_team_permission("Core", "widgets", Some("write")).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// HTTP client and transport
pub mod client;

// Pagination handling
pub mod pagination;

// API Services
pub mod services;

// Resilience patterns
pub mod resilience;

// Observability
pub mod observability;

// Domain layer
pub mod adapters;
pub mod cache;
pub mod model;
pub mod naming;
pub mod permission;

// Providers
pub mod provider;
pub mod tagging;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use auth::{AuthManager, AuthMethod};
pub use cache::TeamCache;
pub use client::{GitHubClient, GitHubClientBuilder, HostingClient};
pub use config::{HostingConfig, HostingConfigBuilder, ProviderSettings};
pub use errors::{HostingError, HostingErrorKind, HostingResult};
pub use model::*;
pub use naming::NameResolver;
pub use pagination::{AutoPaginate, PaginationLinks};
pub use permission::{Permission, TeamRole};
pub use provider::{GitHubHostingProvider, HostingProvider};
pub use tagging::{GitHubTaggingProvider, TaggingProvider};
