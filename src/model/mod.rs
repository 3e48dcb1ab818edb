//! Provider-agnostic domain model.
//!
//! Values in this module are built by the adapters from raw upstream
//! resources and are never mutated afterwards; an update yields a new value.

use crate::errors::{HostingError, HostingResult};
use crate::permission::TeamRole;
use serde::{Deserialize, Serialize};

/// Hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    /// Short name.
    pub name: String,
    /// `namespace/name`.
    pub full_name: String,
    /// Description.
    pub description: Option<String>,
    /// Homepage URL.
    pub homepage: Option<String>,
    /// Whether the repository is private.
    pub is_private: bool,
    /// Whether issues are enabled.
    pub has_issues: bool,
    /// Whether the wiki is enabled.
    pub has_wiki: bool,
    /// Whether downloads are enabled.
    pub has_downloads: bool,
    /// Default branch.
    pub default_branch: Option<String>,
    /// Clone URL.
    pub clone_url: Option<String>,
}

impl Repo {
    /// Namespace part of the full name.
    pub fn namespace(&self) -> &str {
        self.full_name
            .rsplit_once('/')
            .map(|(namespace, _)| namespace)
            .unwrap_or_default()
    }
}

/// Team within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Name.
    pub name: String,
    /// Platform identifier, required by every mutating team call.
    pub id: u64,
    /// Owning organization.
    pub organization: Option<String>,
    /// URL slug.
    pub slug: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Pull request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Open.
    Open,
    /// Closed without merging.
    Closed,
    /// Merged.
    Merged,
}

/// Pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Full name of the target repository.
    pub repo_full_name: String,
    /// Pull request number.
    pub id: u64,
    /// Current state.
    pub state: PullRequestState,
    /// Head branch.
    pub source_ref: String,
    /// Base branch.
    pub target_ref: String,
    /// Title.
    pub title: String,
    /// Body.
    pub body: Option<String>,
}

/// A user's membership in a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Account login.
    pub login: String,
    /// Account id.
    pub id: Option<u64>,
    /// Account type (`User`, `Bot`).
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    /// Role within the team.
    pub role: TeamRole,
    /// `active` or `pending`.
    pub state: Option<String>,
}

/// Public projection of a user.
///
/// Only these fields are ever returned from user enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Account login.
    pub login: String,
    /// Platform identifier.
    pub id: u64,
    /// Account type (`User`, `Organization`, `Bot`).
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    /// Whether the account is a site administrator.
    pub site_admin: bool,
}

/// Options for creating a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoOptions {
    /// Description.
    pub description: Option<String>,
    /// Homepage URL.
    pub homepage: Option<String>,
    /// Whether the repository is private.
    pub private: Option<bool>,
    /// Whether issues are enabled.
    pub has_issues: Option<bool>,
    /// Whether the wiki is enabled.
    pub has_wiki: Option<bool>,
    /// Whether downloads are enabled.
    pub has_downloads: Option<bool>,
    /// Create an initial commit with a README.
    pub auto_init: Option<bool>,
}

/// Changes to apply to a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoUpdate {
    /// Renames the repository.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Homepage URL.
    pub homepage: Option<String>,
    /// Whether the repository is private.
    pub private: Option<bool>,
    /// Whether issues are enabled.
    pub has_issues: Option<bool>,
    /// Whether the wiki is enabled.
    pub has_wiki: Option<bool>,
    /// Whether downloads are enabled.
    pub has_downloads: Option<bool>,
    /// Default branch.
    pub default_branch: Option<String>,
}

impl RepoUpdate {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Repository search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSearch {
    /// Sort field (`stars`, `forks`, `updated`).
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub order: Option<String>,
}

/// Options for creating a team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamOptions {
    /// Description.
    pub description: Option<String>,
    /// `secret` or `closed`.
    pub privacy: Option<String>,
}

/// Changes to apply to a team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamUpdate {
    /// Renames the team.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Privacy level.
    pub privacy: Option<String>,
    /// Default repository permission token; normalized before sending.
    pub permission: Option<String>,
}

/// User enumeration options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearch {
    /// Team whose members are listed. Required.
    pub team_name: Option<String>,
}

impl UserSearch {
    /// Lists members of `team_name`.
    pub fn team(team_name: impl Into<String>) -> Self {
        Self {
            team_name: Some(team_name.into()),
        }
    }
}

/// Which pull requests to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PullRequestFilter {
    /// Open.
    #[default]
    Open,
    /// Closed, including merged.
    Closed,
    /// Any state.
    All,
}

impl PullRequestFilter {
    /// Platform token for this filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Default pull request title.
pub const DEFAULT_PULL_REQUEST_TITLE: &str = "New Pull Request";

/// Default pull request body.
pub const DEFAULT_PULL_REQUEST_BODY: &str = "Pull request opened by integrations-hosting.";

/// Options for opening a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestOptions {
    /// Title.
    pub title: Option<String>,
    /// Body.
    pub body: Option<String>,
}

impl PullRequestOptions {
    /// Title, or the default.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_PULL_REQUEST_TITLE)
    }

    /// Body, or the default.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or(DEFAULT_PULL_REQUEST_BODY)
    }
}

/// Result of merging a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Whether the merge happened.
    pub merged: bool,
    /// Merge commit SHA.
    pub sha: Option<String>,
    /// Status message.
    pub message: Option<String>,
}

/// A branch in a specific repository, written `namespace/repo:branch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Owning namespace.
    pub namespace: String,
    /// Repository name.
    pub repo: String,
    /// Branch name.
    pub branch: String,
}

impl BranchRef {
    /// Parses `namespace/repo:branch`.
    ///
    /// The branch is everything after the first `:` and may itself contain
    /// `/`. Every part must be non-empty.
    pub fn parse(reference: &str) -> HostingResult<Self> {
        let invalid = || HostingError::invalid_reference(reference);

        let (repo_part, branch) = reference.split_once(':').ok_or_else(invalid)?;
        let (namespace, repo) = repo_part.split_once('/').ok_or_else(invalid)?;

        if namespace.is_empty() || repo.is_empty() || repo.contains('/') || branch.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            namespace: namespace.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
        })
    }

    /// `namespace/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.namespace, self.repo)
    }

    /// How this branch is named in a pull request targeting `base`.
    ///
    /// Same-namespace branches are referenced bare; branches in a fork
    /// carry a `namespace:` prefix.
    pub fn head_for(&self, base: &BranchRef) -> String {
        if self.namespace == base.namespace {
            self.branch.clone()
        } else {
            format!("{}:{}", self.namespace, self.branch)
        }
    }
}

/// Label metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMetadata {
    /// Name.
    pub name: String,
    /// Six hex digits, no leading `#`.
    pub color: Option<String>,
    /// Description.
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HostingErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_branch_ref_parse() {
        assert_eq!(
            BranchRef::parse("acme/widgets:feature/login").unwrap(),
            BranchRef {
                namespace: "acme".to_string(),
                repo: "widgets".to_string(),
                branch: "feature/login".to_string(),
            }
        );
    }

    #[test_case("widgets:main" ; "no namespace")]
    #[test_case("acme/widgets" ; "no branch")]
    #[test_case("acme/widgets:" ; "empty branch")]
    #[test_case("/widgets:main" ; "empty namespace")]
    #[test_case("acme/:main" ; "empty repo")]
    #[test_case("a/b/c:main" ; "nested repo")]
    fn test_branch_ref_invalid(reference: &str) {
        let err = BranchRef::parse(reference).unwrap_err();
        assert_eq!(*err.kind(), HostingErrorKind::InvalidReference);
    }

    #[test]
    fn test_head_for() {
        let base = BranchRef::parse("acme/widgets:main").unwrap();
        let same = BranchRef::parse("acme/widgets:feature").unwrap();
        let fork = BranchRef::parse("octo/widgets:feature").unwrap();

        assert_eq!(same.head_for(&base), "feature");
        assert_eq!(fork.head_for(&base), "octo:feature");
    }

    #[test]
    fn test_repo_update_is_empty() {
        assert!(RepoUpdate::default().is_empty());
        assert!(!RepoUpdate {
            private: Some(false),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_pull_request_option_defaults() {
        let options = PullRequestOptions::default();
        assert_eq!(options.title(), DEFAULT_PULL_REQUEST_TITLE);
        assert_eq!(options.body(), DEFAULT_PULL_REQUEST_BODY);

        let options = PullRequestOptions {
            title: Some("Fix".to_string()),
            body: None,
        };
        assert_eq!(options.title(), "Fix");
    }

    #[test]
    fn test_repo_namespace() {
        let repo = Repo {
            name: "widgets".to_string(),
            full_name: "acme/widgets".to_string(),
            description: None,
            homepage: None,
            is_private: false,
            has_issues: true,
            has_wiki: false,
            has_downloads: false,
            default_branch: None,
            clone_url: None,
        };
        assert_eq!(repo.namespace(), "acme");
    }
}
