//! Raw resource shapes returned by the hosting API.
//!
//! These mirror the upstream JSON closely and are deliberately lenient:
//! fields the domain model requires are still `Option`s here so that a
//! missing field surfaces as a `MalformedResource` error from the adapters
//! rather than as an opaque deserialization failure.

use serde::{Deserialize, Serialize};

/// Upstream user (minimal representation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    /// User ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Username (login).
    #[serde(default)]
    pub login: Option<String>,
    /// User type (User, Organization, Bot).
    #[serde(rename = "type", default)]
    pub user_type: Option<String>,
    /// Site admin flag.
    #[serde(default)]
    pub site_admin: Option<bool>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Profile URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

/// Upstream repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRepo {
    /// Repository ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Repository name.
    #[serde(default)]
    pub name: Option<String>,
    /// Full name (owner/repo).
    #[serde(default)]
    pub full_name: Option<String>,
    /// Owner information.
    #[serde(default)]
    pub owner: Option<RawUser>,
    /// Repository description.
    #[serde(default)]
    pub description: Option<String>,
    /// Homepage URL.
    #[serde(default)]
    pub homepage: Option<String>,
    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
    /// Whether issues are enabled.
    #[serde(default)]
    pub has_issues: bool,
    /// Whether wiki is enabled.
    #[serde(default)]
    pub has_wiki: bool,
    /// Whether downloads are enabled.
    #[serde(default)]
    pub has_downloads: bool,
    /// Default branch.
    #[serde(default)]
    pub default_branch: Option<String>,
    /// Clone URL.
    #[serde(default)]
    pub clone_url: Option<String>,
    /// HTML URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

/// Organization summary embedded in team resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrganization {
    /// Organization login.
    #[serde(default)]
    pub login: Option<String>,
    /// Organization ID.
    #[serde(default)]
    pub id: Option<u64>,
}

/// Upstream team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTeam {
    /// Team ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Team name.
    #[serde(default)]
    pub name: Option<String>,
    /// Team slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Team description.
    #[serde(default)]
    pub description: Option<String>,
    /// Privacy level.
    #[serde(default)]
    pub privacy: Option<String>,
    /// Default repository permission.
    #[serde(default)]
    pub permission: Option<String>,
    /// Owning organization (present on single-team responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<RawOrganization>,
}

/// Upstream team membership.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMembership {
    /// Membership role (`member` or `maintainer`).
    #[serde(default)]
    pub role: Option<String>,
    /// Membership state (`active` or `pending`).
    #[serde(default)]
    pub state: Option<String>,
    /// Membership URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Member account id, when the endpoint includes it.
    #[serde(default)]
    pub id: Option<u64>,
    /// Member account type, when the endpoint includes it.
    #[serde(default, rename = "type")]
    pub user_type: Option<String>,
}

/// Branch side of an upstream pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPullRequestRef {
    /// `owner:branch` label.
    #[serde(default)]
    pub label: Option<String>,
    /// Branch name.
    #[serde(rename = "ref", default)]
    pub ref_name: Option<String>,
    /// Commit SHA.
    #[serde(default)]
    pub sha: Option<String>,
    /// Repository the branch lives in.
    #[serde(default)]
    pub repo: Option<RawRepo>,
}

/// Upstream pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPullRequest {
    /// PR ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// PR number.
    #[serde(default)]
    pub number: Option<u64>,
    /// PR state (`open` or `closed`).
    #[serde(default)]
    pub state: Option<String>,
    /// PR title.
    #[serde(default)]
    pub title: Option<String>,
    /// PR body.
    #[serde(default)]
    pub body: Option<String>,
    /// Head (source) branch.
    #[serde(default)]
    pub head: Option<RawPullRequestRef>,
    /// Base (target) branch.
    #[serde(default)]
    pub base: Option<RawPullRequestRef>,
    /// Whether the PR is merged.
    #[serde(default)]
    pub merged: Option<bool>,
    /// Merged time.
    #[serde(default)]
    pub merged_at: Option<String>,
    /// HTML URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

/// Result of a merge call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMergeResult {
    /// Merge commit SHA.
    #[serde(default)]
    pub sha: Option<String>,
    /// Whether the merge happened.
    #[serde(default)]
    pub merged: bool,
    /// Status message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Upstream label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLabel {
    /// Label ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Label name.
    #[serde(default)]
    pub name: Option<String>,
    /// Label color (hex, no leading `#`).
    #[serde(default)]
    pub color: Option<String>,
    /// Label description.
    #[serde(default)]
    pub description: Option<String>,
    /// Default label flag.
    #[serde(default)]
    pub default: bool,
}

/// Upstream issue (as returned by issue search).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIssue {
    /// Issue ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Issue or PR number.
    #[serde(default)]
    pub number: Option<u64>,
    /// Issue title.
    #[serde(default)]
    pub title: Option<String>,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<RawLabel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_user() {
        let json = r#"{
            "id": 1,
            "login": "octocat",
            "node_id": "MDQ6VXNlcjE=",
            "avatar_url": "https://github.com/images/error/octocat_happy.gif",
            "type": "User",
            "site_admin": false,
            "html_url": "https://github.com/octocat"
        }"#;

        let user: RawUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.login.as_deref(), Some("octocat"));
        assert_eq!(user.id, Some(1));
        assert_eq!(user.user_type.as_deref(), Some("User"));
    }

    #[test]
    fn test_deserialize_partial_repo() {
        // Unknown and missing fields are both tolerated here.
        let repo: RawRepo = serde_json::from_str(r#"{"name": "hello", "stargazers_count": 3}"#).unwrap();
        assert_eq!(repo.name.as_deref(), Some("hello"));
        assert!(repo.full_name.is_none());
        assert!(!repo.private);
    }

    #[test]
    fn test_pull_request_ref_field_name() {
        let pr_ref: RawPullRequestRef =
            serde_json::from_str(r#"{"label": "fork:feature", "ref": "feature", "sha": "abc"}"#)
                .unwrap();
        assert_eq!(pr_ref.ref_name.as_deref(), Some("feature"));
    }
}
