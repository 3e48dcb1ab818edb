//! Conversion from raw upstream resources to the domain model.
//!
//! Adapters do no I/O. `None` in gives `None` out; a resource missing a
//! required field is a `MalformedResource` error.

use crate::errors::{HostingError, HostingResult};
use crate::model::{
    Membership, MergeOutcome, PullRequest, PullRequestState, Repo, TagMetadata, Team, UserSummary,
};
use crate::permission::TeamRole;
use crate::types::{RawLabel, RawMembership, RawMergeResult, RawPullRequest, RawRepo, RawTeam, RawUser};

/// Adapts a raw repository.
///
/// `full_name` must be `<namespace>/<name>`.
pub fn adapt_repo(raw: Option<RawRepo>) -> HostingResult<Option<Repo>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(None),
    };

    let name = required(raw.name, "repository", "name")?;
    let full_name = required(raw.full_name, "repository", "full_name")?;

    match full_name.split_once('/') {
        Some((namespace, short)) if !namespace.is_empty() && short == name => {}
        _ => return Err(HostingError::malformed("repository", "full_name")),
    }

    Ok(Some(Repo {
        name,
        full_name,
        description: raw.description,
        homepage: raw.homepage,
        is_private: raw.private,
        has_issues: raw.has_issues,
        has_wiki: raw.has_wiki,
        has_downloads: raw.has_downloads,
        default_branch: raw.default_branch,
        clone_url: raw.clone_url,
    }))
}

/// Adapts a raw team. Name and id are required.
pub fn adapt_team(raw: Option<RawTeam>) -> HostingResult<Option<Team>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(None),
    };

    Ok(Some(Team {
        name: required(raw.name, "team", "name")?,
        id: required(raw.id, "team", "id")?,
        organization: raw.organization.and_then(|org| org.login),
        slug: raw.slug,
        description: raw.description,
    }))
}

/// Adapts a raw pull request.
///
/// The state is `Merged` when the upstream marks the pull request merged or
/// reports a merge time, otherwise it follows the upstream `open`/`closed`.
pub fn adapt_pull_request(raw: Option<RawPullRequest>) -> HostingResult<Option<PullRequest>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(None),
    };

    let head = required(raw.head, "pull request", "head")?;
    let base = required(raw.base, "pull request", "base")?;

    let repo_full_name = base
        .repo
        .and_then(|repo| repo.full_name)
        .ok_or_else(|| HostingError::malformed("pull request", "base.repo.full_name"))?;

    let state = if raw.merged.unwrap_or(false) || raw.merged_at.is_some() {
        PullRequestState::Merged
    } else {
        match required(raw.state, "pull request", "state")?.as_str() {
            "open" => PullRequestState::Open,
            "closed" => PullRequestState::Closed,
            _ => return Err(HostingError::malformed("pull request", "state")),
        }
    };

    Ok(Some(PullRequest {
        repo_full_name,
        id: required(raw.number, "pull request", "number")?,
        state,
        source_ref: required(head.ref_name, "pull request", "head.ref")?,
        target_ref: required(base.ref_name, "pull request", "base.ref")?,
        title: required(raw.title, "pull request", "title")?,
        body: raw.body,
    }))
}

/// Adapts a membership for `login`. An absent role reads as `member`.
pub fn adapt_membership(login: &str, raw: RawMembership) -> Membership {
    Membership {
        login: login.to_string(),
        id: raw.id,
        user_type: raw.user_type,
        role: raw
            .role
            .as_deref()
            .map(TeamRole::normalize)
            .unwrap_or_default(),
        state: raw.state,
    }
}

/// Projects a raw user onto the public allow-list.
pub fn adapt_user_summary(raw: RawUser) -> HostingResult<UserSummary> {
    Ok(UserSummary {
        login: required(raw.login, "user", "login")?,
        id: required(raw.id, "user", "id")?,
        user_type: raw.user_type,
        site_admin: raw.site_admin.unwrap_or(false),
    })
}

/// Adapts a merge result.
pub fn adapt_merge(raw: RawMergeResult) -> MergeOutcome {
    MergeOutcome {
        merged: raw.merged,
        sha: raw.sha,
        message: raw.message,
    }
}

/// Adapts a label. The name is required.
pub fn adapt_label(raw: RawLabel) -> HostingResult<TagMetadata> {
    Ok(TagMetadata {
        name: required(raw.name, "label", "name")?,
        color: raw.color,
        description: raw.description,
    })
}

fn required<T>(value: Option<T>, resource: &str, field: &str) -> HostingResult<T> {
    value.ok_or_else(|| HostingError::malformed(resource, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HostingErrorKind;
    use crate::types::{RawOrganization, RawPullRequestRef};
    use pretty_assertions::assert_eq;

    fn raw_repo() -> RawRepo {
        RawRepo {
            id: Some(1),
            name: Some("widgets".to_string()),
            full_name: Some("acme/widgets".to_string()),
            private: true,
            has_issues: true,
            default_branch: Some("main".to_string()),
            clone_url: Some("https://example.test/acme/widgets.git".to_string()),
            ..Default::default()
        }
    }

    fn raw_pull(state: &str) -> RawPullRequest {
        RawPullRequest {
            id: Some(99),
            number: Some(7),
            state: Some(state.to_string()),
            title: Some("Add login".to_string()),
            body: Some("Details".to_string()),
            head: Some(RawPullRequestRef {
                ref_name: Some("feature".to_string()),
                ..Default::default()
            }),
            base: Some(RawPullRequestRef {
                ref_name: Some("main".to_string()),
                repo: Some(raw_repo()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_adapt_none() {
        assert_eq!(adapt_repo(None).unwrap(), None);
        assert_eq!(adapt_team(None).unwrap(), None);
        assert_eq!(adapt_pull_request(None).unwrap(), None);
    }

    #[test]
    fn test_adapt_repo() {
        let repo = adapt_repo(Some(raw_repo())).unwrap().unwrap();
        assert_eq!(
            repo,
            Repo {
                name: "widgets".to_string(),
                full_name: "acme/widgets".to_string(),
                description: None,
                homepage: None,
                is_private: true,
                has_issues: true,
                has_wiki: false,
                has_downloads: false,
                default_branch: Some("main".to_string()),
                clone_url: Some("https://example.test/acme/widgets.git".to_string()),
            }
        );
    }

    #[test]
    fn test_adapt_repo_missing_name() {
        let raw = RawRepo {
            name: None,
            ..raw_repo()
        };
        let err = adapt_repo(Some(raw)).unwrap_err();
        assert_eq!(*err.kind(), HostingErrorKind::MalformedResource);
    }

    #[test]
    fn test_adapt_repo_inconsistent_full_name() {
        let raw = RawRepo {
            full_name: Some("acme/gadgets".to_string()),
            ..raw_repo()
        };
        assert!(adapt_repo(Some(raw)).is_err());
    }

    #[test]
    fn test_adapt_team() {
        let raw = RawTeam {
            id: Some(42),
            name: Some("Core".to_string()),
            slug: Some("core".to_string()),
            organization: Some(RawOrganization {
                login: Some("acme".to_string()),
                id: Some(1),
            }),
            ..Default::default()
        };

        let team = adapt_team(Some(raw)).unwrap().unwrap();
        assert_eq!(team.id, 42);
        assert_eq!(team.name, "Core");
        assert_eq!(team.organization.as_deref(), Some("acme"));
    }

    #[test]
    fn test_adapt_team_requires_id() {
        let raw = RawTeam {
            name: Some("Core".to_string()),
            ..Default::default()
        };
        let err = adapt_team(Some(raw)).unwrap_err();
        assert_eq!(*err.kind(), HostingErrorKind::MalformedResource);
    }

    #[test]
    fn test_adapt_pull_request_states() {
        let open = adapt_pull_request(Some(raw_pull("open"))).unwrap().unwrap();
        assert_eq!(open.state, PullRequestState::Open);
        assert_eq!(open.repo_full_name, "acme/widgets");
        assert_eq!(open.id, 7);
        assert_eq!(open.source_ref, "feature");
        assert_eq!(open.target_ref, "main");

        let closed = adapt_pull_request(Some(raw_pull("closed"))).unwrap().unwrap();
        assert_eq!(closed.state, PullRequestState::Closed);

        let merged = RawPullRequest {
            merged_at: Some("2024-01-01T00:00:00Z".to_string()),
            ..raw_pull("closed")
        };
        assert_eq!(
            adapt_pull_request(Some(merged)).unwrap().unwrap().state,
            PullRequestState::Merged
        );
    }

    #[test]
    fn test_adapt_pull_request_missing_base() {
        let raw = RawPullRequest {
            base: None,
            ..raw_pull("open")
        };
        assert!(adapt_pull_request(Some(raw)).is_err());
    }

    #[test]
    fn test_adapt_membership() {
        let raw = RawMembership {
            role: Some("maintainer".to_string()),
            state: Some("active".to_string()),
            url: None,
            id: Some(583231),
            user_type: Some("User".to_string()),
        };
        let membership = adapt_membership("octocat", raw);
        assert_eq!(membership.role, TeamRole::Maintainer);
        assert_eq!(membership.login, "octocat");
        assert_eq!(membership.id, Some(583231));
        assert_eq!(membership.user_type.as_deref(), Some("User"));
    }

    #[test]
    fn test_adapt_user_summary() {
        let raw = RawUser {
            id: Some(1),
            login: Some("octocat".to_string()),
            user_type: Some("User".to_string()),
            site_admin: Some(false),
            avatar_url: Some("https://example.test/a.png".to_string()),
            html_url: None,
        };
        assert_eq!(
            adapt_user_summary(raw).unwrap(),
            UserSummary {
                login: "octocat".to_string(),
                id: 1,
                user_type: Some("User".to_string()),
                site_admin: false,
            }
        );
    }
}
