//! Team, team-repository and team-membership operations.
//!
//! Teams are addressed by their numeric ID; the upstream API has no way to
//! fetch a team by display name.

use crate::client::GitHubClient;
use crate::errors::HostingResult;
use crate::pagination::PaginationParams;
use crate::services::repositories::PermissionRequest;
use crate::types::{RawMembership, RawTeam, RawUser};
use serde::Serialize;

/// Service for team operations.
pub struct TeamsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> TeamsService<'a> {
    /// Creates a new teams service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists teams in an organization. Follows every page in bulk mode.
    pub async fn list(&self, org: &str) -> HostingResult<Vec<RawTeam>> {
        self.client
            .get_all(&format!("/orgs/{}/teams", org), &PaginationParams::new())
            .await
    }

    /// Creates a team.
    pub async fn create(&self, org: &str, request: &CreateTeamRequest) -> HostingResult<RawTeam> {
        self.client.post(&format!("/orgs/{}/teams", org), request).await
    }

    /// Updates a team.
    pub async fn update(&self, team_id: u64, request: &UpdateTeamRequest) -> HostingResult<RawTeam> {
        self.client.patch(&format!("/teams/{}", team_id), request).await
    }

    /// Deletes a team.
    pub async fn delete(&self, team_id: u64) -> HostingResult<()> {
        self.client.delete(&format!("/teams/{}", team_id)).await
    }

    // Team repos

    /// Grants a team access to a repository.
    pub async fn add_repo(&self, team_id: u64, full_name: &str, permission: &str) -> HostingResult<()> {
        let request = PermissionRequest {
            permission: permission.to_string(),
        };
        self.client
            .put_no_response(&format!("/teams/{}/repos/{}", team_id, full_name), &request)
            .await
    }

    /// Revokes a team's access to a repository.
    pub async fn remove_repo(&self, team_id: u64, full_name: &str) -> HostingResult<()> {
        self.client
            .delete(&format!("/teams/{}/repos/{}", team_id, full_name))
            .await
    }

    // Team members

    /// Lists members of a team. Follows every page in bulk mode.
    pub async fn list_members(&self, team_id: u64) -> HostingResult<Vec<RawUser>> {
        self.client
            .get_all(&format!("/teams/{}/members", team_id), &PaginationParams::new())
            .await
    }

    /// Gets team membership for a user.
    pub async fn get_membership(&self, team_id: u64, username: &str) -> HostingResult<RawMembership> {
        self.client
            .get(&format!("/teams/{}/memberships/{}", team_id, username))
            .await
    }

    /// Adds or updates team membership for a user.
    pub async fn add_membership(
        &self,
        team_id: u64,
        username: &str,
        role: &str,
    ) -> HostingResult<RawMembership> {
        let request = MembershipRequest {
            role: role.to_string(),
        };
        self.client
            .put(&format!("/teams/{}/memberships/{}", team_id, username), &request)
            .await
    }

    /// Removes a user from a team.
    pub async fn remove_membership(&self, team_id: u64, username: &str) -> HostingResult<()> {
        self.client
            .delete(&format!("/teams/{}/memberships/{}", team_id, username))
            .await
    }
}

/// Request to create a team.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateTeamRequest {
    /// Team name.
    pub name: String,
    /// Team description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Privacy level (`secret` or `closed`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
}

/// Request to update a team.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTeamRequest {
    /// Team name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Team description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Privacy level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
    /// Default repository permission (`pull`, `push` or `admin`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct MembershipRequest {
    role: String,
}
