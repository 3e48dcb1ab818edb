//! The upstream operations the provider layer depends on.

use crate::errors::HostingResult;
use crate::services::{
    CreatePullRequestRequest, CreateRepoRequest, CreateTeamRequest, SearchParams,
    UpdateRepoRequest, UpdateTeamRequest,
};
use crate::types::{
    RawIssue, RawLabel, RawMembership, RawMergeResult, RawPullRequest, RawRepo, RawTeam, RawUser,
};
use async_trait::async_trait;

/// Authenticated access to a hosting platform's REST API.
///
/// Permission, role and state arguments use the platform vocabulary
/// (`pull`/`push`/`admin`, `member`/`maintainer`, `open`/`closed`/`all`).
/// Missing resources surface as [`HostingErrorKind::NotFound`].
///
/// List calls return the first page only unless bulk-fetch mode is on; see
/// [`AutoPaginate`](crate::pagination::AutoPaginate).
///
/// [`HostingErrorKind::NotFound`]: crate::errors::HostingErrorKind::NotFound
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Whether list calls follow every page.
    ///
    /// True while at least one bulk-fetch scope is open.
    fn auto_paginate(&self) -> bool;

    /// Opens a bulk-fetch scope. Every call must be paired with
    /// [`exit_bulk_mode`](Self::exit_bulk_mode).
    fn enter_bulk_mode(&self);

    /// Closes a bulk-fetch scope opened by [`enter_bulk_mode`](Self::enter_bulk_mode).
    fn exit_bulk_mode(&self);

    /// Gets the authenticated account.
    async fn current_user(&self) -> HostingResult<RawUser>;

    // Repositories

    /// Gets a repository by `owner/name`.
    async fn get_repo(&self, full_name: &str) -> HostingResult<RawRepo>;

    /// Creates under `organization`, or under the authenticated account when `None`.
    async fn create_repo(
        &self,
        organization: Option<&str>,
        request: &CreateRepoRequest,
    ) -> HostingResult<RawRepo>;

    /// Updates repository properties.
    async fn edit_repo(&self, full_name: &str, request: &UpdateRepoRequest) -> HostingResult<RawRepo>;

    /// Deletes a repository.
    async fn delete_repo(&self, full_name: &str) -> HostingResult<()>;

    /// Searches repositories.
    async fn search_repos(&self, query: &str, params: &SearchParams) -> HostingResult<Vec<RawRepo>>;

    /// Adds a collaborator, or changes their permission.
    async fn add_collaborator(&self, full_name: &str, user: &str, permission: &str) -> HostingResult<()>;

    /// Removes a collaborator.
    async fn remove_collaborator(&self, full_name: &str, user: &str) -> HostingResult<()>;

    // Teams

    /// Lists an organization's teams.
    async fn list_teams(&self, organization: &str) -> HostingResult<Vec<RawTeam>>;

    /// Creates a team.
    async fn create_team(&self, organization: &str, request: &CreateTeamRequest) -> HostingResult<RawTeam>;

    /// Updates a team.
    async fn update_team(&self, team_id: u64, request: &UpdateTeamRequest) -> HostingResult<RawTeam>;

    /// Deletes a team.
    async fn delete_team(&self, team_id: u64) -> HostingResult<()>;

    /// Grants a team access to a repository.
    async fn add_team_repo(&self, team_id: u64, full_name: &str, permission: &str) -> HostingResult<()>;

    /// Removes a repository from a team.
    async fn remove_team_repo(&self, team_id: u64, full_name: &str) -> HostingResult<()>;

    /// Lists team members.
    async fn list_team_members(&self, team_id: u64) -> HostingResult<Vec<RawUser>>;

    /// Gets a user's membership in a team.
    async fn get_team_membership(&self, team_id: u64, user: &str) -> HostingResult<RawMembership>;

    /// Adds the user, or changes their role when already a member.
    async fn add_team_membership(&self, team_id: u64, user: &str, role: &str) -> HostingResult<RawMembership>;

    /// Removes a user from a team.
    async fn remove_team_membership(&self, team_id: u64, user: &str) -> HostingResult<()>;

    // Pull requests

    /// Creates a pull request.
    async fn create_pull_request(
        &self,
        full_name: &str,
        request: &CreatePullRequestRequest,
    ) -> HostingResult<RawPullRequest>;

    /// Gets a pull request.
    async fn get_pull_request(&self, full_name: &str, number: u64) -> HostingResult<RawPullRequest>;

    /// Lists pull requests in the given state.
    async fn list_pull_requests(&self, full_name: &str, state: &str) -> HostingResult<Vec<RawPullRequest>>;

    /// Merges a pull request.
    async fn merge_pull_request(
        &self,
        full_name: &str,
        number: u64,
        message: Option<&str>,
    ) -> HostingResult<RawMergeResult>;

    /// Closes or reopens a pull request.
    async fn update_pull_request_state(
        &self,
        full_name: &str,
        number: u64,
        state: &str,
    ) -> HostingResult<RawPullRequest>;

    // Labels

    /// Adds labels to an issue or pull request.
    async fn add_labels(&self, full_name: &str, number: u64, labels: &[String]) -> HostingResult<Vec<RawLabel>>;

    /// Removes a label from an issue or pull request.
    async fn remove_label(&self, full_name: &str, number: u64, label: &str) -> HostingResult<Vec<RawLabel>>;

    /// Lists a repository's labels.
    async fn list_labels(&self, full_name: &str) -> HostingResult<Vec<RawLabel>>;

    /// Gets a label.
    async fn get_label(&self, full_name: &str, name: &str) -> HostingResult<RawLabel>;

    /// Creates a label.
    async fn create_label(&self, full_name: &str, name: &str, color: &str) -> HostingResult<RawLabel>;

    /// Changes a label's color.
    async fn update_label(&self, full_name: &str, name: &str, color: &str) -> HostingResult<RawLabel>;

    /// Searches issues and pull requests.
    async fn search_issues(&self, query: &str) -> HostingResult<Vec<RawIssue>>;
}
