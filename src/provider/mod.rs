//! The hosting provider surface.
//!
//! [`HostingProvider`] is the platform-independent contract; each platform
//! supplies one implementation over its [`HostingClient`].
//!
//! Read operations return `None` (or an empty list) when the upstream
//! reports that something does not exist. Mutations on a missing team fail
//! with `TeamNotFound`. Every other upstream failure is returned unchanged;
//! nothing at this layer retries.

use crate::adapters;
use crate::cache::TeamCache;
use crate::client::{GitHubClient, HostingClient};
use crate::config::{HostingConfig, ProviderSettings};
use crate::errors::{HostingError, HostingResult};
use crate::model::{
    BranchRef, Membership, MergeOutcome, PullRequest, PullRequestFilter, PullRequestOptions, Repo,
    RepoOptions, RepoSearch, RepoUpdate, Team, TeamOptions, TeamUpdate, UserSearch, UserSummary,
};
use crate::naming::NameResolver;
use crate::pagination::AutoPaginate;
use crate::permission::{Permission, TeamRole};
use crate::services::{
    CreatePullRequestRequest, CreateRepoRequest, CreateTeamRequest, SearchParams,
    UpdateRepoRequest, UpdateTeamRequest,
};
use crate::types::{RawPullRequest, RawRepo, RawTeam};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// Repository, team, membership and pull request management.
///
/// Repository arguments accept `name` or `namespace/name`; see
/// [`NameResolver`]. Permission arguments accept `read`/`pull`,
/// `write`/`push`, `admin` or `None` to revoke.
#[async_trait]
pub trait HostingProvider: Send + Sync {
    /// Platform identifier.
    fn name(&self) -> &'static str;

    // Repositories

    /// Creates a repository, under an organization when the name's namespace
    /// is not the authenticated account.
    async fn create_repo(&self, name: &str, options: &RepoOptions) -> HostingResult<Repo>;

    /// Reads a repository.
    async fn read_repo(&self, name: &str) -> HostingResult<Option<Repo>>;

    /// Applies `update`. Returns `None` without calling upstream when the
    /// update is empty.
    async fn update_repo(&self, name: &str, update: &RepoUpdate) -> HostingResult<Option<Repo>>;

    /// Deletes a repository.
    async fn delete_repo(&self, name: &str) -> HostingResult<()>;

    /// Searches repositories within the configured namespace.
    async fn search_repos(&self, query: &str, options: &RepoSearch) -> HostingResult<Vec<Repo>>;

    // Teams

    /// Creates a team.
    async fn create_team(&self, name: &str, options: &TeamOptions) -> HostingResult<Team>;

    /// Reads a team by name.
    async fn read_team(&self, name: &str) -> HostingResult<Option<Team>>;

    /// Updates a team.
    async fn update_team(&self, name: &str, update: &TeamUpdate) -> HostingResult<Team>;

    /// Deletes a team.
    async fn delete_team(&self, name: &str) -> HostingResult<()>;

    /// Finds teams whose name contains `query`, ignoring case.
    async fn search_teams(&self, query: &str) -> HostingResult<Vec<Team>>;

    // Permissions

    /// Grants `user` access to `repo`, or revokes it when `permission` is `None`.
    async fn set_user_permission(&self, user: &str, repo: &str, permission: Option<&str>) -> HostingResult<()>;

    /// Grants `team` access to `repo`, or revokes it when `permission` is `None`.
    async fn set_team_permission(&self, team: &str, repo: &str, permission: Option<&str>) -> HostingResult<()>;

    // Team membership

    /// Adds `user` to `team`. A missing role means `member`.
    async fn create_team_membership(&self, team: &str, user: &str, role: Option<&str>) -> HostingResult<Membership>;

    /// Reads `user`'s membership in `team`.
    async fn read_team_membership(&self, team: &str, user: &str) -> HostingResult<Option<Membership>>;

    /// Changes `user`'s role in `team`. The role is required.
    async fn update_team_membership(&self, team: &str, user: &str, role: Option<&str>) -> HostingResult<Membership>;

    /// Removes `user` from `team`.
    async fn delete_team_membership(&self, team: &str, user: &str) -> HostingResult<()>;

    /// Lists users. Only team member listing is supported.
    async fn search_users(&self, search: &UserSearch) -> HostingResult<Vec<UserSummary>>;

    // Pull requests

    /// Opens a pull request from `source` to `target`, both written
    /// `namespace/repo:branch`.
    async fn create_pull_request(
        &self,
        source: &str,
        target: &str,
        options: &PullRequestOptions,
    ) -> HostingResult<PullRequest>;

    /// Reads a pull request.
    async fn read_pull_request(&self, repo: &str, id: u64) -> HostingResult<Option<PullRequest>>;

    /// Lists pull requests.
    async fn read_pull_requests(&self, repo: &str, filter: PullRequestFilter) -> HostingResult<Vec<PullRequest>>;

    /// Merges a pull request.
    async fn merge_pull_request(&self, repo: &str, id: u64, message: Option<&str>) -> HostingResult<MergeOutcome>;

    /// Closes a pull request.
    async fn close_pull_request(&self, repo: &str, id: u64) -> HostingResult<PullRequest>;

    /// Reopens a pull request.
    async fn open_pull_request(&self, repo: &str, id: u64) -> HostingResult<PullRequest>;

    /// Adds labels. Returns every label now on the pull request.
    async fn label_pull_request(&self, repo: &str, id: u64, labels: &[String]) -> HostingResult<Vec<String>>;

    /// Removes labels one at a time.
    async fn unlabel_pull_request(&self, repo: &str, id: u64, labels: &[String]) -> HostingResult<()>;
}

/// GitHub implementation of [`HostingProvider`].
pub struct GitHubHostingProvider {
    client: Arc<dyn HostingClient>,
    names: NameResolver,
    teams: TeamCache,
    organization: Option<String>,
}

impl GitHubHostingProvider {
    /// Creates a provider over `client`, with `organization` as the default
    /// namespace for repositories and the owner of all teams.
    pub fn new(client: Arc<dyn HostingClient>, organization: Option<String>) -> Self {
        Self {
            names: NameResolver::new(organization.clone()),
            teams: TeamCache::new(client.clone(), organization.clone()),
            client,
            organization,
        }
    }

    /// Creates a provider with an HTTP client built from `config`.
    pub fn from_config(config: HostingConfig) -> HostingResult<Self> {
        let organization = config.organization.clone();
        let client = GitHubClient::new(config)?;
        Ok(Self::new(Arc::new(client), organization))
    }

    /// Creates a provider from flat settings.
    pub fn from_settings(settings: ProviderSettings) -> HostingResult<Self> {
        Self::from_config(settings.into_config()?)
    }

    /// Gets the underlying client.
    pub fn client(&self) -> &Arc<dyn HostingClient> {
        &self.client
    }

    /// Gets the default organization.
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Gets the name resolver.
    pub fn names(&self) -> &NameResolver {
        &self.names
    }

    /// Gets the team cache.
    pub fn team_cache(&self) -> &TeamCache {
        &self.teams
    }

    fn require_organization(&self) -> HostingResult<&str> {
        self.organization
            .as_deref()
            .ok_or_else(|| HostingError::configuration("Teams require an organization to be configured"))
    }

    async fn require_team(&self, name: &str) -> HostingResult<RawTeam> {
        self.teams
            .lookup(name)
            .await?
            .ok_or_else(|| HostingError::team_not_found(name))
    }

    fn team_id(team: &RawTeam) -> HostingResult<u64> {
        team.id.ok_or_else(|| HostingError::malformed("team", "id"))
    }

    fn adapt_team(raw: RawTeam) -> HostingResult<Team> {
        adapters::adapt_team(Some(raw))?.ok_or_else(|| HostingError::malformed("team", "body"))
    }

    fn adapt_repo(raw: RawRepo) -> HostingResult<Repo> {
        adapters::adapt_repo(Some(raw))?.ok_or_else(|| HostingError::malformed("repository", "body"))
    }

    fn adapt_pull_request(raw: RawPullRequest) -> HostingResult<PullRequest> {
        adapters::adapt_pull_request(Some(raw))?
            .ok_or_else(|| HostingError::malformed("pull request", "body"))
    }
}

#[async_trait]
impl HostingProvider for GitHubHostingProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    #[instrument(skip(self, options))]
    async fn create_repo(&self, name: &str, options: &RepoOptions) -> HostingResult<Repo> {
        let short_name = self.names.short_name(name)?;

        let organization = match self.names.namespace(name)? {
            Some(namespace) => {
                let me = self.client.current_user().await?;
                if me.login.as_deref() == Some(namespace) {
                    None
                } else {
                    Some(namespace)
                }
            }
            None => None,
        };

        let request = CreateRepoRequest {
            name: short_name.to_string(),
            description: options.description.clone(),
            homepage: options.homepage.clone(),
            private: options.private,
            has_issues: options.has_issues,
            has_wiki: options.has_wiki,
            has_downloads: options.has_downloads,
            auto_init: options.auto_init,
        };

        let raw = self.client.create_repo(organization, &request).await?;
        Self::adapt_repo(raw)
    }

    #[instrument(skip(self))]
    async fn read_repo(&self, name: &str) -> HostingResult<Option<Repo>> {
        let full_name = self.names.full_name(name)?;
        match self.client.get_repo(&full_name).await {
            Ok(raw) => adapters::adapt_repo(Some(raw)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, update))]
    async fn update_repo(&self, name: &str, update: &RepoUpdate) -> HostingResult<Option<Repo>> {
        if update.is_empty() {
            return Ok(None);
        }

        let full_name = self.names.full_name(name)?;
        let request = UpdateRepoRequest {
            name: update.name.clone(),
            description: update.description.clone(),
            homepage: update.homepage.clone(),
            private: update.private,
            has_issues: update.has_issues,
            has_wiki: update.has_wiki,
            has_downloads: update.has_downloads,
            default_branch: update.default_branch.clone(),
        };

        let raw = self.client.edit_repo(&full_name, &request).await?;
        Self::adapt_repo(raw).map(Some)
    }

    #[instrument(skip(self))]
    async fn delete_repo(&self, name: &str) -> HostingResult<()> {
        let full_name = self.names.full_name(name)?;
        self.client.delete_repo(&full_name).await
    }

    #[instrument(skip(self, options))]
    async fn search_repos(&self, query: &str, options: &RepoSearch) -> HostingResult<Vec<Repo>> {
        let query = match self.organization() {
            Some(org) => format!("{} user:{}", query, org),
            None => query.to_string(),
        };
        let params = SearchParams {
            sort: options.sort.clone(),
            order: options.order.clone(),
            ..Default::default()
        };

        self.client
            .search_repos(&query, &params)
            .await?
            .into_iter()
            .map(Self::adapt_repo)
            .collect()
    }

    #[instrument(skip(self, options))]
    async fn create_team(&self, name: &str, options: &TeamOptions) -> HostingResult<Team> {
        let organization = self.require_organization()?;
        let request = CreateTeamRequest {
            name: name.to_string(),
            description: options.description.clone(),
            privacy: options.privacy.clone(),
        };

        let raw = self.client.create_team(organization, &request).await?;
        let team = Self::adapt_team(raw.clone())?;
        self.teams.insert(raw).await;
        Ok(team)
    }

    #[instrument(skip(self))]
    async fn read_team(&self, name: &str) -> HostingResult<Option<Team>> {
        adapters::adapt_team(self.teams.lookup(name).await?)
    }

    #[instrument(skip(self, update))]
    async fn update_team(&self, name: &str, update: &TeamUpdate) -> HostingResult<Team> {
        // A team's default permission has no "none" level.
        let permission = match update.permission.as_deref() {
            Some(token) => Some(
                Permission::normalize(Some(token))?
                    .ok_or_else(|| HostingError::invalid_permission(token))?,
            ),
            None => None,
        };
        let cached = self.require_team(name).await?;
        let team_id = Self::team_id(&cached)?;

        let request = UpdateTeamRequest {
            name: update.name.clone(),
            description: update.description.clone(),
            privacy: update.privacy.clone(),
            permission: permission.map(|p| p.as_str().to_string()),
        };

        let raw = self.client.update_team(team_id, &request).await?;
        let team = Self::adapt_team(raw.clone())?;
        if team.name == name {
            self.teams.insert(raw).await;
        } else {
            self.teams.rename(name, raw).await;
        }
        Ok(team)
    }

    #[instrument(skip(self))]
    async fn delete_team(&self, name: &str) -> HostingResult<()> {
        let cached = self.require_team(name).await?;
        let team_id = Self::team_id(&cached)?;

        self.client.delete_team(team_id).await?;
        self.teams.invalidate(name).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn search_teams(&self, query: &str) -> HostingResult<Vec<Team>> {
        self.teams
            .search(query)
            .await?
            .into_iter()
            .map(Self::adapt_team)
            .collect()
    }

    #[instrument(skip(self))]
    async fn set_user_permission(&self, user: &str, repo: &str, permission: Option<&str>) -> HostingResult<()> {
        let permission = Permission::normalize(permission)?;
        let full_name = self.names.full_name(repo)?;

        match permission {
            Some(permission) => {
                self.client
                    .add_collaborator(&full_name, user, permission.as_str())
                    .await
            }
            None => self.client.remove_collaborator(&full_name, user).await,
        }
    }

    #[instrument(skip(self))]
    async fn set_team_permission(&self, team: &str, repo: &str, permission: Option<&str>) -> HostingResult<()> {
        let permission = Permission::normalize(permission)?;
        let full_name = self.names.full_name(repo)?;
        let cached = self.require_team(team).await?;
        let team_id = Self::team_id(&cached)?;

        match permission {
            Some(permission) => {
                self.client
                    .add_team_repo(team_id, &full_name, permission.as_str())
                    .await
            }
            None => self.client.remove_team_repo(team_id, &full_name).await,
        }
    }

    #[instrument(skip(self))]
    async fn create_team_membership(&self, team: &str, user: &str, role: Option<&str>) -> HostingResult<Membership> {
        let role = role.map(TeamRole::normalize).unwrap_or_default();
        let cached = self.require_team(team).await?;
        let team_id = Self::team_id(&cached)?;

        let raw = self
            .client
            .add_team_membership(team_id, user, role.as_str())
            .await?;
        Ok(adapters::adapt_membership(user, raw))
    }

    #[instrument(skip(self))]
    async fn read_team_membership(&self, team: &str, user: &str) -> HostingResult<Option<Membership>> {
        let cached = match self.teams.lookup(team).await? {
            Some(cached) => cached,
            None => return Ok(None),
        };
        let team_id = Self::team_id(&cached)?;

        match self.client.get_team_membership(team_id, user).await {
            Ok(raw) => Ok(Some(adapters::adapt_membership(user, raw))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn update_team_membership(&self, team: &str, user: &str, role: Option<&str>) -> HostingResult<Membership> {
        let role = TeamRole::normalize(role.ok_or_else(HostingError::missing_role)?);
        let cached = self.require_team(team).await?;
        let team_id = Self::team_id(&cached)?;

        let raw = self
            .client
            .add_team_membership(team_id, user, role.as_str())
            .await?;
        Ok(adapters::adapt_membership(user, raw))
    }

    #[instrument(skip(self))]
    async fn delete_team_membership(&self, team: &str, user: &str) -> HostingResult<()> {
        let cached = self.require_team(team).await?;
        let team_id = Self::team_id(&cached)?;
        self.client.remove_team_membership(team_id, user).await
    }

    #[instrument(skip(self))]
    async fn search_users(&self, search: &UserSearch) -> HostingResult<Vec<UserSummary>> {
        let team = search
            .team_name
            .as_deref()
            .ok_or_else(|| HostingError::missing_option("team_name"))?;
        let cached = self.require_team(team).await?;
        let team_id = Self::team_id(&cached)?;

        let members = {
            let _bulk = AutoPaginate::enable(self.client.as_ref());
            self.client.list_team_members(team_id).await?
        };

        members.into_iter().map(adapters::adapt_user_summary).collect()
    }

    #[instrument(skip(self, options))]
    async fn create_pull_request(
        &self,
        source: &str,
        target: &str,
        options: &PullRequestOptions,
    ) -> HostingResult<PullRequest> {
        let head = BranchRef::parse(source)?;
        let base = BranchRef::parse(target)?;

        if head.repo != base.repo {
            return Err(HostingError::cross_repo_mismatch(source, target));
        }

        let request = CreatePullRequestRequest {
            title: options.title().to_string(),
            head: head.head_for(&base),
            base: base.branch.clone(),
            body: Some(options.body().to_string()),
        };

        let raw = self
            .client
            .create_pull_request(&base.full_name(), &request)
            .await?;
        Self::adapt_pull_request(raw)
    }

    #[instrument(skip(self))]
    async fn read_pull_request(&self, repo: &str, id: u64) -> HostingResult<Option<PullRequest>> {
        let full_name = self.names.full_name(repo)?;
        match self.client.get_pull_request(&full_name, id).await {
            Ok(raw) => adapters::adapt_pull_request(Some(raw)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn read_pull_requests(&self, repo: &str, filter: PullRequestFilter) -> HostingResult<Vec<PullRequest>> {
        let full_name = self.names.full_name(repo)?;
        let raws = match self.client.list_pull_requests(&full_name, filter.as_str()).await {
            Ok(raws) => raws,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        raws.into_iter().map(Self::adapt_pull_request).collect()
    }

    #[instrument(skip(self))]
    async fn merge_pull_request(&self, repo: &str, id: u64, message: Option<&str>) -> HostingResult<MergeOutcome> {
        let full_name = self.names.full_name(repo)?;
        let raw = self.client.merge_pull_request(&full_name, id, message).await?;
        Ok(adapters::adapt_merge(raw))
    }

    #[instrument(skip(self))]
    async fn close_pull_request(&self, repo: &str, id: u64) -> HostingResult<PullRequest> {
        let full_name = self.names.full_name(repo)?;
        let raw = self
            .client
            .update_pull_request_state(&full_name, id, "closed")
            .await?;
        Self::adapt_pull_request(raw)
    }

    #[instrument(skip(self))]
    async fn open_pull_request(&self, repo: &str, id: u64) -> HostingResult<PullRequest> {
        let full_name = self.names.full_name(repo)?;
        let raw = self
            .client
            .update_pull_request_state(&full_name, id, "open")
            .await?;
        Self::adapt_pull_request(raw)
    }

    #[instrument(skip(self))]
    async fn label_pull_request(&self, repo: &str, id: u64, labels: &[String]) -> HostingResult<Vec<String>> {
        let full_name = self.names.full_name(repo)?;
        self.client
            .add_labels(&full_name, id, labels)
            .await?
            .into_iter()
            .map(|label| adapters::adapt_label(label).map(|meta| meta.name))
            .collect()
    }

    #[instrument(skip(self))]
    async fn unlabel_pull_request(&self, repo: &str, id: u64, labels: &[String]) -> HostingResult<()> {
        let full_name = self.names.full_name(repo)?;
        for label in labels {
            self.client.remove_label(&full_name, id, label).await?;
        }
        Ok(())
    }
}
