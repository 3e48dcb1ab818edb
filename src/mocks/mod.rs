//! In-memory hosting client for testing providers without a network.
//!
//! [`MockHostingClient`] keeps repositories, teams, memberships, pull
//! requests and labels in memory and answers [`HostingClient`] calls the
//! way the platform would, including `NotFound` for missing resources.
//! Every call is recorded together with the bulk-fetch mode it ran under,
//! and failures can be injected per endpoint.

use crate::client::HostingClient;
use crate::errors::{HostingError, HostingErrorKind, HostingResult};
use crate::services::{
    CreatePullRequestRequest, CreateRepoRequest, CreateTeamRequest, SearchParams,
    UpdateRepoRequest, UpdateTeamRequest,
};
use crate::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Page size used for list calls while bulk-fetch mode is off.
pub const MOCK_PAGE_SIZE: usize = 30;

/// A recorded call.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// HTTP method the call maps to.
    pub method: String,
    /// REST path the call maps to.
    pub path: String,
    /// Request body as JSON.
    pub body: Option<String>,
    /// Whether bulk-fetch mode was on.
    pub auto_paginate: bool,
    /// Timestamp.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MockState {
    current_user: String,
    next_id: u64,
    repos: BTreeMap<String, RawRepo>,
    teams: Vec<(String, RawTeam)>,
    users: BTreeMap<String, RawUser>,
    collaborators: BTreeMap<(String, String), String>,
    team_repos: BTreeMap<(u64, String), String>,
    memberships: BTreeMap<(u64, String), String>,
    pulls: BTreeMap<(String, u64), RawPullRequest>,
    issue_labels: BTreeMap<(String, u64), Vec<String>>,
    labels: BTreeMap<(String, String), RawLabel>,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn team_mut(&mut self, team_id: u64) -> HostingResult<&mut RawTeam> {
        self.teams
            .iter_mut()
            .map(|(_, team)| team)
            .find(|team| team.id == Some(team_id))
            .ok_or_else(|| not_found(&format!("/teams/{}", team_id)))
    }

    fn user(&mut self, login: &str) -> RawUser {
        if let Some(user) = self.users.get(login) {
            return user.clone();
        }
        let user = fixtures::user(login, self.next_id());
        self.users.insert(login.to_string(), user.clone());
        user
    }

    fn label(&mut self, full_name: &str, name: &str) -> RawLabel {
        let key = (full_name.to_string(), name.to_string());
        if let Some(label) = self.labels.get(&key) {
            return label.clone();
        }
        let label = RawLabel {
            id: Some(self.next_id()),
            name: Some(name.to_string()),
            color: Some("ededed".to_string()),
            description: None,
            default: false,
        };
        self.labels.insert(key, label.clone());
        label
    }

    fn labels_on(&mut self, full_name: &str, number: u64) -> Vec<RawLabel> {
        let names = self
            .issue_labels
            .get(&(full_name.to_string(), number))
            .cloned()
            .unwrap_or_default();
        names.iter().map(|name| self.label(full_name, name)).collect()
    }
}

/// In-memory [`HostingClient`].
#[derive(Debug)]
pub struct MockHostingClient {
    state: RwLock<MockState>,
    requests: RwLock<Vec<MockRequest>>,
    failures: RwLock<HashMap<String, Vec<u16>>>,
    bulk_scopes: AtomicUsize,
}

impl Default for MockHostingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHostingClient {
    /// Creates an empty mock authenticated as `mock-user`.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MockState {
                current_user: "mock-user".to_string(),
                ..Default::default()
            }),
            requests: RwLock::new(Vec::new()),
            failures: RwLock::new(HashMap::new()),
            bulk_scopes: AtomicUsize::new(0),
        }
    }

    /// Sets the authenticated account.
    pub fn with_current_user(self, login: &str) -> Self {
        self.write().current_user = login.to_string();
        self
    }

    // Seeding

    /// Adds a repository, keyed by its full name.
    pub fn add_repo(&self, repo: RawRepo) {
        if let Some(full_name) = repo.full_name.clone() {
            self.write().repos.insert(full_name, repo);
        }
    }

    /// Adds a team to `organization`. A missing id is assigned.
    pub fn add_team(&self, organization: &str, mut team: RawTeam) -> u64 {
        let mut state = self.write();
        let id = match team.id {
            Some(id) => {
                state.next_id = state.next_id.max(id);
                id
            }
            None => state.next_id(),
        };
        team.id = Some(id);
        state.teams.push((organization.to_string(), team));
        id
    }

    /// Deletes a team behind the provider's back.
    pub fn remove_team_upstream(&self, team_id: u64) {
        self.write().teams.retain(|(_, team)| team.id != Some(team_id));
    }

    /// Makes `login` a member of a team with `role`.
    pub fn add_member(&self, team_id: u64, login: &str, role: &str) {
        let mut state = self.write();
        state.user(login);
        state
            .memberships
            .insert((team_id, login.to_string()), role.to_string());
    }

    /// Adds a pull request to a repository.
    pub fn add_pull_request(&self, full_name: &str, pull: RawPullRequest) {
        let number = pull.number.unwrap_or_default();
        self.write()
            .pulls
            .insert((full_name.to_string(), number), pull);
    }

    // Inspection

    /// Gets a repository.
    pub fn repo(&self, full_name: &str) -> Option<RawRepo> {
        self.read().repos.get(full_name).cloned()
    }

    /// Gets a collaborator's permission.
    pub fn collaborator(&self, full_name: &str, user: &str) -> Option<String> {
        self.read()
            .collaborators
            .get(&(full_name.to_string(), user.to_string()))
            .cloned()
    }

    /// Gets a team's permission on a repository.
    pub fn team_repo_permission(&self, team_id: u64, full_name: &str) -> Option<String> {
        self.read()
            .team_repos
            .get(&(team_id, full_name.to_string()))
            .cloned()
    }

    /// Gets a user's role in a team.
    pub fn membership_role(&self, team_id: u64, user: &str) -> Option<String> {
        self.read()
            .memberships
            .get(&(team_id, user.to_string()))
            .cloned()
    }

    /// Gets a pull request.
    pub fn pull_request(&self, full_name: &str, number: u64) -> Option<RawPullRequest> {
        self.read()
            .pulls
            .get(&(full_name.to_string(), number))
            .cloned()
    }

    /// Gets the labels on an issue or pull request.
    pub fn issue_labels(&self, full_name: &str, number: u64) -> Vec<String> {
        self.read()
            .issue_labels
            .get(&(full_name.to_string(), number))
            .cloned()
            .unwrap_or_default()
    }

    // Failure injection

    /// Makes the next call to `method path` fail with `status`.
    pub fn fail_next(&self, method: &str, path: &str, status: u16) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key(method, path))
            .or_default()
            .push(status);
    }

    // Request history

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Gets recorded requests for a method and exact path.
    pub fn requests_matching(&self, method: &str, path: &str) -> Vec<MockRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.eq_ignore_ascii_case(method) && r.path == path)
            .collect()
    }

    /// Verifies that a specific request was made.
    pub fn verify_request(&self, method: &str, path: &str) -> bool {
        !self.requests_matching(method, path).is_empty()
    }

    /// Number of team listings performed, across organizations.
    pub fn list_teams_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == "GET" && r.path.starts_with("/orgs/") && r.path.ends_with("/teams"))
            .count()
    }

    /// Bulk-fetch mode observed by each matching request, in order.
    pub fn bulk_mode_seen(&self, method: &str, path: &str) -> Vec<bool> {
        self.requests_matching(method, path)
            .iter()
            .map(|r| r.auto_paginate)
            .collect()
    }

    /// Clears recorded requests.
    pub fn clear_requests(&self) {
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    // Internals

    fn read(&self) -> RwLockReadGuard<'_, MockState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MockState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn record<B: Serialize>(&self, method: &str, path: &str, body: Option<&B>) -> HostingResult<()> {
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockRequest {
                method: method.to_string(),
                path: path.to_string(),
                body: body.and_then(|b| serde_json::to_string(b).ok()),
                auto_paginate: self.auto_paginate(),
                timestamp: Utc::now(),
            });

        let injected = {
            let mut failures = self.failures.write().unwrap_or_else(PoisonError::into_inner);
            failures
                .get_mut(&key(method, path))
                .filter(|queue| !queue.is_empty())
                .map(|queue| queue.remove(0))
        };

        match injected {
            Some(status) => Err(HostingError::from_response(
                status,
                format!("Injected failure for {} {}", method, path),
                None,
                None,
            )),
            None => Ok(()),
        }
    }

    fn page<T>(&self, items: Vec<T>) -> Vec<T> {
        if self.auto_paginate() {
            items
        } else {
            items.into_iter().take(MOCK_PAGE_SIZE).collect()
        }
    }
}

fn key(method: &str, path: &str) -> String {
    format!("{}:{}", method.to_uppercase(), path)
}

fn not_found(path: &str) -> HostingError {
    HostingError::not_found(format!("Not Found: {}", path))
}

fn unprocessable(message: &str) -> HostingError {
    HostingError::new(HostingErrorKind::UnprocessableEntity, message).with_status(422)
}

const NO_BODY: Option<&()> = None;

#[async_trait]
impl HostingClient for MockHostingClient {
    fn auto_paginate(&self) -> bool {
        self.bulk_scopes.load(Ordering::SeqCst) > 0
    }

    fn enter_bulk_mode(&self) {
        self.bulk_scopes.fetch_add(1, Ordering::SeqCst);
    }

    fn exit_bulk_mode(&self) {
        let _ = self
            .bulk_scopes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    async fn current_user(&self) -> HostingResult<RawUser> {
        self.record("GET", "/user", NO_BODY)?;
        let mut state = self.write();
        let login = state.current_user.clone();
        Ok(state.user(&login))
    }

    async fn get_repo(&self, full_name: &str) -> HostingResult<RawRepo> {
        let path = format!("/repos/{}", full_name);
        self.record("GET", &path, NO_BODY)?;
        self.repo(full_name).ok_or_else(|| not_found(&path))
    }

    async fn create_repo(
        &self,
        organization: Option<&str>,
        request: &CreateRepoRequest,
    ) -> HostingResult<RawRepo> {
        let path = match organization {
            Some(org) => format!("/orgs/{}/repos", org),
            None => "/user/repos".to_string(),
        };
        self.record("POST", &path, Some(request))?;

        let mut state = self.write();
        let namespace = organization
            .map(String::from)
            .unwrap_or_else(|| state.current_user.clone());
        let full_name = format!("{}/{}", namespace, request.name);
        if state.repos.contains_key(&full_name) {
            return Err(unprocessable("name already exists on this account"));
        }

        let owner = state.user(&namespace);
        let repo = RawRepo {
            id: Some(state.next_id()),
            name: Some(request.name.clone()),
            full_name: Some(full_name.clone()),
            owner: Some(owner),
            description: request.description.clone(),
            homepage: request.homepage.clone(),
            private: request.private.unwrap_or(false),
            has_issues: request.has_issues.unwrap_or(true),
            has_wiki: request.has_wiki.unwrap_or(true),
            has_downloads: request.has_downloads.unwrap_or(true),
            default_branch: Some("main".to_string()),
            clone_url: Some(format!("https://github.com/{}.git", full_name)),
            html_url: None,
        };
        state.repos.insert(full_name, repo.clone());
        Ok(repo)
    }

    async fn edit_repo(&self, full_name: &str, request: &UpdateRepoRequest) -> HostingResult<RawRepo> {
        let path = format!("/repos/{}", full_name);
        self.record("PATCH", &path, Some(request))?;

        let mut state = self.write();
        let mut repo = state.repos.remove(full_name).ok_or_else(|| not_found(&path))?;

        if let Some(name) = &request.name {
            let namespace = full_name.split_once('/').map(|(ns, _)| ns).unwrap_or_default();
            repo.name = Some(name.clone());
            repo.full_name = Some(format!("{}/{}", namespace, name));
        }
        if let Some(description) = &request.description {
            repo.description = Some(description.clone());
        }
        if let Some(homepage) = &request.homepage {
            repo.homepage = Some(homepage.clone());
        }
        if let Some(private) = request.private {
            repo.private = private;
        }
        if let Some(has_issues) = request.has_issues {
            repo.has_issues = has_issues;
        }
        if let Some(has_wiki) = request.has_wiki {
            repo.has_wiki = has_wiki;
        }
        if let Some(has_downloads) = request.has_downloads {
            repo.has_downloads = has_downloads;
        }
        if let Some(branch) = &request.default_branch {
            repo.default_branch = Some(branch.clone());
        }

        let key = repo.full_name.clone().unwrap_or_else(|| full_name.to_string());
        state.repos.insert(key, repo.clone());
        Ok(repo)
    }

    async fn delete_repo(&self, full_name: &str) -> HostingResult<()> {
        let path = format!("/repos/{}", full_name);
        self.record("DELETE", &path, NO_BODY)?;
        self.write()
            .repos
            .remove(full_name)
            .map(|_| ())
            .ok_or_else(|| not_found(&path))
    }

    async fn search_repos(&self, query: &str, params: &SearchParams) -> HostingResult<Vec<RawRepo>> {
        self.record("GET", "/search/repositories", Some(&query))?;

        let mut namespace = None;
        let mut terms = Vec::new();
        for token in query.split_whitespace() {
            match token.strip_prefix("user:") {
                Some(ns) => namespace = Some(ns.to_string()),
                None => terms.push(token.to_lowercase()),
            }
        }

        let mut found: Vec<RawRepo> = self
            .read()
            .repos
            .iter()
            .filter(|(full_name, _)| match &namespace {
                Some(ns) => full_name.starts_with(&format!("{}/", ns)),
                None => true,
            })
            .filter(|(_, repo)| {
                let name = repo.name.clone().unwrap_or_default().to_lowercase();
                terms.iter().all(|term| name.contains(term))
            })
            .map(|(_, repo)| repo.clone())
            .collect();
        if params.order.as_deref() == Some("desc") {
            found.reverse();
        }
        Ok(found)
    }

    async fn add_collaborator(&self, full_name: &str, user: &str, permission: &str) -> HostingResult<()> {
        let path = format!("/repos/{}/collaborators/{}", full_name, user);
        self.record("PUT", &path, Some(&permission))?;
        self.write()
            .collaborators
            .insert((full_name.to_string(), user.to_string()), permission.to_string());
        Ok(())
    }

    async fn remove_collaborator(&self, full_name: &str, user: &str) -> HostingResult<()> {
        let path = format!("/repos/{}/collaborators/{}", full_name, user);
        self.record("DELETE", &path, NO_BODY)?;
        self.write()
            .collaborators
            .remove(&(full_name.to_string(), user.to_string()));
        Ok(())
    }

    async fn list_teams(&self, organization: &str) -> HostingResult<Vec<RawTeam>> {
        self.record("GET", &format!("/orgs/{}/teams", organization), NO_BODY)?;
        let teams = self
            .read()
            .teams
            .iter()
            .filter(|(org, _)| org == organization)
            .map(|(_, team)| team.clone())
            .collect();
        Ok(self.page(teams))
    }

    async fn create_team(&self, organization: &str, request: &CreateTeamRequest) -> HostingResult<RawTeam> {
        self.record("POST", &format!("/orgs/{}/teams", organization), Some(request))?;

        let mut state = self.write();
        if state
            .teams
            .iter()
            .any(|(org, team)| org == organization && team.name.as_deref() == Some(request.name.as_str()))
        {
            return Err(unprocessable("Name must be unique for this org"));
        }

        let team = RawTeam {
            id: Some(state.next_id()),
            name: Some(request.name.clone()),
            slug: Some(request.name.to_lowercase().replace(' ', "-")),
            description: request.description.clone(),
            privacy: Some(request.privacy.clone().unwrap_or_else(|| "secret".to_string())),
            permission: Some("pull".to_string()),
            organization: Some(RawOrganization {
                login: Some(organization.to_string()),
                id: None,
            }),
        };
        state.teams.push((organization.to_string(), team.clone()));
        Ok(team)
    }

    async fn update_team(&self, team_id: u64, request: &UpdateTeamRequest) -> HostingResult<RawTeam> {
        self.record("PATCH", &format!("/teams/{}", team_id), Some(request))?;

        let mut state = self.write();
        let team = state.team_mut(team_id)?;
        if let Some(name) = &request.name {
            team.name = Some(name.clone());
            team.slug = Some(name.to_lowercase().replace(' ', "-"));
        }
        if let Some(description) = &request.description {
            team.description = Some(description.clone());
        }
        if let Some(privacy) = &request.privacy {
            team.privacy = Some(privacy.clone());
        }
        if let Some(permission) = &request.permission {
            team.permission = Some(permission.clone());
        }
        Ok(team.clone())
    }

    async fn delete_team(&self, team_id: u64) -> HostingResult<()> {
        let path = format!("/teams/{}", team_id);
        self.record("DELETE", &path, NO_BODY)?;

        let mut state = self.write();
        state.team_mut(team_id)?;
        state.teams.retain(|(_, team)| team.id != Some(team_id));
        state.memberships.retain(|(id, _), _| *id != team_id);
        state.team_repos.retain(|(id, _), _| *id != team_id);
        Ok(())
    }

    async fn add_team_repo(&self, team_id: u64, full_name: &str, permission: &str) -> HostingResult<()> {
        self.record(
            "PUT",
            &format!("/teams/{}/repos/{}", team_id, full_name),
            Some(&permission),
        )?;

        let mut state = self.write();
        state.team_mut(team_id)?;
        state
            .team_repos
            .insert((team_id, full_name.to_string()), permission.to_string());
        Ok(())
    }

    async fn remove_team_repo(&self, team_id: u64, full_name: &str) -> HostingResult<()> {
        self.record("DELETE", &format!("/teams/{}/repos/{}", team_id, full_name), NO_BODY)?;

        let mut state = self.write();
        state.team_mut(team_id)?;
        state.team_repos.remove(&(team_id, full_name.to_string()));
        Ok(())
    }

    async fn list_team_members(&self, team_id: u64) -> HostingResult<Vec<RawUser>> {
        self.record("GET", &format!("/teams/{}/members", team_id), NO_BODY)?;

        let mut state = self.write();
        state.team_mut(team_id)?;
        let logins: Vec<String> = state
            .memberships
            .keys()
            .filter(|(id, _)| *id == team_id)
            .map(|(_, login)| login.clone())
            .collect();
        let members = logins.iter().map(|login| state.user(login)).collect();
        drop(state);
        Ok(self.page(members))
    }

    async fn get_team_membership(&self, team_id: u64, user: &str) -> HostingResult<RawMembership> {
        let path = format!("/teams/{}/memberships/{}", team_id, user);
        self.record("GET", &path, NO_BODY)?;

        let role = self.membership_role(team_id, user).ok_or_else(|| not_found(&path))?;
        let account = self.write().user(user);
        Ok(RawMembership {
            role: Some(role),
            state: Some("active".to_string()),
            url: Some(path),
            id: account.id,
            user_type: account.user_type,
        })
    }

    async fn add_team_membership(&self, team_id: u64, user: &str, role: &str) -> HostingResult<RawMembership> {
        let path = format!("/teams/{}/memberships/{}", team_id, user);
        self.record("PUT", &path, Some(&role))?;

        let mut state = self.write();
        state.team_mut(team_id)?;
        let account = state.user(user);
        state
            .memberships
            .insert((team_id, user.to_string()), role.to_string());
        Ok(RawMembership {
            role: Some(role.to_string()),
            state: Some("active".to_string()),
            url: Some(path),
            id: account.id,
            user_type: account.user_type,
        })
    }

    async fn remove_team_membership(&self, team_id: u64, user: &str) -> HostingResult<()> {
        let path = format!("/teams/{}/memberships/{}", team_id, user);
        self.record("DELETE", &path, NO_BODY)?;

        self.write()
            .memberships
            .remove(&(team_id, user.to_string()))
            .map(|_| ())
            .ok_or_else(|| not_found(&path))
    }

    async fn create_pull_request(
        &self,
        full_name: &str,
        request: &CreatePullRequestRequest,
    ) -> HostingResult<RawPullRequest> {
        self.record("POST", &format!("/repos/{}/pulls", full_name), Some(request))?;

        let mut state = self.write();
        let number = state
            .pulls
            .keys()
            .filter(|(repo, _)| repo == full_name)
            .map(|(_, number)| *number)
            .max()
            .unwrap_or(0)
            + 1;
        let namespace = full_name.split_once('/').map(|(ns, _)| ns).unwrap_or_default();
        let (head_label, head_ref) = match request.head.split_once(':') {
            Some((_, branch)) => (request.head.clone(), branch.to_string()),
            None => (format!("{}:{}", namespace, request.head), request.head.clone()),
        };

        let pull = RawPullRequest {
            id: Some(state.next_id()),
            number: Some(number),
            state: Some("open".to_string()),
            title: Some(request.title.clone()),
            body: request.body.clone(),
            head: Some(RawPullRequestRef {
                label: Some(head_label),
                ref_name: Some(head_ref),
                ..Default::default()
            }),
            base: Some(RawPullRequestRef {
                label: Some(format!("{}:{}", namespace, request.base)),
                ref_name: Some(request.base.clone()),
                repo: Some(fixtures::repo(full_name)),
                ..Default::default()
            }),
            merged: Some(false),
            ..Default::default()
        };
        state.pulls.insert((full_name.to_string(), number), pull.clone());
        Ok(pull)
    }

    async fn get_pull_request(&self, full_name: &str, number: u64) -> HostingResult<RawPullRequest> {
        let path = format!("/repos/{}/pulls/{}", full_name, number);
        self.record("GET", &path, NO_BODY)?;
        self.pull_request(full_name, number).ok_or_else(|| not_found(&path))
    }

    async fn list_pull_requests(&self, full_name: &str, state: &str) -> HostingResult<Vec<RawPullRequest>> {
        let path = format!("/repos/{}/pulls", full_name);
        self.record("GET", &path, Some(&state))?;

        let guard = self.read();
        let known = guard.repos.contains_key(full_name)
            || guard.pulls.keys().any(|(repo, _)| repo == full_name);
        if !known {
            return Err(not_found(&path));
        }

        let pulls = guard
            .pulls
            .iter()
            .filter(|((repo, _), _)| repo == full_name)
            .map(|(_, pull)| pull.clone())
            .filter(|pull| state == "all" || pull.state.as_deref() == Some(state))
            .collect();
        drop(guard);
        Ok(self.page(pulls))
    }

    async fn merge_pull_request(
        &self,
        full_name: &str,
        number: u64,
        message: Option<&str>,
    ) -> HostingResult<RawMergeResult> {
        let path = format!("/repos/{}/pulls/{}/merge", full_name, number);
        self.record("PUT", &path, Some(&message))?;

        let mut state = self.write();
        let pull = state
            .pulls
            .get_mut(&(full_name.to_string(), number))
            .ok_or_else(|| not_found(&path))?;

        if pull.state.as_deref() != Some("open") {
            return Err(HostingError::from_response(
                405,
                "Pull Request is not mergeable".to_string(),
                None,
                None,
            ));
        }

        pull.state = Some("closed".to_string());
        pull.merged = Some(true);
        pull.merged_at = Some(Utc::now().to_rfc3339());
        Ok(RawMergeResult {
            sha: Some(format!("{:040x}", number)),
            merged: true,
            message: Some("Pull Request successfully merged".to_string()),
        })
    }

    async fn update_pull_request_state(
        &self,
        full_name: &str,
        number: u64,
        state: &str,
    ) -> HostingResult<RawPullRequest> {
        let path = format!("/repos/{}/pulls/{}", full_name, number);
        self.record("PATCH", &path, Some(&state))?;

        let mut guard = self.write();
        let pull = guard
            .pulls
            .get_mut(&(full_name.to_string(), number))
            .ok_or_else(|| not_found(&path))?;
        pull.state = Some(state.to_string());
        Ok(pull.clone())
    }

    async fn add_labels(&self, full_name: &str, number: u64, labels: &[String]) -> HostingResult<Vec<RawLabel>> {
        self.record(
            "POST",
            &format!("/repos/{}/issues/{}/labels", full_name, number),
            Some(&labels),
        )?;

        let mut state = self.write();
        let on_issue = state
            .issue_labels
            .entry((full_name.to_string(), number))
            .or_default();
        for label in labels {
            if !on_issue.contains(label) {
                on_issue.push(label.clone());
            }
        }
        Ok(state.labels_on(full_name, number))
    }

    async fn remove_label(&self, full_name: &str, number: u64, label: &str) -> HostingResult<Vec<RawLabel>> {
        let path = format!("/repos/{}/issues/{}/labels/{}", full_name, number, label);
        self.record("DELETE", &path, NO_BODY)?;

        let mut state = self.write();
        let on_issue = state
            .issue_labels
            .get_mut(&(full_name.to_string(), number))
            .ok_or_else(|| not_found(&path))?;
        let before = on_issue.len();
        on_issue.retain(|l| l != label);
        if on_issue.len() == before {
            return Err(not_found(&path));
        }
        Ok(state.labels_on(full_name, number))
    }

    async fn list_labels(&self, full_name: &str) -> HostingResult<Vec<RawLabel>> {
        self.record("GET", &format!("/repos/{}/labels", full_name), NO_BODY)?;
        let labels = self
            .read()
            .labels
            .iter()
            .filter(|((repo, _), _)| repo == full_name)
            .map(|(_, label)| label.clone())
            .collect();
        Ok(self.page(labels))
    }

    async fn get_label(&self, full_name: &str, name: &str) -> HostingResult<RawLabel> {
        let path = format!("/repos/{}/labels/{}", full_name, name);
        self.record("GET", &path, NO_BODY)?;
        self.read()
            .labels
            .get(&(full_name.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(&path))
    }

    async fn create_label(&self, full_name: &str, name: &str, color: &str) -> HostingResult<RawLabel> {
        self.record("POST", &format!("/repos/{}/labels", full_name), Some(&(name, color)))?;

        let mut state = self.write();
        let key = (full_name.to_string(), name.to_string());
        if state.labels.contains_key(&key) {
            return Err(unprocessable("Label already exists"));
        }
        let label = RawLabel {
            id: Some(state.next_id()),
            name: Some(name.to_string()),
            color: Some(color.to_string()),
            description: None,
            default: false,
        };
        state.labels.insert(key, label.clone());
        Ok(label)
    }

    async fn update_label(&self, full_name: &str, name: &str, color: &str) -> HostingResult<RawLabel> {
        let path = format!("/repos/{}/labels/{}", full_name, name);
        self.record("PATCH", &path, Some(&color))?;

        let mut state = self.write();
        let label = state
            .labels
            .get_mut(&(full_name.to_string(), name.to_string()))
            .ok_or_else(|| not_found(&path))?;
        label.color = Some(color.to_string());
        Ok(label.clone())
    }

    async fn search_issues(&self, query: &str) -> HostingResult<Vec<RawIssue>> {
        self.record("GET", "/search/issues", Some(&query))?;

        let repo = query
            .split_whitespace()
            .find_map(|token| token.strip_prefix("repo:"))
            .unwrap_or_default()
            .to_string();
        let label = query
            .split_once("label:")
            .map(|(_, rest)| rest.trim().trim_matches('"').to_string())
            .unwrap_or_default();

        let mut state = self.write();
        let numbers: Vec<u64> = state
            .issue_labels
            .iter()
            .filter(|((r, _), labels)| *r == repo && labels.contains(&label))
            .map(|((_, number), _)| *number)
            .collect();

        Ok(numbers
            .into_iter()
            .map(|number| RawIssue {
                id: None,
                number: Some(number),
                title: None,
                labels: state.labels_on(&repo, number),
            })
            .collect())
    }
}

/// Raw resource fixtures.
pub mod fixtures {
    use super::*;

    /// A user.
    pub fn user(login: &str, id: u64) -> RawUser {
        RawUser {
            id: Some(id),
            login: Some(login.to_string()),
            user_type: Some("User".to_string()),
            site_admin: Some(false),
            avatar_url: Some(format!("https://avatars.githubusercontent.com/u/{}", id)),
            html_url: Some(format!("https://github.com/{}", login)),
        }
    }

    /// A public repository named by `full_name`.
    pub fn repo(full_name: &str) -> RawRepo {
        let name = full_name.rsplit('/').next().unwrap_or(full_name);
        RawRepo {
            id: Some(1),
            name: Some(name.to_string()),
            full_name: Some(full_name.to_string()),
            has_issues: true,
            has_wiki: true,
            has_downloads: true,
            default_branch: Some("main".to_string()),
            clone_url: Some(format!("https://github.com/{}.git", full_name)),
            ..Default::default()
        }
    }

    /// A team.
    pub fn team(id: u64, name: &str) -> RawTeam {
        RawTeam {
            id: Some(id),
            name: Some(name.to_string()),
            slug: Some(name.to_lowercase().replace(' ', "-")),
            privacy: Some("closed".to_string()),
            permission: Some("pull".to_string()),
            ..Default::default()
        }
    }

    /// An open pull request from `head` into `base` of `full_name`.
    pub fn pull_request(full_name: &str, number: u64, head: &str, base: &str) -> RawPullRequest {
        RawPullRequest {
            id: Some(number * 100),
            number: Some(number),
            state: Some("open".to_string()),
            title: Some(format!("Pull request #{}", number)),
            body: None,
            head: Some(RawPullRequestRef {
                ref_name: Some(head.to_string()),
                ..Default::default()
            }),
            base: Some(RawPullRequestRef {
                ref_name: Some(base.to_string()),
                repo: Some(repo(full_name)),
                ..Default::default()
            }),
            merged: Some(false),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_requests_with_bulk_mode() {
        let client = MockHostingClient::new();
        client.add_team("acme", fixtures::team(1, "Core"));

        client.list_teams("acme").await.unwrap();
        client.enter_bulk_mode();
        client.list_teams("acme").await.unwrap();

        assert_eq!(client.bulk_mode_seen("GET", "/orgs/acme/teams"), vec![false, true]);
        assert_eq!(client.list_teams_calls(), 2);
    }

    #[tokio::test]
    async fn test_first_page_only_without_bulk_mode() {
        let client = MockHostingClient::new();
        for id in 1..=40 {
            client.add_team("acme", fixtures::team(id, &format!("team-{}", id)));
        }

        assert_eq!(client.list_teams("acme").await.unwrap().len(), MOCK_PAGE_SIZE);
        client.enter_bulk_mode();
        assert_eq!(client.list_teams("acme").await.unwrap().len(), 40);
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed() {
        let client = MockHostingClient::new();
        client.add_repo(fixtures::repo("acme/widgets"));
        client.fail_next("GET", "/repos/acme/widgets", 502);

        let err = client.get_repo("acme/widgets").await.unwrap_err();
        assert_eq!(*err.kind(), HostingErrorKind::BadGateway);
        assert!(client.get_repo("acme/widgets").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_resources_are_not_found() {
        let client = MockHostingClient::new();

        assert!(client.get_repo("acme/nothing").await.unwrap_err().is_not_found());
        assert!(client.get_team_membership(9, "octocat").await.unwrap_err().is_not_found());
        assert!(client.delete_team(9).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_repo_for_current_user() {
        let client = MockHostingClient::new().with_current_user("octocat");
        let request = CreateRepoRequest {
            name: "widgets".to_string(),
            ..Default::default()
        };

        let repo = client.create_repo(None, &request).await.unwrap();

        assert_eq!(repo.full_name.as_deref(), Some("octocat/widgets"));
        assert!(client.verify_request("POST", "/user/repos"));
    }
}
