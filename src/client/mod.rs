//! REST client for the hosting platform.

mod capability;

pub use capability::HostingClient;

use crate::auth::{AuthManager, AuthMethod};
use crate::config::{HostingConfig, HostingConfigBuilder};
use crate::errors::{HostingError, HostingErrorKind, HostingResult, RateLimitInfo};
use crate::observability::TracingHooks;
use crate::pagination::{PaginationLinks, BULK_PAGE_SIZE};
use crate::resilience::{RateLimitTracker, Resilience, RetryExecutor};
use crate::services::*;
use crate::types::{
    RawIssue, RawLabel, RawMembership, RawMergeResult, RawPullRequest, RawRepo, RawTeam, RawUser,
};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{
    header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    Client, Method, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Error body returned by the API.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    message: String,
    documentation_url: Option<String>,
}

/// HTTP client for the hosting REST API.
pub struct GitHubClient {
    http: Client,
    config: HostingConfig,
    auth: Arc<AuthManager>,
    resilience: Arc<Resilience>,
    bulk_scopes: AtomicUsize,
}

impl GitHubClient {
    /// Creates a new client.
    pub fn new(config: HostingConfig) -> HostingResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .pool_idle_timeout(config.pool.idle_timeout)
            .build()
            .map_err(|e| {
                HostingError::new(
                    HostingErrorKind::InvalidConfiguration,
                    format!("Failed to create HTTP client: {}", e),
                )
                .with_cause(e)
            })?;

        let auth = Arc::new(AuthManager::new(config.auth.clone().ok_or_else(|| {
            HostingError::new(HostingErrorKind::MissingAuth, "Authentication required")
        })?));

        let resilience = Arc::new(Resilience::new(
            RetryExecutor::from_config(&config.retry),
            RateLimitTracker::from_config(&config.rate_limit),
        ));

        Ok(Self {
            http,
            config,
            auth,
            resilience,
            bulk_scopes: AtomicUsize::new(0),
        })
    }

    /// Creates a new client builder.
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Gets the configuration.
    pub fn config(&self) -> &HostingConfig {
        &self.config
    }

    /// Gets the rate limit tracker.
    pub fn rate_limit(&self) -> &RateLimitTracker {
        self.resilience.rate_limit()
    }

    // Service accessors

    /// Gets the repositories service.
    pub fn repositories(&self) -> RepositoriesService {
        RepositoriesService::new(self)
    }

    /// Gets the teams service.
    pub fn teams(&self) -> TeamsService {
        TeamsService::new(self)
    }

    /// Gets the pull requests service.
    pub fn pull_requests(&self) -> PullRequestsService {
        PullRequestsService::new(self)
    }

    /// Gets the issues service.
    pub fn issues(&self) -> IssuesService {
        IssuesService::new(self)
    }

    /// Gets the users service.
    pub fn users(&self) -> UsersService {
        UsersService::new(self)
    }

    /// Gets the search service.
    pub fn search(&self) -> SearchService {
        SearchService::new(self)
    }

    // HTTP methods

    /// Makes a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> HostingResult<T> {
        self.request(Method::GET, path, Option::<&()>::None).await
    }

    /// Makes a GET request with query parameters.
    pub async fn get_with_params<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
    ) -> HostingResult<T> {
        let url = self.build_url_with_params(path, params)?;
        let response = self
            .execute_request(Method::GET, &url, Option::<&()>::None)
            .await?;
        Self::parse_json(response).await
    }

    /// Makes a GET request for a list.
    ///
    /// Returns only the first page unless bulk-fetch mode is on, in which case
    /// every `next` link is followed and pages are requested at the maximum
    /// page size.
    pub async fn get_all<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
    ) -> HostingResult<Vec<T>> {
        let mut url = self.build_url_with_params(path, params)?;

        if !self.auto_paginate() {
            let response = self
                .execute_request(Method::GET, &url, Option::<&()>::None)
                .await?;
            return Self::parse_json(response).await;
        }

        if !url.contains("per_page=") {
            let separator = if url.contains('?') { '&' } else { '?' };
            url = format!("{}{}per_page={}", url, separator, BULK_PAGE_SIZE);
        }

        let mut items = Vec::new();
        loop {
            let response = self
                .execute_request(Method::GET, &url, Option::<&()>::None)
                .await?;
            let links = PaginationLinks::from_headers(response.headers());
            let page: Vec<T> = Self::parse_json(response).await?;
            items.extend(page);

            match links.next {
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::debug!(path, items = items.len(), "Fetched all pages");
        Ok(items)
    }

    /// Makes a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> HostingResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Makes a PUT request.
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> HostingResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Makes a PUT request without a response body.
    pub async fn put_no_response<B: Serialize>(&self, path: &str, body: &B) -> HostingResult<()> {
        self.request_no_response(Method::PUT, path, Some(body)).await
    }

    /// Makes a PATCH request.
    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> HostingResult<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, path: &str) -> HostingResult<()> {
        self.request_no_response(Method::DELETE, path, Option::<&()>::None)
            .await
    }

    /// Makes a DELETE request that returns a body.
    pub async fn delete_with_response<T: DeserializeOwned>(&self, path: &str) -> HostingResult<T> {
        self.request(Method::DELETE, path, Option::<&()>::None).await
    }

    /// Makes a request and returns the raw response.
    pub async fn raw_request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> HostingResult<Response> {
        let url = self.build_url(path);
        self.execute_request(method, &url, body).await
    }

    // Internal methods

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> HostingResult<T> {
        let url = self.build_url(path);
        let response = self.execute_request(method, &url, body).await?;
        Self::parse_json(response).await
    }

    async fn request_no_response<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> HostingResult<()> {
        let url = self.build_url(path);
        self.execute_request(method, &url, body).await?;
        Ok(())
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> HostingResult<T> {
        response.json().await.map_err(|e| {
            HostingError::deserialization(format!("Failed to deserialize response: {}", e))
        })
    }

    async fn execute_request<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> HostingResult<Response> {
        let auth_header = self.auth.auth_header();
        let body_bytes = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| {
                HostingError::new(
                    HostingErrorKind::InvalidParameter,
                    format!("Failed to serialize request body: {}", e),
                )
            })?;

        let response = self
            .resilience
            .execute(|| {
                let http = self.http.clone();
                let method = method.clone();
                let auth_header = auth_header.clone();
                let body_bytes = body_bytes.clone();
                let url = url.to_string();
                let user_agent = self.config.user_agent.clone();
                let api_version = self.config.api_version.clone();

                async move {
                    let started = Instant::now();
                    TracingHooks::on_request_start(method.as_str(), &url);

                    let mut request = http
                        .request(method.clone(), &url)
                        .header(AUTHORIZATION, &auth_header)
                        .header(USER_AGENT, &user_agent)
                        .header(ACCEPT, "application/vnd.github+json")
                        .header("X-GitHub-Api-Version", &api_version);

                    if let Some(bytes) = body_bytes {
                        request = request.header(CONTENT_TYPE, "application/json").body(bytes);
                    }

                    let response = request.send().await.map_err(|e| {
                        let error = if e.is_timeout() {
                            HostingError::timeout(format!("Request timed out: {}", e))
                        } else if e.is_connect() {
                            HostingError::new(
                                HostingErrorKind::ConnectionFailed,
                                format!("Connection failed: {}", e),
                            )
                        } else {
                            HostingError::new(HostingErrorKind::Unknown, format!("Request failed: {}", e))
                        };
                        TracingHooks::on_request_error(method.as_str(), &url, &error);
                        error
                    })?;

                    let rate_limit = Self::extract_rate_limit(response.headers());
                    let status = response.status();
                    TracingHooks::on_request_complete(method.as_str(), &url, status.as_u16(), started.elapsed());

                    if !status.is_success() {
                        let error = Self::handle_error_response(response, rate_limit).await;
                        TracingHooks::on_request_error(method.as_str(), &url, &error);
                        return Err(error);
                    }

                    Ok(response)
                }
            })
            .await?;

        if let Some(info) = Self::extract_rate_limit(response.headers()) {
            self.resilience.rate_limit().update(&info);
        }

        Ok(response)
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    fn build_url_with_params<P: Serialize + ?Sized>(&self, path: &str, params: &P) -> HostingResult<String> {
        let url = self.build_url(path);
        let query = serde_urlencoded::to_string(params).map_err(|e| {
            HostingError::new(
                HostingErrorKind::InvalidParameter,
                format!("Failed to serialize parameters: {}", e),
            )
        })?;

        if query.is_empty() {
            Ok(url)
        } else {
            Ok(format!("{}?{}", url, query))
        }
    }

    fn extract_rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
        let limit = headers
            .get("x-ratelimit-limit")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())?;

        let remaining = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())?;

        let reset_timestamp: i64 = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())?;

        let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

        let retry_after = headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let resource = headers
            .get("x-ratelimit-resource")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Some(RateLimitInfo {
            limit,
            remaining,
            reset_at,
            retry_after,
            resource,
        })
    }

    async fn handle_error_response(response: Response, rate_limit: Option<RateLimitInfo>) -> HostingError {
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-github-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(info) = rate_limit.clone() {
                if info.remaining == 0 {
                    return HostingError::rate_limited(info).with_status(status.as_u16());
                }
            }
        }

        let error_body = response.json::<ApiErrorResponse>().await.ok();

        let message = error_body
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| format!("HTTP {} error", status.as_u16()));

        let documentation_url = error_body.and_then(|e| e.documentation_url);

        let mut error = HostingError::from_response(status.as_u16(), message, documentation_url, request_id);

        if let Some(info) = rate_limit {
            error = error.with_rate_limit(info);
        }

        error
    }
}

#[async_trait]
impl HostingClient for GitHubClient {
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
        self.users().get_authenticated().await
    }

    async fn get_repo(&self, full_name: &str) -> HostingResult<RawRepo> {
        self.repositories().get(full_name).await
    }

    async fn create_repo(
        &self,
        organization: Option<&str>,
        request: &CreateRepoRequest,
    ) -> HostingResult<RawRepo> {
        self.repositories().create(organization, request).await
    }

    async fn edit_repo(&self, full_name: &str, request: &UpdateRepoRequest) -> HostingResult<RawRepo> {
        self.repositories().update(full_name, request).await
    }

    async fn delete_repo(&self, full_name: &str) -> HostingResult<()> {
        self.repositories().delete(full_name).await
    }

    async fn search_repos(&self, query: &str, params: &SearchParams) -> HostingResult<Vec<RawRepo>> {
        self.search().repositories(query, params).await
    }

    async fn add_collaborator(&self, full_name: &str, user: &str, permission: &str) -> HostingResult<()> {
        self.repositories()
            .add_collaborator(full_name, user, permission)
            .await
    }

    async fn remove_collaborator(&self, full_name: &str, user: &str) -> HostingResult<()> {
        self.repositories().remove_collaborator(full_name, user).await
    }

    async fn list_teams(&self, organization: &str) -> HostingResult<Vec<RawTeam>> {
        self.teams().list(organization).await
    }

    async fn create_team(&self, organization: &str, request: &CreateTeamRequest) -> HostingResult<RawTeam> {
        self.teams().create(organization, request).await
    }

    async fn update_team(&self, team_id: u64, request: &UpdateTeamRequest) -> HostingResult<RawTeam> {
        self.teams().update(team_id, request).await
    }

    async fn delete_team(&self, team_id: u64) -> HostingResult<()> {
        self.teams().delete(team_id).await
    }

    async fn add_team_repo(&self, team_id: u64, full_name: &str, permission: &str) -> HostingResult<()> {
        self.teams().add_repo(team_id, full_name, permission).await
    }

    async fn remove_team_repo(&self, team_id: u64, full_name: &str) -> HostingResult<()> {
        self.teams().remove_repo(team_id, full_name).await
    }

    async fn list_team_members(&self, team_id: u64) -> HostingResult<Vec<RawUser>> {
        self.teams().list_members(team_id).await
    }

    async fn get_team_membership(&self, team_id: u64, user: &str) -> HostingResult<RawMembership> {
        self.teams().get_membership(team_id, user).await
    }

    async fn add_team_membership(&self, team_id: u64, user: &str, role: &str) -> HostingResult<RawMembership> {
        self.teams().add_membership(team_id, user, role).await
    }

    async fn remove_team_membership(&self, team_id: u64, user: &str) -> HostingResult<()> {
        self.teams().remove_membership(team_id, user).await
    }

    async fn create_pull_request(
        &self,
        full_name: &str,
        request: &CreatePullRequestRequest,
    ) -> HostingResult<RawPullRequest> {
        self.pull_requests().create(full_name, request).await
    }

    async fn get_pull_request(&self, full_name: &str, number: u64) -> HostingResult<RawPullRequest> {
        self.pull_requests().get(full_name, number).await
    }

    async fn list_pull_requests(&self, full_name: &str, state: &str) -> HostingResult<Vec<RawPullRequest>> {
        let params = ListPullRequestsParams {
            state: Some(state.to_string()),
        };
        self.pull_requests().list(full_name, &params).await
    }

    async fn merge_pull_request(
        &self,
        full_name: &str,
        number: u64,
        message: Option<&str>,
    ) -> HostingResult<RawMergeResult> {
        let request = MergePullRequestRequest {
            commit_message: message.map(String::from),
        };
        self.pull_requests().merge(full_name, number, &request).await
    }

    async fn update_pull_request_state(
        &self,
        full_name: &str,
        number: u64,
        state: &str,
    ) -> HostingResult<RawPullRequest> {
        let request = UpdatePullRequestRequest {
            state: Some(state.to_string()),
            ..Default::default()
        };
        self.pull_requests().update(full_name, number, &request).await
    }

    async fn add_labels(&self, full_name: &str, number: u64, labels: &[String]) -> HostingResult<Vec<RawLabel>> {
        self.issues().add_labels(full_name, number, labels).await
    }

    async fn remove_label(&self, full_name: &str, number: u64, label: &str) -> HostingResult<Vec<RawLabel>> {
        self.issues().remove_label(full_name, number, label).await
    }

    async fn list_labels(&self, full_name: &str) -> HostingResult<Vec<RawLabel>> {
        self.issues().list_labels(full_name).await
    }

    async fn get_label(&self, full_name: &str, name: &str) -> HostingResult<RawLabel> {
        self.issues().get_label(full_name, name).await
    }

    async fn create_label(&self, full_name: &str, name: &str, color: &str) -> HostingResult<RawLabel> {
        self.issues().create_label(full_name, name, color).await
    }

    async fn update_label(&self, full_name: &str, name: &str, color: &str) -> HostingResult<RawLabel> {
        self.issues().update_label(full_name, name, color).await
    }

    async fn search_issues(&self, query: &str) -> HostingResult<Vec<RawIssue>> {
        self.search().issues(query, &SearchParams::default()).await
    }
}

/// Builder for GitHubClient.
pub struct GitHubClientBuilder {
    config_builder: HostingConfigBuilder,
}

impl GitHubClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: HostingConfig::builder(),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.config_builder = self.config_builder.auth(auth);
        self
    }

    /// Sets an access token.
    pub fn token(self, token: impl Into<String>) -> Self {
        self.auth(AuthMethod::token(token))
    }

    /// Sets the default organization.
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.organization(org);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Disables retries.
    pub fn no_retry(mut self) -> Self {
        self.config_builder = self.config_builder.no_retry();
        self
    }

    /// Builds the client.
    pub fn build(self) -> HostingResult<GitHubClient> {
        let config = self.config_builder.build()?;
        GitHubClient::new(config)
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PaginationParams;

    fn client() -> GitHubClient {
        GitHubClient::builder().token("test").build().unwrap()
    }

    #[test]
    fn test_build_url() {
        let client = client();

        assert_eq!(
            client.build_url("/repos/owner/repo"),
            "https://api.github.com/repos/owner/repo"
        );
        assert_eq!(
            client.build_url("repos/owner/repo"),
            "https://api.github.com/repos/owner/repo"
        );
    }

    #[test]
    fn test_build_url_with_params() {
        let client = client();

        assert_eq!(
            client
                .build_url_with_params("/orgs/acme/teams", &PaginationParams::new())
                .unwrap(),
            "https://api.github.com/orgs/acme/teams"
        );
        assert_eq!(
            client
                .build_url_with_params("/orgs/acme/teams", &PaginationParams::new().page(2))
                .unwrap(),
            "https://api.github.com/orgs/acme/teams?page=2"
        );
    }

    #[test]
    fn test_bulk_mode_counts_open_scopes() {
        let client = client();
        assert!(!client.auto_paginate());
        client.enter_bulk_mode();
        client.enter_bulk_mode();
        client.exit_bulk_mode();
        assert!(client.auto_paginate());
        client.exit_bulk_mode();
        assert!(!client.auto_paginate());

        // Unbalanced exits never wrap the counter.
        client.exit_bulk_mode();
        client.enter_bulk_mode();
        assert!(client.auto_paginate());
    }

    #[test]
    fn test_client_requires_auth() {
        let result = GitHubClient::builder().build();
        assert_eq!(*result.err().unwrap().kind(), HostingErrorKind::MissingAuth);
    }

    #[test]
    fn test_extract_rate_limit() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", "5000".parse().unwrap());
        headers.insert("x-ratelimit-remaining", "4999".parse().unwrap());
        headers.insert("x-ratelimit-reset", "1700000000".parse().unwrap());

        let info = GitHubClient::extract_rate_limit(&headers).unwrap();
        assert_eq!(info.limit, 5000);
        assert_eq!(info.remaining, 4999);
        assert!(info.retry_after.is_none());
    }
}
