//! Pull request operations.

use crate::client::GitHubClient;
use crate::errors::HostingResult;
use crate::types::{RawMergeResult, RawPullRequest};
use serde::Serialize;

/// Service for pull request operations.
pub struct PullRequestsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> PullRequestsService<'a> {
    /// Creates a new pull requests service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists pull requests in a repository.
    pub async fn list(
        &self,
        full_name: &str,
        params: &ListPullRequestsParams,
    ) -> HostingResult<Vec<RawPullRequest>> {
        self.client
            .get_all(&format!("/repos/{}/pulls", full_name), params)
            .await
    }

    /// Gets a pull request.
    pub async fn get(&self, full_name: &str, number: u64) -> HostingResult<RawPullRequest> {
        self.client
            .get(&format!("/repos/{}/pulls/{}", full_name, number))
            .await
    }

    /// Creates a pull request.
    pub async fn create(
        &self,
        full_name: &str,
        request: &CreatePullRequestRequest,
    ) -> HostingResult<RawPullRequest> {
        self.client
            .post(&format!("/repos/{}/pulls", full_name), request)
            .await
    }

    /// Updates a pull request.
    pub async fn update(
        &self,
        full_name: &str,
        number: u64,
        request: &UpdatePullRequestRequest,
    ) -> HostingResult<RawPullRequest> {
        self.client
            .patch(&format!("/repos/{}/pulls/{}", full_name, number), request)
            .await
    }

    /// Merges a pull request.
    pub async fn merge(
        &self,
        full_name: &str,
        number: u64,
        request: &MergePullRequestRequest,
    ) -> HostingResult<RawMergeResult> {
        self.client
            .put(&format!("/repos/{}/pulls/{}/merge", full_name, number), request)
            .await
    }
}

/// Parameters for listing pull requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListPullRequestsParams {
    /// State filter (`open`, `closed` or `all`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Request to create a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePullRequestRequest {
    /// Title.
    pub title: String,
    /// Head branch, `branch` or `namespace:branch` for forks.
    pub head: String,
    /// Base branch.
    pub base: String,
    /// Body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Request to update a pull request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePullRequestRequest {
    /// Title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// State (`open` or `closed`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Request to merge a pull request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergePullRequestRequest {
    /// Extra detail appended to the merge commit message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}
