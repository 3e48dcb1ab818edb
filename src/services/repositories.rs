//! Repository and collaborator operations.

use crate::client::GitHubClient;
use crate::errors::HostingResult;
use crate::types::RawRepo;
use serde::Serialize;

/// Service for repository operations.
pub struct RepositoriesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepositoriesService<'a> {
    /// Creates a new repositories service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Gets a repository by full name.
    pub async fn get(&self, full_name: &str) -> HostingResult<RawRepo> {
        self.client.get(&format!("/repos/{}", full_name)).await
    }

    /// Creates a repository for the authenticated user, or for `org` when given.
    pub async fn create(
        &self,
        org: Option<&str>,
        request: &CreateRepoRequest,
    ) -> HostingResult<RawRepo> {
        match org {
            Some(org) => self.client.post(&format!("/orgs/{}/repos", org), request).await,
            None => self.client.post("/user/repos", request).await,
        }
    }

    /// Updates a repository.
    pub async fn update(&self, full_name: &str, request: &UpdateRepoRequest) -> HostingResult<RawRepo> {
        self.client.patch(&format!("/repos/{}", full_name), request).await
    }

    /// Deletes a repository.
    pub async fn delete(&self, full_name: &str) -> HostingResult<()> {
        self.client.delete(&format!("/repos/{}", full_name)).await
    }

    // Collaborators

    /// Adds a collaborator, or changes their permission.
    pub async fn add_collaborator(
        &self,
        full_name: &str,
        username: &str,
        permission: &str,
    ) -> HostingResult<()> {
        let request = PermissionRequest {
            permission: permission.to_string(),
        };
        self.client
            .put_no_response(
                &format!("/repos/{}/collaborators/{}", full_name, username),
                &request,
            )
            .await
    }

    /// Removes a collaborator.
    pub async fn remove_collaborator(&self, full_name: &str, username: &str) -> HostingResult<()> {
        self.client
            .delete(&format!("/repos/{}/collaborators/{}", full_name, username))
            .await
    }
}

/// Request to create a repository.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRepoRequest {
    /// Repository name.
    pub name: String,
    /// Repository description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Homepage URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Whether the repository is private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    /// Whether issues are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    /// Whether wiki is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    /// Whether downloads are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_downloads: Option<bool>,
    /// Auto-initialize with README.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_init: Option<bool>,
}

/// Request to update a repository.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateRepoRequest {
    /// New repository name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Repository description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Homepage URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Whether the repository is private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    /// Whether issues are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    /// Whether wiki is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    /// Whether downloads are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_downloads: Option<bool>,
    /// Default branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PermissionRequest {
    pub(crate) permission: String,
}
