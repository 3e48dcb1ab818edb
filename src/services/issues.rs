//! Label operations on issues and pull requests.

use crate::client::GitHubClient;
use crate::errors::HostingResult;
use crate::pagination::PaginationParams;
use crate::services::encode_segment;
use crate::types::RawLabel;
use serde::Serialize;

/// Service for issue label operations.
pub struct IssuesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> IssuesService<'a> {
    /// Creates a new issues service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Adds labels to an issue or pull request.
    pub async fn add_labels(
        &self,
        full_name: &str,
        number: u64,
        labels: &[String],
    ) -> HostingResult<Vec<RawLabel>> {
        let request = LabelsRequest {
            labels: labels.to_vec(),
        };
        self.client
            .post(&format!("/repos/{}/issues/{}/labels", full_name, number), &request)
            .await
    }

    /// Removes a label from an issue or pull request.
    pub async fn remove_label(
        &self,
        full_name: &str,
        number: u64,
        label: &str,
    ) -> HostingResult<Vec<RawLabel>> {
        self.client
            .delete_with_response(&format!(
                "/repos/{}/issues/{}/labels/{}",
                full_name,
                number,
                encode_segment(label)
            ))
            .await
    }

    // Repository labels

    /// Lists labels defined in a repository.
    pub async fn list_labels(&self, full_name: &str) -> HostingResult<Vec<RawLabel>> {
        self.client
            .get_all(&format!("/repos/{}/labels", full_name), &PaginationParams::new())
            .await
    }

    /// Gets a repository label.
    pub async fn get_label(&self, full_name: &str, name: &str) -> HostingResult<RawLabel> {
        self.client
            .get(&format!("/repos/{}/labels/{}", full_name, encode_segment(name)))
            .await
    }

    /// Creates a repository label.
    pub async fn create_label(&self, full_name: &str, name: &str, color: &str) -> HostingResult<RawLabel> {
        let request = LabelRequest {
            name: Some(name.to_string()),
            color: color.to_string(),
        };
        self.client
            .post(&format!("/repos/{}/labels", full_name), &request)
            .await
    }

    /// Updates a repository label's color.
    pub async fn update_label(&self, full_name: &str, name: &str, color: &str) -> HostingResult<RawLabel> {
        let request = LabelRequest {
            name: None,
            color: color.to_string(),
        };
        self.client
            .patch(
                &format!("/repos/{}/labels/{}", full_name, encode_segment(name)),
                &request,
            )
            .await
    }
}

#[derive(Debug, Clone, Serialize)]
struct LabelsRequest {
    labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct LabelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    color: String,
}
