//! Search operations.

use crate::client::GitHubClient;
use crate::errors::HostingResult;
use crate::pagination::ListResponse;
use crate::types::{RawIssue, RawRepo};
use serde::Serialize;

/// Service for search operations.
pub struct SearchService<'a> {
    client: &'a GitHubClient,
}

impl<'a> SearchService<'a> {
    /// Creates a new search service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Searches repositories.
    pub async fn repositories(&self, query: &str, params: &SearchParams) -> HostingResult<Vec<RawRepo>> {
        let response: ListResponse<RawRepo> = self
            .client
            .get_with_params("/search/repositories", &SearchQuery { q: query, params })
            .await?;
        Ok(response.items)
    }

    /// Searches issues and pull requests.
    pub async fn issues(&self, query: &str, params: &SearchParams) -> HostingResult<Vec<RawIssue>> {
        let response: ListResponse<RawIssue> = self
            .client
            .get_with_params("/search/issues", &SearchQuery { q: query, params })
            .await?;
        Ok(response.items)
    }
}

/// Search parameters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchParams {
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Sort order (`asc` or `desc`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    #[serde(flatten)]
    params: &'a SearchParams,
}
