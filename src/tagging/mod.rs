//! Labels as tags on issues and pull requests.

use crate::adapters;
use crate::client::HostingClient;
use crate::errors::{HostingError, HostingErrorKind, HostingResult};
use crate::model::TagMetadata;
use crate::pagination::AutoPaginate;
use crate::types::RawLabel;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// Tagging of issues and pull requests within a repository.
///
/// Repositories are addressed by full name.
#[async_trait]
pub trait TaggingProvider: Send + Sync {
    /// Adds tags. Returns every tag now on the item.
    async fn add_tags(&self, repo: &str, id: u64, tags: &[String]) -> HostingResult<Vec<String>>;

    /// Removes a tag. Returns the tags left on the item.
    async fn remove_tag(&self, repo: &str, id: u64, tag: &str) -> HostingResult<Vec<String>>;

    /// Numbers of the issues and pull requests carrying `tag`.
    async fn search(&self, repo: &str, tag: &str) -> HostingResult<Vec<u64>>;

    /// Metadata of a tag, or `None` if it is not defined.
    async fn metadata(&self, repo: &str, tag: &str) -> HostingResult<Option<TagMetadata>>;

    /// Metadata of every tag defined in the repository.
    async fn all_metadata(&self, repo: &str) -> HostingResult<BTreeMap<String, TagMetadata>>;

    /// Sets a tag's color, defining the tag if needed.
    ///
    /// `color` is six hex digits, optionally prefixed with `#`.
    async fn set_metadata(&self, repo: &str, tag: &str, color: &str) -> HostingResult<TagMetadata>;
}

/// GitHub implementation of [`TaggingProvider`], backed by labels.
pub struct GitHubTaggingProvider {
    client: Arc<dyn HostingClient>,
}

impl GitHubTaggingProvider {
    /// Creates a tagging provider over `client`.
    pub fn new(client: Arc<dyn HostingClient>) -> Self {
        Self { client }
    }
}

fn label_names(labels: Vec<RawLabel>) -> HostingResult<Vec<String>> {
    labels
        .into_iter()
        .map(|label| adapters::adapt_label(label).map(|meta| meta.name))
        .collect()
}

fn validate_color(color: &str) -> HostingResult<&str> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(hex)
    } else {
        Err(HostingError::new(
            HostingErrorKind::InvalidParameter,
            format!("Invalid color '{}' (expected six hex digits)", color),
        ))
    }
}

#[async_trait]
impl TaggingProvider for GitHubTaggingProvider {
    #[instrument(skip(self))]
    async fn add_tags(&self, repo: &str, id: u64, tags: &[String]) -> HostingResult<Vec<String>> {
        label_names(self.client.add_labels(repo, id, tags).await?)
    }

    #[instrument(skip(self))]
    async fn remove_tag(&self, repo: &str, id: u64, tag: &str) -> HostingResult<Vec<String>> {
        label_names(self.client.remove_label(repo, id, tag).await?)
    }

    #[instrument(skip(self))]
    async fn search(&self, repo: &str, tag: &str) -> HostingResult<Vec<u64>> {
        let query = format!("repo:{} label:\"{}\"", repo, tag);
        Ok(self
            .client
            .search_issues(&query)
            .await?
            .into_iter()
            .filter_map(|issue| issue.number)
            .collect())
    }

    #[instrument(skip(self))]
    async fn metadata(&self, repo: &str, tag: &str) -> HostingResult<Option<TagMetadata>> {
        match self.client.get_label(repo, tag).await {
            Ok(raw) => adapters::adapt_label(raw).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn all_metadata(&self, repo: &str) -> HostingResult<BTreeMap<String, TagMetadata>> {
        let labels = {
            let _bulk = AutoPaginate::enable(self.client.as_ref());
            self.client.list_labels(repo).await?
        };

        labels
            .into_iter()
            .map(|raw| adapters::adapt_label(raw).map(|meta| (meta.name.clone(), meta)))
            .collect()
    }

    #[instrument(skip(self))]
    async fn set_metadata(&self, repo: &str, tag: &str, color: &str) -> HostingResult<TagMetadata> {
        let color = validate_color(color)?;

        let raw = match self.metadata(repo, tag).await? {
            Some(_) => self.client.update_label(repo, tag, color).await?,
            None => self.client.create_label(repo, tag, color).await?,
        };
        adapters::adapt_label(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockHostingClient;
    use test_case::test_case;

    #[test_case("ff0000", Some("ff0000"))]
    #[test_case("#00FF7a", Some("00FF7a"))]
    #[test_case("red", None)]
    #[test_case("ff00", None)]
    #[test_case("gg0000", None)]
    fn test_validate_color(input: &str, expected: Option<&str>) {
        assert_eq!(validate_color(input).ok(), expected);
    }

    fn provider() -> (Arc<MockHostingClient>, GitHubTaggingProvider) {
        let client = Arc::new(MockHostingClient::new());
        (client.clone(), GitHubTaggingProvider::new(client))
    }

    #[tokio::test]
    async fn test_add_and_remove_tags() {
        let (_, tagging) = provider();

        let tags = tagging
            .add_tags("acme/widgets", 3, &["bug".to_string(), "ui".to_string()])
            .await
            .unwrap();
        assert_eq!(tags, vec!["bug", "ui"]);

        let left = tagging.remove_tag("acme/widgets", 3, "bug").await.unwrap();
        assert_eq!(left, vec!["ui"]);
    }

    #[tokio::test]
    async fn test_search_by_tag() {
        let (_, tagging) = provider();
        tagging
            .add_tags("acme/widgets", 3, &["bug".to_string()])
            .await
            .unwrap();
        tagging
            .add_tags("acme/widgets", 5, &["docs".to_string()])
            .await
            .unwrap();

        assert_eq!(tagging.search("acme/widgets", "bug").await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_metadata_absent() {
        let (_, tagging) = provider();
        assert!(tagging.metadata("acme/widgets", "bug").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_metadata_creates_then_updates() {
        let (client, tagging) = provider();

        let created = tagging
            .set_metadata("acme/widgets", "bug", "#ff0000")
            .await
            .unwrap();
        assert_eq!(created.color.as_deref(), Some("ff0000"));
        assert!(client.verify_request("POST", "/repos/acme/widgets/labels"));

        let updated = tagging
            .set_metadata("acme/widgets", "bug", "00ff00")
            .await
            .unwrap();
        assert_eq!(updated.color.as_deref(), Some("00ff00"));
        assert!(client.verify_request("PATCH", "/repos/acme/widgets/labels/bug"));

        let all = tagging.all_metadata("acme/widgets").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["bug"].color.as_deref(), Some("00ff00"));
    }

    #[tokio::test]
    async fn test_set_metadata_rejects_bad_color() {
        let (client, tagging) = provider();

        let err = tagging
            .set_metadata("acme/widgets", "bug", "red")
            .await
            .unwrap_err();
        assert_eq!(*err.kind(), HostingErrorKind::InvalidParameter);
        assert!(client.requests().is_empty());
    }
}
