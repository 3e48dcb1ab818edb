//! Pagination handling and bulk-fetch mode.

use crate::client::HostingClient;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// Page size requested while bulk-fetch mode is on.
pub const BULK_PAGE_SIZE: u32 = 100;

/// Pagination links parsed from Link header.
#[derive(Debug, Clone, Default)]
pub struct PaginationLinks {
    /// URL for the next page.
    pub next: Option<String>,
    /// URL for the previous page.
    pub prev: Option<String>,
    /// URL for the first page.
    pub first: Option<String>,
    /// URL for the last page.
    pub last: Option<String>,
}

impl PaginationLinks {
    /// Parses pagination links from the Link header (RFC 8288).
    pub fn from_header(header_value: &str) -> Self {
        let mut links = Self::default();

        for part in header_value.split(',') {
            let mut url = None;
            let mut rel = None;

            for segment in part.split(';') {
                let segment = segment.trim();
                if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                    url = Some(inner.to_string());
                } else if let Some(value) = segment.strip_prefix("rel=") {
                    rel = Some(value.trim_matches('"').to_string());
                }
            }

            if let (Some(url), Some(rel)) = (url, rel) {
                match rel.as_str() {
                    "next" => links.next = Some(url),
                    "prev" => links.prev = Some(url),
                    "first" => links.first = Some(url),
                    "last" => links.last = Some(url),
                    _ => {}
                }
            }
        }

        links
    }

    /// Parses pagination links from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(Self::from_header)
            .unwrap_or_default()
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Gets the total page count from the last link.
    pub fn total_pages(&self) -> Option<u32> {
        self.last.as_deref().and_then(extract_page_number)
    }
}

/// Pagination parameters for list requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaginationParams {
    /// Page number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page (max 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl PaginationParams {
    /// Creates new pagination parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets items per page.
    pub fn per_page(mut self, per_page: u32) -> Self {
        // upstream caps at 100
        self.per_page = Some(per_page.min(BULK_PAGE_SIZE));
        self
    }
}

/// Search response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    /// Total count of items.
    pub total_count: u64,
    /// Whether results are incomplete.
    #[serde(default)]
    pub incomplete_results: bool,
    /// The items.
    pub items: Vec<T>,
}

/// Extracts page number from a URL.
pub fn extract_page_number(url: &str) -> Option<u32> {
    url::Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}

/// Scoped bulk-fetch mode.
///
/// Opens a bulk-fetch scope on the client for the lifetime of the guard and
/// closes it when dropped, including when the guarded call fails or its
/// future is dropped mid-flight. Scopes nest and may overlap; the client
/// stays in bulk mode until the last open scope closes.
#[must_use = "bulk mode is restored as soon as the guard is dropped"]
pub struct AutoPaginate<'a> {
    client: &'a dyn HostingClient,
}

impl<'a> AutoPaginate<'a> {
    /// Enables bulk-fetch mode on `client` until the guard is dropped.
    pub fn enable(client: &'a dyn HostingClient) -> Self {
        client.enter_bulk_mode();
        tracing::trace!("Bulk fetch scope opened");
        Self { client }
    }
}

impl Drop for AutoPaginate<'_> {
    fn drop(&mut self) {
        self.client.exit_bulk_mode();
        tracing::trace!(
            still_bulk = self.client.auto_paginate(),
            "Bulk fetch scope closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockHostingClient;

    #[test]
    fn test_parse_link_header() {
        let header = r#"<https://api.github.com/repos?page=2>; rel="next", <https://api.github.com/repos?page=5>; rel="last""#;
        let links = PaginationLinks::from_header(header);

        assert_eq!(links.next, Some("https://api.github.com/repos?page=2".to_string()));
        assert_eq!(links.last, Some("https://api.github.com/repos?page=5".to_string()));
        assert!(links.prev.is_none());
        assert!(links.first.is_none());
        assert_eq!(links.total_pages(), Some(5));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let header = r#"<https://api.github.com/repos?page=1>; rel="first", <https://api.github.com/repos?page=4>; rel="prev""#;
        let links = PaginationLinks::from_header(header);

        assert!(!links.has_next());
        assert!(links.first.is_some());
        assert!(links.prev.is_some());
    }

    #[test]
    fn test_per_page_limit() {
        let params = PaginationParams::new().per_page(200);
        assert_eq!(params.per_page, Some(100));
    }

    #[test]
    fn test_guard_restores_previous_mode() {
        let client = MockHostingClient::new();
        assert!(!client.auto_paginate());

        {
            let _guard = AutoPaginate::enable(&client);
            assert!(client.auto_paginate());
        }
        assert!(!client.auto_paginate());

        // Nested scopes leave an outer bulk scope untouched.
        let outer = AutoPaginate::enable(&client);
        {
            let _inner = AutoPaginate::enable(&client);
            assert!(client.auto_paginate());
        }
        assert!(client.auto_paginate());
        drop(outer);
        assert!(!client.auto_paginate());
    }

    #[test]
    fn test_overlapping_guards_end_in_single_page_mode() {
        let client = MockHostingClient::new();

        let first = AutoPaginate::enable(&client);
        let second = AutoPaginate::enable(&client);
        drop(first);
        assert!(client.auto_paginate());
        drop(second);

        assert!(!client.auto_paginate());
    }

    #[test]
    fn test_guard_restores_on_early_return() {
        fn failing(client: &MockHostingClient) -> Result<(), ()> {
            let _bulk = AutoPaginate::enable(client);
            Err(())
        }

        let client = MockHostingClient::new();
        assert!(failing(&client).is_err());
        assert!(!client.auto_paginate());
    }
}
