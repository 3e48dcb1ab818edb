//! REST endpoint groups used by the HTTP client.

mod issues;
mod pull_requests;
mod repositories;
mod search;
mod teams;
mod users;

pub use issues::*;
pub use pull_requests::*;
pub use repositories::*;
pub use search::*;
pub use teams::*;
pub use users::*;

/// Percent-encodes a single path segment such as a label name.
pub(crate) fn encode_segment(segment: &str) -> String {
    let mut url = match url::Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return segment.to_string(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}
