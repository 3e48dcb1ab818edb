//! User operations.

use crate::client::GitHubClient;
use crate::errors::HostingResult;
use crate::types::RawUser;

/// Service for user operations.
pub struct UsersService<'a> {
    client: &'a GitHubClient,
}

impl<'a> UsersService<'a> {
    /// Creates a new users service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Gets the authenticated user.
    pub async fn get_authenticated(&self) -> HostingResult<RawUser> {
        self.client.get("/user").await
    }

    /// Gets a user by login.
    pub async fn get(&self, username: &str) -> HostingResult<RawUser> {
        self.client.get(&format!("/users/{}", username)).await
    }
}
