//! Team name index.
//!
//! The hosting API cannot fetch a team by name, so teams are resolved
//! through a local `name -> team` map. A miss triggers one full listing of
//! the organization's teams, which replaces the whole map. Entries never
//! expire; team mutations made through the provider update the map directly.

use crate::client::HostingClient;
use crate::errors::{HostingError, HostingResult};
use crate::observability::TracingHooks;
use crate::pagination::AutoPaginate;
use crate::types::RawTeam;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-through cache of an organization's teams, keyed by name.
pub struct TeamCache {
    client: Arc<dyn HostingClient>,
    organization: Option<String>,
    teams: RwLock<HashMap<String, RawTeam>>,
}

impl TeamCache {
    /// Creates an empty cache for `organization`.
    pub fn new(client: Arc<dyn HostingClient>, organization: Option<String>) -> Self {
        Self {
            client,
            organization,
            teams: RwLock::new(HashMap::new()),
        }
    }

    /// Looks up a team, refreshing once on a miss.
    ///
    /// `None` after the refresh means the team does not exist.
    pub async fn lookup(&self, name: &str) -> HostingResult<Option<RawTeam>> {
        if let Some(team) = self.cached(name).await {
            return Ok(Some(team));
        }

        self.refresh().await?;
        Ok(self.cached(name).await)
    }

    /// Gets a team from local state without touching the network.
    pub async fn cached(&self, name: &str) -> Option<RawTeam> {
        self.teams.read().await.get(name).cloned()
    }

    /// Refetches every team and replaces the cache contents.
    ///
    /// Returns the number of cached teams.
    pub async fn refresh(&self) -> HostingResult<usize> {
        let organization = self.organization.as_deref().ok_or_else(|| {
            HostingError::configuration("Teams require an organization to be configured")
        })?;

        let teams = {
            let _bulk = AutoPaginate::enable(self.client.as_ref());
            self.client.list_teams(organization).await?
        };

        let count = self.replace_all(teams).await;
        TracingHooks::on_team_cache_refresh(organization, count);
        Ok(count)
    }

    /// Replaces the cache contents with `teams`.
    ///
    /// When two teams share a name the later one wins. Teams without a name
    /// cannot be looked up and are skipped.
    pub async fn replace_all(&self, teams: Vec<RawTeam>) -> usize {
        let mut map = HashMap::with_capacity(teams.len());
        for team in teams {
            match team.name.clone() {
                Some(name) => {
                    map.insert(name, team);
                }
                None => tracing::warn!(id = ?team.id, "Skipping team without a name"),
            }
        }

        let count = map.len();
        *self.teams.write().await = map;
        count
    }

    /// Inserts or overwrites the entry for a team.
    pub async fn insert(&self, team: RawTeam) {
        if let Some(name) = team.name.clone() {
            self.teams.write().await.insert(name, team);
        }
    }

    /// Removes a team from the cache.
    pub async fn invalidate(&self, name: &str) {
        if self.teams.write().await.remove(name).is_some() {
            TracingHooks::on_team_cache_invalidate(name);
        }
    }

    /// Moves an entry to the team's current name.
    pub async fn rename(&self, old_name: &str, team: RawTeam) {
        let mut teams = self.teams.write().await;
        teams.remove(old_name);
        if let Some(name) = team.name.clone() {
            teams.insert(name, team);
        }
        TracingHooks::on_team_cache_invalidate(old_name);
    }

    /// Finds teams whose name contains `query`, ignoring case.
    ///
    /// If nothing cached matches, refreshes once and matches again.
    pub async fn search(&self, query: &str) -> HostingResult<Vec<RawTeam>> {
        let query = query.to_lowercase();

        let found = self.matching(&query).await;
        if !found.is_empty() {
            return Ok(found);
        }

        self.refresh().await?;
        Ok(self.matching(&query).await)
    }

    /// Number of cached teams.
    pub async fn len(&self) -> usize {
        self.teams.read().await.len()
    }

    /// Returns true when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.teams.read().await.is_empty()
    }

    async fn matching(&self, query: &str) -> Vec<RawTeam> {
        let teams = self.teams.read().await;
        let mut found: Vec<RawTeam> = teams
            .iter()
            .filter(|(name, _)| name.to_lowercase().contains(query))
            .map(|(_, team)| team.clone())
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}
