pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{CupEntity, MatchEntity, TeamEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Optional criteria applied by [`CupStore::list_matches`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchFilter {
    /// Restrict to a single round.
    pub round: Option<u32>,
    /// Restrict by completion state.
    pub completed: Option<bool>,
}

impl MatchFilter {
    /// Whether a match record satisfies the criteria.
    pub fn accepts(&self, round: u32, completed: bool) -> bool {
        self.round.is_none_or(|want| want == round)
            && self.completed.is_none_or(|want| want == completed)
    }
}

/// Abstraction over the persistence layer for cups, teams and matches.
///
/// Every `save_*` method is an idempotent upsert on the record's natural key;
/// concurrency control is last-write-wins.
pub trait CupStore: Send + Sync {
    /// Upsert a cup keyed by slug.
    fn save_cup(&self, cup: CupEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a cup by slug.
    fn find_cup(&self, slug: &str) -> BoxFuture<'static, StorageResult<Option<CupEntity>>>;
    /// List every cup.
    fn list_cups(&self) -> BoxFuture<'static, StorageResult<Vec<CupEntity>>>;

    /// Upsert a team keyed by `(cup, name)`.
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a team by name within a cup.
    fn find_team(
        &self,
        cup: &str,
        name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// List every team of a cup in registration order.
    fn list_teams(&self, cup: &str) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// Delete a team; returns whether it existed.
    fn delete_team(&self, cup: &str, name: &str) -> BoxFuture<'static, StorageResult<bool>>;

    /// Upsert a match keyed by `(cup, id)`.
    fn save_match(&self, m: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a match by slot id within a cup.
    fn find_match(
        &self,
        cup: &str,
        id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    /// List a cup's matches, optionally filtered by round or completion.
    fn list_matches(
        &self,
        cup: &str,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    /// Delete a single match; returns whether it existed.
    fn delete_match(&self, cup: &str, id: &str) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete every match of a cup (tournament reset).
    fn delete_matches(&self, cup: &str) -> BoxFuture<'static, StorageResult<()>>;

    /// Probe backend connectivity.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a dropped backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
