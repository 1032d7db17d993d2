use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::cup_store::{CupStore, MatchFilter};
use crate::dao::models::{CupEntity, MatchEntity, TeamEntity};
use crate::dao::storage::StorageResult;

/// In-memory [`CupStore`] used by tests and storage-less development runs.
///
/// Teams and matches are kept in per-cup vectors so listing preserves
/// registration/generation order the way the database-backed stores do.
#[derive(Debug, Default)]
pub struct MemoryCupStore {
    cups: DashMap<String, CupEntity>,
    teams: DashMap<String, Vec<TeamEntity>>,
    matches: DashMap<String, Vec<MatchEntity>>,
}

impl MemoryCupStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CupStore for MemoryCupStore {
    fn save_cup(&self, cup: CupEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.cups.insert(cup.slug.clone(), cup);
        Box::pin(async { Ok(()) })
    }

    fn find_cup(&self, slug: &str) -> BoxFuture<'static, StorageResult<Option<CupEntity>>> {
        let found = self.cups.get(slug).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_cups(&self) -> BoxFuture<'static, StorageResult<Vec<CupEntity>>> {
        let mut cups: Vec<CupEntity> = self.cups.iter().map(|entry| entry.value().clone()).collect();
        cups.sort_by(|a, b| a.slug.cmp(&b.slug));
        Box::pin(async move { Ok(cups) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let mut teams = self.teams.entry(team.cup.clone()).or_default();
        match teams.iter().position(|existing| existing.name == team.name) {
            Some(i) => teams[i] = team,
            None => teams.push(team),
        }
        Box::pin(async { Ok(()) })
    }

    fn find_team(
        &self,
        cup: &str,
        name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let found = self.teams.get(cup).and_then(|teams| {
            teams.iter().find(|team| team.name == name).cloned()
        });
        Box::pin(async move { Ok(found) })
    }

    fn list_teams(&self, cup: &str) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let teams = self
            .teams
            .get(cup)
            .map(|teams| teams.value().clone())
            .unwrap_or_default();
        Box::pin(async move { Ok(teams) })
    }

    fn delete_team(&self, cup: &str, name: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self
            .teams
            .get_mut(cup)
            .map(|mut teams| {
                let before = teams.len();
                teams.retain(|team| team.name != name);
                teams.len() != before
            })
            .unwrap_or(false);
        Box::pin(async move { Ok(removed) })
    }

    fn save_match(&self, m: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let mut matches = self.matches.entry(m.cup.clone()).or_default();
        match matches.iter().position(|existing| existing.id == m.id) {
            Some(i) => matches[i] = m,
            None => matches.push(m),
        }
        Box::pin(async { Ok(()) })
    }

    fn find_match(
        &self,
        cup: &str,
        id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let found = self.matches.get(cup).and_then(|matches| {
            matches.iter().find(|m| m.id == id).cloned()
        });
        Box::pin(async move { Ok(found) })
    }

    fn list_matches(
        &self,
        cup: &str,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let mut matches: Vec<MatchEntity> = self
            .matches
            .get(cup)
            .map(|matches| {
                matches
                    .iter()
                    .filter(|m| filter.accepts(m.round, m.completed))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by(|a, b| a.round.cmp(&b.round).then_with(|| a.id.cmp(&b.id)));
        Box::pin(async move { Ok(matches) })
    }

    fn delete_match(&self, cup: &str, id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self
            .matches
            .get_mut(cup)
            .map(|mut matches| {
                let before = matches.len();
                matches.retain(|m| m.id != id);
                matches.len() != before
            })
            .unwrap_or(false);
        Box::pin(async move { Ok(removed) })
    }

    fn delete_matches(&self, cup: &str) -> BoxFuture<'static, StorageResult<()>> {
        self.matches.remove(cup);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
