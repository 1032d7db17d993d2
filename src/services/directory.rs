//! Player identity resolution, consumed at registration and roster-edit time.
//!
//! The real game API client lives outside this crate; the engine only needs
//! the narrow lookup below.

use futures::future::BoxFuture;

/// Identity data returned for a player tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    /// Display name.
    pub name: String,
    /// Town-hall level, when the source knows it.
    pub town_hall: Option<u8>,
}

/// Resolves player tags to identity data.
pub trait PlayerDirectory: Send + Sync {
    /// Look up a tag; `None` when the player is unknown or the source is down.
    fn resolve(&self, tag: &str) -> BoxFuture<'static, Option<PlayerProfile>>;
}

/// Directory that never resolves anything; callers fall back to the raw tag.
pub struct NullDirectory;

impl PlayerDirectory for NullDirectory {
    fn resolve(&self, _tag: &str) -> BoxFuture<'static, Option<PlayerProfile>> {
        Box::pin(async { None })
    }
}

/// Fixed-map directory for tests and offline operation.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    entries: std::collections::HashMap<String, PlayerProfile>,
}

impl StaticDirectory {
    /// Build a directory from `(tag, name, town_hall)` triples.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, PlayerProfile)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl PlayerDirectory for StaticDirectory {
    fn resolve(&self, tag: &str) -> BoxFuture<'static, Option<PlayerProfile>> {
        let found = self.entries.get(tag).cloned();
        Box::pin(async move { found })
    }
}
