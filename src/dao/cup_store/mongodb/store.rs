use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
};
use crate::dao::{
    cup_store::{CupStore, MatchFilter},
    models::{CupEntity, MatchEntity, TeamEntity},
    storage::StorageResult,
};

const CUP_COLLECTION: &str = "cups";
const TEAM_COLLECTION: &str = "teams";
const MATCH_COLLECTION: &str = "matches";

/// MongoDB-backed cup store. Cheap to clone; all clones share the connection.
#[derive(Clone)]
pub struct MongoCupStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoCupStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let cups = database.collection::<mongodb::bson::Document>(CUP_COLLECTION);
        let cup_index = mongodb::IndexModel::builder()
            .keys(doc! {"slug": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("cup_slug_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        cups.create_index(cup_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: CUP_COLLECTION,
                index: "slug",
                source,
            })?;

        let teams = database.collection::<mongodb::bson::Document>(TEAM_COLLECTION);
        let team_index = mongodb::IndexModel::builder()
            .keys(doc! {"cup": 1, "name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("team_cup_name_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        teams
            .create_index(team_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: TEAM_COLLECTION,
                index: "cup,name",
                source,
            })?;

        let matches = database.collection::<mongodb::bson::Document>(MATCH_COLLECTION);
        let match_index = mongodb::IndexModel::builder()
            .keys(doc! {"cup": 1, "id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("match_cup_id_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        matches
            .create_index(match_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION,
                index: "cup,id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn cups(&self) -> Collection<CupEntity> {
        self.database().await.collection::<CupEntity>(CUP_COLLECTION)
    }

    async fn teams(&self) -> Collection<TeamEntity> {
        self.database()
            .await
            .collection::<TeamEntity>(TEAM_COLLECTION)
    }

    async fn matches(&self) -> Collection<MatchEntity> {
        self.database()
            .await
            .collection::<MatchEntity>(MATCH_COLLECTION)
    }

    async fn save_cup(&self, cup: CupEntity) -> MongoResult<()> {
        let key = cup.slug.clone();
        self.cups()
            .await
            .replace_one(doc! {"slug": &key}, &cup)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                what: "cup",
                key,
                source,
            })?;
        Ok(())
    }

    async fn find_cup(&self, slug: String) -> MongoResult<Option<CupEntity>> {
        self.cups()
            .await
            .find_one(doc! {"slug": &slug})
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "cup",
                key: slug,
                source,
            })
    }

    async fn list_cups(&self) -> MongoResult<Vec<CupEntity>> {
        self.cups()
            .await
            .find(doc! {})
            .sort(doc! {"slug": 1})
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "cup",
                key: "*".to_owned(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "cup",
                key: "*".to_owned(),
                source,
            })
    }

    async fn save_team(&self, team: TeamEntity) -> MongoResult<()> {
        let key = format!("{}/{}", team.cup, team.name);
        self.teams()
            .await
            .replace_one(doc! {"cup": &team.cup, "name": &team.name}, &team)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                what: "team",
                key,
                source,
            })?;
        Ok(())
    }

    async fn find_team(&self, cup: String, name: String) -> MongoResult<Option<TeamEntity>> {
        self.teams()
            .await
            .find_one(doc! {"cup": &cup, "name": &name})
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "team",
                key: format!("{cup}/{name}"),
                source,
            })
    }

    async fn list_teams(&self, cup: String) -> MongoResult<Vec<TeamEntity>> {
        self.teams()
            .await
            .find(doc! {"cup": &cup})
            .sort(doc! {"registered_at": 1})
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "team",
                key: cup.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "team",
                key: cup,
                source,
            })
    }

    async fn delete_team(&self, cup: String, name: String) -> MongoResult<bool> {
        let result = self
            .teams()
            .await
            .delete_one(doc! {"cup": &cup, "name": &name})
            .await
            .map_err(|source| MongoDaoError::Delete {
                what: "team",
                key: format!("{cup}/{name}"),
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn save_match(&self, m: MatchEntity) -> MongoResult<()> {
        let key = format!("{}/{}", m.cup, m.id);
        self.matches()
            .await
            .replace_one(doc! {"cup": &m.cup, "id": &m.id}, &m)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                what: "match",
                key,
                source,
            })?;
        Ok(())
    }

    async fn find_match(&self, cup: String, id: String) -> MongoResult<Option<MatchEntity>> {
        self.matches()
            .await
            .find_one(doc! {"cup": &cup, "id": &id})
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "match",
                key: format!("{cup}/{id}"),
                source,
            })
    }

    async fn list_matches(
        &self,
        cup: String,
        filter: MatchFilter,
    ) -> MongoResult<Vec<MatchEntity>> {
        let mut query = doc! {"cup": &cup};
        if let Some(round) = filter.round {
            query.insert("round", i64::from(round));
        }
        if let Some(completed) = filter.completed {
            query.insert("completed", completed);
        }

        self.matches()
            .await
            .find(query)
            .sort(doc! {"round": 1, "id": 1})
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "match",
                key: cup.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Load {
                what: "match",
                key: cup,
                source,
            })
    }

    async fn delete_match(&self, cup: String, id: String) -> MongoResult<bool> {
        let result = self
            .matches()
            .await
            .delete_one(doc! {"cup": &cup, "id": &id})
            .await
            .map_err(|source| MongoDaoError::Delete {
                what: "match",
                key: format!("{cup}/{id}"),
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_matches(&self, cup: String) -> MongoResult<()> {
        self.matches()
            .await
            .delete_many(doc! {"cup": &cup})
            .await
            .map_err(|source| MongoDaoError::Delete {
                what: "match",
                key: cup,
                source,
            })?;
        Ok(())
    }
}

impl CupStore for MongoCupStore {
    fn save_cup(&self, cup: CupEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_cup(cup).await.map_err(Into::into) })
    }

    fn find_cup(&self, slug: &str) -> BoxFuture<'static, StorageResult<Option<CupEntity>>> {
        let store = self.clone();
        let slug = slug.to_owned();
        Box::pin(async move { store.find_cup(slug).await.map_err(Into::into) })
    }

    fn list_cups(&self) -> BoxFuture<'static, StorageResult<Vec<CupEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_cups().await.map_err(Into::into) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_team(team).await.map_err(Into::into) })
    }

    fn find_team(
        &self,
        cup: &str,
        name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        let cup = cup.to_owned();
        let name = name.to_owned();
        Box::pin(async move { store.find_team(cup, name).await.map_err(Into::into) })
    }

    fn list_teams(&self, cup: &str) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        let cup = cup.to_owned();
        Box::pin(async move { store.list_teams(cup).await.map_err(Into::into) })
    }

    fn delete_team(&self, cup: &str, name: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let cup = cup.to_owned();
        let name = name.to_owned();
        Box::pin(async move { store.delete_team(cup, name).await.map_err(Into::into) })
    }

    fn save_match(&self, m: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_match(m).await.map_err(Into::into) })
    }

    fn find_match(
        &self,
        cup: &str,
        id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        let cup = cup.to_owned();
        let id = id.to_owned();
        Box::pin(async move { store.find_match(cup, id).await.map_err(Into::into) })
    }

    fn list_matches(
        &self,
        cup: &str,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        let cup = cup.to_owned();
        Box::pin(async move { store.list_matches(cup, filter).await.map_err(Into::into) })
    }

    fn delete_match(&self, cup: &str, id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let cup = cup.to_owned();
        let id = id.to_owned();
        Box::pin(async move { store.delete_match(cup, id).await.map_err(Into::into) })
    }

    fn delete_matches(&self, cup: &str) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let cup = cup.to_owned();
        Box::pin(async move { store.delete_matches(cup).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
