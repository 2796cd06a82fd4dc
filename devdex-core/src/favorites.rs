//! Favorite topic ids, persisted as one JSON array under [`FAVORITES_KEY`]
//!
//! Ids are stored as-is and never validated against the catalog. Listing
//! resolves them through [`enrich_favorites`], so ids whose pack has been
//! removed simply stop showing up.
//!
//! `toggle` reads, modifies and writes the whole array. Concurrent toggles
//! can lose one of the updates.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::views::{enrich_favorites, TopicView};
use crate::catalog::Catalog;
use crate::error::StorageError;
use crate::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "@favorites";

pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read_ids(&self) -> Result<Vec<String>, StorageError> {
        let Some(raw) = self.store.get(FAVORITES_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                warn!("Ignoring unreadable favorites: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Stored ids in insertion order; empty when the store fails
    pub async fn ids(&self) -> Vec<String> {
        match self.read_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Could not read favorites: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn is_favorite(&self, topic_id: &str) -> bool {
        self.ids().await.iter().any(|id| id == topic_id)
    }

    /// Add or remove `topic_id`, returning the new list
    ///
    /// Returns an empty list when the store fails.
    pub async fn toggle(&self, topic_id: &str) -> Vec<String> {
        match self.try_toggle(topic_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Could not toggle favorite '{}': {}", topic_id, e);
                Vec::new()
            }
        }
    }

    pub async fn try_toggle(&self, topic_id: &str) -> Result<Vec<String>, StorageError> {
        let mut ids = self.read_ids().await?;

        if ids.iter().any(|id| id == topic_id) {
            // Every copy of a duplicated id
            ids.retain(|id| id != topic_id);
            debug!("Removed favorite {}", topic_id);
        } else {
            ids.push(topic_id.to_string());
            debug!("Added favorite {}", topic_id);
        }

        let json = serde_json::to_string(&ids)?;
        self.store.set(FAVORITES_KEY, &json).await?;
        Ok(ids)
    }

    /// Favorites that still resolve against `catalog`
    pub async fn list_favorites(&self, catalog: &Catalog) -> Vec<TopicView> {
        let ids = self.ids().await;
        enrich_favorites(catalog, &ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::baseline_packs;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn favorites() -> (Arc<MemoryStore>, FavoritesStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), FavoritesStore::new(store))
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let (_, favorites) = favorites();

        assert_eq!(favorites.toggle("rs-ownership").await, vec!["rs-ownership"]);
        assert_eq!(
            favorites.toggle("js-promises").await,
            vec!["rs-ownership", "js-promises"]
        );
        assert!(favorites.is_favorite("rs-ownership").await);

        assert_eq!(favorites.toggle("rs-ownership").await, vec!["js-promises"]);
        assert!(!favorites.is_favorite("rs-ownership").await);
        assert_eq!(favorites.ids().await, vec!["js-promises"]);
    }

    #[tokio::test]
    async fn test_persisted_as_json_array() {
        let (store, favorites) = favorites();
        favorites.toggle("a").await;
        favorites.toggle("b").await;

        let raw = store.get(FAVORITES_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"["a","b"]"#);
    }

    #[tokio::test]
    async fn test_unreadable_value_is_empty() {
        let (store, favorites) = favorites();
        store.set(FAVORITES_KEY, "{not json").await.unwrap();

        assert!(favorites.ids().await.is_empty());
        assert_eq!(favorites.toggle("a").await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_toggle_removes_duplicated_id() {
        let (store, favorites) = favorites();
        store.set(FAVORITES_KEY, r#"["a","b","a"]"#).await.unwrap();

        assert_eq!(favorites.toggle("a").await, vec!["b"]);
        assert!(!favorites.is_favorite("a").await);
        assert_eq!(
            store.get(FAVORITES_KEY).await.unwrap().as_deref(),
            Some(r#"["b"]"#)
        );
    }

    #[tokio::test]
    async fn test_store_failure_returns_empty() {
        let (store, favorites) = favorites();
        favorites.toggle("a").await;
        store.set_unavailable(true);

        assert!(favorites.toggle("b").await.is_empty());
        assert!(!favorites.is_favorite("a").await);

        store.set_unavailable(false);
        assert_eq!(favorites.ids().await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_list_favorites_drops_dangling() {
        let (_, favorites) = favorites();
        favorites.toggle("py-decorators").await;
        favorites.toggle("removed-topic").await;
        favorites.toggle("rs-ownership").await;

        let catalog = Catalog::new(baseline_packs().to_vec());
        let views = favorites.list_favorites(&catalog).await;
        let ids: Vec<_> = views.iter().map(|v| v.topic.id.as_str()).collect();

        assert_eq!(ids, vec!["py-decorators", "rs-ownership"]);
        assert_eq!(views[0].language_name, "Python");
        // The stored list is left untouched
        assert_eq!(favorites.ids().await.len(), 3);
    }
}
