use super::{Table, watch_stream};
use crate::core::quotation::{AssetKind, Quotation};
use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// A pinned quotation. Price fields are not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub kind: AssetKind,
}

impl From<&Quotation> for Favorite {
    fn from(q: &Quotation) -> Self {
        Favorite {
            id: q.id.clone(),
            name: q.name.clone(),
            symbol: q.symbol.clone(),
            image_url: q.image_url.clone(),
            kind: q.kind,
        }
    }
}

impl From<Favorite> for Quotation {
    fn from(f: Favorite) -> Self {
        Quotation {
            id: f.id,
            name: f.name,
            symbol: f.symbol,
            current_price: 0.0,
            change_24h: 0.0,
            image_url: f.image_url,
            kind: f.kind,
        }
    }
}

pub struct FavoritesStore {
    table: Arc<dyn Table>,
    tx: watch::Sender<Vec<Favorite>>,
}

impl FavoritesStore {
    pub fn new(table: Arc<dyn Table>) -> Result<Self> {
        let initial = load_all(table.as_ref())?;
        let (tx, _rx) = watch::channel(initial);
        Ok(Self { table, tx })
    }

    /// Inserts or replaces the favorite for `quotation.id`.
    pub fn add(&self, quotation: &Quotation) -> Result<()> {
        let favorite = Favorite::from(quotation);
        let value = serde_json::to_vec(&favorite)?;
        self.table.put(favorite.id.as_bytes(), &value)?;
        debug!("Added favorite {}", favorite.id);
        self.publish()
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        self.table.remove(id.as_bytes())?;
        debug!("Removed favorite {}", id);
        self.publish()
    }

    pub fn is_favorite(&self, id: &str) -> Result<bool> {
        Ok(self.table.get(id.as_bytes())?.is_some())
    }

    pub fn all(&self) -> Result<Vec<Quotation>> {
        Ok(load_all(self.table.as_ref())?
            .into_iter()
            .map(Quotation::from)
            .collect())
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Favorite>> {
        self.tx.subscribe()
    }

    /// Current favorites, re-emitted after every write.
    pub fn watch_all(&self) -> impl Stream<Item = Vec<Quotation>> + Send + 'static {
        watch_stream(self.subscribe())
            .map(|favorites| favorites.into_iter().map(Quotation::from).collect())
    }

    /// Whether `id` is a favorite, re-emitted after every write.
    pub fn watch_is_favorite(&self, id: &str) -> impl Stream<Item = bool> + Send + 'static {
        let id = id.to_string();
        watch_stream(self.subscribe()).map(move |favorites| favorites.iter().any(|f| f.id == id))
    }

    fn publish(&self) -> Result<()> {
        let favorites = load_all(self.table.as_ref())?;
        self.tx.send_replace(favorites);
        Ok(())
    }
}

fn load_all(table: &dyn Table) -> Result<Vec<Favorite>> {
    table
        .values()?
        .iter()
        .map(|raw| serde_json::from_slice(raw).context("Corrupt favorite row"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryTable;

    fn quotation(id: &str, price: f64) -> Quotation {
        Quotation {
            id: id.to_string(),
            name: format!("{id} name"),
            symbol: id.to_uppercase(),
            current_price: price,
            change_24h: -3.0,
            image_url: Some(format!("https://img/{id}.png")),
            kind: AssetKind::Crypto,
        }
    }

    fn store() -> FavoritesStore {
        FavoritesStore::new(Arc::new(MemoryTable::new())).unwrap()
    }

    #[test]
    fn test_add_then_remove() {
        let store = store();
        store.add(&quotation("bitcoin", 64000.0)).unwrap();
        assert!(store.is_favorite("bitcoin").unwrap());

        store.remove("bitcoin").unwrap();
        assert!(!store.is_favorite("bitcoin").unwrap());

        // Absent rows are not an error
        store.remove("bitcoin").unwrap();
    }

    #[test]
    fn test_add_replaces_on_conflict() {
        let store = store();
        store.add(&quotation("bitcoin", 1.0)).unwrap();
        let mut renamed = quotation("bitcoin", 2.0);
        renamed.name = "Bitcoin".to_string();
        store.add(&renamed).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Bitcoin");
    }

    #[test]
    fn test_rehydrated_favorites_have_zeroed_prices() {
        let store = store();
        store.add(&quotation("ethereum", 3000.0)).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all[0].current_price, 0.0);
        assert_eq!(all[0].change_24h, 0.0);
        assert_eq!(all[0].image_url.as_deref(), Some("https://img/ethereum.png"));
    }

    #[tokio::test]
    async fn test_watch_is_favorite_reemits_on_write() {
        let store = store();
        let mut flags = Box::pin(store.watch_is_favorite("bitcoin"));
        assert_eq!(flags.next().await, Some(false));

        store.add(&quotation("bitcoin", 1.0)).unwrap();
        assert_eq!(flags.next().await, Some(true));

        store.remove("bitcoin").unwrap();
        assert_eq!(flags.next().await, Some(false));
    }

    #[tokio::test]
    async fn test_watch_all_replays_latest() {
        let store = store();
        store.add(&quotation("bitcoin", 1.0)).unwrap();
        store.add(&quotation("dogecoin", 1.0)).unwrap();

        let mut lists = Box::pin(store.watch_all());
        let first = lists.next().await.unwrap();
        let ids: Vec<_> = first.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "dogecoin"]);
    }
}
