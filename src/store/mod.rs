pub mod alerts;
pub mod disk;
pub mod favorites;
pub mod memory;

use anyhow::{Context, Result};
use disk::DiskTable;
use fjall::PartitionCreateOptions;
use futures::Stream;
use futures::stream;
use memory::MemoryTable;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

pub use alerts::AlertStore;
pub use favorites::{Favorite, FavoritesStore};

pub const FAVORITES_TABLE: &str = "favorites";
pub const ALERTS_TABLE: &str = "alerts";

/// Ordered byte-keyed table. Iteration follows key order.
pub trait Table: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    fn remove(&self, key: &[u8]) -> Result<()>;

    fn values(&self) -> Result<Vec<Vec<u8>>>;

    fn last_key(&self) -> Result<Option<Vec<u8>>>;
}

/// The local database: one table per persisted entity.
pub struct Database {
    pub favorites: FavoritesStore,
    pub alerts: AlertStore,
}

impl Database {
    /// Opens (or creates) the fjall keyspace under `path`.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path.join("db"))
            .open()
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        debug!("Opened database at {}", path.display());
        let keyspace = Arc::new(keyspace);

        let table = |name: &str| -> Result<Arc<dyn Table>> {
            let partition = keyspace
                .open_partition(name, PartitionCreateOptions::default())
                .with_context(|| format!("Failed to open table: {name}"))?;
            Ok(Arc::new(DiskTable::new(Arc::clone(&keyspace), partition)))
        };

        Ok(Self {
            favorites: FavoritesStore::new(table(FAVORITES_TABLE)?)?,
            alerts: AlertStore::new(table(ALERTS_TABLE)?)?,
        })
    }

    /// A database that lives only as long as the process.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            favorites: FavoritesStore::new(Arc::new(MemoryTable::new()))?,
            alerts: AlertStore::new(Arc::new(MemoryTable::new()))?,
        })
    }
}

/// Turns a watch receiver into a stream that yields the current value first, then every update.
pub(crate) fn watch_stream<T>(rx: watch::Receiver<T>) -> impl Stream<Item = T> + Send + 'static
where
    T: Clone + Send + Sync + 'static,
{
    stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let value = rx.borrow_and_update().clone();
        Some((value, (rx, false)))
    })
}
