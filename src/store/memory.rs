use super::Table;
use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory table with the same ordering guarantees as the disk table
#[derive(Default)]
pub struct MemoryTable {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("memory table lock poisoned")
}

impl Table for MemoryTable {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let table = self.inner.read().map_err(poisoned)?;
        Ok(table.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut table = self.inner.write().map_err(poisoned)?;
        table.insert(key.to_vec(), value.to_vec());
        debug!("Table PUT {} bytes", value.len());
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<()> {
        let mut table = self.inner.write().map_err(poisoned)?;
        table.remove(key);
        debug!("Table REMOVE");
        Ok(())
    }

    fn values(&self) -> Result<Vec<Vec<u8>>> {
        let table = self.inner.read().map_err(poisoned)?;
        Ok(table.values().cloned().collect())
    }

    fn last_key(&self) -> Result<Option<Vec<u8>>> {
        let table = self.inner.read().map_err(poisoned)?;
        Ok(table.keys().next_back().cloned())
    }
}
