use super::Table;
use anyhow::Result;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// Table stored in a fjall partition; every write is journaled before returning.
pub struct DiskTable {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskTable {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn persist(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl Table for DiskTable {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.partition.get(key)?.map(|value| value.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.partition.insert(key, value)?;
        self.persist()?;
        debug!("Table PUT {} bytes", value.len());
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<()> {
        self.partition.remove(key)?;
        self.persist()?;
        debug!("Table REMOVE");
        Ok(())
    }

    fn values(&self) -> Result<Vec<Vec<u8>>> {
        self.partition
            .iter()
            .map(|item| {
                let (_key, value) = item?;
                Ok(value.to_vec())
            })
            .collect()
    }

    fn last_key(&self) -> Result<Option<Vec<u8>>> {
        Ok(self
            .partition
            .last_key_value()?
            .map(|(key, _value)| key.to_vec()))
    }
}
