use super::{Table, watch_stream};
use crate::core::alerts::{Alert, NewAlert};
use anyhow::{Context, Result, anyhow};
use futures::Stream;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::debug;

/// Alert rows keyed by big-endian id, so iteration order is creation order.
pub struct AlertStore {
    table: Arc<dyn Table>,
    tx: watch::Sender<Vec<Alert>>,
    next_id: Mutex<u64>,
}

fn key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

impl AlertStore {
    pub fn new(table: Arc<dyn Table>) -> Result<Self> {
        let initial = load_all(table.as_ref())?;
        let next_id = match table.last_key()? {
            Some(raw) => {
                let bytes: [u8; 8] = raw
                    .as_slice()
                    .try_into()
                    .context("Corrupt alert key")?;
                u64::from_be_bytes(bytes) + 1
            }
            None => 1,
        };
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            table,
            tx,
            next_id: Mutex::new(next_id),
        })
    }

    /// Stores a new active alert under the next id. Ids are never reused while the store is open.
    pub fn insert(&self, new_alert: NewAlert) -> Result<Alert> {
        let mut next_id = self
            .next_id
            .lock()
            .map_err(|_| anyhow!("alert store lock poisoned"))?;

        let alert = new_alert.into_alert(*next_id);
        self.write(&alert)?;
        *next_id += 1;
        drop(next_id);
        debug!(id = alert.id, quotation = %alert.quotation_id, "Inserted alert");
        self.publish()?;
        Ok(alert)
    }

    pub fn update(&self, alert: &Alert) -> Result<()> {
        self.write(alert)?;
        self.publish()
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.table.remove(&key(id))?;
        debug!(id, "Deleted alert");
        self.publish()
    }

    pub fn get(&self, id: u64) -> Result<Option<Alert>> {
        self.table
            .get(&key(id))?
            .map(|raw| serde_json::from_slice(&raw).context("Corrupt alert row"))
            .transpose()
    }

    pub fn all(&self) -> Result<Vec<Alert>> {
        load_all(self.table.as_ref())
    }

    pub fn active(&self) -> Result<Vec<Alert>> {
        Ok(self.all()?.into_iter().filter(|a| a.active).collect())
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Alert>> {
        self.tx.subscribe()
    }

    pub fn watch_all(&self) -> impl Stream<Item = Vec<Alert>> + Send + 'static {
        watch_stream(self.subscribe())
    }

    fn write(&self, alert: &Alert) -> Result<()> {
        let value = serde_json::to_vec(alert)?;
        self.table.put(&key(alert.id), &value)
    }

    fn publish(&self) -> Result<()> {
        self.tx.send_replace(self.all()?);
        Ok(())
    }
}

fn load_all(table: &dyn Table) -> Result<Vec<Alert>> {
    table
        .values()?
        .iter()
        .map(|raw| serde_json::from_slice(raw).context("Corrupt alert row"))
        .collect()
}
