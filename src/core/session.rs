use crate::core::aggregator::{QuoteAggregator, QuoteList};
use crate::core::resource::Resource;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Debounced search driver. Each new query cancels the one in flight.
pub struct SearchSession {
    aggregator: Arc<QuoteAggregator>,
    debounce: Duration,
    state: Arc<watch::Sender<Resource<QuoteList>>>,
    query: String,
    in_flight: Option<JoinHandle<()>>,
}

impl SearchSession {
    pub fn new(aggregator: Arc<QuoteAggregator>, debounce: Duration) -> Self {
        let (tx, _rx) = watch::channel(Resource::loading());
        Self {
            aggregator,
            debounce,
            state: Arc::new(tx),
            query: String::new(),
            in_flight: None,
        }
    }

    /// Latest state first, then every change.
    pub fn subscribe(&self) -> watch::Receiver<Resource<QuoteList>> {
        self.state.subscribe()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replaces the query. The previous search is aborted before the new one is scheduled.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }

        let aggregator = Arc::clone(&self.aggregator);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        let query = self.query.clone();
        self.in_flight = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            debug!(query = %query, "Running search");
            let mut states = aggregator.quotations(&query);
            while let Some(next) = states.next().await {
                // Keep the last list visible while loading
                let next = match next {
                    Resource::Loading { .. } => state.borrow().to_loading(),
                    other => other,
                };
                state.send_replace(next);
            }
        }));
    }

    /// Waits for the current search to publish its terminal state.
    pub async fn settle(&mut self) {
        if let Some(task) = self.in_flight.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}
