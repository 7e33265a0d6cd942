//! Price alerts and the evaluator that fires them

use crate::core::error::QuoteError;
use crate::core::provider::MarketDataProvider;
use crate::store::AlertStore;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

impl Display for AlertDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertDirection::Above => write!(f, "above"),
            AlertDirection::Below => write!(f, "below"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub quotation_id: String,
    pub symbol: String,
    pub target_price: f64,
    pub direction: AlertDirection,
    pub active: bool,
}

impl Alert {
    pub fn is_triggered(&self, price: f64) -> bool {
        match self.direction {
            AlertDirection::Above => price >= self.target_price,
            AlertDirection::Below => price <= self.target_price,
        }
    }
}

/// User input for a new alert; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub quotation_id: String,
    pub symbol: String,
    pub target_price: f64,
    pub direction: AlertDirection,
}

impl NewAlert {
    pub fn into_alert(self, id: u64) -> Alert {
        Alert {
            id,
            quotation_id: self.quotation_id,
            symbol: self.symbol,
            target_price: self.target_price,
            direction: self.direction,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertNotification {
    pub alert_id: u64,
    pub symbol: String,
    pub price: f64,
    pub target_price: f64,
    pub direction: AlertDirection,
}

impl AlertNotification {
    pub fn title(&self) -> &'static str {
        "Price alert reached!"
    }

    pub fn message(&self) -> String {
        let verb = match self.direction {
            AlertDirection::Above => "rose to",
            AlertDirection::Below => "fell to",
        };
        format!(
            "{} {} {} (target: {})",
            self.symbol, verb, self.price, self.target_price
        )
    }
}

/// Delivers a fired alert to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &AlertNotification) -> Result<()>;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EvaluationReport {
    pub checked: usize,
    pub triggered: Vec<AlertNotification>,
}

pub struct AlertEvaluator {
    provider: Arc<dyn MarketDataProvider>,
    alerts: Arc<AlertStore>,
    notifier: Arc<dyn Notifier>,
}

impl AlertEvaluator {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        alerts: Arc<AlertStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider,
            alerts,
            notifier,
        }
    }

    /// Checks every active alert once against fresh prices.
    ///
    /// A failed price fetch fails the whole run; already-inactive alerts are never re-fired.
    #[instrument(name = "AlertCheck", skip(self))]
    pub async fn run_once(&self) -> Result<EvaluationReport> {
        let active = self.alerts.active()?;
        if active.is_empty() {
            debug!("No active alerts");
            return Ok(EvaluationReport::default());
        }

        let ids: Vec<String> = active
            .iter()
            .map(|a| a.quotation_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let prices = self
            .provider
            .current_prices(&ids)
            .await
            .map_err(|e: QuoteError| anyhow::Error::new(e).context("Failed to fetch prices"))?;

        let mut report = EvaluationReport {
            checked: active.len(),
            triggered: Vec::new(),
        };
        for alert in active {
            let Some(&price) = prices.get(&alert.quotation_id) else {
                debug!(quotation = %alert.quotation_id, "No price returned, alert stays active");
                continue;
            };
            if !alert.is_triggered(price) {
                continue;
            }

            let notification = AlertNotification {
                alert_id: alert.id,
                symbol: alert.symbol.clone(),
                price,
                target_price: alert.target_price,
                direction: alert.direction,
            };
            self.notifier.notify(&notification).await?;
            self.alerts.update(&Alert {
                active: false,
                ..alert
            })?;
            info!(id = notification.alert_id, "Alert triggered");
            report.triggered.push(notification);
        }
        Ok(report)
    }

    /// Runs checks every `period` until `shutdown` flips to true. Failed runs are retried on the next tick.
    pub async fn run_periodic(&self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(report) => debug!(
                            checked = report.checked,
                            triggered = report.triggered.len(),
                            "Alert check finished"
                        ),
                        Err(e) => warn!("Alert check failed, retrying next tick: {e:#}"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Alert watcher stopping");
                        return;
                    }
                }
            }
        }
    }
}
