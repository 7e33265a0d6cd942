//! Normalized quote types shared by every provider

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Which family of upstream data a quotation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Crypto,
    Stock,
    Forex,
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AssetKind::Crypto => "crypto",
                AssetKind::Stock => "stock",
                AssetKind::Forex => "forex",
            }
        )
    }
}

impl FromStr for AssetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crypto" => Ok(AssetKind::Crypto),
            "stock" => Ok(AssetKind::Stock),
            "forex" => Ok(AssetKind::Forex),
            _ => Err(anyhow::anyhow!("Invalid asset kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub current_price: f64,
    /// Percent change over the last 24 hours.
    pub change_24h: f64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub kind: AssetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    /// Epoch milliseconds.
    pub timestamp_ms: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub points: Vec<PriceHistoryPoint>,
    pub change_pct: f64,
}

impl HistorySummary {
    pub fn new(mut points: Vec<PriceHistoryPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp_ms);
        let change_pct = percent_change(&points);
        Self { points, change_pct }
    }
}

/// Percent change between the first and last point of a chronological series.
///
/// Fewer than two points, or a zero starting price, yield `0.0`.
pub fn percent_change(history: &[PriceHistoryPoint]) -> f64 {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return 0.0;
    };
    if history.len() < 2 || first.price == 0.0 {
        return 0.0;
    }
    ((last.price - first.price) / first.price) * 100.0
}
