//! Core business logic abstractions

pub mod aggregator;
pub mod alerts;
pub mod config;
pub mod error;
pub mod log;
pub mod provider;
pub mod quotation;
pub mod resource;
pub mod session;

// Re-export main types for cleaner imports
pub use aggregator::{QuoteAggregator, QuoteList};
pub use error::QuoteError;
pub use provider::{MarketDataProvider, SymbolProvider};
pub use quotation::{AssetKind, Quotation};
pub use resource::Resource;
