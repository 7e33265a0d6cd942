pub mod alpha_vantage;
pub mod coingecko;
pub mod normalize;
pub mod util;

pub use alpha_vantage::AlphaVantageProvider;
pub use coingecko::CoinGeckoProvider;
