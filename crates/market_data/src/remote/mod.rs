pub mod coingecko_client;
pub mod sentiment_api;

pub use coingecko_client::CoinGeckoClient;
pub use sentiment_api::SentimentApiClient;

pub const DEFAULT_PRICE_API_BASE: &str = "https://api.coingecko.com";
