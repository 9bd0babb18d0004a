use async_trait::async_trait;

use crate::error::ProviderError;
use common::models::SentimentSnapshot;

/// Spot and historical prices for the traded asset.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn current_price(&self) -> Result<f64, ProviderError>;

    /// Daily closes over the last `window_days`, ordered oldest first.
    async fn historical_prices(&self, window_days: u32) -> Result<Vec<f64>, ProviderError>;
}

/// Aggregate market sentiment from an external scoring service. How the
/// score is computed (which feeds, which analyzer) is that service's
/// business; the core only consumes the snapshot.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn fetch(&self) -> Result<SentimentSnapshot, ProviderError>;
}
