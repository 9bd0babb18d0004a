use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::error::ProviderError;
use crate::traits::PriceProvider;

const SERVICE: &str = "coingecko";

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: UsdQuote,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: f64,
}

/// Market-chart payload. Each entry is a `[timestamp_ms, value]` pair.
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(i64, f64)>,
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
    ) -> Result<T, ProviderError> {
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            error!("CoinGecko request failed: {} -> {}", url, status);
            return Err(ProviderError::Status {
                service: SERVICE,
                status,
            });
        }

        resp.json::<T>().await.map_err(|e| ProviderError::Decode {
            service: SERVICE,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    async fn current_price(&self) -> Result<f64, ProviderError> {
        let url = format!(
            "{}/api/v3/simple/price?ids=bitcoin&vs_currencies=usd",
            self.base_url
        );
        let parsed: SimplePriceResponse = self.get_json(url).await?;
        Ok(parsed.bitcoin.usd)
    }

    async fn historical_prices(&self, window_days: u32) -> Result<Vec<f64>, ProviderError> {
        let url = format!(
            "{}/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days={}",
            self.base_url, window_days
        );
        let parsed: MarketChartResponse = self.get_json(url).await?;

        if parsed.prices.is_empty() {
            return Err(ProviderError::EmptySeries { service: SERVICE });
        }

        Ok(parsed.prices.into_iter().map(|(_, price)| price).collect())
    }
}
