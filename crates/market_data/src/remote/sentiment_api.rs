use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::error::ProviderError;
use crate::traits::SentimentProvider;
use common::models::SentimentSnapshot;

const SERVICE: &str = "sentiment-api";

/// Payload of the external scoring service: an aggregate compound score
/// plus the post counts it was derived from.
#[derive(Debug, Deserialize)]
struct SentimentResponse {
    score: f64,
    positive: u32,
    negative: u32,
    neutral: u32,
}

/// Adapter for an HTTP sentiment service. Scoring social-media content is
/// the service's concern; this client only fetches the latest snapshot.
#[derive(Clone)]
pub struct SentimentApiClient {
    client: Client,
    endpoint: String,
}

impl SentimentApiClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SentimentProvider for SentimentApiClient {
    async fn fetch(&self) -> Result<SentimentSnapshot, ProviderError> {
        let resp = self.client.get(&self.endpoint).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            error!("Sentiment request failed: {} -> {}", self.endpoint, status);
            return Err(ProviderError::Status {
                service: SERVICE,
                status,
            });
        }

        let parsed = resp
            .json::<SentimentResponse>()
            .await
            .map_err(|e| ProviderError::Decode {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        Ok(SentimentSnapshot {
            // The aggregator assumes a score in [-1, 1].
            score: parsed.score.clamp(-1.0, 1.0),
            positive: parsed.positive,
            negative: parsed.negative,
            neutral: parsed.neutral,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sentiment_payload() {
        let raw = r#"{"score":0.1234,"positive":42,"negative":17,"neutral":61}"#;
        let parsed: SentimentResponse = serde_json::from_str(raw).unwrap();
        assert!((parsed.score - 0.1234).abs() < 1e-9);
        assert_eq!(parsed.positive, 42);
        assert_eq!(parsed.negative, 17);
        assert_eq!(parsed.neutral, 61);
    }
}
