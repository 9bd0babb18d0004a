use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::decision::TradeDecision;
use super::portfolio::Portfolio;

/// Sentiment as reported by the external scoring service: an aggregate
/// score in [-1, 1] plus the post counts behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    pub score: f64,
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl SentimentSnapshot {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            positive: 0,
            negative: 0,
            neutral: 0,
        }
    }
}

/// Outcome of one completed trading cycle. A single last-writer-wins slot
/// holds the most recent one; no history is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub cycle_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub sentiment: SentimentSnapshot,
    pub forecast_price: f64,
    pub observed_price: f64,
    pub decision: TradeDecision,
    pub portfolio: Portfolio,
    pub alert_sent: bool,
}
