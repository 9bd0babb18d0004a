use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, error};

use common::models::RunResult;

use crate::repositories::{TradeRepository, TradeRow};

/// Append-only persistence of each cycle's decision. Recording is
/// best-effort: a failure is logged and the cycle outcome stands.
#[async_trait]
pub trait TradeRecorder: Send + Sync {
    async fn record(&self, result: &RunResult);
}

pub struct SqliteTradeRecorder {
    pool: SqlitePool,
}

impl SqliteTradeRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TradeRecorder for SqliteTradeRecorder {
    async fn record(&self, result: &RunResult) {
        let row = TradeRow::from(result);
        match TradeRepository::insert(&self.pool, &row).await {
            Ok(()) => debug!("Journaled {} for cycle {}", row.action, row.cycle_id),
            Err(e) => error!("Failed to journal trade for cycle {}: {}", row.cycle_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Utc;
    use common::models::{
        AggregatedScore, Portfolio, SentimentSnapshot, TradeAction, TradeDecision,
    };
    use uuid::Uuid;

    #[tokio::test]
    async fn recorder_appends_one_row_per_result() {
        let pool = db::connect_in_memory().await.unwrap();
        let recorder = SqliteTradeRecorder::new(pool.clone());

        let result = RunResult {
            cycle_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sentiment: SentimentSnapshot::neutral(),
            forecast_price: 64_000.0,
            observed_price: 65_000.0,
            decision: TradeDecision::hold(AggregatedScore::default()),
            portfolio: Portfolio::new(1000.0),
            alert_sent: false,
        };

        recorder.record(&result).await;
        assert_eq!(TradeRepository::count(&pool).await.unwrap(), 1);
    }
}
