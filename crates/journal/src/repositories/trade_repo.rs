use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use common::models::RunResult;

/// One journal row: the decision plus the portfolio it left behind.
#[derive(Debug, Clone)]
pub struct TradeRow {
    pub cycle_id: String,
    pub recorded_at: DateTime<Utc>,
    pub action: String,
    pub sentiment_score: f64,
    pub forecast_price: f64,
    pub observed_price: f64,
    pub trade_size: f64,
    pub cash_balance: f64,
    pub asset_balance: f64,
    pub average_cost_basis: f64,
}

impl From<&RunResult> for TradeRow {
    fn from(result: &RunResult) -> Self {
        Self {
            cycle_id: result.cycle_id.to_string(),
            recorded_at: result.timestamp,
            action: result.decision.action.to_string(),
            sentiment_score: result.sentiment.score,
            forecast_price: result.forecast_price,
            observed_price: result.observed_price,
            trade_size: result.decision.trade_size,
            cash_balance: result.portfolio.cash_balance,
            asset_balance: result.portfolio.asset_balance,
            average_cost_basis: result.portfolio.average_cost_basis,
        }
    }
}

pub struct TradeRepository;

impl TradeRepository {
    pub async fn insert(pool: &SqlitePool, row: &TradeRow) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
                INSERT INTO trades (
                    cycle_id, recorded_at, action, sentiment_score, forecast_price,
                    observed_price, trade_size, cash_balance, asset_balance, average_cost_basis
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.cycle_id)
        .bind(row.recorded_at)
        .bind(&row.action)
        .bind(row.sentiment_score)
        .bind(row.forecast_price)
        .bind(row.observed_price)
        .bind(row.trade_size)
        .bind(row.cash_balance)
        .bind(row.asset_balance)
        .bind(row.average_cost_basis)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trades")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use common::models::{AggregatedScore, Portfolio, SentimentSnapshot, TradeAction, TradeDecision};
    use uuid::Uuid;

    fn sample_result() -> RunResult {
        RunResult {
            cycle_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sentiment: SentimentSnapshot {
                score: 0.25,
                positive: 30,
                negative: 10,
                neutral: 60,
            },
            forecast_price: 66_000.0,
            observed_price: 65_000.0,
            decision: TradeDecision {
                action: TradeAction::Buy,
                score: AggregatedScore::default(),
                trade_size: 100.0,
            },
            portfolio: Portfolio {
                cash_balance: 900.0,
                asset_balance: 100.0 / 65_000.0,
                average_cost_basis: 65_000.0,
            },
            alert_sent: true,
        }
    }

    #[tokio::test]
    async fn inserted_rows_are_counted() {
        let pool = db::connect_in_memory().await.unwrap();
        assert_eq!(TradeRepository::count(&pool).await.unwrap(), 0);

        let row = TradeRow::from(&sample_result());
        TradeRepository::insert(&pool, &row).await.unwrap();
        TradeRepository::insert(&pool, &row).await.unwrap();

        assert_eq!(TradeRepository::count(&pool).await.unwrap(), 2);
    }
}
