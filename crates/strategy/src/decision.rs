use tracing::info;

use common::models::{AggregatedScore, Portfolio, TradeAction, TradeDecision};

/// Fraction of cash committed to a single buy.
pub const POSITION_FRACTION: f64 = 0.10;
/// Hard cap on a single buy, in USD.
pub const MAX_POSITION_USD: f64 = 120.0;
/// Buys below this are dust and are skipped.
pub const MIN_POSITION_USD: f64 = 50.0;
/// Minimum holdings for a signal-driven sell.
pub const MIN_SELL_BALANCE: f64 = 0.0005;
/// Fixed liquidation unit for stop-loss / take-profit exits.
pub const LIQUIDATION_UNIT: f64 = 0.001;
/// Stop-loss fires at basis * 0.95, take-profit at basis * 1.10.
pub const STOP_LOSS_RATIO: f64 = 0.95;
pub const TAKE_PROFIT_RATIO: f64 = 1.10;
/// Total strength a side must reach before it can act.
pub const ACTION_THRESHOLD: f64 = 1.0;

/// Map the aggregated score and current ledger state to exactly one
/// action, applying the corresponding ledger mutation as a single commit.
/// First matching rule wins; the engine holds no state across cycles.
pub fn decide(
    portfolio: &mut Portfolio,
    score: AggregatedScore,
    observed_price: f64,
) -> TradeDecision {
    let total_buy = score.total_buy_strength();
    let total_sell = score.total_sell_strength();

    let position_size = (portfolio.cash_balance * POSITION_FRACTION).min(MAX_POSITION_USD);
    if total_buy >= ACTION_THRESHOLD
        && position_size >= MIN_POSITION_USD
        && portfolio.cash_balance >= position_size
    {
        let confidence = (total_buy / 2.0).min(1.0);
        let spend = position_size * confidence;
        let snapshot = portfolio.apply_buy(spend, observed_price);
        info!(
            "BUY ${:.2} at ${:.2} (confidence {:.2}, basis now ${:.2})",
            spend, observed_price, confidence, snapshot.average_cost_basis
        );
        return TradeDecision {
            action: TradeAction::Buy,
            score,
            trade_size: spend,
        };
    }

    if total_sell >= ACTION_THRESHOLD && portfolio.asset_balance >= MIN_SELL_BALANCE {
        let ratio = sell_ratio(portfolio.profit_pct(observed_price), total_sell).clamp(0.0, 1.0);
        let amount = portfolio.asset_balance * ratio;
        portfolio.apply_sell(amount, observed_price);
        info!(
            "SELL {:.6} units at ${:.2} (ratio {:.2})",
            amount, observed_price, ratio
        );
        return TradeDecision {
            action: TradeAction::Sell,
            score,
            trade_size: amount,
        };
    }

    if portfolio.is_holding() && observed_price <= portfolio.average_cost_basis * STOP_LOSS_RATIO {
        let amount = LIQUIDATION_UNIT.min(portfolio.asset_balance);
        portfolio.apply_sell(amount, observed_price);
        info!(
            "STOP-LOSS {:.6} units at ${:.2} (basis ${:.2})",
            amount, observed_price, portfolio.average_cost_basis
        );
        return TradeDecision {
            action: TradeAction::StopLoss,
            score,
            trade_size: amount,
        };
    }

    if portfolio.is_holding() && observed_price >= portfolio.average_cost_basis * TAKE_PROFIT_RATIO
    {
        let amount = LIQUIDATION_UNIT.min(portfolio.asset_balance);
        portfolio.apply_sell(amount, observed_price);
        info!(
            "TAKE-PROFIT {:.6} units at ${:.2} (basis ${:.2})",
            amount, observed_price, portfolio.average_cost_basis
        );
        return TradeDecision {
            action: TradeAction::TakeProfit,
            score,
            trade_size: amount,
        };
    }

    TradeDecision::hold(score)
}

/// Graduated liquidation: the deeper the drawdown or the riper the profit,
/// the larger the permitted slice of the position.
fn sell_ratio(profit_pct: Option<f64>, total_sell: f64) -> f64 {
    match profit_pct {
        Some(p) if p > 0.06 => (total_sell / 2.0).min(0.5),
        Some(p) if p > 0.02 => (total_sell / 2.5).min(0.3),
        Some(p) if p < -0.05 => (total_sell / 1.5).min(0.6),
        _ => (total_sell / 3.0).min(0.25),
    }
}
