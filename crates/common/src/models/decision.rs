use serde::{Deserialize, Serialize};
use std::fmt;

use super::score::AggregatedScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Hold,
    Buy,
    Sell,
    StopLoss,
    TakeProfit,
}

impl TradeAction {
    pub fn is_trade(&self) -> bool {
        !matches!(self, TradeAction::Hold)
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeAction::Hold => "HOLD",
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
            TradeAction::StopLoss => "STOP-LOSS",
            TradeAction::TakeProfit => "TAKE-PROFIT",
        };
        f.write_str(s)
    }
}

/// The single action chosen for a cycle, the score that triggered it and
/// the realized trade size: USD spent on a buy, units liquidated on a sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub action: TradeAction,
    pub score: AggregatedScore,
    pub trade_size: f64,
}

impl TradeDecision {
    pub fn hold(score: AggregatedScore) -> Self {
        Self {
            action: TradeAction::Hold,
            score,
            trade_size: 0.0,
        }
    }
}
