pub mod decision;
pub mod portfolio;
pub mod run_result;
pub mod score;

pub use decision::{TradeAction, TradeDecision};
pub use portfolio::{DUST_BALANCE, Portfolio};
pub use run_result::{RunResult, SentimentSnapshot};
pub use score::{AggregatedScore, Side, Signal, SignalSource};
