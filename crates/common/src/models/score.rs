use serde::{Deserialize, Serialize};

/// Weight applied to directional vote counts when combining them with the
/// continuous strengths into a total.
pub const SIGNAL_COUNT_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalSource {
    Sentiment,
    Forecast,
    Momentum,
    /// Sell pressure derived from the unrealized profit of an open position.
    Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// One scored contribution from a single input. Signals are ephemeral and
/// recomputed from scratch every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub source: SignalSource,
    pub side: Side,
    pub count: u32,
    pub strength: f64,
}

impl Signal {
    pub fn buy(source: SignalSource, count: u32, strength: f64) -> Self {
        Self {
            source,
            side: Side::Buy,
            count,
            strength,
        }
    }

    pub fn sell(source: SignalSource, count: u32, strength: f64) -> Self {
        Self {
            source,
            side: Side::Sell,
            count,
            strength,
        }
    }
}

/// Accumulated buy/sell votes and strengths for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedScore {
    pub buy_signals: u32,
    pub sell_signals: u32,
    pub buy_strength: f64,
    pub sell_strength: f64,
}

impl AggregatedScore {
    pub fn add(&mut self, signal: Signal) {
        match signal.side {
            Side::Buy => {
                self.buy_signals += signal.count;
                self.buy_strength += signal.strength;
            }
            Side::Sell => {
                self.sell_signals += signal.count;
                self.sell_strength += signal.strength;
            }
        }
    }

    pub fn total_buy_strength(&self) -> f64 {
        self.buy_signals as f64 * SIGNAL_COUNT_WEIGHT + self.buy_strength
    }

    pub fn total_sell_strength(&self) -> f64 {
        self.sell_signals as f64 * SIGNAL_COUNT_WEIGHT + self.sell_strength
    }
}
