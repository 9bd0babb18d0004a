use ta::Next;
use ta::indicators::{SimpleMovingAverage, StandardDeviation};

/// Rolling statistics over the daily close series, folded once per cycle.
/// `recent_mean` is the mean of the last 5 closes; `recent_volatility` is
/// the coefficient of variation (stddev / mean) over the last 10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketView {
    pub recent_mean: f64,
    pub recent_volatility: f64,
}

impl MarketView {
    pub fn from_series(closes: &[f64]) -> Self {
        if closes.is_empty() {
            return Self {
                recent_mean: 0.0,
                recent_volatility: 0.0,
            };
        }

        let mut sma_short = SimpleMovingAverage::new(5).unwrap();
        let mut sma_long = SimpleMovingAverage::new(10).unwrap();
        let mut std_dev = StandardDeviation::new(10).unwrap();

        let mut recent_mean = 0.0;
        let mut long_mean = 0.0;
        let mut deviation = 0.0;
        for close in closes {
            recent_mean = sma_short.next(*close);
            long_mean = sma_long.next(*close);
            deviation = std_dev.next(*close);
        }

        let recent_volatility = if long_mean > 0.0 {
            deviation / long_mean
        } else {
            0.0
        };

        Self {
            recent_mean,
            recent_volatility,
        }
    }

    /// Relative distance of the observed price from the recent mean.
    /// Zero when the series was too thin to produce a mean.
    pub fn momentum(&self, observed_price: f64) -> f64 {
        if self.recent_mean > 0.0 {
            (observed_price - self.recent_mean) / self.recent_mean
        } else {
            0.0
        }
    }
}
