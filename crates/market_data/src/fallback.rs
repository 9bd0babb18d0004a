//! Degraded-input policy for provider failures. A failing collaborator
//! never aborts a cycle; the cycle proceeds on these clearly-marked
//! substitutes instead.

use rand::Rng;

use common::models::SentimentSnapshot;

/// Substitute spot price when the price API is unreachable.
pub const DEFAULT_BTC_PRICE: f64 = 65_000.0;

/// Sentiment substitute when the scoring service is unreachable: a neutral
/// score over a plausible post distribution.
pub fn degraded_sentiment() -> SentimentSnapshot {
    SentimentSnapshot {
        score: 0.0,
        positive: 10,
        negative: 10,
        neutral: 20,
    }
}

/// Synthetic daily close series used when the history endpoint fails:
/// a random walk from `base_price` with a slight upward drift, ordered
/// oldest first.
pub fn synthetic_history<R: Rng>(days: u32, base_price: f64, rng: &mut R) -> Vec<f64> {
    let mut prices = Vec::with_capacity(days as usize);
    let mut price = base_price;

    for _ in 0..days {
        let daily_return = 0.001 + rng.gen_range(-0.03..0.03);
        price *= 1.0 + daily_return;
        prices.push(price);
    }

    prices
}
