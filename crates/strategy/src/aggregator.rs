use common::models::{AggregatedScore, Portfolio, Signal, SignalSource};

use crate::market_view::MarketView;

/// Above this coefficient of variation the market is considered choppy:
/// buy conviction is damped, sell urgency is raised.
pub const VOLATILITY_DAMPENING_THRESHOLD: f64 = 0.04;

/// Score one cycle's inputs into weighted buy/sell votes and strengths.
///
/// Each rule fires independently and accumulates into the score; the
/// volatility adjustment is applied last, against whichever side dominated
/// on raw strength.
pub fn aggregate(
    sentiment_score: f64,
    forecast_price: f64,
    observed_price: f64,
    view: &MarketView,
    portfolio: &Portfolio,
) -> AggregatedScore {
    let mut score = AggregatedScore::default();

    if sentiment_score > 0.30 {
        score.add(Signal::buy(SignalSource::Sentiment, 2, 0.40));
    } else if sentiment_score > 0.15 {
        score.add(Signal::buy(SignalSource::Sentiment, 1, 0.20));
    } else if sentiment_score < -0.30 {
        score.add(Signal::sell(SignalSource::Sentiment, 2, 0.40));
    } else if sentiment_score < -0.15 {
        score.add(Signal::sell(SignalSource::Sentiment, 1, 0.20));
    }

    if observed_price > 0.0 {
        let price_change_pct = (forecast_price - observed_price) / observed_price;
        if price_change_pct > 0.02 {
            score.add(Signal::buy(SignalSource::Forecast, 2, 0.30));
        } else if price_change_pct > 0.008 {
            score.add(Signal::buy(SignalSource::Forecast, 1, 0.15));
        } else if price_change_pct < -0.02 {
            score.add(Signal::sell(SignalSource::Forecast, 2, 0.30));
        } else if price_change_pct < -0.008 {
            score.add(Signal::sell(SignalSource::Forecast, 1, 0.15));
        }
    }

    let momentum = view.momentum(observed_price);
    if momentum > 0.015 {
        score.add(Signal::buy(SignalSource::Momentum, 1, 0.20));
    } else if momentum < -0.015 {
        score.add(Signal::sell(SignalSource::Momentum, 1, 0.20));
    }

    // Open positions add sell pressure proportional to how far the price
    // has drifted from the cost basis, in either direction.
    if let Some(profit_pct) = portfolio.profit_pct(observed_price) {
        if profit_pct > 0.08 {
            score.add(Signal::sell(SignalSource::Position, 2, 0.30));
        } else if profit_pct > 0.04 {
            score.add(Signal::sell(SignalSource::Position, 1, 0.15));
        } else if profit_pct < -0.07 {
            score.add(Signal::sell(SignalSource::Position, 2, 0.40));
        } else if profit_pct < -0.04 {
            score.add(Signal::sell(SignalSource::Position, 1, 0.20));
        }
    }

    if view.recent_volatility > VOLATILITY_DAMPENING_THRESHOLD {
        if score.buy_strength > score.sell_strength {
            score.buy_strength *= 0.7;
        } else {
            score.sell_strength *= 1.2;
        }
    }

    score
}
