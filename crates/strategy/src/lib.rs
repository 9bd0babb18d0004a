pub mod aggregator;
pub mod backtest;
pub mod decision;
pub mod forecast;
pub mod market_view;

pub use aggregator::aggregate;
pub use decision::decide;
pub use forecast::{Forecaster, OnnxForecaster, RandomWalkForecaster, forecaster_from_model_path};
pub use market_view::MarketView;
