use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use tracing::{error, info, warn};

use common::logger;
use journal::{SqliteTradeRecorder, TradeRepository};
use market_data::remote::{CoinGeckoClient, SentimentApiClient};
use strategy::forecaster_from_model_path;

use crate::config::Config;
use crate::services::bot_service::{BotSettings, LatestResult, TradingBot};
use crate::services::run_state::CycleOutcome;
use crate::services::telegram_service::{AlertNotifier, TelegramNotifier};

mod config;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();
    dotenv().ok();

    let config = Config::from_env()?;

    if let Some(days) = config.backtest_days {
        return run_backtest(&config, days).await;
    }

    let pool = journal::db::connect(&config.workdir).await?;
    let journaled = TradeRepository::count(&pool).await.unwrap_or(0);
    info!("Trade journal ready ({} rows)", journaled);

    let price = Arc::new(CoinGeckoClient::new(&config.price_api_base));
    let sentiment = Arc::new(SentimentApiClient::new(&config.sentiment_api_url));
    let forecaster: Arc<dyn strategy::Forecaster> =
        Arc::from(forecaster_from_model_path(&config.model_path));
    let recorder = Arc::new(SqliteTradeRecorder::new(pool));

    let settings = BotSettings {
        initial_cash: config.initial_cash,
        history_window_days: config.history_window_days,
        cycle_interval: config.cycle_interval,
    };

    let mut bot = TradingBot::new(price, sentiment, forecaster, recorder, settings);
    if let Some(telegram) = &config.telegram {
        let notifier: Arc<dyn AlertNotifier> =
            Arc::new(TelegramNotifier::new(&telegram.bot_token, telegram.chat_id));
        bot = bot.with_notifier(notifier);
    }
    let bot = Arc::new(bot);

    if config.continuous {
        bot.set_continuous(true);
        tokio::signal::ctrl_c().await?;
        info!("Shutdown requested; finishing any in-flight cycle");
        bot.set_continuous(false);
        while bot.is_cycle_running() {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    } else if bot.start_cycle() {
        match bot.wait_for_result().await {
            Some(CycleOutcome::Completed(result)) => info!(
                "Cycle finished: {} | sentiment {:.4} | forecast ${:.2} | price ${:.2} | cash ${:.2} asset {:.6}",
                result.decision.action,
                result.sentiment.score,
                result.forecast_price,
                result.observed_price,
                result.portfolio.cash_balance,
                result.portfolio.asset_balance
            ),
            Some(CycleOutcome::Failed { error, .. }) => error!("Cycle failed: {}", error),
            None => match bot.latest_result().await {
                LatestResult::InProgress => info!("Cycle still running; poll again later"),
                other => info!("No result within the polling window: {:?}", other),
            },
        }
    }

    Ok(())
}

async fn run_backtest(config: &Config, days: u32) -> anyhow::Result<()> {
    use market_data::{PriceProvider, fallback};
    use strategy::backtest::{self, BacktestConfig};

    let client = CoinGeckoClient::new(&config.price_api_base);
    let closes = match client.historical_prices(days).await {
        Ok(series) => series,
        Err(e) => {
            warn!("History fetch failed: {}. Backtesting a synthetic series.", e);
            fallback::synthetic_history(days, fallback::DEFAULT_BTC_PRICE, &mut rand::thread_rng())
        }
    };

    backtest::run(
        &closes,
        &BacktestConfig {
            initial_cash: config.initial_cash,
        },
        &mut rand::thread_rng(),
    );
    Ok(())
}
