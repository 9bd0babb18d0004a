use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::ensure;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use common::models::{Portfolio, RunResult, TradeDecision};
use journal::TradeRecorder;
use market_data::{PriceProvider, SentimentProvider, fallback};
use strategy::{Forecaster, MarketView, aggregate, decide};

use crate::services::run_state::{CycleOutcome, CyclePermit, ExecutionGuard, ResultSlot};
use crate::services::telegram_service::AlertNotifier;

/// Interval between polls of the result slot.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Polls before a synchronous caller gives up and re-polls later.
pub const POLL_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub initial_cash: f64,
    pub history_window_days: u32,
    pub cycle_interval: Duration,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            initial_cash: 1000.0,
            history_window_days: 180,
            cycle_interval: Duration::from_secs(600),
        }
    }
}

/// What a poller learns from the result slot.
#[derive(Debug, Clone)]
pub enum LatestResult {
    /// No cycle has ever completed and none is running.
    NotYetRun,
    /// A cycle is in flight and nothing has been published yet.
    InProgress,
    Ready(RunResult),
    Failed {
        timestamp: DateTime<Utc>,
        error: String,
    },
}

/// Orchestrates one trading cycle end to end and owns all shared state:
/// the portfolio ledger, the single-flight guard, the result slot and the
/// continuous-mode flag.
pub struct TradingBot {
    price: Arc<dyn PriceProvider>,
    sentiment: Arc<dyn SentimentProvider>,
    forecaster: Arc<dyn Forecaster>,
    recorder: Arc<dyn TradeRecorder>,
    notifier: Option<Arc<dyn AlertNotifier>>,
    portfolio: Mutex<Portfolio>,
    guard: Arc<ExecutionGuard>,
    slot: ResultSlot,
    desired_running: AtomicBool,
    settings: BotSettings,
}

impl TradingBot {
    pub fn new(
        price: Arc<dyn PriceProvider>,
        sentiment: Arc<dyn SentimentProvider>,
        forecaster: Arc<dyn Forecaster>,
        recorder: Arc<dyn TradeRecorder>,
        settings: BotSettings,
    ) -> Self {
        Self {
            price,
            sentiment,
            forecaster,
            recorder,
            notifier: None,
            portfolio: Mutex::new(Portfolio::new(settings.initial_cash)),
            guard: Arc::new(ExecutionGuard::new()),
            slot: ResultSlot::new(),
            desired_running: AtomicBool::new(false),
            settings,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn AlertNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Request one cycle. Returns whether the request was admitted; a
    /// rejected caller does no work and can poll the previous result.
    pub fn start_cycle(self: &Arc<Self>) -> bool {
        let Some(permit) = self.guard.try_acquire() else {
            info!("Cycle already running; request rejected");
            return false;
        };

        let bot = Arc::clone(self);
        tokio::spawn(async move {
            bot.run_cycle(permit).await;
        });
        true
    }

    /// Toggle continuous mode. Turning it on spawns the long-lived loop;
    /// turning it off lets any in-flight cycle finish and stops before the
    /// next one.
    pub fn set_continuous(self: &Arc<Self>, enabled: bool) {
        let was_enabled = self.desired_running.swap(enabled, Ordering::AcqRel);
        if enabled && !was_enabled {
            let bot = Arc::clone(self);
            tokio::spawn(async move {
                bot.continuous_loop().await;
            });
        }
    }

    pub fn is_cycle_running(&self) -> bool {
        self.guard.is_running()
    }

    pub async fn latest_result(&self) -> LatestResult {
        match self.slot.load().await {
            Some(CycleOutcome::Completed(result)) => LatestResult::Ready(result),
            Some(CycleOutcome::Failed { timestamp, error }) => {
                LatestResult::Failed { timestamp, error }
            }
            None if self.guard.is_running() => LatestResult::InProgress,
            None => LatestResult::NotYetRun,
        }
    }

    /// Poll the slot once per [`POLL_INTERVAL`] up to [`POLL_ATTEMPTS`].
    /// `None` means the cycle is still in progress; the caller can re-poll
    /// later via [`Self::latest_result`].
    pub async fn wait_for_result(&self) -> Option<CycleOutcome> {
        for _ in 0..POLL_ATTEMPTS {
            if let Some(outcome) = self.slot.load().await {
                return Some(outcome);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        info!(
            "No result after {} polls; cycle still in progress",
            POLL_ATTEMPTS
        );
        None
    }

    async fn continuous_loop(&self) {
        info!(
            "Continuous mode started (cycle every {:?})",
            self.settings.cycle_interval
        );

        while self.desired_running.load(Ordering::Acquire) {
            match self.guard.try_acquire() {
                Some(permit) => self.run_cycle(permit).await,
                None => debug!("Skipping tick: a cycle is already in flight"),
            }
            tokio::time::sleep(self.settings.cycle_interval).await;
        }

        info!("Continuous mode stopped");
    }

    async fn run_cycle(&self, permit: CyclePermit) {
        let outcome = match self.execute_cycle().await {
            Ok(result) => CycleOutcome::Completed(result),
            Err(e) => {
                error!("Trading cycle failed: {:#}", e);
                CycleOutcome::Failed {
                    timestamp: Utc::now(),
                    error: format!("{:#}", e),
                }
            }
        };

        self.slot.store(outcome).await;
        // Released only after the outcome is visible to pollers.
        drop(permit);
    }

    /// One full cycle: providers, aggregation, decision + ledger commit,
    /// alert, journal, in that order.
    async fn execute_cycle(&self) -> anyhow::Result<RunResult> {
        let cycle_id = Uuid::new_v4();
        info!("Trading cycle {} starting", cycle_id);

        let sentiment = match self.sentiment.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Sentiment provider failed: {}. Using neutral fallback.", e);
                fallback::degraded_sentiment()
            }
        };

        let observed_price = match self.price.current_price().await {
            Ok(price) => price,
            Err(e) => {
                warn!(
                    "Price provider failed: {}. Using default price ${}.",
                    e,
                    fallback::DEFAULT_BTC_PRICE
                );
                fallback::DEFAULT_BTC_PRICE
            }
        };
        ensure!(
            observed_price > 0.0,
            "non-positive observed price {}",
            observed_price
        );

        let history = match self
            .price
            .historical_prices(self.settings.history_window_days)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                warn!("History fetch failed: {}. Using synthetic series.", e);
                fallback::synthetic_history(
                    self.settings.history_window_days,
                    observed_price,
                    &mut rand::thread_rng(),
                )
            }
        };

        let forecast_price = match self.forecaster.predict(&history) {
            Ok(price) => price,
            Err(e) => {
                warn!("Forecast failed: {}. Using random-walk fallback.", e);
                strategy::RandomWalkForecaster::default()
                    .predict(&[observed_price])
                    .unwrap_or(observed_price)
            }
        };

        let view = MarketView::from_series(&history);

        let (decision, snapshot) = {
            let mut portfolio = self.portfolio.lock().await;
            let score = aggregate(
                sentiment.score,
                forecast_price,
                observed_price,
                &view,
                &portfolio,
            );
            let decision = decide(&mut portfolio, score, observed_price);
            (decision, portfolio.clone())
        };

        let alert_sent = self
            .send_alert(&decision, sentiment.score, forecast_price, observed_price)
            .await;

        let result = RunResult {
            cycle_id,
            timestamp: Utc::now(),
            sentiment,
            forecast_price,
            observed_price,
            decision,
            portfolio: snapshot,
            alert_sent,
        };

        self.recorder.record(&result).await;

        info!(
            "Cycle {} complete: {} | price ${:.2} forecast ${:.2} | cash ${:.2} asset {:.6}",
            cycle_id,
            result.decision.action,
            observed_price,
            forecast_price,
            result.portfolio.cash_balance,
            result.portfolio.asset_balance
        );

        Ok(result)
    }

    async fn send_alert(
        &self,
        decision: &TradeDecision,
        sentiment_score: f64,
        forecast_price: f64,
        observed_price: f64,
    ) -> bool {
        if !decision.action.is_trade() {
            return false;
        }
        let Some(notifier) = &self.notifier else {
            return false;
        };

        let subject = format!("[Trading Bot] {} signal", decision.action);
        let body = format!(
            "Action: {}\nSentiment: {:.4}\nPredicted: ${:.2}\nPrice now: ${:.2}\nSize: {:.6}",
            decision.action, sentiment_score, forecast_price, observed_price, decision.trade_size
        );
        notifier.notify(&subject, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    use common::models::{SentimentSnapshot, TradeAction};
    use market_data::ProviderError;

    mock! {
        PriceFeed {}

        #[async_trait]
        impl PriceProvider for PriceFeed {
            async fn current_price(&self) -> Result<f64, ProviderError>;
            async fn historical_prices(&self, window_days: u32) -> Result<Vec<f64>, ProviderError>;
        }
    }

    mock! {
        SentimentFeed {}

        #[async_trait]
        impl SentimentProvider for SentimentFeed {
            async fn fetch(&self) -> Result<SentimentSnapshot, ProviderError>;
        }
    }

    mock! {
        Predictor {}

        impl Forecaster for Predictor {
            fn predict(&self, closes: &[f64]) -> Result<f64, ProviderError>;
        }
    }

    /// Recorder double counting invocations.
    #[derive(Default)]
    struct CountingRecorder {
        records: AtomicUsize,
    }

    #[async_trait]
    impl TradeRecorder for CountingRecorder {
        async fn record(&self, _result: &RunResult) {
            self.records.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        alerts: AtomicUsize,
    }

    #[async_trait]
    impl AlertNotifier for CountingNotifier {
        async fn notify(&self, _subject: &str, _body: &str) -> bool {
            self.alerts.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    /// Sentiment provider that blocks until released, to hold a cycle in
    /// flight deterministically.
    struct GatedSentiment {
        gate: Arc<Notify>,
        snapshot: SentimentSnapshot,
    }

    #[async_trait]
    impl SentimentProvider for GatedSentiment {
        async fn fetch(&self) -> Result<SentimentSnapshot, ProviderError> {
            self.gate.notified().await;
            Ok(self.snapshot)
        }
    }

    fn bullish_sentiment() -> SentimentSnapshot {
        SentimentSnapshot {
            score: 0.35,
            positive: 60,
            negative: 10,
            neutral: 30,
        }
    }

    fn steady_history(len: usize, price: f64) -> Vec<f64> {
        vec![price; len]
    }

    fn test_settings() -> BotSettings {
        BotSettings {
            initial_cash: 1000.0,
            history_window_days: 30,
            cycle_interval: Duration::from_secs(1),
        }
    }

    fn bullish_bot(recorder: Arc<CountingRecorder>, notifier: Arc<CountingNotifier>) -> TradingBot {
        let mut price = MockPriceFeed::new();
        price.expect_current_price().returning(|| Ok(50_000.0));
        // Closes sit below the spot price, so momentum reads positive.
        price
            .expect_historical_prices()
            .returning(|_| Ok(steady_history(30, 49_000.0)));

        let mut sentiment = MockSentimentFeed::new();
        sentiment.expect_fetch().returning(|| Ok(bullish_sentiment()));

        let mut forecaster = MockPredictor::new();
        // 2.5% above the observed price; with sentiment and momentum the
        // total buy strength reaches 2.4 and confidence caps at 1.0.
        forecaster.expect_predict().returning(|_| Ok(51_250.0));

        TradingBot::new(
            Arc::new(price),
            Arc::new(sentiment),
            Arc::new(forecaster),
            recorder,
            test_settings(),
        )
        .with_notifier(notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn full_cycle_buys_journals_and_alerts() {
        let recorder = Arc::new(CountingRecorder::default());
        let notifier = Arc::new(CountingNotifier::default());
        let bot = Arc::new(bullish_bot(Arc::clone(&recorder), Arc::clone(&notifier)));

        assert!(bot.start_cycle());
        let outcome = bot.wait_for_result().await.expect("cycle result");

        let result = match outcome {
            CycleOutcome::Completed(result) => result,
            CycleOutcome::Failed { error, .. } => panic!("cycle failed: {}", error),
        };

        assert_eq!(result.decision.action, TradeAction::Buy);
        assert!((result.decision.trade_size - 100.0).abs() < 1e-9);
        assert!((result.portfolio.cash_balance - 900.0).abs() < 1e-9);
        assert!(result.alert_sent);
        assert_eq!(recorder.records.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.alerts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_cycle_is_rejected_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let sentiment = GatedSentiment {
            gate: Arc::clone(&gate),
            snapshot: bullish_sentiment(),
        };

        let mut price = MockPriceFeed::new();
        price.expect_current_price().returning(|| Ok(50_000.0));
        price
            .expect_historical_prices()
            .returning(|_| Ok(steady_history(30, 50_000.0)));

        let mut forecaster = MockPredictor::new();
        forecaster.expect_predict().returning(|_| Ok(50_000.0));

        let bot = Arc::new(TradingBot::new(
            Arc::new(price),
            Arc::new(sentiment),
            Arc::new(forecaster),
            Arc::new(CountingRecorder::default()),
            test_settings(),
        ));

        assert!(bot.start_cycle());
        assert!(bot.is_cycle_running());
        assert!(!bot.start_cycle());
        assert!(matches!(
            bot.latest_result().await,
            LatestResult::InProgress
        ));

        gate.notify_one();
        let outcome = bot.wait_for_result().await;
        assert!(outcome.is_some());
        assert!(!bot.is_cycle_running());

        // Guard reopens once the cycle is over.
        assert!(bot.start_cycle());
        gate.notify_one();
        bot.wait_for_result().await.expect("second cycle result");
    }

    #[tokio::test]
    async fn latest_result_distinguishes_not_run_from_ready() {
        let recorder = Arc::new(CountingRecorder::default());
        let notifier = Arc::new(CountingNotifier::default());
        let bot = Arc::new(bullish_bot(recorder, notifier));

        assert!(matches!(bot.latest_result().await, LatestResult::NotYetRun));

        assert!(bot.start_cycle());
        bot.wait_for_result().await.expect("cycle result");

        let first = bot.latest_result().await;
        let second = bot.latest_result().await;
        match (first, second) {
            (LatestResult::Ready(a), LatestResult::Ready(b)) => assert_eq!(a, b),
            other => panic!("unexpected results: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failures_degrade_instead_of_aborting() {
        let mut price = MockPriceFeed::new();
        price.expect_current_price().returning(|| {
            Err(ProviderError::Status {
                service: "coingecko",
                status: 503,
            })
        });
        price.expect_historical_prices().returning(|_| {
            Err(ProviderError::EmptySeries {
                service: "coingecko",
            })
        });

        let mut sentiment = MockSentimentFeed::new();
        sentiment.expect_fetch().returning(|| {
            Err(ProviderError::Status {
                service: "sentiment-api",
                status: 500,
            })
        });

        let mut forecaster = MockPredictor::new();
        forecaster
            .expect_predict()
            .returning(|_| Err(ProviderError::Inference("no model".to_string())));

        let bot = Arc::new(TradingBot::new(
            Arc::new(price),
            Arc::new(sentiment),
            Arc::new(forecaster),
            Arc::new(CountingRecorder::default()),
            test_settings(),
        ));

        assert!(bot.start_cycle());
        let outcome = bot.wait_for_result().await.expect("cycle result");

        let result = match outcome {
            CycleOutcome::Completed(result) => result,
            CycleOutcome::Failed { error, .. } => panic!("cycle failed: {}", error),
        };

        // Degraded inputs: default price, neutral sentiment, no alert.
        assert!((result.observed_price - fallback::DEFAULT_BTC_PRICE).abs() < 1e-9);
        assert_eq!(result.sentiment.score, 0.0);
        assert!(!result.alert_sent);
    }

    #[tokio::test(start_paused = true)]
    async fn nonsense_price_fails_the_cycle_without_touching_the_ledger() {
        let mut price = MockPriceFeed::new();
        price.expect_current_price().returning(|| Ok(0.0));
        price
            .expect_historical_prices()
            .returning(|_| Ok(steady_history(30, 50_000.0)));

        let mut sentiment = MockSentimentFeed::new();
        sentiment.expect_fetch().returning(|| Ok(bullish_sentiment()));

        let mut forecaster = MockPredictor::new();
        forecaster.expect_predict().returning(|_| Ok(50_000.0));

        let bot = Arc::new(TradingBot::new(
            Arc::new(price),
            Arc::new(sentiment),
            Arc::new(forecaster),
            Arc::new(CountingRecorder::default()),
            test_settings(),
        ));

        assert!(bot.start_cycle());
        let outcome = bot.wait_for_result().await.expect("cycle outcome");
        assert!(matches!(outcome, CycleOutcome::Failed { .. }));

        let portfolio = bot.portfolio.lock().await;
        assert!((portfolio.cash_balance - 1000.0).abs() < 1e-9);
        assert_eq!(portfolio.asset_balance, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn continuous_mode_repeats_cycles_until_switched_off() {
        let recorder = Arc::new(CountingRecorder::default());
        let notifier = Arc::new(CountingNotifier::default());
        let bot = Arc::new(bullish_bot(Arc::clone(&recorder), notifier));

        bot.set_continuous(true);
        tokio::time::sleep(Duration::from_secs(5)).await;
        bot.set_continuous(false);

        let after_stop = recorder.records.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected repeated cycles, got {}", after_stop);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(recorder.records.load(Ordering::SeqCst), after_stop);
    }
}
