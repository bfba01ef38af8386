//! Bot runner: the poll, scan, enter loop.
//!
//! Each iteration:
//! - Checks the broker for open positions and waits if any exist
//! - Fetches candles for every configured symbol and evaluates signals
//! - Sends a market order for the strongest candidate
//!
//! The broker's position list is the only record of an active trade.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, ensure, Context, Result};
use backoff::backoff::Constant;
use rust_decimal::Decimal;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::api::{Broker, Credentials};
use crate::models::{Bar, OrderRequest, OrderSide, Position, Timeframe};
use crate::trading::{
    select_best, Candidate, OrderBuilder, Strategy, StrategyConfig, TradingConfig,
};

/// Bot configuration. Built once at startup and never changed.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Symbols to scan, in priority order for equal-strength signals
    pub symbols: Vec<String>,

    /// Candle timeframe
    pub timeframe: Timeframe,

    /// Bars fetched per symbol; shorter histories are skipped
    pub lookback_bars: usize,

    /// Wait between iterations (seconds)
    pub poll_interval_secs: u64,

    /// Fetch attempts per symbol before skipping it for the cycle
    pub fetch_attempts: u32,

    /// Wait between fetch attempts
    pub retry_delay: Duration,

    /// Log orders instead of sending them
    pub dry_run: bool,

    /// Trading configuration
    pub trading_config: TradingConfig,

    /// Strategy configuration
    pub strategy_config: StrategyConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                "EURUSDm".to_string(),
                "BTCUSDm".to_string(),
                "XAUUSDm".to_string(),
            ],
            timeframe: Timeframe::M15,
            lookback_bars: 100,
            poll_interval_secs: 60,
            fetch_attempts: 3,
            retry_delay: Duration::from_secs(3),
            dry_run: false,
            trading_config: TradingConfig::default(),
            strategy_config: StrategyConfig::default(),
        }
    }
}

impl BotConfig {
    /// Reject settings the sizing and signal logic cannot work with.
    pub fn validate(&self) -> Result<()> {
        let trading = &self.trading_config;

        ensure!(!self.symbols.is_empty(), "No symbols configured");
        ensure!(self.fetch_attempts >= 1, "fetch_attempts must be at least 1");
        ensure!(
            trading.stop_loss_pips > Decimal::ZERO,
            "Stop-loss distance must be positive, got {} pips",
            trading.stop_loss_pips
        );
        ensure!(
            trading.take_profit_pips > Decimal::ZERO,
            "Take-profit distance must be positive, got {} pips",
            trading.take_profit_pips
        );
        ensure!(
            trading.risk_pct > Decimal::ZERO && trading.risk_pct <= Decimal::ONE,
            "Risk fraction must be in (0, 1], got {}",
            trading.risk_pct
        );
        ensure!(
            trading.volume_multiplier > Decimal::ZERO,
            "Volume multiplier must be positive, got {}",
            trading.volume_multiplier
        );

        let min_bars = Strategy::new(self.strategy_config.clone()).min_bars();
        ensure!(
            self.lookback_bars >= min_bars,
            "Lookback of {} bars is shorter than the {} bars the indicators need",
            self.lookback_bars,
            min_bars
        );

        Ok(())
    }
}

/// What a single iteration did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A position was already open; nothing was scanned
    PositionOpen,
    /// No symbol reached the vote threshold
    NoSignal,
    /// A candidate was chosen but its entry price could not be re-fetched
    EntrySkipped { symbol: String },
    /// Order sent (retcode is `None` in dry run)
    Entered {
        order: OrderRequest,
        retcode: Option<u32>,
    },
    /// The order could not be delivered to the terminal
    OrderFailed { order: OrderRequest },
}

/// Main bot runner.
pub struct Bot<B: Broker> {
    config: BotConfig,
    broker: B,
    strategy: Strategy,
    orders: OrderBuilder,

    // Shutdown signal
    shutdown: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl<B: Broker> Bot<B> {
    /// Create a new bot over `broker`.
    pub fn new(config: BotConfig, broker: B) -> Result<Self> {
        config.validate()?;

        let strategy = Strategy::new(config.strategy_config.clone());
        let orders = OrderBuilder::new(config.trading_config.clone());

        Ok(Self {
            config,
            broker,
            strategy,
            orders,
            shutdown: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Get shutdown signal for external control.
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Connect to the terminal and make every symbol tradable.
    ///
    /// A failed connection is fatal. Symbol problems are logged only.
    pub async fn initialize(&self, credentials: &Credentials) -> Result<()> {
        info!(
            login = credentials.login,
            server = %credentials.server,
            "Connecting to terminal"
        );

        self.broker
            .connect(credentials)
            .await
            .context("Terminal connection failed")?;
        info!("Terminal connected");

        self.activate_symbols().await;
        Ok(())
    }

    /// Ensure each symbol is visible in market watch.
    async fn activate_symbols(&self) {
        for symbol in &self.config.symbols {
            let info = match self.broker.symbol_info(symbol).await {
                Ok(Some(info)) => info,
                Ok(None) => {
                    warn!(symbol = %symbol, "Symbol info not found");
                    continue;
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Symbol info unavailable");
                    continue;
                }
            };

            if info.visible {
                info!(symbol = %symbol, "Symbol already visible");
                continue;
            }

            match self.broker.select_symbol(symbol).await {
                Ok(true) => info!(symbol = %symbol, "Symbol activated"),
                Ok(false) => warn!(symbol = %symbol, "Failed to activate symbol"),
                Err(e) => warn!(symbol = %symbol, error = %e, "Failed to activate symbol"),
            }
        }
    }

    /// Main run loop. Returns after Ctrl+C or an external shutdown.
    pub async fn run(&self) -> Result<()> {
        info!(
            symbols = ?self.config.symbols,
            timeframe = %self.config.timeframe,
            dry_run = self.config.dry_run,
            poll_interval = self.config.poll_interval_secs,
            "Starting bot run loop"
        );

        // Register shutdown handler
        let shutdown = self.shutdown_signal();
        let wake = self.wake.clone();
        let handler = tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
            shutdown.store(true, Ordering::SeqCst);
            wake.notify_one();
        });

        let poll_interval = Duration::from_secs(self.config.poll_interval_secs);

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.tick().await {
                Ok(outcome) => debug!(outcome = ?outcome, "Tick complete"),
                Err(e) => error!(error = %e, "Error in bot tick"),
            }

            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = self.wake.notified() => {}
            }
        }

        handler.abort();

        info!("Shutting down bot...");
        self.close().await;
        info!("Bot shutdown complete");

        Ok(())
    }

    /// Close the terminal session. Failures are logged only.
    pub async fn close(&self) {
        if let Err(e) = self.broker.shutdown().await {
            warn!(error = %e, "Terminal shutdown failed");
        }
    }

    /// Single iteration of the main loop.
    pub async fn tick(&self) -> Result<TickOutcome> {
        if self.has_open_position().await {
            info!("Trade already open. Waiting...");
            return Ok(TickOutcome::PositionOpen);
        }

        let summary = self.scan().await;

        let Some(best) = select_best(&summary) else {
            info!(scanned = summary.len(), "No valid trade signals found");
            return Ok(TickOutcome::NoSignal);
        };

        info!(
            symbol = %best.symbol,
            vote = best.vote,
            strength = best.strength,
            "Selected candidate"
        );
        self.open_trade(best).await
    }

    /// Evaluate every configured symbol. Symbols without enough data are left out.
    pub async fn scan(&self) -> Vec<Candidate> {
        let mut summary = Vec::with_capacity(self.config.symbols.len());

        for symbol in &self.config.symbols {
            let Some(bars) = self.fetch_candles(symbol).await else {
                continue;
            };

            if bars.len() < self.config.lookback_bars {
                warn!(
                    symbol = %symbol,
                    bars = bars.len(),
                    required = self.config.lookback_bars,
                    "Not enough history, skipping"
                );
                continue;
            }

            let candidate = self.strategy.assess(symbol, &bars);
            info!(
                symbol = %symbol,
                signals = %candidate.signals,
                vote = candidate.vote,
                strength = candidate.strength,
                "Symbol evaluated"
            );
            summary.push(candidate);
        }

        summary
    }

    /// Fetch the configured lookback of bars, retrying on empty results.
    ///
    /// Returns `None` once the attempts are exhausted.
    pub async fn fetch_candles(&self, symbol: &str) -> Option<Vec<Bar>> {
        let max_attempts = self.config.fetch_attempts;
        let timeframe = self.config.timeframe;
        let count = self.config.lookback_bars;
        let broker = &self.broker;
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;

        let operation = move || async move {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;

            let failure = match broker.fetch_bars(symbol, timeframe, count).await {
                Ok(bars) if !bars.is_empty() => return Ok(bars),
                Ok(_) => anyhow!("no data returned"),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                Err(backoff::Error::permanent(failure))
            } else {
                Err(backoff::Error::transient(failure))
            }
        };

        let notify = |e: anyhow::Error, _: Duration| {
            warn!(
                symbol = %symbol,
                attempt = attempts.load(Ordering::Relaxed),
                max_attempts = max_attempts,
                error = %e,
                "No data for symbol, retrying"
            );
        };

        match backoff::future::retry_notify(Constant::new(self.config.retry_delay), operation, notify)
            .await
        {
            Ok(bars) => Some(bars),
            Err(e) => {
                error!(
                    symbol = %symbol,
                    attempts = max_attempts,
                    error = %e,
                    "Failed to fetch data. Ensure chart is open and history is loaded"
                );
                None
            }
        }
    }

    /// Open positions, or `None` when the terminal could not report them.
    pub async fn open_positions(&self) -> Option<Vec<Position>> {
        match self.broker.positions().await {
            Ok(positions) => positions,
            Err(e) => {
                warn!(error = %e, "Position query failed");
                None
            }
        }
    }

    /// Whether any position is open. An unreadable list counts as none.
    pub async fn has_open_position(&self) -> bool {
        match self.open_positions().await {
            Some(positions) => !positions.is_empty(),
            None => {
                warn!("Could not retrieve positions. Check terminal connection.");
                false
            }
        }
    }

    /// Account balance, zero when unavailable.
    pub async fn balance(&self) -> Decimal {
        match self.broker.account_info().await {
            Ok(Some(account)) => account.balance,
            Ok(None) => Decimal::ZERO,
            Err(e) => {
                warn!(error = %e, "Account query failed");
                Decimal::ZERO
            }
        }
    }

    /// Build and send the order for a selected candidate.
    async fn open_trade(&self, candidate: &Candidate) -> Result<TickOutcome> {
        let side: OrderSide = candidate
            .side()
            .context("Selected candidate has no direction")?;
        let symbol = candidate.symbol.as_str();

        // Entry price is the last close of a fresh fetch
        let Some(bars) = self.fetch_candles(symbol).await else {
            warn!(symbol = %symbol, "Could not refresh price, skipping entry");
            return Ok(TickOutcome::EntrySkipped {
                symbol: symbol.to_string(),
            });
        };
        let entry = bars.last().map(|b| b.close).context("Empty bar series")?;

        let balance = self.balance().await;
        let order = self.orders.build(symbol, side, entry, balance)?;

        if self.config.dry_run {
            info!(
                symbol = %order.symbol,
                side = %order.side,
                volume = %order.volume,
                price = %order.price,
                sl = %order.sl,
                tp = %order.tp,
                "[DRY RUN] Would send order"
            );
            return Ok(TickOutcome::Entered {
                order,
                retcode: None,
            });
        }

        match self.broker.send_order(&order).await {
            Ok(result) => {
                if result.is_done() {
                    info!(
                        symbol = %order.symbol,
                        side = %order.side,
                        volume = %order.volume,
                        retcode = result.retcode,
                        ticket = ?result.order,
                        "Order sent"
                    );
                } else {
                    warn!(
                        symbol = %order.symbol,
                        side = %order.side,
                        volume = %order.volume,
                        retcode = result.retcode,
                        comment = %result.comment,
                        "Order not filled"
                    );
                }
                Ok(TickOutcome::Entered {
                    order,
                    retcode: Some(result.retcode),
                })
            }
            Err(e) => {
                error!(symbol = %order.symbol, error = %e, "Order submission failed");
                Ok(TickOutcome::OrderFailed { order })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use rust_decimal_macros::dec;

    use crate::indicators::make_ohlc_bars;
    use crate::models::{AccountInfo, OrderResult, SymbolInfo, RETCODE_DONE};

    /// In-memory terminal.
    struct FakeBroker {
        connect_ok: bool,
        symbols: HashMap<String, SymbolInfo>,
        bars: HashMap<String, Vec<Bar>>,
        /// Empty responses to return per symbol before serving bars
        empty_responses: Mutex<HashMap<String, u32>>,
        positions: Option<Vec<Position>>,
        balance: Option<Decimal>,
        retcode: u32,
        fail_orders: bool,

        fetch_calls: Mutex<HashMap<String, u32>>,
        selected: Mutex<Vec<String>>,
        sent: Mutex<Vec<OrderRequest>>,
        shut_down: AtomicBool,
    }

    impl Default for FakeBroker {
        fn default() -> Self {
            Self {
                connect_ok: true,
                symbols: HashMap::new(),
                bars: HashMap::new(),
                empty_responses: Mutex::new(HashMap::new()),
                positions: Some(Vec::new()),
                balance: Some(dec!(10000)),
                retcode: RETCODE_DONE,
                fail_orders: false,
                fetch_calls: Mutex::new(HashMap::new()),
                selected: Mutex::new(Vec::new()),
                sent: Mutex::new(Vec::new()),
                shut_down: AtomicBool::new(false),
            }
        }
    }

    impl FakeBroker {
        fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
            self.bars.insert(symbol.to_string(), bars);
            self
        }

        fn fetches(&self, symbol: &str) -> u32 {
            self.fetch_calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
        }

        fn sent(&self) -> Vec<OrderRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Broker for FakeBroker {
        async fn connect(&self, _credentials: &Credentials) -> Result<()> {
            if self.connect_ok {
                Ok(())
            } else {
                Err(anyhow!("Authorization failed"))
            }
        }

        async fn symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>> {
            Ok(self.symbols.get(symbol).cloned())
        }

        async fn select_symbol(&self, symbol: &str) -> Result<bool> {
            self.selected.lock().unwrap().push(symbol.to_string());
            Ok(true)
        }

        async fn fetch_bars(&self, symbol: &str, _timeframe: Timeframe, count: usize) -> Result<Vec<Bar>> {
            *self
                .fetch_calls
                .lock()
                .unwrap()
                .entry(symbol.to_string())
                .or_insert(0) += 1;

            if let Some(remaining) = self.empty_responses.lock().unwrap().get_mut(symbol) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Ok(Vec::new());
                }
            }

            let bars = self.bars.get(symbol).cloned().unwrap_or_default();
            let start = bars.len().saturating_sub(count);
            Ok(bars[start..].to_vec())
        }

        async fn account_info(&self) -> Result<Option<AccountInfo>> {
            Ok(self.balance.map(|balance| AccountInfo {
                login: 1,
                balance,
                equity: balance,
                currency: "USD".to_string(),
            }))
        }

        async fn positions(&self) -> Result<Option<Vec<Position>>> {
            Ok(self.positions.clone())
        }

        async fn send_order(&self, request: &OrderRequest) -> Result<OrderResult> {
            if self.fail_orders {
                return Err(anyhow!("connection reset"));
            }
            self.sent.lock().unwrap().push(request.clone());
            Ok(OrderResult {
                retcode: self.retcode,
                comment: String::new(),
                order: Some(1),
                deal: Some(1),
            })
        }

        async fn shutdown(&self) -> Result<()> {
            self.shut_down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config(symbols: &[&str]) -> BotConfig {
        BotConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            poll_interval_secs: 0,
            retry_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            login: 1,
            password: "pw".to_string(),
            server: "Demo".to_string(),
        }
    }

    /// Accelerating rally with rising highs and lows.
    /// Votes: trend +1, MACD +1, RSI -1 (overbought), ADX +1, volume spike as given.
    fn rally(spike: bool) -> Vec<Bar> {
        let data: Vec<_> = (0..100)
            .map(|i| {
                let c = 100.0 + (i as f64).powi(2) * 0.05;
                (c - 0.5, c + 0.5, c - 1.0, c)
            })
            .collect();
        let mut bars = make_ohlc_bars(&data);
        for bar in bars.iter_mut() {
            bar.real_volume = 10.0;
        }
        if spike {
            bars.last_mut().unwrap().real_volume = 1_000.0;
        }
        bars
    }

    /// Flat market. Votes: trend -1, MACD -1, RSI -1 (no losses reads 100).
    fn flat() -> Vec<Bar> {
        make_ohlc_bars(&vec![(100.0, 100.0, 100.0, 100.0); 100])
    }

    /// Accelerating selloff with falling highs and lows.
    /// Votes: trend -1, MACD -1, RSI +1 (oversold), ADX +1, no volume spike.
    fn selloff() -> Vec<Bar> {
        let data: Vec<_> = (0..100)
            .map(|i| {
                let c = 1000.0 - (i as f64).powi(2) * 0.05;
                (c + 0.5, c + 1.0, c - 0.5, c)
            })
            .collect();
        let mut bars = make_ohlc_bars(&data);
        for bar in bars.iter_mut() {
            bar.real_volume = 10.0;
        }
        bars
    }

    fn position() -> Position {
        Position {
            ticket: 9,
            symbol: "EURUSDm".to_string(),
            side: OrderSide::Buy,
            volume: dec!(0.1),
            price_open: dec!(1.1),
            sl: dec!(1.0985),
            tp: dec!(1.102),
            profit: Decimal::ZERO,
            magic: 123456,
        }
    }

    #[tokio::test]
    async fn test_open_position_blocks_scan() {
        let broker = FakeBroker {
            positions: Some(vec![position()]),
            ..Default::default()
        }
        .with_bars("EURUSDm", rally(true));
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        let outcome = bot.tick().await.unwrap();

        assert_eq!(outcome, TickOutcome::PositionOpen);
        assert_eq!(bot.broker.fetches("EURUSDm"), 0);
        assert!(bot.broker.sent().is_empty());
    }

    #[tokio::test]
    async fn test_enters_strongest_candidate() {
        let broker = FakeBroker::default()
            .with_bars("EURUSDm", flat())
            .with_bars("BTCUSDm", rally(false))
            .with_bars("XAUUSDm", rally(true));
        let bot = Bot::new(config(&["EURUSDm", "BTCUSDm", "XAUUSDm"]), broker).unwrap();

        let summary = bot.scan().await;
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].vote, -1);
        assert_eq!(summary[0].strength, 3);
        assert_eq!(summary[1].strength, 3);
        assert_eq!(summary[2].strength, 4);

        let outcome = bot.tick().await.unwrap();
        let TickOutcome::Entered { order, retcode } = outcome else {
            panic!("expected an entry, got {outcome:?}");
        };

        assert_eq!(retcode, Some(RETCODE_DONE));
        assert_eq!(order.symbol, "XAUUSDm");
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.volume, dec!(15.33));
        assert!(order.sl < order.price && order.price < order.tp);
        assert_eq!(order.tp - order.price, dec!(0.0020));
        assert_eq!(bot.broker.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_equal_strength_goes_to_first_symbol() {
        let broker = FakeBroker::default()
            .with_bars("BTCUSDm", rally(false))
            .with_bars("EURUSDm", rally(false));
        let bot = Bot::new(config(&["BTCUSDm", "EURUSDm"]), broker).unwrap();

        let TickOutcome::Entered { order, .. } = bot.tick().await.unwrap() else {
            panic!("expected an entry");
        };
        assert_eq!(order.symbol, "BTCUSDm");
    }

    #[tokio::test]
    async fn test_no_signal() {
        let broker = FakeBroker::default().with_bars("EURUSDm", selloff());
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        let summary = bot.scan().await;
        assert_eq!(summary[0].signals.0, [-1, -1, 1, 1, 0]);
        assert_eq!(summary[0].vote, 0);

        assert_eq!(bot.tick().await.unwrap(), TickOutcome::NoSignal);
        assert!(bot.broker.sent().is_empty());
    }

    #[tokio::test]
    async fn test_flat_market_enters_sell() {
        let broker = FakeBroker::default().with_bars("EURUSDm", flat());
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        let TickOutcome::Entered { order, .. } = bot.tick().await.unwrap() else {
            panic!("expected an entry");
        };
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.price, dec!(100));
        assert_eq!(order.sl, dec!(100.0015));
        assert_eq!(order.tp, dec!(99.9980));
    }

    #[tokio::test]
    async fn test_empty_fetch_is_retried() {
        let broker = FakeBroker::default().with_bars("EURUSDm", rally(true));
        broker
            .empty_responses
            .lock()
            .unwrap()
            .insert("EURUSDm".to_string(), 2);
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        let bars = bot.fetch_candles("EURUSDm").await;

        assert_eq!(bars.map(|b| b.len()), Some(100));
        assert_eq!(bot.broker.fetches("EURUSDm"), 3);
    }

    #[tokio::test]
    async fn test_symbol_skipped_after_three_empty_fetches() {
        let broker = FakeBroker::default().with_bars("BTCUSDm", flat());
        let bot = Bot::new(config(&["EURUSDm", "BTCUSDm"]), broker).unwrap();

        let summary = bot.scan().await;

        assert_eq!(bot.broker.fetches("EURUSDm"), 3);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].symbol, "BTCUSDm");
    }

    #[tokio::test]
    async fn test_short_history_skipped() {
        let mut bars = rally(true);
        bars.drain(..10);
        let broker = FakeBroker::default().with_bars("EURUSDm", bars);
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        assert!(bot.scan().await.is_empty());
        assert_eq!(bot.tick().await.unwrap(), TickOutcome::NoSignal);
    }

    #[tokio::test]
    async fn test_unreadable_positions_count_as_none() {
        let broker = FakeBroker {
            positions: None,
            ..Default::default()
        }
        .with_bars("EURUSDm", rally(true));
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        assert!(!bot.has_open_position().await);
        assert!(matches!(bot.tick().await.unwrap(), TickOutcome::Entered { .. }));
    }

    #[tokio::test]
    async fn test_order_failure_does_not_escape() {
        let broker = FakeBroker {
            fail_orders: true,
            ..Default::default()
        }
        .with_bars("EURUSDm", rally(true));
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        let outcome = bot.tick().await.unwrap();
        assert!(matches!(outcome, TickOutcome::OrderFailed { .. }));
    }

    #[tokio::test]
    async fn test_rejected_retcode_is_reported_only() {
        let broker = FakeBroker {
            retcode: 10019,
            ..Default::default()
        }
        .with_bars("EURUSDm", rally(true));
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        let TickOutcome::Entered { retcode, .. } = bot.tick().await.unwrap() else {
            panic!("expected an entry");
        };
        assert_eq!(retcode, Some(10019));
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let broker = FakeBroker::default().with_bars("EURUSDm", rally(true));
        let cfg = BotConfig {
            dry_run: true,
            ..config(&["EURUSDm"])
        };
        let bot = Bot::new(cfg, broker).unwrap();

        let TickOutcome::Entered { order, retcode } = bot.tick().await.unwrap() else {
            panic!("expected an entry");
        };
        assert_eq!(retcode, None);
        assert_eq!(order.symbol, "EURUSDm");
        assert!(bot.broker.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_balance_sizes_minimum() {
        let broker = FakeBroker {
            balance: None,
            ..Default::default()
        }
        .with_bars("EURUSDm", rally(true));
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        let TickOutcome::Entered { order, .. } = bot.tick().await.unwrap() else {
            panic!("expected an entry");
        };
        assert_eq!(order.volume, dec!(0.01));
    }

    #[tokio::test]
    async fn test_connect_failure_is_fatal() {
        let broker = FakeBroker {
            connect_ok: false,
            ..Default::default()
        };
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        assert!(bot.initialize(&credentials()).await.is_err());
    }

    #[tokio::test]
    async fn test_initialize_selects_hidden_symbols() {
        let mut symbols = HashMap::new();
        for (name, visible) in [("EURUSDm", true), ("XAUUSDm", false)] {
            symbols.insert(
                name.to_string(),
                SymbolInfo {
                    name: name.to_string(),
                    visible,
                    digits: 5,
                    point: 0.00001,
                },
            );
        }
        let broker = FakeBroker {
            symbols,
            ..Default::default()
        }
        .with_bars("BTCUSDm", flat());
        let bot = Bot::new(config(&["EURUSDm", "XAUUSDm", "BTCUSDm"]), broker).unwrap();

        bot.initialize(&credentials()).await.unwrap();
        assert_eq!(*bot.broker.selected.lock().unwrap(), vec!["XAUUSDm".to_string()]);

        // A symbol unknown to market watch is still scanned
        let summary = bot.scan().await;
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].symbol, "BTCUSDm");
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let broker = FakeBroker::default();
        let bot = Bot::new(config(&["EURUSDm"]), broker).unwrap();

        bot.shutdown_signal().store(true, Ordering::SeqCst);
        bot.run().await.unwrap();

        assert!(bot.broker.shut_down.load(Ordering::SeqCst));
        assert_eq!(bot.broker.fetches("EURUSDm"), 0);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(BotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejections() {
        let short = BotConfig {
            lookback_bars: 20,
            ..Default::default()
        };
        assert!(short.validate().is_err());

        let mut no_stop = BotConfig::default();
        no_stop.trading_config.stop_loss_pips = Decimal::ZERO;
        assert!(no_stop.validate().is_err());

        let mut reckless = BotConfig::default();
        reckless.trading_config.risk_pct = dec!(1.5);
        assert!(reckless.validate().is_err());

        let none = BotConfig {
            symbols: Vec::new(),
            ..Default::default()
        };
        assert!(none.validate().is_err());
    }
}
