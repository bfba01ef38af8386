//! pipvote: fixed-pip FX trading bot
//!
//! Scans a handful of symbols every interval, scores each with a 3-of-5
//! indicator vote, and enters the strongest signal with a fixed stop and
//! target while no position is open.

mod api;
mod bot;
mod indicators;
mod models;
mod trading;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{BridgeClient, Credentials, DEFAULT_BRIDGE_URL};
use crate::bot::{Bot, BotConfig};
use crate::models::Timeframe;
use crate::trading::{Strategy, StrategyConfig, TradingConfig};

/// Fixed-pip FX trading bot CLI.
#[derive(Parser)]
#[command(name = "pipvote")]
#[command(about = "Trade the strongest 3-of-5 indicator vote with fixed-pip risk", long_about = None)]
struct Cli {
    /// Terminal bridge URL
    #[arg(short, long, env = "BRIDGE_URL", default_value = DEFAULT_BRIDGE_URL)]
    bridge_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Market selection shared by `run` and `scan`.
#[derive(clap::Args)]
struct MarketArgs {
    /// Symbols to scan, comma separated
    #[arg(short, long, value_delimiter = ',', default_value = "EURUSDm,BTCUSDm,XAUUSDm")]
    symbols: Vec<String>,

    /// Candle timeframe
    #[arg(short, long, value_enum, default_value_t = Timeframe::M15)]
    timeframe: Timeframe,

    /// Bars fetched per symbol
    #[arg(long, default_value = "100")]
    lookback: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the trading bot
    Run {
        #[command(flatten)]
        market: MarketArgs,

        /// Polling interval in seconds
        #[arg(short, long, default_value = "60")]
        interval: u64,

        /// Fraction of balance risked per trade
        #[arg(short, long, default_value = "0.23")]
        risk: f64,

        /// Stop-loss distance in pips
        #[arg(long, default_value = "15")]
        sl_pips: f64,

        /// Take-profit distance in pips
        #[arg(long, default_value = "20")]
        tp_pips: f64,

        /// Lot size multiplier
        #[arg(short, long, default_value = "1.0")]
        multiplier: f64,

        /// Dry run (don't send orders)
        #[arg(long)]
        dry_run: bool,
    },

    /// Evaluate every symbol once and print the signals
    Scan {
        #[command(flatten)]
        market: MarketArgs,
    },

    /// Show account balance and open positions
    Status,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            market,
            interval,
            risk,
            sl_pips,
            tp_pips,
            multiplier,
            dry_run,
        } => {
            let trading_config = TradingConfig {
                risk_pct: Decimal::try_from(risk)?,
                stop_loss_pips: Decimal::try_from(sl_pips)?,
                take_profit_pips: Decimal::try_from(tp_pips)?,
                volume_multiplier: Decimal::try_from(multiplier)?,
                ..Default::default()
            };

            let bot_config = BotConfig {
                symbols: market.symbols,
                timeframe: market.timeframe,
                lookback_bars: market.lookback,
                poll_interval_secs: interval,
                dry_run,
                trading_config,
                ..Default::default()
            };

            let credentials = Credentials::from_env()?;
            let broker = BridgeClient::new(&cli.bridge_url)?;

            info!(
                bridge = %broker.base_url(),
                interval = interval,
                dry_run = dry_run,
                "Starting trading bot"
            );

            let bot = Bot::new(bot_config, broker)?;
            bot.initialize(&credentials).await?;

            let config = bot.config();
            println!("\n=== pipvote ===");
            println!("Symbols:          {}", config.symbols.join(", "));
            println!("Timeframe:        {}", config.timeframe);
            println!("Polling interval: {}s", config.poll_interval_secs);
            println!(
                "Risk per trade:   {}%",
                config.trading_config.risk_pct * Decimal::from(100)
            );
            println!("Mode: {}", if dry_run { "DRY RUN (no real orders)" } else { "LIVE TRADING" });
            println!("\nPress Ctrl+C to stop.\n");

            if let Err(e) = bot.run().await {
                tracing::error!(error = %e, "Bot error");
            }
        }

        Commands::Scan { market } => {
            let bot_config = BotConfig {
                symbols: market.symbols,
                timeframe: market.timeframe,
                lookback_bars: market.lookback,
                dry_run: true,
                ..Default::default()
            };

            let credentials = Credentials::from_env()?;
            let broker = BridgeClient::new(&cli.bridge_url)?;
            let bot = Bot::new(bot_config, broker)?;
            bot.initialize(&credentials).await?;

            let summary = bot.scan().await;

            println!("\n{:<12} {:<18} {:>5} {:>9}", "SYMBOL", "SIGNALS", "VOTE", "STRENGTH");
            println!("{}", "-".repeat(47));
            for candidate in &summary {
                println!(
                    "{:<12} {:<18} {:>5} {:>9}",
                    candidate.symbol,
                    candidate.signals.to_string(),
                    candidate.vote,
                    candidate.strength
                );
            }

            match trading::select_best(&summary) {
                Some(best) => println!(
                    "\nBest: {} {} (strength {})",
                    best.symbol,
                    best.side().map(|s| s.as_str()).unwrap_or("-"),
                    best.strength
                ),
                None => println!("\nNo valid trade signals found."),
            }

            bot.close().await;
        }

        Commands::Status => {
            let credentials = Credentials::from_env()?;
            let broker = BridgeClient::new(&cli.bridge_url)?;
            let bot = Bot::new(BotConfig::default(), broker)?;
            bot.initialize(&credentials).await?;

            let balance = bot.balance().await;

            println!("\n=== Account ===");
            println!("Login:            {}", credentials.login);
            println!("Server:           {}", credentials.server);
            println!("Balance:          {:.2}", balance);

            match bot.open_positions().await {
                None => println!("\nPositions unavailable. Check terminal connection."),
                Some(positions) if positions.is_empty() => println!("\nNo open positions."),
                Some(positions) => {
                    println!("\n=== Open Positions ({}) ===", positions.len());
                    for pos in &positions {
                        let pnl_sign = if pos.profit >= Decimal::ZERO { "+" } else { "" };
                        println!(
                            "  #{} {} {} {} @ {} (SL {} / TP {}) {}{:.2}",
                            pos.ticket,
                            pos.symbol,
                            pos.side,
                            pos.volume,
                            pos.price_open,
                            pos.sl,
                            pos.tp,
                            pnl_sign,
                            pos.profit
                        );
                    }
                }
            }

            bot.close().await;
        }

        Commands::Config => {
            let bot = BotConfig::default();
            let config = &bot.trading_config;
            let strategy = StrategyConfig::default();

            println!("\n=== Bot Configuration ===\n");
            println!("  Symbols:              {}", bot.symbols.join(", "));
            println!("  Timeframe:            {}", bot.timeframe);
            println!("  Lookback Bars:        {}", bot.lookback_bars);
            println!("  Poll Interval:        {}s", bot.poll_interval_secs);
            println!("  Fetch Attempts:       {}", bot.fetch_attempts);
            println!("  Retry Delay:          {}s", bot.retry_delay.as_secs());

            println!("\n=== Trading Configuration ===\n");
            println!("Position Sizing:");
            println!("  Risk Per Trade:       {}%", config.risk_pct * Decimal::from(100));
            println!("  Volume Multiplier:    {}", config.volume_multiplier);
            println!("  Min Volume:           {}", config.min_volume);
            println!("  Contract Size:        {}", config.contract_size);

            println!("\nOrders:");
            println!("  Stop Loss:            {} pips", config.stop_loss_pips);
            println!("  Take Profit:          {} pips", config.take_profit_pips);
            println!("  Deviation:            {} points", config.deviation);
            println!("  Magic:                {}", config.magic);
            println!("  Comment:              {}", config.comment);

            println!("\n=== Strategy Configuration ===\n");
            println!("  EMA Period:           {}", strategy.ema_period);
            println!(
                "  MACD:                 {}/{}/{}",
                strategy.macd_fast, strategy.macd_slow, strategy.macd_signal
            );
            println!(
                "  RSI:                  {} ({}/{})",
                strategy.rsi_period, strategy.rsi_oversold, strategy.rsi_overbought
            );
            println!(
                "  ADX:                  {} (> {})",
                strategy.adx_period, strategy.adx_threshold
            );
            println!(
                "  Volume Spike:         {}x {}-bar mean",
                strategy.volume_spike_multiple, strategy.volume_window
            );
            println!("  Vote Threshold:       {} of 5", strategy.vote_threshold);
            println!(
                "  Warmup:               {} bars",
                Strategy::new(strategy.clone()).min_bars()
            );
        }
    }

    Ok(())
}
