//! Signal strategy: five indicator votes, a majority rule, and candidate
//! selection across symbols.
//!
//! Each indicator reads only the latest bar of its series:
//! - Trend: close above EMA → buy, otherwise sell
//! - Momentum: MACD histogram positive → buy, otherwise sell
//! - Oscillator: RSI oversold → buy, overbought → sell, otherwise neutral
//! - Trend strength: ADX above threshold → buy, otherwise neutral
//! - Volume: real volume spike → buy, otherwise neutral

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{self, Macd};
use crate::models::{closes, Bar, OrderSide};

/// Indicator parameters and the voting threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub ema_period: usize,

    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,

    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,

    pub adx_period: usize,
    /// ADX level that counts as a trending regime
    pub adx_threshold: f64,

    /// Bars in the volume average (latest bar included)
    pub volume_window: usize,
    pub volume_spike_multiple: f64,

    /// Concurring votes needed to trade
    pub vote_threshold: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            ema_period: 20,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            adx_period: 14,
            adx_threshold: 25.0,
            volume_window: 20,
            volume_spike_multiple: 4.0,
            vote_threshold: 3,
        }
    }
}

/// The five indicator readings, each in {-1, 0, 1}.
///
/// Order: trend, momentum, oscillator, trend strength, volume spike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalVector(pub [i8; 5]);

impl SignalVector {
    /// Number of readings equal to `value`.
    pub fn count(&self, value: i8) -> usize {
        self.0.iter().filter(|&&s| s == value).count()
    }

    pub fn buy_votes(&self) -> usize {
        self.count(1)
    }

    pub fn sell_votes(&self) -> usize {
        self.count(-1)
    }
}

impl From<[i8; 5]> for SignalVector {
    fn from(values: [i8; 5]) -> Self {
        Self(values)
    }
}

impl std::fmt::Display for SignalVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e] = self.0;
        write!(f, "[{a:>2},{b:>2},{c:>2},{d:>2},{e:>2}]")
    }
}

/// Reduce signals to +1 (buy), -1 (sell) or 0 (no trade).
///
/// Buys are checked first. Anything short of `threshold` agreeing votes is
/// no trade, even when the non-zero votes lean one way.
pub fn majority_vote(signals: &SignalVector, threshold: usize) -> i8 {
    if signals.buy_votes() >= threshold {
        1
    } else if signals.sell_votes() >= threshold {
        -1
    } else {
        0
    }
}

/// One symbol's evaluation within a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub signals: SignalVector,
    pub vote: i8,
    /// Count of readings agreeing with the vote (0 when there is no vote)
    pub strength: usize,
}

impl Candidate {
    pub fn new(symbol: impl Into<String>, signals: SignalVector, threshold: usize) -> Self {
        let vote = majority_vote(&signals, threshold);
        let strength = match vote {
            0 => 0,
            v => signals.count(v),
        };

        Self {
            symbol: symbol.into(),
            signals,
            vote,
            strength,
        }
    }

    pub fn side(&self) -> Option<OrderSide> {
        OrderSide::from_vote(self.vote)
    }
}

/// Pick the strongest non-zero candidate. Ties go to the earliest entry.
pub fn select_best(summary: &[Candidate]) -> Option<&Candidate> {
    summary
        .iter()
        .filter(|c| c.vote != 0)
        .min_by_key(|c| std::cmp::Reverse(c.strength))
}

/// Indicator evaluation bound to a configuration.
#[derive(Debug, Clone)]
pub struct Strategy {
    config: StrategyConfig,
    macd: Macd,
}

impl Strategy {
    pub fn new(config: StrategyConfig) -> Self {
        let macd = Macd {
            fast: config.macd_fast,
            slow: config.macd_slow,
            signal: config.macd_signal,
        };
        Self { config, macd }
    }

    /// Bars needed for every indicator to produce a value on the last bar.
    pub fn min_bars(&self) -> usize {
        [
            self.config.ema_period,
            self.macd.min_bars(),
            self.config.rsi_period,
            2 * self.config.adx_period,
            self.config.volume_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Compute the five signals on the latest bar.
    ///
    /// The caller must supply at least `min_bars()` bars. With less history
    /// the comparisons against NaN fall through to the sell/neutral branches.
    pub fn evaluate(&self, bars: &[Bar]) -> SignalVector {
        let cfg = &self.config;
        let close = closes(bars);
        let last_close = indicators::last(&close);

        let ema = indicators::last(&indicators::ema(&close, cfg.ema_period));
        let trend = if last_close > ema { 1 } else { -1 };

        let hist = indicators::last(&self.macd.histogram(&close));
        let momentum = if hist > 0.0 { 1 } else { -1 };

        let rsi = indicators::last(&indicators::rsi(&close, cfg.rsi_period));
        let oscillator = if rsi < cfg.rsi_oversold {
            1
        } else if rsi > cfg.rsi_overbought {
            -1
        } else {
            0
        };

        let adx = indicators::last(&indicators::adx(bars, cfg.adx_period));
        let trend_strength = if adx > cfg.adx_threshold { 1 } else { 0 };

        let volume_spike =
            if indicators::is_volume_spike(bars, cfg.volume_window, cfg.volume_spike_multiple) {
                1
            } else {
                0
            };

        debug!(
            close = last_close,
            ema = ema,
            macd_hist = hist,
            rsi = rsi,
            adx = adx,
            "Indicator readings"
        );

        SignalVector([trend, momentum, oscillator, trend_strength, volume_spike])
    }

    /// Evaluate one symbol into a candidate.
    pub fn assess(&self, symbol: &str, bars: &[Bar]) -> Candidate {
        Candidate::new(symbol, self.evaluate(bars), self.config.vote_threshold)
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}
