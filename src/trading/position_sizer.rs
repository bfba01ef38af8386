//! Position sizing: fixed fractional risk over a fixed pip stop.

use rust_decimal::Decimal;

use crate::models::pip_size;
use super::TradingConfig;

/// Calculator for order volume.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    config: TradingConfig,
}

impl PositionSizer {
    /// Create a new position sizer with given config.
    pub fn new(config: TradingConfig) -> Self {
        Self { config }
    }

    /// Lot size for `symbol` using the configured stop and risk fraction.
    pub fn lot_size(&self, balance: Decimal, symbol: &str) -> Decimal {
        self.calculate(
            balance,
            symbol,
            self.config.stop_loss_pips,
            self.config.risk_pct,
        )
    }

    /// Calculate the volume that loses `risk_pct` of `balance` if the stop is hit.
    ///
    /// lot = (balance * risk_pct) / (stop_pips * pip_size * contract_size)
    ///
    /// The result is scaled by the volume multiplier, rounded to 0.01 lots
    /// (half to even) and never below the minimum volume. There is no cap:
    /// the broker's margin check is the only upper bound.
    pub fn calculate(
        &self,
        balance: Decimal,
        symbol: &str,
        stop_pips: Decimal,
        risk_pct: Decimal,
    ) -> Decimal {
        let stop_amount = stop_pips * pip_size(symbol) * self.config.contract_size;
        if stop_amount <= Decimal::ZERO {
            return self.config.min_volume;
        }

        let risk_amount = balance * risk_pct;
        let lot = risk_amount / stop_amount;

        (lot * self.config.volume_multiplier)
            .round_dp(2)
            .max(self.config.min_volume)
    }
}
