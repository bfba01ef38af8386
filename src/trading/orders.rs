//! Market order construction with fixed-pip stop-loss and take-profit.

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::models::{
    pip_size, OrderFilling, OrderRequest, OrderSide, OrderTime, TradeAction,
};

use super::{PositionSizer, TradingConfig};

/// Builds order requests from a chosen symbol, side and entry price.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    config: TradingConfig,
    sizer: PositionSizer,
}

impl OrderBuilder {
    pub fn new(config: TradingConfig) -> Self {
        let sizer = PositionSizer::new(config.clone());
        Self { config, sizer }
    }

    /// Stop-loss and take-profit prices for an entry.
    ///
    /// The stop sits `stop_loss_pips` against the trade, the target
    /// `take_profit_pips` with it.
    pub fn price_levels(&self, symbol: &str, side: OrderSide, entry: Decimal) -> (Decimal, Decimal) {
        let pip = pip_size(symbol);
        let sign = side.sign();

        let sl = entry - sign * self.config.stop_loss_pips * pip;
        let tp = entry + sign * self.config.take_profit_pips * pip;
        (sl, tp)
    }

    /// Build a market order sized from `balance`.
    pub fn build(
        &self,
        symbol: &str,
        side: OrderSide,
        entry_price: f64,
        balance: Decimal,
    ) -> Result<OrderRequest> {
        // Shortest round-trip text keeps the terminal's quote digits intact
        let price: Decimal = entry_price
            .to_string()
            .parse()
            .with_context(|| format!("Invalid entry price {entry_price} for {symbol}"))?;

        let volume = self.sizer.lot_size(balance, symbol);
        let (sl, tp) = self.price_levels(symbol, side, price);

        Ok(OrderRequest {
            client_order_id: uuid::Uuid::new_v4().to_string(),
            action: TradeAction::Deal,
            symbol: symbol.to_string(),
            volume,
            side,
            price,
            sl,
            tp,
            deviation: self.config.deviation,
            magic: self.config.magic,
            comment: self.config.comment.clone(),
            type_time: OrderTime::Gtc,
            type_filling: OrderFilling::Ioc,
        })
    }
}
