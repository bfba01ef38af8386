//! Data models for bars, symbols, orders, positions, and the account.

mod account;
mod bar;
mod order;
mod symbol;

pub use account::{AccountInfo, Position};
pub use bar::{closes, Bar, Timeframe};
pub use order::{OrderFilling, OrderRequest, OrderResult, OrderSide, OrderTime, TradeAction};
pub use symbol::{pip_size, SymbolInfo};

#[cfg(test)]
pub use order::RETCODE_DONE;
