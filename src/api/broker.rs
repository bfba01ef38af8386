//! Broker capability: everything the bot needs from a trading terminal.

use anyhow::{Context, Result};

use crate::models::{AccountInfo, Bar, OrderRequest, OrderResult, Position, SymbolInfo, Timeframe};

/// Terminal login.
#[derive(Clone)]
pub struct Credentials {
    pub login: u64,
    pub password: String,
    pub server: String,
}

impl Credentials {
    /// Read `MT5_LOGIN`, `MT5_PASSWORD` and `MT5_SERVER` from the environment.
    pub fn from_env() -> Result<Self> {
        let login = std::env::var("MT5_LOGIN")
            .context("MT5_LOGIN not set")?
            .parse()
            .context("Invalid MT5_LOGIN")?;
        let password = std::env::var("MT5_PASSWORD").context("MT5_PASSWORD not set")?;
        let server = std::env::var("MT5_SERVER").context("MT5_SERVER not set")?;

        Ok(Self {
            login,
            password,
            server,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .field("server", &self.server)
            .finish()
    }
}

/// Operations a trading terminal exposes to the bot.
///
/// `Ok(None)` means the terminal answered but had nothing to report (an
/// unknown symbol, an unreadable account or position list). `Err` is a
/// transport or protocol failure.
#[allow(async_fn_in_trait)]
pub trait Broker {
    /// Open a session. Must succeed before any other call.
    async fn connect(&self, credentials: &Credentials) -> Result<()>;

    async fn symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>>;

    /// Add a symbol to market watch. Returns whether the terminal accepted it.
    async fn select_symbol(&self, symbol: &str) -> Result<bool>;

    /// Most recent `count` bars, oldest first. May be empty.
    async fn fetch_bars(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<Vec<Bar>>;

    async fn account_info(&self) -> Result<Option<AccountInfo>>;

    async fn positions(&self) -> Result<Option<Vec<Position>>>;

    async fn send_order(&self, request: &OrderRequest) -> Result<OrderResult>;

    /// Close the session.
    async fn shutdown(&self) -> Result<()>;
}
