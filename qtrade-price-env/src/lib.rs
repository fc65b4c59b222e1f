//! Single-asset trading environment for qtrade.
//!
//! [`PriceEnv`] replays a price series. At each step the agent holds, buys or sells a
//! fixed quantity of the asset at the current price; the episode ends when the series
//! has no next price. The observation, [`TradeState`], holds the position, the cash
//! and the current and next prices.
//!
//! ```no_run
//! use anyhow::Result;
//! use qtrade_core::{Env as _, Policy};
//! use qtrade_price_env::{PriceEnv, PriceEnvConfig, TradeAct, TradeState};
//!
//! struct BuyAndHold;
//!
//! impl Policy<PriceEnv> for BuyAndHold {
//!     fn sample(&mut self, _: &TradeState) -> Result<TradeAct> {
//!         Ok(TradeAct::Buy)
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let config = PriceEnvConfig::default().prices(vec![10.0, 11.0, 12.5, 12.0]);
//!     let mut env = PriceEnv::build(&config, 0)?;
//!     let mut policy = BuyAndHold;
//!     let mut obs = env.reset()?;
//!
//!     loop {
//!         let (step, record) = env.step(&policy.sample(&obs)?)?;
//!         if step.is_done {
//!             println!("{:?}", record.get_scalar("net_worth")?);
//!             break;
//!         }
//!         obs = env.state();
//!     }
//!
//!     Ok(())
//! }
//! ```
mod act;
mod env;
mod obs;
mod prices;
pub use act::TradeAct;
pub use env::{PriceEnv, PriceEnvConfig, PriceSource, RewardPolicy, TradeInfo};
pub use obs::{TradeState, TradeStateEncoder};
pub use prices::load_prices;
