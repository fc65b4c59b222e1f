//! A deep Q-learning trader.
//!
//! qtrade consists of the following crates:
//!
//! * [qtrade-core](qtrade_core) provides the traits shared by environments and
//!   agents, the replay memory, the records and the training loop. It does not
//!   depend on any deep learning backend.
//! * [qtrade-candle-agent](qtrade_candle_agent) includes the DQN agent based on
//!   [candle](https://crates.io/crates/candle-core).
//! * [qtrade-price-env](qtrade_price_env) is the environment replaying a price
//!   series of a single asset.
//! * [qtrade](crate) wires them together in [`trader`] and ships the
//!   `train_trader` binary.
pub mod trader;
pub use qtrade_candle_agent;
pub use qtrade_core;
pub use qtrade_price_env;
