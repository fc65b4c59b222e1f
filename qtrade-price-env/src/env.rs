//! Price-series trading environment.
mod config;
use crate::{TradeAct, TradeState};
use anyhow::Result;
pub use config::{PriceEnvConfig, PriceSource, RewardPolicy};
use log::{debug, info};
use qtrade_core::{
    error::QtradeError,
    record::{Record, RecordValue},
    Env, Info, Step,
};

/// Information of a step of [`PriceEnv`].
#[derive(Clone, Debug, PartialEq)]
pub struct TradeInfo {
    /// Net worth after the step, at the new price.
    pub net_worth: f32,

    /// `false` if a buy or sell order could not be executed.
    pub executed: bool,
}

impl Info for TradeInfo {}

/// Replays a price series, trading a fixed quantity of the asset per step.
///
/// At step `t` the agent sees the price at `t` and at `t + 1`. Buying requires
/// enough cash and selling requires enough holdings; otherwise the order is
/// dropped and the step counts as trivial, like holding. An episode on a series
/// of `n` prices lasts `n - 1` steps.
///
/// Each step records `net_worth`, `cash` and `holdings`.
pub struct PriceEnv {
    prices: Vec<f32>,
    initial_cash: f32,
    trade_quantity: f32,
    reward_policy: RewardPolicy,

    /// Index of the current price.
    t: usize,
    cash: f32,
    holdings: f32,
}

impl PriceEnv {
    /// Returns the net worth at the current price.
    pub fn net_worth(&self) -> f32 {
        self.cash + self.holdings * self.prices[self.t]
    }

    /// Returns the price series.
    pub fn prices(&self) -> &[f32] {
        &self.prices
    }

    /// Executes the order, returning `true` if it changed the account.
    fn execute(&mut self, act: &TradeAct) -> bool {
        let price = self.prices[self.t];
        let q = self.trade_quantity;
        match act {
            TradeAct::Hold => false,
            TradeAct::Buy if self.cash >= q * price => {
                self.cash -= q * price;
                self.holdings += q;
                true
            }
            TradeAct::Sell if self.holdings >= q => {
                self.holdings -= q;
                self.cash += q * price;
                true
            }
            _ => false,
        }
    }

    fn reward(&self, net_worth_prev: f32, net_worth: f32, is_done: bool) -> f32 {
        match self.reward_policy {
            RewardPolicy::PerStep => net_worth - net_worth_prev,
            RewardPolicy::Terminal { .. } if !is_done => 0.0,
            RewardPolicy::Terminal { flat_penalty } => {
                let delta = net_worth - self.initial_cash;
                match flat_penalty {
                    Some(penalty) if delta == 0.0 => penalty,
                    _ => delta,
                }
            }
        }
    }
}

impl Env for PriceEnv {
    type Config = PriceEnvConfig;
    type Obs = TradeState;
    type Act = TradeAct;
    type Info = TradeInfo;

    /// Builds the environment at the beginning of an episode.
    ///
    /// Fails with [`QtradeError::Configuration`] if the series has fewer than 2
    /// prices, a price is not a positive number, or the cash or the trade quantity
    /// is not positive.
    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        let prices = config.source.load()?;
        if prices.len() < 2 {
            return Err(QtradeError::Configuration(format!(
                "at least 2 prices are required, got {}",
                prices.len()
            ))
            .into());
        }
        if let Some(p) = prices.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
            return Err(QtradeError::Configuration(format!("invalid price {}", p)).into());
        }
        if !(config.initial_cash > 0.0 && config.trade_quantity > 0.0) {
            return Err(QtradeError::Configuration(
                "initial_cash and trade_quantity must be positive".into(),
            )
            .into());
        }
        info!("Built a price environment with {} prices", prices.len());

        Ok(Self {
            prices,
            initial_cash: config.initial_cash,
            trade_quantity: config.trade_quantity,
            reward_policy: config.reward_policy.clone(),
            t: 0,
            cash: config.initial_cash,
            holdings: 0.0,
        })
    }

    fn state(&self) -> TradeState {
        let next_price = self.prices[(self.t + 1).min(self.prices.len() - 1)];
        TradeState {
            holdings: self.holdings,
            cash: self.cash,
            price: self.prices[self.t],
            next_price,
        }
    }

    /// Trades at the current price, then moves to the next price.
    ///
    /// Stepping after the end of an episode, without reset, fails with
    /// [`QtradeError::Configuration`].
    fn step(&mut self, a: &TradeAct) -> Result<(Step<Self>, Record)> {
        if self.t + 1 >= self.prices.len() {
            return Err(
                QtradeError::Configuration("the episode has ended, call reset()".into()).into(),
            );
        }

        let net_worth_prev = self.net_worth();
        let executed = self.execute(a);
        self.t += 1;
        let net_worth = self.net_worth();
        let is_done = self.t + 1 == self.prices.len();
        let reward = self.reward(net_worth_prev, net_worth, is_done);

        if is_done {
            debug!("Episode ended with net worth {}", net_worth);
        }

        let obs = match is_done {
            true => None,
            false => Some(self.state()),
        };
        let record = Record::from_slice(&[
            ("net_worth", RecordValue::Scalar(net_worth)),
            ("cash", RecordValue::Scalar(self.cash)),
            ("holdings", RecordValue::Scalar(self.holdings)),
        ]);
        let info = TradeInfo {
            net_worth,
            executed,
        };
        let is_nontrivial = executed;

        Ok((
            Step::new(obs, reward, is_done, is_nontrivial, info),
            record,
        ))
    }

    fn reset(&mut self) -> Result<TradeState> {
        self.t = 0;
        self.cash = self.initial_cash;
        self.holdings = 0.0;
        Ok(self.state())
    }

    /// Same as [`Env::reset`], as every episode replays the whole series.
    fn reset_with_index(&mut self, _ix: usize) -> Result<TradeState> {
        self.reset()
    }
}
