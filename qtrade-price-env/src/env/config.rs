//! Configuration of [`PriceEnv`](super::PriceEnv).
use crate::load_prices;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Where the prices come from.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum PriceSource {
    /// Prices given in the configuration.
    Inline(Vec<f32>),

    /// A column of a CSV file with headers.
    Csv {
        /// Path of the file.
        path: String,

        /// Name of the price column.
        #[serde(default = "default_column")]
        column: String,
    },
}

fn default_column() -> String {
    "close".to_string()
}

impl PriceSource {
    /// Returns the price series.
    pub fn load(&self) -> Result<Vec<f32>> {
        match self {
            Self::Inline(prices) => Ok(prices.clone()),
            Self::Csv { path, column } => load_prices(path, column),
        }
    }
}

/// How the agent is rewarded.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum RewardPolicy {
    /// The change of net worth over the episode, paid at the last step.
    /// Other steps are rewarded with zero.
    ///
    /// If `flat_penalty` is given, it replaces a zero change, discouraging
    /// episodes without any gain or loss.
    Terminal {
        /// Reward of an episode ending with the initial net worth.
        flat_penalty: Option<f32>,
    },

    /// The change of net worth over each step.
    PerStep,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::Terminal {
            flat_penalty: Some(-1.0),
        }
    }
}

/// Configuration of [`PriceEnv`](super::PriceEnv).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PriceEnvConfig {
    /// Price series.
    pub source: PriceSource,

    /// Cash at the beginning of an episode.
    pub initial_cash: f32,

    /// Quantity bought or sold by a single action.
    pub trade_quantity: f32,

    /// Reward policy.
    #[serde(default)]
    pub reward_policy: RewardPolicy,
}

impl Default for PriceEnvConfig {
    fn default() -> Self {
        Self {
            source: PriceSource::Inline(vec![]),
            initial_cash: 1000.0,
            trade_quantity: 1.0,
            reward_policy: RewardPolicy::default(),
        }
    }
}

impl PriceEnvConfig {
    /// Sets the price series.
    pub fn prices(mut self, v: Vec<f32>) -> Self {
        self.source = PriceSource::Inline(v);
        self
    }

    /// Reads the prices from the `close` column of a CSV file.
    pub fn csv(mut self, path: impl Into<String>) -> Self {
        self.source = PriceSource::Csv {
            path: path.into(),
            column: default_column(),
        };
        self
    }

    /// Sets the cash at the beginning of an episode.
    pub fn initial_cash(mut self, v: f32) -> Self {
        self.initial_cash = v;
        self
    }

    /// Sets the quantity bought or sold by a single action.
    pub fn trade_quantity(mut self, v: f32) -> Self {
        self.trade_quantity = v;
        self
    }

    /// Sets the reward policy.
    pub fn reward_policy(mut self, v: RewardPolicy) -> Self {
        self.reward_policy = v;
        self
    }

    /// Constructs [`PriceEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PriceEnvConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
