//! Configuration of DQN agent.
use super::{DqnModelConfig, EpsilonGreedy};
use crate::{opt::OptimizerConfig, util::CriticLoss, util::OutDim, Device};
use anyhow::Result;
use qtrade_core::{error::QtradeError, ReplayMemoryConfig};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Dqn`](super::Dqn) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig<Q>
where
    Q: OutDim,
{
    /// Configuration of the online and the target networks.
    pub model_config: DqnModelConfig<Q>,

    /// Exploration schedule.
    pub explorer: EpsilonGreedy,

    /// Configuration of the replay memory.
    pub replay_memory: ReplayMemoryConfig,

    /// Loss between predicted and target action-values.
    #[serde(default)]
    pub critic_loss: CriticLoss,

    /// Device on which the networks are placed.
    #[serde(default)]
    pub device: Device,

    /// Seed of the random number generator used for exploration.
    pub seed: u64,
}

impl<Q> Default for DqnConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            model_config: DqnModelConfig::default(),
            explorer: EpsilonGreedy::default(),
            replay_memory: ReplayMemoryConfig::default(),
            critic_loss: CriticLoss::default(),
            device: Device::default(),
            seed: 42,
        }
    }
}

impl<Q> DqnConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the networks.
    pub fn model_config(mut self, v: DqnModelConfig<Q>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the exploration schedule.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the capacity of the replay memory.
    pub fn replay_buffer_size(mut self, v: usize) -> Self {
        self.replay_memory = self.replay_memory.capacity(v);
        self
    }

    /// Sets the exploration rate at frame 0.
    pub fn epsilon_init(mut self, v: f64) -> Self {
        self.explorer = self.explorer.eps_start(v);
        self
    }

    /// Sets the exploration rate after the decay.
    pub fn epsilon_final(mut self, v: f64) -> Self {
        self.explorer = self.explorer.eps_final(v);
        self
    }

    /// Sets the number of frames over which epsilon decays.
    pub fn epsilon_decay_frames(mut self, v: usize) -> Self {
        self.explorer = self.explorer.final_step(v);
        self
    }

    /// Sets the learning rate of the optimizer.
    pub fn learning_rate(mut self, v: f64) -> Self {
        let opt_config = self.model_config.opt_config.clone().learning_rate(v);
        self.model_config = self.model_config.opt_config(opt_config);
        self
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.model_config = self.model_config.opt_config(v);
        self
    }

    /// Sets the critic loss.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Sets the seeds of the agent and of its replay memory.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self.replay_memory = self.replay_memory.seed(v);
        self
    }

    /// Checks the configuration.
    ///
    /// Fails with [`QtradeError::Configuration`] if the replay memory capacity or
    /// the decay frames are zero, if an exploration rate is out of `[0, 1]` or if
    /// the learning rate is not a positive number.
    pub fn check(&self) -> Result<()> {
        if self.replay_memory.capacity == 0 {
            return Err(
                QtradeError::Configuration("replay buffer size must be positive".into()).into(),
            );
        }
        self.explorer.check()?;
        let lr = self.model_config.opt_config.lr();
        if !(lr.is_finite() && lr > 0.0) {
            return Err(QtradeError::Configuration(format!(
                "learning rate must be positive, got {}",
                lr
            ))
            .into());
        }
        Ok(())
    }

    /// Constructs [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::MlpConfig;
    use tempdir::TempDir;

    fn config() -> DqnConfig<MlpConfig> {
        DqnConfig::default()
            .model_config(
                DqnModelConfig::default().q_config(MlpConfig::new(4, vec![16, 16], 3, false)),
            )
            .replay_buffer_size(500)
            .epsilon_init(1.0)
            .epsilon_final(0.1)
            .epsilon_decay_frames(10)
            .learning_rate(0.01)
    }

    #[test]
    fn test_serde_dqn_config() -> Result<()> {
        let config = config().critic_loss(CriticLoss::SmoothL1).seed(7);
        let dir = TempDir::new("dqn_config")?;
        let path = dir.path().join("dqn_config.yaml");

        config.save(&path)?;
        let config_ = DqnConfig::<MlpConfig>::load(&path)?;
        assert_eq!(config, config_);
        assert_eq!(config_.replay_memory.seed, 7);
        Ok(())
    }

    #[test]
    fn test_check() {
        assert!(config().check().is_ok());
        assert!(config().replay_buffer_size(0).check().is_err());
        assert!(config().epsilon_init(1.1).check().is_err());
        assert!(config().epsilon_final(-0.5).check().is_err());
        assert!(config().epsilon_decay_frames(0).check().is_err());
        assert!(config().learning_rate(0.0).check().is_err());
        assert!(config().learning_rate(f64::NAN).check().is_err());
    }
}
