//! Training and evaluation of the DQN trader on a price series.
use anyhow::Result;
use log::info;
use qtrade_candle_agent::{
    dqn::{Dqn, DqnConfig, DqnModelConfig},
    mlp::{Mlp, MlpConfig},
};
use qtrade_core::{
    record::{AggregateRecorder, Record},
    Agent, DefaultEvaluator, Env, Evaluator, Trainer, TrainerConfig,
};
use qtrade_price_env::{PriceEnv, PriceEnvConfig, TradeStateEncoder};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::Path,
};

/// DQN agent trading on [`PriceEnv`] with an [`Mlp`] action-value function.
pub type TraderAgent = Dqn<PriceEnv, Mlp, TradeStateEncoder>;

/// Configuration of a training run.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TraderConfig {
    /// Environment used for training and evaluation.
    pub env_config: PriceEnvConfig,

    /// Agent.
    pub agent_config: DqnConfig<MlpConfig>,

    /// Training loop.
    pub trainer_config: TrainerConfig,

    /// Encoder of observations. If not given, scales are derived from the price
    /// series and the initial cash.
    #[serde(default)]
    pub encoder: Option<TradeStateEncoder>,

    /// Number of episodes per evaluation.
    pub n_eval_episodes: usize,
}

impl Default for TraderConfig {
    fn default() -> Self {
        let mlp_config = MlpConfig::new(4, vec![64, 64], 3, false);
        let agent_config = DqnConfig::default()
            .model_config(DqnModelConfig::default().q_config(mlp_config))
            .replay_buffer_size(10_000)
            .epsilon_init(1.0)
            .epsilon_final(0.02)
            .epsilon_decay_frames(10_000)
            .learning_rate(0.001);
        let trainer_config = TrainerConfig::default()
            .max_opts(10_000)
            .sync_interval(500)
            .eval_interval(1000)
            .flush_record_interval(1000)
            .record_compute_cost_interval(1000)
            .min_replay_len(1000)
            .batch_size(64)
            .discount_factor(0.99);

        Self {
            env_config: PriceEnvConfig::default(),
            agent_config,
            trainer_config,
            encoder: None,
            n_eval_episodes: 1,
        }
    }
}

impl TraderConfig {
    /// Sets the environment configuration.
    pub fn env_config(mut self, v: PriceEnvConfig) -> Self {
        self.env_config = v;
        self
    }

    /// Sets the agent configuration.
    pub fn agent_config(mut self, v: DqnConfig<MlpConfig>) -> Self {
        self.agent_config = v;
        self
    }

    /// Sets the training loop configuration.
    pub fn trainer_config(mut self, v: TrainerConfig) -> Self {
        self.trainer_config = v;
        self
    }

    /// Sets the encoder.
    pub fn encoder(mut self, v: TradeStateEncoder) -> Self {
        self.encoder = Some(v);
        self
    }

    /// Sets the number of episodes per evaluation.
    pub fn n_eval_episodes(mut self, v: usize) -> Self {
        self.n_eval_episodes = v;
        self
    }

    /// Constructs [`TraderConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TraderConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    fn build_encoder(&self, env: &PriceEnv) -> TradeStateEncoder {
        match &self.encoder {
            Some(encoder) => encoder.clone(),
            None => TradeStateEncoder::for_series(env.prices(), self.env_config.initial_cash),
        }
    }

    /// Builds the environment and an untrained agent.
    pub fn build(&self) -> Result<(PriceEnv, TraderAgent)> {
        let env = PriceEnv::build(&self.env_config, 0)?;
        let encoder = self.build_encoder(&env);
        let agent = Dqn::build(self.agent_config.clone(), encoder)?;
        Ok((env, agent))
    }
}

/// Trains an agent and returns it.
///
/// If `model_dir` is set in the trainer configuration, the configuration is saved
/// there as `config.yaml` together with the models.
pub fn train<R>(config: &TraderConfig, recorder: &mut R) -> Result<TraderAgent>
where
    R: AggregateRecorder + ?Sized,
{
    let (mut env, mut agent) = config.build()?;
    let mut evaluator =
        DefaultEvaluator::<PriceEnv>::new(&config.env_config, 0, config.n_eval_episodes)?;
    let mut trainer = Trainer::build(config.trainer_config.clone())?;

    if let Some(model_dir) = &config.trainer_config.model_dir {
        fs::create_dir_all(model_dir)?;
        config.save(Path::new(model_dir).join("config.yaml"))?;
    }

    trainer.train(&mut env, &mut agent, recorder, &mut evaluator)?;
    Ok(agent)
}

/// Evaluates the agent saved in `model_dir` with the greedy policy.
pub fn evaluate(config: &TraderConfig, model_dir: impl AsRef<Path>) -> Result<Record> {
    let (_, mut agent) = config.build()?;
    agent.load_params(model_dir.as_ref())?;

    let mut evaluator =
        DefaultEvaluator::<PriceEnv>::new(&config.env_config, 0, config.n_eval_episodes)?;
    let record = evaluator.evaluate(&mut agent)?;
    info!(
        "Evaluated the agent in {:?}: eval_reward = {}",
        model_dir.as_ref(),
        record.get_scalar("eval_reward")?
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trader_config() -> Result<()> {
        let dir = TempDir::new("trader_config")?;
        let path = dir.path().join("config.yaml");
        let config = TraderConfig::default()
            .env_config(PriceEnvConfig::default().prices(vec![10.0, 11.0, 10.5]))
            .encoder(TradeStateEncoder::new(10.0, 1000.0, 20.0));

        config.save(&path)?;
        assert_eq!(TraderConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_default_encoder() -> Result<()> {
        let config = TraderConfig::default()
            .env_config(PriceEnvConfig::default().prices(vec![10.0, 50.0, 25.0]));
        let (env, _) = config.build()?;
        let encoder = config.build_encoder(&env);
        assert_eq!(encoder.price_scale, 50.0);
        assert_eq!(encoder.cash_scale, 1000.0);
        Ok(())
    }
}
