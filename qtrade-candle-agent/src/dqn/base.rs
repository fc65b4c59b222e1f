//! DQN agent implemented with candle.
use super::{config::DqnConfig, explorer::EpsilonGreedy, model::DqnModel};
use crate::{
    model::SubModel1,
    opt::Optimizer,
    util::{argmax_first, encode_batch, smooth_l1_loss, CriticLoss, OutDim},
};
use anyhow::Result;
use candle_core::{shape::D, Device, Tensor};
use candle_nn::loss::mse;
use log::{debug, info};
use qtrade_core::{
    error::QtradeError, Act, Agent, Encoder, Env, ExperienceBufferBase, PlayStep, Policy,
    ReplayBufferBase, ReplayMemory, Transition,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};

#[allow(clippy::upper_case_acronyms)]
/// DQN agent implemented with candle.
///
/// The agent owns an online and a target action-value network, a replay memory of
/// [`Transition`]s and the exploration schedule. Observations are turned into
/// network inputs by the encoder `C`.
///
/// The frame counter driving the exploration schedule is advanced by
/// [`Agent::play_step`] only; [`Policy::sample`] acts greedily and leaves it as is.
pub struct Dqn<E, Q, C>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    C: Encoder<E::Obs>,
{
    qnet: DqnModel<Q>,
    qnet_tgt: DqnModel<Q>,
    memory: ReplayMemory<Transition<E::Obs, E::Act>>,
    explorer: EpsilonGreedy,
    encoder: C,
    critic_loss: CriticLoss,
    device: Device,

    /// Number of steps taken by [`Agent::play_step`], never reset.
    frame_count: usize,

    episode_reward: f32,
    episode_trades: usize,
    n_opts: usize,
    rng: SmallRng,
}

impl<E, Q, C> Dqn<E, Q, C>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    C: Encoder<E::Obs>,
{
    /// Constructs DQN agent.
    ///
    /// The target network starts as a copy of the online network.
    /// Fails with [`QtradeError::Configuration`] if the configuration is invalid, if
    /// there is no action or no input feature, or if the output dimension of the
    /// network differs from the number of actions.
    pub fn build(config: DqnConfig<Q::Config>, encoder: C) -> Result<Self> {
        config.check()?;
        let n_actions = E::Act::n_actions();
        if n_actions == 0 {
            return Err(
                QtradeError::Configuration("the number of actions must be positive".into()).into(),
            );
        }
        if encoder.dim() == 0 {
            return Err(
                QtradeError::Configuration("the encoder width must be positive".into()).into(),
            );
        }
        let device: Device = config.device.try_into()?;
        let qnet = DqnModel::build(config.model_config.clone(), device.clone())?;
        if qnet.out_dim != n_actions {
            return Err(QtradeError::Configuration(format!(
                "output dimension of the network ({}) differs from the number of actions ({})",
                qnet.out_dim, n_actions
            ))
            .into());
        }
        let qnet_tgt = DqnModel::build(config.model_config, device.clone())?;
        qnet_tgt.copy_from(&qnet)?;

        Ok(Self {
            qnet,
            qnet_tgt,
            memory: ReplayMemory::build(&config.replay_memory)?,
            explorer: config.explorer,
            encoder,
            critic_loss: config.critic_loss,
            device,
            frame_count: 0,
            episode_reward: 0.0,
            episode_trades: 0,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(config.seed),
        })
    }

    /// Returns the number of steps taken in the environment so far.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Returns the number of optimization steps done so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Returns the online network.
    pub fn qnet(&self) -> &DqnModel<Q> {
        &self.qnet
    }

    /// Returns the target network.
    pub fn qnet_tgt(&self) -> &DqnModel<Q> {
        &self.qnet_tgt
    }

    /// Returns the index of the action with the highest value predicted by the
    /// online network, the first one among ties.
    fn greedy(&self, obs: &E::Obs) -> Result<usize> {
        let xs = encode_batch(&self.encoder, [Some(obs)], &self.device)?;
        let q = self.qnet.predict(&xs)?.squeeze(0)?.to_vec1::<f32>()?;
        Ok(argmax_first(&q))
    }

    /// Computes the TD targets `r + discount_factor * max_a Q_tgt(s', a)` of a batch.
    ///
    /// The target of a transition ending its episode is its reward, whatever the
    /// target network outputs. Targets are plain numbers, so no gradient flows
    /// through them.
    pub fn td_targets(
        &self,
        batch: &[Transition<E::Obs, E::Act>],
        discount_factor: f64,
    ) -> Result<Vec<f32>> {
        let xs = encode_batch(
            &self.encoder,
            batch.iter().map(|tr| tr.next_state.as_ref()),
            &self.device,
        )?;
        let q_next = self.qnet_tgt.predict(&xs)?.max(D::Minus1)?.to_vec1::<f32>()?;
        let gamma = discount_factor as f32;

        Ok(batch
            .iter()
            .zip(q_next)
            .map(|(tr, q)| match tr.is_done {
                true => tr.reward,
                false => tr.reward + gamma * q,
            })
            .collect())
    }
}

impl<E, Q, C> Policy<E> for Dqn<E, Q, C>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    C: Encoder<E::Obs>,
{
    /// Takes the greedy action, without exploration.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        Ok(E::Act::from_index(self.greedy(obs)?))
    }
}

impl<E, Q, C> Agent<E> for Dqn<E, Q, C>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    C: Encoder<E::Obs>,
{
    type Optimizer = Optimizer;

    fn play_step(&mut self, env: &mut E) -> Result<PlayStep<E::Act>> {
        let state = env.state();
        let n_actions = E::Act::n_actions();
        let ix = match self
            .explorer
            .explore(self.frame_count, n_actions, &mut self.rng)
        {
            Some(ix) => ix,
            None => self.greedy(&state)?,
        };
        self.frame_count += 1;

        let act = E::Act::from_index(ix);
        let (step, _) = env.step(&act)?;
        let is_done = step.is_done;
        self.memory.push(Transition::new(
            state,
            act.clone(),
            step.reward,
            is_done,
            step.obs,
        ))?;

        self.episode_reward += step.reward;
        if step.is_nontrivial {
            self.episode_trades += 1;
        }

        let play_step = PlayStep {
            act,
            cumulative_reward: self.episode_reward,
            is_done,
            trades: self.episode_trades,
        };

        if is_done {
            debug!(
                "Episode ended at frame {}, return = {}, trades = {}",
                self.frame_count, self.episode_reward, self.episode_trades
            );
            self.episode_reward = 0.0;
            self.episode_trades = 0;
            env.reset()?;
        }

        Ok(play_step)
    }

    fn build_optimizer(&self) -> Result<Optimizer> {
        self.qnet.build_optimizer()
    }

    fn train_on_replay_batch(
        &mut self,
        batch_size: usize,
        discount_factor: f64,
        opt: &mut Optimizer,
    ) -> Result<f32> {
        let batch = self.memory.batch(batch_size)?;
        let n = batch.len();

        let pred = {
            let xs = encode_batch(
                &self.encoder,
                batch.iter().map(|tr| Some(&tr.state)),
                &self.device,
            )?;
            let acts: Vec<u32> = batch.iter().map(|tr| tr.act.index() as u32).collect();
            let acts = Tensor::from_vec(acts, (n, 1), &self.device)?;
            self.qnet
                .forward(&xs)?
                .gather(&acts, D::Minus1)?
                .squeeze(D::Minus1)?
        };
        let tgt = Tensor::from_vec(self.td_targets(&batch, discount_factor)?, n, &self.device)?;

        let loss = match self.critic_loss {
            CriticLoss::Mse => mse(&pred, &tgt)?,
            CriticLoss::SmoothL1 => smooth_l1_loss(&pred, &tgt)?,
        };
        opt.backward_step(&loss)?;
        self.n_opts += 1;

        Ok(loss.to_scalar::<f32>()?)
    }

    fn sync_target(&mut self) -> Result<()> {
        self.qnet_tgt.copy_from(&self.qnet)?;
        debug!("Synchronized the target network at opt step {}", self.n_opts);
        Ok(())
    }

    fn replay_len(&self) -> usize {
        self.memory.len()
    }

    fn replay_capacity(&self) -> usize {
        self.memory.capacity()
    }

    fn epsilon(&self) -> f64 {
        self.explorer.epsilon(self.frame_count)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(path.join("qnet.safetensors"))?;
        self.qnet_tgt.save(path.join("qnet_tgt.safetensors"))?;
        info!("Saved the agent in {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path.join("qnet.safetensors"))?;
        self.qnet_tgt.load(path.join("qnet_tgt.safetensors"))?;
        Ok(())
    }
}
