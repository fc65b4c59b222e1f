//! Agent.
use super::{Env, Policy};
use crate::record::{Record, RecordValue};
use anyhow::Result;
use std::path::Path;

/// Summary of a single environment step taken by an [`Agent`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlayStep<A> {
    /// The action taken.
    pub act: A,

    /// Sum of the rewards in the current episode, including this step.
    pub cumulative_reward: f32,

    /// Flag denoting if the episode ended with this step.
    pub is_done: bool,

    /// Number of non-hold actions taken in the current episode, including this step.
    pub trades: usize,
}

/// Represents a trainable policy on an environment.
///
/// An agent owns its replay memory and its networks. The environment is owned by
/// the caller and lent to [`Agent::play_step`] for the duration of a step.
/// Methods are called sequentially by a driving loop, typically [`Trainer`].
///
/// [`Trainer`]: crate::Trainer
pub trait Agent<E: Env>: Policy<E> {
    /// Optimizer applying gradients to the parameters of the agent.
    type Optimizer;

    /// Takes an action in `env`, stores the transition and updates the episode
    /// statistics.
    ///
    /// When the episode ends, the episode statistics and `env` are reset after the
    /// returned [`PlayStep`] has been captured.
    fn play_step(&mut self, env: &mut E) -> Result<PlayStep<E::Act>>;

    /// Builds an optimizer over the trainable parameters of the agent.
    fn build_optimizer(&self) -> Result<Self::Optimizer>;

    /// Performs a training step on a batch sampled from the replay memory and
    /// returns the loss.
    ///
    /// `discount_factor` must lie in `[0, 1]`.
    fn train_on_replay_batch(
        &mut self,
        batch_size: usize,
        discount_factor: f64,
        opt: &mut Self::Optimizer,
    ) -> Result<f32>;

    /// Performs a training step and returns the loss in a [`Record`].
    fn opt_with_record(
        &mut self,
        batch_size: usize,
        discount_factor: f64,
        opt: &mut Self::Optimizer,
    ) -> Result<Record> {
        let loss = self.train_on_replay_batch(batch_size, discount_factor, opt)?;
        Ok(Record::from_slice(&[("loss", RecordValue::Scalar(loss))]))
    }

    /// Copies the parameters of the online network into the target network.
    fn sync_target(&mut self) -> Result<()>;

    /// Returns the number of transitions in the replay memory.
    fn replay_len(&self) -> usize;

    /// Returns the capacity of the replay memory.
    fn replay_capacity(&self) -> usize;

    /// Returns the exploration rate of the next step.
    fn epsilon(&self) -> f64;

    /// Save the parameters of the agent in the given directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
