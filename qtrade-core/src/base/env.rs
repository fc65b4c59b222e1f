//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents a stateful simulation the agent interacts with.
///
/// The environment owns its clock. A freshly built environment sits at the beginning
/// of an episode, so [`Env::state`] is valid right after [`Env::build`].
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Returns the current observation.
    fn state(&self) -> Self::Obs;

    /// Performs an environment step.
    ///
    /// The returned [`Record`] holds environment specific values for logging.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Starts a new episode and returns its initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Starts a new episode with a given index.
    ///
    /// The index is used in an arbitrary way, for example as a random seed. It is
    /// called by [`DefaultEvaluator`](crate::DefaultEvaluator).
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs>;
}
