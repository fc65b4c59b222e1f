//! Core functionalities.
mod agent;
mod encoder;
mod env;
mod policy;
mod replay_buffer;
mod step;
pub use agent::{Agent, PlayStep};
pub use encoder::Encoder;
pub use env::Env;
pub use policy::Policy;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Observations are immutable once emitted by [`Env`]. They are stored in the
/// replay memory, thus cloned cheaply.
pub trait Obs: Clone + Debug {}

/// A discrete action.
///
/// Actions form a small closed set `{0, .., n_actions() - 1}`. The agent treats them
/// as opaque indices into this set while the environment gives them a meaning.
pub trait Act: Clone + Debug {
    /// The number of actions in the set.
    fn n_actions() -> usize;

    /// Constructs the action of the given index.
    ///
    /// `ix` must be smaller than [`Act::n_actions()`].
    fn from_index(ix: usize) -> Self;

    /// Returns the index of the action.
    fn index(&self) -> usize;
}
