//! Environment step.
use super::Env;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// The outcome of applying an action `a_t` to an environment.
///
/// It carries the next observation `o_t+1`, the reward `r_t`, and whether the
/// episode ended with this step.
pub struct Step<E: Env> {
    /// Next observation. `None` when the episode has ended.
    pub obs: Option<E::Obs>,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode ended with this step.
    pub is_done: bool,

    /// Flag denoting if the action did something other than holding.
    pub is_nontrivial: bool,

    /// Information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: Option<E::Obs>,
        reward: f32,
        is_done: bool,
        is_nontrivial: bool,
        info: E::Info,
    ) -> Self {
        Step {
            obs,
            reward,
            is_done,
            is_nontrivial,
            info,
        }
    }
}
