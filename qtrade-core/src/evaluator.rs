//! Evaluate a [`Policy`].
use crate::{record::Record, Env, Policy};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluate a [`Policy`].
pub trait Evaluator<E: Env> {
    /// Runs the policy and returns the evaluation result.
    ///
    /// The returned record must contain `eval_reward`, used by
    /// [`Trainer`](crate::Trainer) to keep track of the best model.
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<Record>;
}
