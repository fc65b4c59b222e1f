use super::Evaluator;
use crate::{
    error::QtradeError,
    record::{Record, RecordValue},
    Env, Policy,
};
use anyhow::Result;
use log::info;
use std::collections::HashMap;

/// Runs a fixed number of episodes and averages their returns.
///
/// Besides `eval_reward`, the mean return, the scalars recorded by the environment
/// at the last step of each episode are averaged and reported with the prefix
/// `eval_`. For example, a trading environment reporting `net_worth` yields
/// `eval_net_worth`.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    env: E,
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs an evaluator running `n_episodes` episodes in its own environment.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        if n_episodes == 0 {
            return Err(QtradeError::Configuration(
                "number of evaluation episodes must be positive".into(),
            )
            .into());
        }

        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<Record> {
        let mut r_total = 0f32;
        let mut terminal_values: HashMap<String, f32> = HashMap::new();

        for ix in 0..self.n_episodes {
            let mut obs = self.env.reset_with_index(ix)?;
            let mut r_episode = 0f32;

            loop {
                let act = policy.sample(&obs)?;
                let (step, record) = self.env.step(&act)?;
                r_episode += step.reward;

                if step.is_done {
                    for (k, v) in record.iter() {
                        if let RecordValue::Scalar(v) = v {
                            *terminal_values.entry(k.clone()).or_insert(0.0) += v;
                        }
                    }
                    break;
                }

                obs = match step.obs {
                    Some(obs) => obs,
                    None => self.env.state(),
                };
            }

            info!("Evaluation episode {}, return = {}", ix, r_episode);
            r_total += r_episode;
        }

        let n = self.n_episodes as f32;
        let mut record = Record::from_scalar("eval_reward", r_total / n);
        for (k, v) in terminal_values.into_iter() {
            record.insert(format!("eval_{}", k), RecordValue::Scalar(v / n));
        }

        Ok(record)
    }
}
