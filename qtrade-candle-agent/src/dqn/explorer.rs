//! Exploration strategy of DQN.
use anyhow::Result;
use qtrade_core::error::QtradeError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer for DQN.
///
/// Epsilon decays linearly from `eps_start` at frame 0 to `eps_final` at frame
/// `final_step`, and stays at `eps_final` afterwards.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Exploration rate at frame 0.
    pub eps_start: f64,

    /// Exploration rate from frame `final_step` on.
    pub eps_final: f64,

    /// Number of frames over which epsilon decays.
    pub final_step: usize,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_final: 0.02,
            final_step: 100_000,
        }
    }
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs epsilon-greedy explorer decaying over `final_step` frames.
    pub fn with_final_step(final_step: usize) -> Self {
        Self {
            final_step,
            ..Self::default()
        }
    }

    /// Returns the exploration rate at the given frame.
    pub fn epsilon(&self, frame: usize) -> f64 {
        if frame >= self.final_step {
            return self.eps_final;
        }
        let r = frame as f64 / self.final_step as f64;
        self.eps_start + (self.eps_final - self.eps_start) * r
    }

    /// Returns a uniformly random action index with probability `epsilon(frame)`,
    /// and `None` if the greedy action should be taken.
    pub fn explore(&self, frame: usize, n_actions: usize, rng: &mut impl Rng) -> Option<usize> {
        if rng.gen::<f64>() < self.epsilon(frame) {
            Some(rng.gen_range(0..n_actions))
        } else {
            None
        }
    }

    /// Checks that the exploration rates lie in `[0, 1]` and `final_step` is positive.
    pub fn check(&self) -> Result<()> {
        for (name, eps) in [("eps_start", self.eps_start), ("eps_final", self.eps_final)] {
            if !(0.0..=1.0).contains(&eps) {
                return Err(QtradeError::Configuration(format!(
                    "{} must be in [0, 1], got {}",
                    name, eps
                ))
                .into());
            }
        }
        if self.final_step == 0 {
            return Err(
                QtradeError::Configuration("final_step of epsilon-greedy must be positive".into())
                    .into(),
            );
        }
        Ok(())
    }

    /// Set the epsilon value at the final step.
    pub fn eps_final(self, v: f64) -> Self {
        let mut s = self;
        s.eps_final = v;
        s
    }

    /// Set the epsilon value at the start.
    pub fn eps_start(self, v: f64) -> Self {
        let mut s = self;
        s.eps_start = v;
        s
    }

    /// Set the number of frames over which epsilon decays.
    pub fn final_step(self, v: usize) -> Self {
        let mut s = self;
        s.final_step = v;
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn explorer() -> EpsilonGreedy {
        EpsilonGreedy::new()
            .eps_start(1.0)
            .eps_final(0.1)
            .final_step(10)
    }

    #[test]
    fn test_schedule() {
        let explorer = explorer();
        assert_eq!(explorer.epsilon(0), 1.0);
        assert!((explorer.epsilon(5) - 0.55).abs() < 1e-12);
        assert_eq!(explorer.epsilon(10), 0.1);
        assert_eq!(explorer.epsilon(11), 0.1);
        assert_eq!(explorer.epsilon(1_000_000), 0.1);
    }

    #[test]
    fn test_schedule_monotonic() {
        let explorer = explorer();
        let eps: Vec<f64> = (0..=10).map(|t| explorer.epsilon(t)).collect();
        assert!(eps.windows(2).all(|w| w[1] < w[0]));

        let explorer = explorer.eps_start(0.1);
        assert!((0..20).all(|t| explorer.epsilon(t) == 0.1));
    }

    #[test]
    fn test_explore() {
        let mut rng = SmallRng::seed_from_u64(0);

        let always = EpsilonGreedy::new().eps_start(1.0).eps_final(1.0);
        for _ in 0..100 {
            let a = always.explore(0, 3, &mut rng);
            assert!(matches!(a, Some(0..=2)));
        }

        let never = EpsilonGreedy::new().eps_start(0.0).eps_final(0.0);
        assert!((0..100).all(|t| never.explore(t, 3, &mut rng).is_none()));
    }

    #[test]
    fn test_check() {
        assert!(explorer().check().is_ok());
        assert!(explorer().eps_start(1.5).check().is_err());
        assert!(explorer().eps_final(-0.1).check().is_err());
        assert!(explorer().final_step(0).check().is_err());
    }
}
