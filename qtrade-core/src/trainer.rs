//! Train [`Agent`].
mod config;
use crate::{
    error::QtradeError,
    record::{
        AggregateRecorder, Record,
        RecordValue::{DateTime, Scalar},
    },
    Agent, Env, Evaluator,
};
use anyhow::Result;
use chrono::Local;
pub use config::TrainerConfig;
use log::{info, warn};
use std::{
    path::Path,
    time::{Duration, SystemTime},
};

/// Manages the training loop.
///
/// # Training loop
///
/// 0. Given an environment, an agent implementing [`Agent`], a recorder and an
///    evaluator. An optimizer is built with [`Agent::build_optimizer`].
///    Counters `env_steps = 0` and `opt_steps = 0`.
/// 1. The agent takes a step in the environment with [`Agent::play_step`], which
///    pushes a transition into its replay memory and resets the environment when
///    the episode ends. `env_steps += 1`.
/// 2. If the replay memory holds fewer than `min_replay_len` transitions, or
///    `env_steps % opt_interval != 0`, go back to 1.
/// 3. A training step is done with [`Agent::train_on_replay_batch`] on a batch of
///    `batch_size` transitions. `opt_steps += 1`.
///     1. If `opt_steps % sync_interval == 0`, the target network is synchronized
///        with [`Agent::sync_target`].
///     2. If `opt_steps % eval_interval == 0`, the agent is evaluated. The model with
///        the best `eval_reward` so far is saved in `(model_dir)/best`. If no
///        evaluation has been done when `opt_steps == max_opts`, the agent is
///        evaluated once there, so `(model_dir)/best` always exists after training.
///     3. If `opt_steps % save_interval == 0`, the model is saved in
///        `(model_dir)/(opt_steps)`.
///     4. If `opt_steps == max_opts`, training finishes.
/// 4. Back to 1.
///
/// ```text
///            Env::Act
///   Agent ------------> Env
///     ^  <------------   |
///     |   Step<E: Env>   |
///     |                  |
///     +-- ReplayMemory <-+ (Transition pushed in Agent::play_step)
/// ```
pub struct Trainer {
    max_opts: usize,
    opt_interval: usize,
    sync_interval: usize,
    eval_interval: usize,
    flush_record_interval: usize,
    record_compute_cost_interval: usize,
    save_interval: usize,
    min_replay_len: usize,
    batch_size: usize,
    discount_factor: f64,
    model_dir: Option<String>,

    /// Optimization steps for computing optimization steps per second.
    opt_steps_for_ops: usize,

    /// Time spent in optimization steps.
    timer_for_ops: Duration,

    /// Environment steps for computing frames per second.
    env_steps_for_fps: usize,

    /// Time spent in environment steps.
    timer_for_fps: Duration,
}

fn positive(name: &str, v: usize) -> Result<()> {
    if v == 0 {
        return Err(QtradeError::Configuration(format!("{} must be positive", name)).into());
    }
    Ok(())
}

fn per_sec(steps: usize, elapsed: Duration) -> f32 {
    let secs = elapsed.as_secs_f32();
    if secs > 0.0 {
        steps as f32 / secs
    } else {
        0.0
    }
}

impl Trainer {
    /// Constructs a trainer.
    ///
    /// Fails with [`QtradeError::Configuration`] if an interval, `max_opts` or
    /// `batch_size` is zero, or if `discount_factor` is out of `[0, 1]`.
    pub fn build(config: TrainerConfig) -> Result<Self> {
        positive("max_opts", config.max_opts)?;
        positive("opt_interval", config.opt_interval)?;
        positive("sync_interval", config.sync_interval)?;
        positive("eval_interval", config.eval_interval)?;
        positive("flush_record_interval", config.flush_record_interval)?;
        positive("record_compute_cost_interval", config.record_compute_cost_interval)?;
        positive("save_interval", config.save_interval)?;
        positive("batch_size", config.batch_size)?;
        if !(0.0..=1.0).contains(&config.discount_factor) {
            return Err(QtradeError::Configuration(format!(
                "discount_factor must be in [0, 1], got {}",
                config.discount_factor
            ))
            .into());
        }

        Ok(Self {
            max_opts: config.max_opts,
            opt_interval: config.opt_interval,
            sync_interval: config.sync_interval,
            eval_interval: config.eval_interval,
            flush_record_interval: config.flush_record_interval,
            record_compute_cost_interval: config.record_compute_cost_interval,
            save_interval: config.save_interval,
            min_replay_len: config.min_replay_len,
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            model_dir: config.model_dir,
            opt_steps_for_ops: 0,
            timer_for_ops: Duration::new(0, 0),
            env_steps_for_fps: 0,
            timer_for_fps: Duration::new(0, 0),
        })
    }

    fn save_model<E: Env, A: Agent<E>>(agent: &A, model_dir: &Path) {
        match agent.save_params(model_dir) {
            Ok(()) => info!("Saved the model in {:?}", model_dir),
            Err(e) => warn!("Failed to save the model in {:?}: {}", model_dir, e),
        }
    }

    /// Returns optimization steps per second, then resets the internal counter.
    ///
    /// Returns 0 if no time has been measured.
    fn opt_steps_per_sec(&mut self) -> f32 {
        let osps = per_sec(self.opt_steps_for_ops, self.timer_for_ops);
        self.opt_steps_for_ops = 0;
        self.timer_for_ops = Duration::new(0, 0);
        osps
    }

    /// Returns environment steps per second, then resets the internal counter.
    fn fps(&mut self) -> f32 {
        let fps = per_sec(self.env_steps_for_fps, self.timer_for_fps);
        self.env_steps_for_fps = 0;
        self.timer_for_fps = Duration::new(0, 0);
        fps
    }

    /// Performs a training step.
    ///
    /// First, the agent takes an environment step. Then, if the replay memory is
    /// filled enough and the number of environment steps reaches the optimization
    /// interval, an optimization step is done, followed by a target network
    /// synchronization on its own cadence.
    ///
    /// The second return value is `true` if an optimization step is done.
    pub fn train_step<E, A>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        opt: &mut A::Optimizer,
        env_steps: &mut usize,
        opt_steps: &mut usize,
    ) -> Result<(Record, bool)>
    where
        E: Env,
        A: Agent<E>,
    {
        let timer = SystemTime::now();
        let step = agent.play_step(env)?;
        self.timer_for_fps += timer.elapsed()?;
        self.env_steps_for_fps += 1;
        *env_steps += 1;

        let mut record = Record::empty();
        if step.is_done {
            record.insert("episode_return", Scalar(step.cumulative_reward));
            record.insert("trades", Scalar(step.trades as f32));
        }

        if agent.replay_len() < self.min_replay_len || *env_steps % self.opt_interval != 0 {
            return Ok((record, false));
        }

        let timer = SystemTime::now();
        let record_agent = agent.opt_with_record(self.batch_size, self.discount_factor, opt)?;
        *opt_steps += 1;
        self.timer_for_ops += timer.elapsed()?;
        self.opt_steps_for_ops += 1;
        record.merge_inplace(record_agent);
        record.insert("epsilon", Scalar(agent.epsilon() as f32));

        if *opt_steps % self.sync_interval == 0 {
            agent.sync_target()?;
        }

        Ok((record, true))
    }

    /// Trains the agent.
    ///
    /// Fails with [`QtradeError::Configuration`] if `min_replay_len` exceeds the
    /// capacity of the agent's replay memory, as training would never start.
    pub fn train<E, A, R, D>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        recorder: &mut R,
        evaluator: &mut D,
    ) -> Result<()>
    where
        E: Env,
        A: Agent<E>,
        R: AggregateRecorder + ?Sized,
        D: Evaluator<E>,
    {
        if self.min_replay_len > agent.replay_capacity() {
            return Err(QtradeError::Configuration(format!(
                "min_replay_len ({}) exceeds the replay memory capacity ({})",
                self.min_replay_len,
                agent.replay_capacity()
            ))
            .into());
        }

        let mut opt = agent.build_optimizer()?;
        let mut max_eval_reward = f32::MIN;
        let mut evaluated = false;
        let mut env_steps: usize = 0;
        let mut opt_steps: usize = 0;

        loop {
            let (mut record, is_opt) =
                self.train_step(env, agent, &mut opt, &mut env_steps, &mut opt_steps)?;

            if is_opt {
                if opt_steps % self.record_compute_cost_interval == 0 {
                    record.insert("fps", Scalar(self.fps()));
                    record.insert("opt_steps_per_sec", Scalar(self.opt_steps_per_sec()));
                    record.insert("datetime", DateTime(Local::now()));
                }

                if opt_steps % self.eval_interval == 0
                    || (opt_steps == self.max_opts && !evaluated)
                {
                    info!("Starts evaluation of the trained model");
                    let eval_record = evaluator.evaluate(agent)?;
                    let eval_reward = eval_record.get_scalar("eval_reward")?;
                    record.merge_inplace(eval_record);

                    if !evaluated || eval_reward > max_eval_reward {
                        evaluated = true;
                        max_eval_reward = eval_reward;
                        if let Some(model_dir) = &self.model_dir {
                            Self::save_model::<E, A>(agent, &Path::new(model_dir).join("best"));
                        }
                    }
                }

                if opt_steps % self.save_interval == 0 {
                    if let Some(model_dir) = &self.model_dir {
                        let path = Path::new(model_dir).join(opt_steps.to_string());
                        Self::save_model::<E, A>(agent, &path);
                    }
                }
            }

            if !record.is_empty() {
                recorder.store(record);
            }

            if is_opt && opt_steps % self.flush_record_interval == 0 {
                recorder.flush(opt_steps as _);
            }

            if opt_steps == self.max_opts {
                break;
            }
        }

        info!(
            "Training finished after {} environment steps and {} optimization steps",
            env_steps, opt_steps
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::{BufferedRecorder, NullRecorder},
        Act, DefaultEvaluator, ExperienceBufferBase, Obs, PlayStep,
        Policy, ReplayBufferBase, ReplayMemory, ReplayMemoryConfig, Step, Transition,
    };
    use std::{cell::RefCell, path::PathBuf};

    #[derive(Clone, Debug, PartialEq)]
    struct Tick(usize);

    impl Obs for Tick {}

    #[derive(Clone, Debug, PartialEq)]
    struct Move(usize);

    impl Act for Move {
        fn n_actions() -> usize {
            2
        }

        fn from_index(ix: usize) -> Self {
            Move(ix)
        }

        fn index(&self) -> usize {
            self.0
        }
    }

    /// Episodes of `len` steps; the reward of a step is the index of the action.
    struct TickEnv {
        t: usize,
        len: usize,
    }

    impl Env for TickEnv {
        type Config = usize;
        type Obs = Tick;
        type Act = Move;
        type Info = ();

        fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self { t: 0, len: *config })
        }

        fn state(&self) -> Tick {
            Tick(self.t)
        }

        fn step(&mut self, a: &Move) -> Result<(Step<Self>, Record)> {
            self.t += 1;
            let is_done = self.t == self.len;
            let obs = if is_done { None } else { Some(Tick(self.t)) };
            let step = Step::new(obs, a.0 as f32, is_done, a.0 == 1, ());
            Ok((step, Record::from_scalar("t", self.t as f32)))
        }

        fn reset(&mut self) -> Result<Tick> {
            self.t = 0;
            Ok(Tick(0))
        }

        fn reset_with_index(&mut self, _ix: usize) -> Result<Tick> {
            self.reset()
        }
    }

    struct CountingAgent {
        memory: ReplayMemory<Transition<Tick, Move>>,
        episode_reward: f32,
        episode_trades: usize,
        n_syncs: usize,
        n_opts: usize,
        opt_steps_at_sync: Vec<usize>,
        saved: RefCell<Vec<PathBuf>>,
    }

    impl CountingAgent {
        fn new(capacity: usize) -> Self {
            let config = ReplayMemoryConfig::default().capacity(capacity);
            Self {
                memory: ReplayMemory::build(&config).unwrap(),
                episode_reward: 0.0,
                episode_trades: 0,
                n_syncs: 0,
                n_opts: 0,
                opt_steps_at_sync: vec![],
                saved: RefCell::new(vec![]),
            }
        }
    }

    impl Policy<TickEnv> for CountingAgent {
        fn sample(&mut self, _obs: &Tick) -> Result<Move> {
            Ok(Move(1))
        }
    }

    impl Agent<TickEnv> for CountingAgent {
        type Optimizer = ();

        fn play_step(&mut self, env: &mut TickEnv) -> Result<PlayStep<Move>> {
            let state = env.state();
            let act = Move(1);
            let (step, _) = env.step(&act)?;
            self.memory.push(Transition::new(
                state,
                act.clone(),
                step.reward,
                step.is_done,
                step.obs.clone(),
            ))?;
            self.episode_reward += step.reward;
            self.episode_trades += step.is_nontrivial as usize;
            let out = PlayStep {
                act,
                cumulative_reward: self.episode_reward,
                is_done: step.is_done,
                trades: self.episode_trades,
            };
            if step.is_done {
                self.episode_reward = 0.0;
                self.episode_trades = 0;
                env.reset()?;
            }
            Ok(out)
        }

        fn build_optimizer(&self) -> Result<()> {
            Ok(())
        }

        fn train_on_replay_batch(&mut self, batch_size: usize, _: f64, _: &mut ()) -> Result<f32> {
            let batch = self.memory.batch(batch_size)?;
            self.n_opts += 1;
            Ok(batch.len() as f32)
        }

        fn sync_target(&mut self) -> Result<()> {
            self.n_syncs += 1;
            self.opt_steps_at_sync.push(self.n_opts);
            Ok(())
        }

        fn replay_len(&self) -> usize {
            self.memory.len()
        }

        fn replay_capacity(&self) -> usize {
            self.memory.capacity()
        }

        fn epsilon(&self) -> f64 {
            0.0
        }

        fn save_params(&self, path: &Path) -> Result<()> {
            self.saved.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn load_params(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn config() -> TrainerConfig {
        TrainerConfig::default()
            .max_opts(20)
            .sync_interval(5)
            .eval_interval(10)
            .flush_record_interval(10)
            .min_replay_len(8)
            .batch_size(4)
    }

    #[test]
    fn test_train() -> Result<()> {
        let mut trainer = Trainer::build(config())?;
        let mut env = TickEnv::build(&3, 0)?;
        let mut agent = CountingAgent::new(100);
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = DefaultEvaluator::<TickEnv>::new(&3, 0, 2)?;

        trainer.train(&mut env, &mut agent, &mut recorder, &mut evaluator)?;

        assert_eq!(agent.n_opts, 20);
        assert_eq!(agent.opt_steps_at_sync, vec![5, 10, 15, 20]);
        // training starts once 8 transitions are stored
        assert_eq!(agent.memory.len(), 8 + 20 - 1);
        assert_eq!(recorder.len(), 2);

        let record = recorder.iter().next().unwrap();
        assert_eq!(record.get_scalar("eval_reward")?, 3.0);
        assert_eq!(record.get_scalar("eval_t")?, 3.0);
        assert_eq!(record.get_scalar("loss_mean")?, 4.0);
        assert_eq!(record.get_scalar("episode_return_max")?, 3.0);
        Ok(())
    }

    #[test]
    fn test_evaluate_at_end_without_eval_interval() -> Result<()> {
        let config = config()
            .max_opts(5)
            .eval_interval(1000)
            .flush_record_interval(5)
            .model_dir("model");
        let mut trainer = Trainer::build(config)?;
        let mut env = TickEnv::build(&3, 0)?;
        let mut agent = CountingAgent::new(100);
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = DefaultEvaluator::<TickEnv>::new(&3, 0, 2)?;

        trainer.train(&mut env, &mut agent, &mut recorder, &mut evaluator)?;

        assert_eq!(agent.n_opts, 5);
        assert_eq!(*agent.saved.borrow(), vec![Path::new("model").join("best")]);
        let record = recorder.iter().next().unwrap();
        assert_eq!(record.get_scalar("eval_reward")?, 3.0);
        Ok(())
    }

    #[test]
    fn test_per_sec_zero_duration() {
        assert_eq!(per_sec(10, Duration::new(0, 0)), 0.0);
        assert_eq!(per_sec(0, Duration::new(0, 0)), 0.0);
        assert_eq!(per_sec(10, Duration::from_secs(2)), 5.0);
    }

    #[test]
    fn test_train_step_before_warmup() -> Result<()> {
        let mut trainer = Trainer::build(config())?;
        let mut env = TickEnv::build(&3, 0)?;
        let mut agent = CountingAgent::new(100);
        let (mut env_steps, mut opt_steps) = (0, 0);

        for _ in 0..7 {
            let (_, is_opt) =
                trainer.train_step(&mut env, &mut agent, &mut (), &mut env_steps, &mut opt_steps)?;
            assert!(!is_opt);
        }
        let (record, is_opt) =
            trainer.train_step(&mut env, &mut agent, &mut (), &mut env_steps, &mut opt_steps)?;
        assert!(is_opt);
        assert_eq!(opt_steps, 1);
        assert_eq!(record.get_scalar("loss")?, 4.0);
        Ok(())
    }

    #[test]
    fn test_warmup_exceeds_capacity() -> Result<()> {
        let mut trainer = Trainer::build(config())?;
        let mut env = TickEnv::build(&3, 0)?;
        let mut agent = CountingAgent::new(4);
        let mut recorder = NullRecorder::default();
        let mut evaluator = DefaultEvaluator::<TickEnv>::new(&3, 0, 1)?;

        let err = trainer
            .train(&mut env, &mut agent, &mut recorder, &mut evaluator)
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<QtradeError>(),
            Some(QtradeError::Configuration(_))
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        assert!(Trainer::build(config().batch_size(0)).is_err());
        assert!(Trainer::build(config().sync_interval(0)).is_err());
        assert!(Trainer::build(config().discount_factor(1.5)).is_err());
        assert!(Trainer::build(TrainerConfig::default()).is_err());
    }
}
