#![warn(missing_docs)]
//! Core of qtrade, a deep Q-learning trader.
//!
//! This crate is independent of any tensor backend. It defines the interfaces
//! between an environment ([`Env`]), the agent learning in it ([`Agent`]) and the
//! training loop driving both ([`Trainer`]), together with the replay memory
//! ([`ReplayMemory`]) and the record system used for logging metrics.
pub mod error;
pub mod record;

mod base;
pub use base::{
    Act, Agent, Encoder, Env, ExperienceBufferBase, Info, Obs, PlayStep, Policy,
    ReplayBufferBase, Step,
};

mod replay_memory;
pub use replay_memory::{ReplayMemory, ReplayMemoryConfig, Transition};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};
