//! Fixed-capacity replay memory with uniform sampling.
mod base;
mod config;
mod transition;
pub use base::ReplayMemory;
pub use config::ReplayMemoryConfig;
pub use transition::Transition;
