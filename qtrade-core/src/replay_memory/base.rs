use super::ReplayMemoryConfig;
use crate::{error::QtradeError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A fixed-capacity circular buffer of transitions.
///
/// Storage is allocated once at construction. Until the memory is full, pushed items
/// are appended; afterwards each push overwrites the oldest item, at index
/// `i = n_pushed % capacity`.
///
/// Batches are drawn uniformly at random *with replacement* among the items
/// currently held, so a batch may be larger than the number of distinct items.
/// Sampling never modifies the stored items.
///
/// Pushing and sampling update `i` and `size` without synchronization; callers
/// sharing a memory between threads must serialize access.
pub struct ReplayMemory<T> {
    /// Maximum number of items that can be stored.
    capacity: usize,

    /// Next insertion index.
    i: usize,

    /// Current number of stored items.
    size: usize,

    buf: Vec<T>,

    rng: StdRng,
}

impl<T: Clone> ReplayMemory<T> {
    /// Returns the maximum number of items the memory holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Draws `size` indices of valid slots, with replacement.
    fn sample_indices(&mut self, size: usize) -> Vec<usize> {
        let n = self.size;
        (0..size).map(|_| self.rng.gen_range(0..n)).collect()
    }

    /// Samples `size` items uniformly at random with replacement.
    ///
    /// # Errors
    ///
    /// * [`QtradeError::Configuration`] if `size == 0`.
    /// * [`QtradeError::EmptyBuffer`] if the memory holds no items.
    pub fn sample(&mut self, size: usize) -> Result<Vec<T>> {
        if size == 0 {
            return Err(QtradeError::Configuration("batch size must be positive".into()).into());
        }
        if self.size == 0 {
            return Err(QtradeError::EmptyBuffer.into());
        }

        Ok(self
            .sample_indices(size)
            .into_iter()
            .map(|ix| self.buf[ix].clone())
            .collect())
    }
}

impl<T: Clone> ExperienceBufferBase for ReplayMemory<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.size
    }

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        if self.buf.len() < self.capacity {
            self.buf.push(tr);
        } else {
            self.buf[self.i] = tr;
        }

        self.i = (self.i + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);

        Ok(())
    }
}

impl<T: Clone> ReplayBufferBase for ReplayMemory<T> {
    type Config = ReplayMemoryConfig;
    type Batch = Vec<T>;

    /// Builds an empty memory.
    ///
    /// Fails with [`QtradeError::Configuration`] if the capacity is zero.
    fn build(config: &Self::Config) -> Result<Self> {
        if config.capacity == 0 {
            return Err(
                QtradeError::Configuration("replay memory capacity must be positive".into())
                    .into(),
            );
        }

        Ok(Self {
            capacity: config.capacity,
            i: 0,
            size: 0,
            buf: Vec::with_capacity(config.capacity),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        self.sample(size)
    }
}
