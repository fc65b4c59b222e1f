//! Records of values logged during training and evaluation.
//!
//! A [`Record`] is a set of key-value pairs. Records are produced by the agent,
//! the environment and the [`Trainer`](crate::Trainer), and consumed by a
//! [`AggregateRecorder`].
//!
//! ```rust
//! use qtrade_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("loss", 0.5);
//! record.insert("trades", RecordValue::Scalar(3.0));
//! assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::AggregateRecorder;
pub use storage::RecordStorage;
