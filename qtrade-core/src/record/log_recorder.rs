use super::{AggregateRecorder, Record, RecordStorage, RecordValue};
use log::info;

/// Writes records through the [`log`] facade.
///
/// Stored records are aggregated with [`RecordStorage`] and written on flush.
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Constructs the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn format(record: &Record) -> String {
        let mut items = record
            .iter()
            .map(|(k, v)| match v {
                RecordValue::Scalar(v) => format!("{} = {:.4}", k, v),
                RecordValue::DateTime(t) => format!("{} = {}", k, t.to_rfc3339()),
            })
            .collect::<Vec<_>>();
        items.sort();
        items.join(", ")
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();
        if !record.is_empty() {
            info!("opt_steps = {}: {}", step, Self::format(&record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_format() {
        let mut record = Record::from_scalar("loss", 0.5);
        record.insert("eval_reward", RecordValue::Scalar(12.0));
        assert_eq!(LogRecorder::format(&record), "eval_reward = 12.0000, loss = 0.5000");

        let t = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let record = Record::from_slice(&[("datetime", RecordValue::DateTime(t))]);
        assert!(LogRecorder::format(&record).starts_with("datetime = 2024-01-02T03:04:05"));
    }
}
