use super::{AggregateRecorder, Record, RecordStorage, RecordValue};

/// Keeps records in memory.
///
/// Stored records are aggregated on [`AggregateRecorder::flush`] and the
/// aggregate, tagged with `opt_steps`, is kept. Useful for inspecting a training
/// run in tests.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    storage: RecordStorage,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no record has been kept.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let mut record = self.storage.aggregate();
        if !record.is_empty() {
            record.insert("opt_steps", RecordValue::Scalar(step as f32));
            self.buf.push(record);
        }
    }
}
