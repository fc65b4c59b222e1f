use super::Record;

/// Stores records, then writes values aggregated from them.
pub trait AggregateRecorder {
    /// Store the record.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records.
    ///
    /// `step` is the number of optimization steps at the time of flushing.
    fn flush(&mut self, step: i64);
}
