//! Batch accumulator trait and flush helper

use arrow::array::RecordBatch;
use arrow::error::ArrowError;

use crate::sink::TableSink;

/// Default batch size for flushing accumulated rows into a `RecordBatch`.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Accumulator trait for batch processing of flattened rows into Arrow `RecordBatch`.
pub trait Accumulator {
    type Row;

    /// Push a row into the accumulator
    fn push(&mut self, row: Self::Row);

    /// Number of rows currently buffered
    fn len(&self) -> usize;

    /// Check if buffer is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if buffer is full and should be flushed
    fn is_full(&self) -> bool {
        self.len() >= DEFAULT_BATCH_SIZE
    }

    /// Take buffered rows as a RecordBatch, resetting internal state
    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError>;
}

/// Write buffered rows to `sink` once the accumulator is full.
///
/// With `force`, any non-empty buffer is written (end of input).
pub fn flush_into<A: Accumulator + ?Sized>(
    acc: &mut A,
    sink: &mut TableSink,
    force: bool,
) -> std::io::Result<()> {
    if acc.is_full() || (force && !acc.is_empty()) {
        let batch = acc.take_batch().map_err(std::io::Error::other)?;
        sink.write_batch(&batch)?;
    }
    Ok(())
}
