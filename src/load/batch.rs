use crate::load::traits::BatchSink;
use crate::transform::records::Record;
use log::{error, info, warn};
use std::ops::AddAssign;

/// Counters of one [`BatchLoader::load`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub submitted: usize,
    pub committed: usize,
    pub succeeded_batches: usize,
    pub failed_batches: usize,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed_batches == 0
    }
}

impl AddAssign for BatchReport {
    fn add_assign(&mut self, other: Self) {
        self.submitted += other.submitted;
        self.committed += other.committed;
        self.succeeded_batches += other.succeeded_batches;
        self.failed_batches += other.failed_batches;
    }
}

/// Splits records into fixed-size chunks and hands each one to a [`BatchSink`].
///
/// A failing chunk is logged and counted; the remaining chunks are still submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLoader {
    batch_size: usize,
}

impl BatchLoader {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn load<S: BatchSink + ?Sized>(
        &self,
        sink: &S,
        target: &str,
        records: &[Record],
    ) -> BatchReport {
        let mut report = BatchReport::default();
        if records.is_empty() {
            warn!("No records to insert into '{target}'.");
            return report;
        }

        let total_batches = records.len().div_ceil(self.batch_size);
        for (idx, chunk) in records.chunks(self.batch_size).enumerate() {
            report.submitted += chunk.len();
            match sink.submit(target, chunk) {
                Ok(stored) => {
                    report.committed += stored;
                    report.succeeded_batches += 1;
                    info!(
                        "Inserted {stored} records into '{target}' (batch {}/{total_batches}).",
                        idx + 1
                    );
                }
                Err(err) => {
                    report.committed += err.stored();
                    report.failed_batches += 1;
                    error!(
                        "Batch {}/{total_batches} into '{target}' failed: {err}",
                        idx + 1
                    );
                }
            }
        }

        info!(
            "Finished '{target}': {} of {} records committed, {} failed batches.",
            report.committed, report.submitted, report.failed_batches
        );
        report
    }
}
