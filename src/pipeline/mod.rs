//! The two load runs. Every loader is independent: a failure is logged and
//! recorded, then the run moves on.

pub mod document;
pub use document::DocumentPipeline;
pub mod graph;
pub use graph::GraphPipeline;

use crate::error::PipelineError;
use crate::extract::traits::HasSource;
use crate::load::batch::BatchReport;
use crate::load::graph::EdgeReport;
use log::{error, info, warn};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum LoaderOutcome {
    Loaded(BatchReport),
    Edges(EdgeReport),
    /// The source file does not exist.
    Skipped(PathBuf),
}

impl LoaderOutcome {
    fn is_clean(&self) -> bool {
        match self {
            LoaderOutcome::Loaded(report) => report.is_clean(),
            LoaderOutcome::Edges(report) => report.failed_chunks == 0,
            LoaderOutcome::Skipped(_) => true,
        }
    }
}

/// What each loader of a run did, in execution order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(String, LoaderOutcome)>,
    pub failures: Vec<(String, PipelineError)>,
}

impl RunSummary {
    pub fn record(&mut self, loader: &str, result: Result<LoaderOutcome, PipelineError>) {
        match result {
            Ok(outcome) => {
                info!("Loader '{loader}' finished: {outcome:?}");
                self.outcomes.push((loader.to_string(), outcome));
            }
            Err(err) => {
                error!("Loader '{loader}' failed: {err}");
                self.failures.push((loader.to_string(), err));
            }
        }
    }

    pub fn outcome(&self, loader: &str) -> Option<&LoaderOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == loader)
            .map(|(_, outcome)| outcome)
    }

    pub fn failure(&self, loader: &str) -> Option<&PipelineError> {
        self.failures
            .iter()
            .find(|(name, _)| name == loader)
            .map(|(_, err)| err)
    }

    /// No loader failed and no batch was rejected.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.outcomes.iter().all(|(_, outcome)| outcome.is_clean())
    }
}

pub(crate) fn skip_missing(source: &impl HasSource) -> Option<LoaderOutcome> {
    if source.exists() {
        return None;
    }
    warn!("File {:?} not found, skipping.", source.source());
    Some(LoaderOutcome::Skipped(source.source().to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::error::ExtractionError;
    use rstest::rstest;

    #[rstest]
    fn test_summary_keeps_going_after_failure() {
        let mut summary = RunSummary::default();
        summary.record(
            "Tag",
            Err(ExtractionError::MissingHeader(PathBuf::from("Tag.csv")).into()),
        );
        summary.record("Vendor", Ok(LoaderOutcome::Loaded(BatchReport::default())));

        assert!(summary.failure("Tag").is_some());
        assert!(summary.outcome("Vendor").is_some());
        assert!(!summary.is_clean());
    }

    #[rstest]
    fn test_failed_batches_make_the_run_unclean() {
        let mut summary = RunSummary::default();
        summary.record(
            "Vendor",
            Ok(LoaderOutcome::Loaded(BatchReport {
                submitted: 2,
                committed: 1,
                succeeded_batches: 1,
                failed_batches: 1,
            })),
        );
        summary.record("Tag", Ok(LoaderOutcome::Skipped(PathBuf::from("Tag.csv"))));

        assert!(!summary.is_clean());
    }
}
