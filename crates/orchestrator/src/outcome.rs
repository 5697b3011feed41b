//! Per-submission outcomes and the batch result.

use common::ReviewRecord;
use downstream::DownstreamError;

use crate::error::BatchError;

/// The result of submitting a whole batch: every record in input order,
/// or one consolidated failure.
pub type BatchResult = Result<Vec<ReviewRecord>, BatchError>;

/// What happened to one submission.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Accepted(ReviewRecord),
    Rejected(DownstreamError),
}

impl From<Result<ReviewRecord, DownstreamError>> for SubmissionOutcome {
    fn from(result: Result<ReviewRecord, DownstreamError>) -> Self {
        match result {
            Ok(record) => SubmissionOutcome::Accepted(record),
            Err(error) => SubmissionOutcome::Rejected(error),
        }
    }
}
