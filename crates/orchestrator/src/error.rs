//! Batch error types.

use common::ReviewId;
use downstream::DownstreamError;
use thiserror::Error;

/// A submission the review service refused, after retries.
#[derive(Debug)]
pub struct Rejection {
    /// Position of the submission in the caller's list.
    pub index: usize,
    pub error: DownstreamError,
}

/// An accepted review whose compensating delete failed. It still exists
/// downstream and has to be reconciled by hand.
#[derive(Debug)]
pub struct OrphanedReview {
    /// Position of the submission in the caller's list.
    pub index: usize,
    pub review_id: ReviewId,
    pub error: DownstreamError,
}

/// A batch that could not be committed.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Some submissions were rejected; every accepted review was deleted again.
    #[error(
        "It was not possible to post the reviews: {} of {total} rejected, {compensated} rolled back",
        .rejections.len()
    )]
    BatchFailed {
        total: usize,
        rejections: Vec<Rejection>,
        compensated: usize,
    },

    /// Some submissions were rejected and at least one rollback delete failed.
    #[error(
        "It was not possible to post the reviews: {} of {total} rejected, {} accepted reviews could not be rolled back",
        .rejections.len(),
        .orphaned.len()
    )]
    CompensationIncomplete {
        total: usize,
        rejections: Vec<Rejection>,
        compensated: usize,
        orphaned: Vec<OrphanedReview>,
    },
}

impl BatchError {
    /// Number of submissions in the failed batch.
    pub fn total(&self) -> usize {
        match self {
            BatchError::BatchFailed { total, .. }
            | BatchError::CompensationIncomplete { total, .. } => *total,
        }
    }

    /// The rejected submissions, in input order.
    pub fn rejections(&self) -> &[Rejection] {
        match self {
            BatchError::BatchFailed { rejections, .. }
            | BatchError::CompensationIncomplete { rejections, .. } => rejections,
        }
    }

    /// Number of accepted reviews that were deleted again.
    pub fn compensated(&self) -> usize {
        match self {
            BatchError::BatchFailed { compensated, .. }
            | BatchError::CompensationIncomplete { compensated, .. } => *compensated,
        }
    }

    /// Reviews left behind downstream, in input order. Empty unless the
    /// compensation was incomplete.
    pub fn orphaned(&self) -> &[OrphanedReview] {
        match self {
            BatchError::BatchFailed { .. } => &[],
            BatchError::CompensationIncomplete { orphaned, .. } => orphaned,
        }
    }

    pub fn is_compensation_incomplete(&self) -> bool {
        matches!(self, BatchError::CompensationIncomplete { .. })
    }

    /// Returns true if every rejection was a client error, i.e. retrying
    /// the same batch cannot succeed.
    pub fn rejected_by_client_errors_only(&self) -> bool {
        self.rejections().iter().all(|r| r.error.is_client_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use downstream::{Service, classify};

    fn rejection(index: usize, status: u16) -> Rejection {
        Rejection {
            index,
            error: classify(Service::Reviews, status, "no"),
        }
    }

    #[test]
    fn test_batch_failed_message() {
        let err = BatchError::BatchFailed {
            total: 3,
            rejections: vec![rejection(1, 400)],
            compensated: 2,
        };
        assert_eq!(
            err.to_string(),
            "It was not possible to post the reviews: 1 of 3 rejected, 2 rolled back"
        );
        assert!(err.orphaned().is_empty());
        assert!(!err.is_compensation_incomplete());
    }

    #[test]
    fn test_compensation_incomplete_message() {
        let err = BatchError::CompensationIncomplete {
            total: 3,
            rejections: vec![rejection(0, 400)],
            compensated: 1,
            orphaned: vec![OrphanedReview {
                index: 2,
                review_id: ReviewId::new("r2"),
                error: classify(Service::Reviews, 500, "down"),
            }],
        };
        assert_eq!(
            err.to_string(),
            "It was not possible to post the reviews: 1 of 3 rejected, 1 accepted reviews could not be rolled back"
        );
        assert!(err.is_compensation_incomplete());
        assert_eq!(err.orphaned()[0].review_id, ReviewId::new("r2"));
        assert_eq!(err.total(), 3);
        assert_eq!(err.compensated(), 1);
    }

    #[test]
    fn test_rejected_by_client_errors_only() {
        let client_only = BatchError::BatchFailed {
            total: 2,
            rejections: vec![rejection(0, 400), rejection(1, 422)],
            compensated: 0,
        };
        assert!(client_only.rejected_by_client_errors_only());

        let mixed = BatchError::BatchFailed {
            total: 2,
            rejections: vec![rejection(0, 400), rejection(1, 503)],
            compensated: 0,
        };
        assert!(!mixed.rejected_by_client_errors_only());
    }
}
