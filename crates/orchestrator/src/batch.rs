//! Batch review submission with compensation.

use std::time::Instant;

use common::{ReviewId, ReviewRecord, ReviewSubmission};
use downstream::{DownstreamError, RetryPolicy, ReviewService};
use futures_util::StreamExt;
use futures_util::stream;

use crate::error::{BatchError, OrphanedReview, Rejection};
use crate::outcome::{BatchResult, SubmissionOutcome};
use crate::state::BatchPhase;

/// Submits batches of reviews as all-or-nothing units.
///
/// A batch runs in three phases:
/// 1. every submission is created concurrently, at most `max_concurrency`
///    at a time, each through the retry policy. A rejection does not stop
///    the others; all outcomes are collected first.
/// 2. if every submission was accepted, the records are returned in input
///    order.
/// 3. otherwise every accepted review is deleted again, with the same
///    concurrency bound and retry policy, and the batch fails. Deletes that
///    still fail are reported as orphans.
pub struct BatchOrchestrator<R: ReviewService> {
    reviews: R,
    retry: RetryPolicy,
    max_concurrency: usize,
}

impl<R: ReviewService> BatchOrchestrator<R> {
    pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

    /// Creates an orchestrator with the default concurrency bound.
    pub fn new(reviews: R, retry: RetryPolicy) -> Self {
        Self {
            reviews,
            retry,
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Sets how many create or delete calls may be outstanding at once.
    /// Zero is treated as one.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Creates every submission, or none of them.
    #[tracing::instrument(skip_all, fields(batch_size = submissions.len()))]
    pub async fn submit_batch(&self, submissions: Vec<ReviewSubmission>) -> BatchResult {
        if submissions.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let total = submissions.len();
        tracing::info!(phase = %BatchPhase::Dispatching, "batch started");

        let outcomes = self.dispatch(submissions).await;

        let mut accepted = Vec::with_capacity(total);
        let mut rejections = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                SubmissionOutcome::Accepted(record) => accepted.push((index, record)),
                SubmissionOutcome::Rejected(error) => {
                    tracing::info!(index, error = %error, "review submission rejected");
                    rejections.push(Rejection { index, error });
                }
            }
        }

        if rejections.is_empty() {
            finish(BatchPhase::Committed, started);
            tracing::info!(phase = %BatchPhase::Committed, "batch committed");
            return Ok(accepted.into_iter().map(|(_, record)| record).collect());
        }

        tracing::warn!(
            phase = %BatchPhase::Compensating,
            rejected = rejections.len(),
            to_delete = accepted.len(),
            "batch rejected, deleting accepted reviews"
        );
        metrics::counter!("review_batch_compensations_total").increment(1);

        let accepted_ids: Vec<(usize, ReviewId)> = accepted
            .into_iter()
            .map(|(index, record)| (index, record.review_id))
            .collect();
        let attempted = accepted_ids.len();
        let orphaned = self.compensate(accepted_ids).await;
        let compensated = attempted - orphaned.len();

        if orphaned.is_empty() {
            finish(BatchPhase::RolledBack, started);
            tracing::warn!(phase = %BatchPhase::RolledBack, compensated, "batch rolled back");
            return Err(BatchError::BatchFailed {
                total,
                rejections,
                compensated,
            });
        }

        finish(BatchPhase::CompensationIncomplete, started);
        metrics::counter!("review_batch_orphans_total").increment(orphaned.len() as u64);
        let orphan_ids: Vec<&str> = orphaned.iter().map(|o| o.review_id.as_str()).collect();
        tracing::error!(
            phase = %BatchPhase::CompensationIncomplete,
            compensated,
            orphaned = ?orphan_ids,
            "batch rollback incomplete, orphaned reviews need manual reconciliation"
        );
        Err(BatchError::CompensationIncomplete {
            total,
            rejections,
            compensated,
            orphaned,
        })
    }

    /// Creates every submission and returns the outcomes in input order.
    async fn dispatch(&self, submissions: Vec<ReviewSubmission>) -> Vec<SubmissionOutcome> {
        let total = submissions.len();
        let mut slots: Vec<Option<SubmissionOutcome>> = (0..total).map(|_| None).collect();

        stream::iter(submissions.into_iter().enumerate())
            .map(|(index, submission)| async move {
                let result = self
                    .retry
                    .run("create_review", || self.reviews.create(&submission))
                    .await;
                (index, SubmissionOutcome::from(result))
            })
            .buffer_unordered(self.max_concurrency)
            .for_each(|(index, outcome)| {
                slots[index] = Some(outcome);
                async {}
            })
            .await;

        let outcomes: Vec<SubmissionOutcome> = slots.into_iter().flatten().collect();
        debug_assert_eq!(outcomes.len(), total);
        outcomes
    }

    /// Deletes the given reviews and returns the ones that could not be
    /// deleted, in input order.
    async fn compensate(&self, accepted: Vec<(usize, ReviewId)>) -> Vec<OrphanedReview> {
        let results: Vec<(usize, ReviewId, Result<(), DownstreamError>)> = stream::iter(accepted)
            .map(|(index, review_id)| async move {
                let result = self
                    .retry
                    .run("delete_review", || self.reviews.delete(&review_id))
                    .await;
                (index, review_id, result)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut orphaned: Vec<OrphanedReview> = results
            .into_iter()
            .filter_map(|(index, review_id, result)| {
                let error = result.err()?;
                tracing::error!(%review_id, error = %error, "compensating delete failed");
                Some(OrphanedReview {
                    index,
                    review_id,
                    error,
                })
            })
            .collect();
        orphaned.sort_by_key(|o| o.index);
        orphaned
    }
}

fn finish(phase: BatchPhase, started: Instant) {
    metrics::counter!("review_batches_total", "outcome" => phase.as_str()).increment(1);
    metrics::histogram!("review_batch_duration_seconds").record(started.elapsed().as_secs_f64());
}
