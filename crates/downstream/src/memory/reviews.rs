//! In-memory review service with scripted failures and call accounting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::{MovieInfoId, ReviewId, ReviewRecord, ReviewSubmission};
use uuid::Uuid;

use crate::error::{Result, Service, classify};
use crate::service::ReviewService;

type SubmissionPredicate = Arc<dyn Fn(&ReviewSubmission) -> bool + Send + Sync>;
type SubmissionLatency = Arc<dyn Fn(&ReviewSubmission) -> Duration + Send + Sync>;

#[derive(Default)]
struct InMemoryReviewState {
    reviews: Vec<ReviewRecord>,
    reject_creates: Option<(u16, SubmissionPredicate)>,
    create_latency: Option<SubmissionLatency>,
    transient_create_failures: u32,
    transient_delete_failures: u32,
    delete_failure: Option<u16>,
    query_failure: Option<u16>,
    query_latency: Option<Duration>,
    create_calls: usize,
    delete_calls: HashMap<ReviewId, usize>,
    query_calls: usize,
}

#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }
}

struct InFlightGuard<'a>(&'a InFlight);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory review service.
///
/// Clones share state, so a test can keep a handle to inspect calls
/// after handing the service to an orchestrator.
#[derive(Clone, Default)]
pub struct InMemoryReviewService {
    state: Arc<RwLock<InMemoryReviewState>>,
    in_flight: Arc<InFlight>,
}

impl InMemoryReviewService {
    /// Creates an empty review service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a review directly, bypassing `create`.
    pub fn insert(&self, record: ReviewRecord) {
        self.write().reviews.push(record);
    }

    /// Rejects every create whose submission matches `predicate` with `status`.
    pub fn reject_creates_when<F>(&self, status: u16, predicate: F)
    where
        F: Fn(&ReviewSubmission) -> bool + Send + Sync + 'static,
    {
        self.write().reject_creates = Some((status, Arc::new(predicate)));
    }

    /// Delays each create by the duration computed from its submission.
    pub fn set_create_latency<F>(&self, latency: F)
    where
        F: Fn(&ReviewSubmission) -> Duration + Send + Sync + 'static,
    {
        self.write().create_latency = Some(Arc::new(latency));
    }

    /// Fails the next `count` creates with a 503.
    pub fn fail_next_creates(&self, count: u32) {
        self.write().transient_create_failures = count;
    }

    /// Fails the next `count` deletes with a 503.
    pub fn fail_next_deletes(&self, count: u32) {
        self.write().transient_delete_failures = count;
    }

    /// Fails every delete with `status`, or clears the failure with `None`.
    pub fn set_delete_failure(&self, status: Option<u16>) {
        self.write().delete_failure = status;
    }

    /// Answers every query with `status`, or clears the failure with `None`.
    pub fn set_query_failure(&self, status: Option<u16>) {
        self.write().query_failure = status;
    }

    /// Delays every query by `latency`.
    pub fn set_query_latency(&self, latency: Duration) {
        self.write().query_latency = Some(latency);
    }

    /// Returns the number of stored reviews.
    pub fn review_count(&self) -> usize {
        self.read().reviews.len()
    }

    /// Returns true if a review with the given id is stored.
    pub fn contains(&self, review_id: &ReviewId) -> bool {
        self.read().reviews.iter().any(|r| &r.review_id == review_id)
    }

    pub fn create_calls(&self) -> usize {
        self.read().create_calls
    }

    /// Returns how many deletes were issued for `review_id`.
    pub fn delete_calls_for(&self, review_id: &ReviewId) -> usize {
        self.read().delete_calls.get(review_id).copied().unwrap_or(0)
    }

    pub fn total_delete_calls(&self) -> usize {
        self.read().delete_calls.values().sum()
    }

    pub fn query_calls(&self) -> usize {
        self.read().query_calls
    }

    /// Returns the highest number of calls that were outstanding at once.
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryReviewState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryReviewState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_create(&self, submission: &ReviewSubmission) -> Option<Duration> {
        let mut state = self.write();
        state.create_calls += 1;
        state.create_latency.as_ref().map(|latency| latency(submission))
    }

    fn finish_create(&self, submission: &ReviewSubmission) -> Result<ReviewRecord> {
        let mut state = self.write();

        if state.transient_create_failures > 0 {
            state.transient_create_failures -= 1;
            return Err(classify(Service::Reviews, 503, "review service unavailable"));
        }

        if let Some((status, predicate)) = &state.reject_creates {
            if predicate(submission) {
                return Err(classify(Service::Reviews, *status, "review rejected"));
            }
        }

        let review_id = ReviewId::new(Uuid::new_v4().simple().to_string());
        let record = ReviewRecord::from_submission(review_id, submission.clone());
        state.reviews.push(record.clone());
        Ok(record)
    }

    fn apply_delete(&self, review_id: &ReviewId) -> Result<()> {
        let mut state = self.write();
        *state.delete_calls.entry(review_id.clone()).or_default() += 1;

        if let Some(status) = state.delete_failure {
            if status != 404 {
                return Err(classify(Service::Reviews, status, "delete failed"));
            }
        }

        if state.transient_delete_failures > 0 {
            state.transient_delete_failures -= 1;
            return Err(classify(Service::Reviews, 503, "review service unavailable"));
        }

        state.reviews.retain(|r| &r.review_id != review_id);
        Ok(())
    }

    fn begin_query(&self) -> Option<Duration> {
        let mut state = self.write();
        state.query_calls += 1;
        state.query_latency
    }

    fn finish_query(&self, movie_info_id: MovieInfoId) -> Result<Vec<ReviewRecord>> {
        let state = self.read();

        match state.query_failure {
            Some(404) => Ok(Vec::new()),
            Some(status) => Err(classify(Service::Reviews, status, "query failed")),
            None => Ok(state
                .reviews
                .iter()
                .filter(|r| r.movie_info_id == movie_info_id)
                .cloned()
                .collect()),
        }
    }
}

#[async_trait]
impl ReviewService for InMemoryReviewService {
    async fn create(&self, submission: &ReviewSubmission) -> Result<ReviewRecord> {
        let _in_flight = self.in_flight.enter();
        if let Some(latency) = self.begin_create(submission) {
            tokio::time::sleep(latency).await;
        }
        self.finish_create(submission)
    }

    async fn delete(&self, review_id: &ReviewId) -> Result<()> {
        let _in_flight = self.in_flight.enter();
        tokio::task::yield_now().await;
        self.apply_delete(review_id)
    }

    async fn find_by_movie(&self, movie_info_id: MovieInfoId) -> Result<Vec<ReviewRecord>> {
        if let Some(latency) = self.begin_query() {
            tokio::time::sleep(latency).await;
        }
        self.finish_query(movie_info_id)
    }
}
