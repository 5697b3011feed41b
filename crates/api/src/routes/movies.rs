//! Movie lookup and batch review submission endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{MovieAggregate, MovieInfoId, ReviewRecord, ReviewSubmission};
use downstream::{MovieInfoService, RetryPolicy, ReviewService};
use orchestrator::{BatchOrchestrator, MovieAggregator};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<M: MovieInfoService, R: ReviewService> {
    pub orchestrator: BatchOrchestrator<R>,
    pub aggregator: MovieAggregator<M, R>,
}

impl<M: MovieInfoService, R: ReviewService + Clone> AppState<M, R> {
    /// Wires both paths to the same services and retry policy.
    pub fn new(movie_info: M, reviews: R, retry: RetryPolicy, max_concurrency: usize) -> Self {
        Self {
            orchestrator: BatchOrchestrator::new(reviews.clone(), retry)
                .with_max_concurrency(max_concurrency),
            aggregator: MovieAggregator::new(movie_info, reviews, retry),
        }
    }
}

/// POST /v1/movies/reviews — create a batch of reviews, all or nothing.
#[tracing::instrument(skip_all)]
pub async fn create_reviews<M, R>(
    State(state): State<Arc<AppState<M, R>>>,
    Json(submissions): Json<Vec<ReviewSubmission>>,
) -> Result<(StatusCode, Json<Vec<ReviewRecord>>), ApiError>
where
    M: MovieInfoService + 'static,
    R: ReviewService + 'static,
{
    let invalid: Vec<usize> = submissions
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.has_valid_rating())
        .map(|(index, _)| index)
        .collect();
    if !invalid.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "rating.negative : please pass a non-negative value (submissions {invalid:?})"
        )));
    }

    let records = state.orchestrator.submit_batch(submissions).await?;
    Ok((StatusCode::CREATED, Json(records)))
}

/// GET /v1/movies/:id — movie metadata joined with its reviews.
#[tracing::instrument(skip(state))]
pub async fn get_movie<M, R>(
    State(state): State<Arc<AppState<M, R>>>,
    Path(id): Path<String>,
) -> Result<Json<MovieAggregate>, ApiError>
where
    M: MovieInfoService + 'static,
    R: ReviewService + 'static,
{
    let movie_info_id: MovieInfoId = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid movie id {id}: {e}")))?;

    let aggregate = state.aggregator.fetch(movie_info_id).await?;
    Ok(Json(aggregate))
}
