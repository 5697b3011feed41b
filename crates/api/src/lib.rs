//! Movies aggregator HTTP service.
//!
//! Fronts the movie-info and review services: joins a movie with its
//! reviews, and creates batches of reviews all-or-nothing. Structured
//! logging via tracing, Prometheus metrics on `/metrics`.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use downstream::{
    HttpMovieInfoClient, HttpReviewClient, MovieInfoService, ReviewService, build_http_client,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::movies::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<M, R>(state: Arc<AppState<M, R>>, metrics_handle: PrometheusHandle) -> Router
where
    M: MovieInfoService + 'static,
    R: ReviewService + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health))
        .route("/v1/movies/reviews", post(routes::movies::create_reviews::<M, R>))
        .route("/v1/movies/{id}", get(routes::movies::get_movie::<M, R>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by the HTTP clients described in `config`.
pub fn create_http_state(
    config: &Config,
) -> Result<Arc<AppState<HttpMovieInfoClient, HttpReviewClient>>, reqwest::Error> {
    let http = build_http_client(config.http_timeout())?;
    let movie_info = HttpMovieInfoClient::new(http.clone(), config.movies_info_url.as_str());
    let reviews = HttpReviewClient::new(http, config.reviews_url.as_str());

    Ok(Arc::new(AppState::new(
        movie_info,
        reviews,
        config.retry_policy(),
        config.batch_max_concurrency,
    )))
}
