//! In-memory movie-info service.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::{MovieInfo, MovieInfoId};

use crate::error::{DownstreamError, Result, Service, classify};
use crate::service::MovieInfoService;

#[derive(Debug, Default)]
struct InMemoryMovieInfoState {
    movies: HashMap<MovieInfoId, MovieInfo>,
    failure: Option<u16>,
    transient_failures: u32,
    latency: Option<Duration>,
    get_calls: usize,
}

/// In-memory movie-info service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMovieInfoService {
    state: Arc<RwLock<InMemoryMovieInfoState>>,
}

impl InMemoryMovieInfoService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores movie metadata under `movie_info_id`.
    pub fn insert(&self, movie_info_id: MovieInfoId, movie: MovieInfo) {
        self.write().movies.insert(movie_info_id, movie);
    }

    /// Answers every lookup with `status`, or clears the failure with `None`.
    pub fn set_failure(&self, status: Option<u16>) {
        self.write().failure = status;
    }

    /// Fails the next `count` lookups with a 503.
    pub fn fail_next_gets(&self, count: u32) {
        self.write().transient_failures = count;
    }

    /// Delays every lookup by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.write().latency = Some(latency);
    }

    pub fn get_calls(&self) -> usize {
        self.write().get_calls
    }

    fn begin_get(&self) -> Option<Duration> {
        let mut state = self.write();
        state.get_calls += 1;
        state.latency
    }

    fn finish_get(&self, movie_info_id: MovieInfoId) -> Result<MovieInfo> {
        let mut state = self.write();

        if state.transient_failures > 0 {
            state.transient_failures -= 1;
            return Err(classify(Service::MovieInfo, 503, "movie-info service unavailable"));
        }

        match state.failure {
            Some(404) => Err(DownstreamError::movie_info_not_found(movie_info_id)),
            Some(status) => Err(classify(Service::MovieInfo, status, "lookup failed")),
            None => state
                .movies
                .get(&movie_info_id)
                .cloned()
                .ok_or_else(|| DownstreamError::movie_info_not_found(movie_info_id)),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryMovieInfoState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MovieInfoService for InMemoryMovieInfoService {
    async fn get(&self, movie_info_id: MovieInfoId) -> Result<MovieInfo> {
        if let Some(latency) = self.begin_get() {
            tokio::time::sleep(latency).await;
        }
        self.finish_get(movie_info_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batman() -> MovieInfo {
        MovieInfo {
            movie_info_id: Some("1".to_string()),
            name: "Batman Begins".to_string(),
            year: 2005,
            cast: vec!["Christian Bale".to_string()],
            release_date: None,
        }
    }

    #[tokio::test]
    async fn test_get_stored_movie() {
        let service = InMemoryMovieInfoService::new();
        service.insert(MovieInfoId::new(1), batman());

        let movie = service.get(MovieInfoId::new(1)).await.unwrap();
        assert_eq!(movie.name, "Batman Begins");
        assert_eq!(service.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_movie_is_not_found() {
        let service = InMemoryMovieInfoService::new();
        let err = service.get(MovieInfoId::new(1)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_scripted_server_failure() {
        let service = InMemoryMovieInfoService::new();
        service.insert(MovieInfoId::new(1), batman());
        service.set_failure(Some(500));

        let err = service.get(MovieInfoId::new(1)).await.unwrap_err();
        assert!(err.is_server_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_lookup() {
        let service = InMemoryMovieInfoService::new();
        service.insert(MovieInfoId::new(1), batman());
        service.set_latency(Duration::from_millis(200));
        let started = tokio::time::Instant::now();

        service.get(MovieInfoId::new(1)).await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(200));
    }
}
