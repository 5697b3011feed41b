//! Movie aggregate query path.

use common::{MovieAggregate, MovieInfoId};
use downstream::{DownstreamError, MovieInfoService, RetryPolicy, ReviewService};

/// Joins a movie's metadata with its reviews.
pub struct MovieAggregator<M: MovieInfoService, R: ReviewService> {
    movie_info: M,
    reviews: R,
    retry: RetryPolicy,
}

impl<M: MovieInfoService, R: ReviewService> MovieAggregator<M, R> {
    pub fn new(movie_info: M, reviews: R, retry: RetryPolicy) -> Self {
        Self {
            movie_info,
            reviews,
            retry,
        }
    }

    /// Fetches the movie and its reviews concurrently and joins them.
    ///
    /// Both calls always run to completion. A missing movie fails the
    /// join; missing reviews yield an empty list. If both calls fail, the
    /// movie-info error is returned.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, movie_info_id: MovieInfoId) -> Result<MovieAggregate, DownstreamError> {
        let (movie_info, reviews) = tokio::join!(
            self.retry
                .run("get_movie_info", || self.movie_info.get(movie_info_id)),
            self.retry
                .run("find_reviews", || self.reviews.find_by_movie(movie_info_id)),
        );

        let movie_info = movie_info.inspect_err(|err| {
            tracing::info!(error = %err, "movie info lookup failed");
        })?;
        let review_list = reviews.inspect_err(|err| {
            tracing::info!(error = %err, "review lookup failed");
        })?;

        tracing::debug!(reviews = review_list.len(), "movie aggregate joined");
        Ok(MovieAggregate::new(movie_info, review_list))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use common::{MovieInfo, ReviewId, ReviewRecord, ReviewSubmission};
    use downstream::{InMemoryMovieInfoService, InMemoryReviewService};

    fn setup() -> (
        MovieAggregator<InMemoryMovieInfoService, InMemoryReviewService>,
        InMemoryMovieInfoService,
        InMemoryReviewService,
    ) {
        let movies = InMemoryMovieInfoService::new();
        let reviews = InMemoryReviewService::new();
        let aggregator = MovieAggregator::new(
            movies.clone(),
            reviews.clone(),
            RetryPolicy::fixed_delay(3, Duration::from_millis(1)),
        );
        (aggregator, movies, reviews)
    }

    fn movie() -> MovieInfo {
        MovieInfo {
            movie_info_id: Some("1".to_string()),
            name: "Batman Begins".to_string(),
            year: 2005,
            cast: vec!["Christian Bale".to_string(), "Michael Cane".to_string()],
            release_date: None,
        }
    }

    #[tokio::test]
    async fn test_joins_movie_and_reviews() {
        let (aggregator, movies, reviews) = setup();
        movies.insert(MovieInfoId::new(1), movie());
        reviews.insert(ReviewRecord::from_submission(
            ReviewId::new("r1"),
            ReviewSubmission::new(1, "Awesome Movie", 9.0),
        ));

        let aggregate = aggregator.fetch(MovieInfoId::new(1)).await.unwrap();

        assert_eq!(aggregate.movie_info.name, "Batman Begins");
        assert_eq!(aggregate.review_list.len(), 1);
    }

    #[tokio::test]
    async fn test_transient_movie_info_failure_is_retried() {
        let (aggregator, movies, _) = setup();
        movies.insert(MovieInfoId::new(1), movie());
        movies.fail_next_gets(2);

        let aggregate = aggregator.fetch(MovieInfoId::new(1)).await.unwrap();

        assert!(aggregate.review_list.is_empty());
        assert_eq!(movies.get_calls(), 3);
    }

    #[tokio::test]
    async fn test_both_legs_run_when_movie_is_missing() {
        let (aggregator, _, reviews) = setup();

        let err = aggregator.fetch(MovieInfoId::new(1)).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(reviews.query_calls(), 1);
    }
}
