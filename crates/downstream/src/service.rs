//! Service traits for the review and movie-info dependencies.

use async_trait::async_trait;
use common::{MovieInfo, MovieInfoId, ReviewId, ReviewRecord, ReviewSubmission};

use crate::error::Result;

/// Operations against the review service.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Creates a review and returns it with its assigned id.
    async fn create(&self, submission: &ReviewSubmission) -> Result<ReviewRecord>;

    /// Deletes a review. Deleting a review that no longer exists succeeds.
    async fn delete(&self, review_id: &ReviewId) -> Result<()>;

    /// Returns the reviews of a movie, or an empty list if it has none.
    async fn find_by_movie(&self, movie_info_id: MovieInfoId) -> Result<Vec<ReviewRecord>>;
}

/// Operations against the movie-info service.
#[async_trait]
pub trait MovieInfoService: Send + Sync {
    /// Fetches a movie's metadata. A missing movie is a 404 client error.
    async fn get(&self, movie_info_id: MovieInfoId) -> Result<MovieInfo>;
}
