//! In-memory review and movie-info services.

pub mod movie_info;
pub mod reviews;

pub use movie_info::InMemoryMovieInfoService;
pub use reviews::InMemoryReviewService;
