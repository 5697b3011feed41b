//! Batch review submission and the movie aggregate query path.
//!
//! A batch of reviews is created concurrently against the review service
//! and committed as a unit: if any submission is rejected, every review
//! that was created is deleted again before the failure is reported.
//!
//! The query path fetches a movie's metadata and its reviews concurrently
//! and joins them.

pub mod batch;
pub mod error;
pub mod outcome;
pub mod query;
pub mod state;

pub use batch::BatchOrchestrator;
pub use error::{BatchError, OrphanedReview, Rejection};
pub use outcome::{BatchResult, SubmissionOutcome};
pub use query::MovieAggregator;
pub use state::BatchPhase;
