//! Shared types for the movies aggregator.
//!
//! Identifiers are newtypes so a movie id can never be passed where a
//! review id is expected. Wire names follow the downstream services'
//! camelCase JSON.

pub mod movie;
pub mod review;
pub mod types;

pub use movie::{MovieAggregate, MovieInfo};
pub use review::{ReviewRecord, ReviewSubmission};
pub use types::{MovieInfoId, ReviewId};
