//! Clients for the services the aggregator depends on.
//!
//! Every outbound call goes through one status classification
//! ([`classify`]) and can be wrapped by the shared [`RetryPolicy`], which
//! retries transient server failures only.
//!
//! The in-memory services implement the same traits as the HTTP clients
//! and are used for tests, benchmarks and local runs.

pub mod error;
pub mod http;
pub mod memory;
pub mod retry;
pub mod service;

pub use error::{DownstreamError, Result, Service, classify};
pub use http::{HttpMovieInfoClient, HttpReviewClient, build_http_client};
pub use memory::{InMemoryMovieInfoService, InMemoryReviewService};
pub use retry::{RetryPolicy, RetryPredicate};
pub use service::{MovieInfoService, ReviewService};
