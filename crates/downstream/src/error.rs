//! Downstream error taxonomy and HTTP status classification.

use common::MovieInfoId;
use thiserror::Error;

/// The remote service a call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    MovieInfo,
    Reviews,
}

impl Service {
    /// Returns the label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::MovieInfo => "movie_info",
            Service::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed call to a downstream service.
#[derive(Debug, Error)]
pub enum DownstreamError {
    /// The request was refused (4xx). Never retried.
    #[error("{service} service rejected the request ({status}): {message}")]
    Client {
        service: Service,
        status: u16,
        message: String,
    },

    /// The service failed (5xx). Retryable.
    #[error("{service} service failed ({status}): {message}")]
    Server {
        service: Service,
        status: u16,
        message: String,
    },

    /// No usable response: connection failure, timeout or an undecodable body.
    #[error("{service} service call failed: {source}")]
    Transport {
        service: Service,
        #[source]
        source: reqwest::Error,
    },
}

impl DownstreamError {
    /// The error returned when the movie-info service has no such movie.
    pub fn movie_info_not_found(movie_info_id: MovieInfoId) -> Self {
        DownstreamError::Client {
            service: Service::MovieInfo,
            status: 404,
            message: format!(
                "There is no MovieInfo available for the passed in Id : {movie_info_id}"
            ),
        }
    }

    /// Returns the service the failed call was made against.
    pub fn service(&self) -> Service {
        match self {
            DownstreamError::Client { service, .. }
            | DownstreamError::Server { service, .. }
            | DownstreamError::Transport { service, .. } => *service,
        }
    }

    /// Returns the HTTP status, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DownstreamError::Client { status, .. } | DownstreamError::Server { status, .. } => {
                Some(*status)
            }
            DownstreamError::Transport { .. } => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, DownstreamError::Client { .. })
    }

    /// The default retry predicate.
    pub fn is_server_error(&self) -> bool {
        matches!(self, DownstreamError::Server { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DownstreamError::Client { status: 404, .. })
    }
}

/// Maps a non-success status and its body to an error.
///
/// 4xx is a client error, everything else is treated as a server error.
/// Callers handle the per-call 404 cases (empty query, idempotent delete,
/// missing movie) before falling back to this.
pub fn classify(service: Service, status: u16, message: impl Into<String>) -> DownstreamError {
    let message = message.into();
    if (400..500).contains(&status) {
        DownstreamError::Client {
            service,
            status,
            message,
        }
    } else {
        DownstreamError::Server {
            service,
            status,
            message,
        }
    }
}

/// Convenience type alias for downstream call results.
pub type Result<T> = std::result::Result<T, DownstreamError>;
