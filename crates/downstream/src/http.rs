//! reqwest-backed clients for the review and movie-info services.

use std::time::Duration;

use async_trait::async_trait;
use common::{MovieInfo, MovieInfoId, ReviewId, ReviewRecord, ReviewSubmission};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{DownstreamError, Result, Service, classify};
use crate::service::{MovieInfoService, ReviewService};

/// Builds the HTTP client shared by the downstream clients.
pub fn build_http_client(timeout: Duration) -> std::result::Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Client for the review service rooted at its collection URL,
/// e.g. `http://localhost:8081/v1/reviews`.
#[derive(Debug, Clone)]
pub struct HttpReviewClient {
    client: Client,
    base_url: String,
}

impl HttpReviewClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ReviewService for HttpReviewClient {
    async fn create(&self, submission: &ReviewSubmission) -> Result<ReviewRecord> {
        let request = self.client.post(&self.base_url).json(submission);
        let response = send(Service::Reviews, request).await?;

        if response.status().is_success() {
            return decode(Service::Reviews, response).await;
        }
        Err(error_from(Service::Reviews, response).await)
    }

    async fn delete(&self, review_id: &ReviewId) -> Result<()> {
        let url = format!("{}/{}", self.base_url, review_id);
        let response = send(Service::Reviews, self.client.delete(url)).await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(error_from(Service::Reviews, response).await)
    }

    async fn find_by_movie(&self, movie_info_id: MovieInfoId) -> Result<Vec<ReviewRecord>> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("movieInfoId", movie_info_id.as_i64())]);
        let response = send(Service::Reviews, request).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(%movie_info_id, "no reviews found");
            return Ok(Vec::new());
        }
        if status.is_success() {
            return decode(Service::Reviews, response).await;
        }
        Err(error_from(Service::Reviews, response).await)
    }
}

/// Client for the movie-info service rooted at its collection URL,
/// e.g. `http://localhost:8080/v1/movieinfos`.
#[derive(Debug, Clone)]
pub struct HttpMovieInfoClient {
    client: Client,
    base_url: String,
}

impl HttpMovieInfoClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MovieInfoService for HttpMovieInfoClient {
    async fn get(&self, movie_info_id: MovieInfoId) -> Result<MovieInfo> {
        let url = format!("{}/{}", self.base_url, movie_info_id);
        let response = send(Service::MovieInfo, self.client.get(url)).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DownstreamError::movie_info_not_found(movie_info_id));
        }
        if status.is_success() {
            return decode(Service::MovieInfo, response).await;
        }
        Err(error_from(Service::MovieInfo, response).await)
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

async fn send(service: Service, request: RequestBuilder) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|source| DownstreamError::Transport { service, source })?;

    let status = response.status();
    tracing::debug!(%service, status = status.as_u16(), "downstream response");
    metrics::counter!(
        "downstream_responses_total",
        "service" => service.as_str(),
        "class" => status_class(status)
    )
    .increment(1);

    Ok(response)
}

async fn decode<T: DeserializeOwned>(service: Service, response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|source| DownstreamError::Transport { service, source })
}

async fn error_from(service: Service, response: Response) -> DownstreamError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::info!(%service, status, "downstream call failed");
    classify(service, status, body)
}

fn status_class(status: StatusCode) -> &'static str {
    if status.is_success() {
        "success"
    } else if status == StatusCode::NOT_FOUND {
        "not_found"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "server_error"
    }
}
