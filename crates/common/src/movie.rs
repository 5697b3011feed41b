//! Movie metadata and the joined movie + reviews view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::review::ReviewRecord;

/// Movie metadata as served by the movie-info service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieInfo {
    #[serde(default)]
    pub movie_info_id: Option<String>,
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default, rename = "release_date")]
    pub release_date: Option<NaiveDate>,
}

/// A movie joined with its reviews. `review_list` is empty, never absent,
/// when the review service has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieAggregate {
    pub movie_info: MovieInfo,
    pub review_list: Vec<ReviewRecord>,
}

impl MovieAggregate {
    pub fn new(movie_info: MovieInfo, review_list: Vec<ReviewRecord>) -> Self {
        Self {
            movie_info,
            review_list,
        }
    }
}
