//! Review payloads as submitted by callers and as persisted downstream.

use serde::{Deserialize, Serialize};

use crate::types::{MovieInfoId, ReviewId};

/// A review a caller wants created. Has no identity until the review
/// service accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    pub movie_info_id: MovieInfoId,
    #[serde(default)]
    pub comment: String,
    pub rating: f64,
}

impl ReviewSubmission {
    pub fn new(movie_info_id: impl Into<MovieInfoId>, comment: impl Into<String>, rating: f64) -> Self {
        Self {
            movie_info_id: movie_info_id.into(),
            comment: comment.into(),
            rating,
        }
    }

    /// Returns true if the rating is a finite, non-negative number.
    pub fn has_valid_rating(&self) -> bool {
        self.rating.is_finite() && self.rating >= 0.0
    }
}

/// A review persisted by the review service, carrying the id it assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub review_id: ReviewId,
    pub movie_info_id: MovieInfoId,
    #[serde(default)]
    pub comment: String,
    pub rating: f64,
}

impl ReviewRecord {
    /// Builds the record a review service would return for `submission`.
    pub fn from_submission(review_id: ReviewId, submission: ReviewSubmission) -> Self {
        Self {
            review_id,
            movie_info_id: submission.movie_info_id,
            comment: submission.comment,
            rating: submission.rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_uses_camel_case_wire_names() {
        let submission = ReviewSubmission::new(1, "Awesome Movie", 9.0);
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "movieInfoId": 1, "comment": "Awesome Movie", "rating": 9.0 })
        );
    }

    #[test]
    fn submission_ignores_client_supplied_review_id() {
        let submission: ReviewSubmission = serde_json::from_str(
            r#"{"reviewId": null, "movieInfoId": 3, "comment": "ok", "rating": 4.5}"#,
        )
        .unwrap();
        assert_eq!(submission.movie_info_id, MovieInfoId::new(3));
    }

    #[test]
    fn rating_validation() {
        assert!(ReviewSubmission::new(1, "", 0.0).has_valid_rating());
        assert!(!ReviewSubmission::new(1, "", -1.0).has_valid_rating());
        assert!(!ReviewSubmission::new(1, "", f64::NAN).has_valid_rating());
    }

    #[test]
    fn record_deserializes_from_review_service_body() {
        let record: ReviewRecord = serde_json::from_str(
            r#"{"reviewId": "abc", "movieInfoId": 1, "comment": "Excellent", "rating": 8.0}"#,
        )
        .unwrap();
        assert_eq!(record.review_id, ReviewId::new("abc"));
        assert_eq!(record.comment, "Excellent");
    }
}
