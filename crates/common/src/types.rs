use serde::{Deserialize, Serialize};

/// Identifier of a movie in the movie-info service.
///
/// Reviews reference their movie by this numeric id, and the review
/// service filters on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieInfoId(i64);

impl MovieInfoId {
    /// Creates a movie id from its numeric value.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MovieInfoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MovieInfoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for MovieInfoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Identifier assigned to a review by the review service.
///
/// The aggregator never mints these; it only carries the ones the
/// downstream service hands back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(String);

impl ReviewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReviewId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ReviewId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
