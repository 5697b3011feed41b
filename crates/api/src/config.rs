//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use downstream::RetryPolicy;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8082`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `MOVIES_INFO_URL` — movie-info collection URL
/// - `REVIEWS_URL` — review collection URL
/// - `RETRY_MAX_RETRIES` — retries after the first attempt (default: `3`)
/// - `RETRY_DELAY_MS` — fixed delay between attempts (default: `1000`)
/// - `BATCH_MAX_CONCURRENCY` — create/delete calls in flight per batch (default: `10`)
/// - `HTTP_TIMEOUT_SECS` — per-request timeout for downstream calls (default: `10`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub movies_info_url: String,
    pub reviews_url: String,
    pub retry_max_retries: u32,
    pub retry_delay_ms: u64,
    pub batch_max_concurrency: usize,
    pub http_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            movies_info_url: lookup("MOVIES_INFO_URL").unwrap_or(defaults.movies_info_url),
            reviews_url: lookup("REVIEWS_URL").unwrap_or(defaults.reviews_url),
            retry_max_retries: parse_var(&lookup, "RETRY_MAX_RETRIES")
                .unwrap_or(defaults.retry_max_retries),
            retry_delay_ms: parse_var(&lookup, "RETRY_DELAY_MS").unwrap_or(defaults.retry_delay_ms),
            batch_max_concurrency: parse_var(&lookup, "BATCH_MAX_CONCURRENCY")
                .unwrap_or(defaults.batch_max_concurrency),
            http_timeout_secs: parse_var(&lookup, "HTTP_TIMEOUT_SECS")
                .unwrap_or(defaults.http_timeout_secs),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the retry policy shared by all downstream calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed_delay(
            self.retry_max_retries,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
            log_level: "info".to_string(),
            movies_info_url: "http://localhost:8080/v1/movieinfos".to_string(),
            reviews_url: "http://localhost:8081/v1/reviews".to_string(),
            retry_max_retries: RetryPolicy::DEFAULT_MAX_RETRIES,
            retry_delay_ms: 1000,
            batch_max_concurrency: 10,
            http_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8082);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.reviews_url, "http://localhost:8081/v1/reviews");
        assert_eq!(config.batch_max_concurrency, 10);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = from_pairs(&[
            ("PORT", "9000"),
            ("REVIEWS_URL", "http://reviews:8081/v1/reviews"),
            ("RETRY_MAX_RETRIES", "5"),
            ("RETRY_DELAY_MS", "250"),
            ("BATCH_MAX_CONCURRENCY", "4"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.reviews_url, "http://reviews:8081/v1/reviews");
        assert_eq!(config.batch_max_concurrency, 4);

        let policy = config.retry_policy();
        assert_eq!(policy.max_retries(), 5);
        assert_eq!(policy.delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_retry_count_excludes_first_attempt() {
        let config = from_pairs(&[("RETRY_MAX_RETRIES", "3")]);
        assert_eq!(config.retry_max_retries, 3);
        assert_eq!(config.retry_policy().max_attempts(), 4);

        let config = from_pairs(&[("RETRY_MAX_ATTEMPTS", "7")]);
        assert_eq!(config.retry_max_retries, RetryPolicy::DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        let config = from_pairs(&[("PORT", "not-a-port"), ("RETRY_DELAY_MS", "-1")]);
        assert_eq!(config.port, 8082);
        assert_eq!(config.retry_delay_ms, 1000);
    }
}
