//! Blocklist source fetching over HTTP with retry.

use std::io::Read;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::config::RequestConfig;
use crate::error::{FetchErrorKind, Result, RulegenError};

/// Some blocklist hosts reject non-browser clients
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// HTTP fetcher with a configured retry budget
pub struct Fetcher {
    agent: ureq::Agent,
    retry_count: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Create a fetcher from the request configuration
    pub fn new(config: &RequestConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();
        Self {
            agent,
            retry_count: config.retry_count.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }

    /// Fetch a URL as text, retrying transient failures
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        let mut last_err = None;

        for attempt in 1..=self.retry_count {
            debug!("GET {} (attempt {}/{})", url, attempt, self.retry_count);
            match self.try_fetch(url) {
                Ok(text) => return Ok(text),
                Err(err) => {
                    warn!(
                        "fetch of {} failed (attempt {}/{}): {}",
                        url, attempt, self.retry_count, err
                    );
                    last_err = Some(err);
                    if attempt < self.retry_count {
                        thread::sleep(self.retry_delay);
                    }
                }
            }
        }

        Err(last_err.expect("retry loop ran at least once"))
    }

    fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| RulegenError::FetchError {
                kind: classify_error(&e),
                message: format!("GET {} failed: {}", url, e),
            })?;

        let (_, body) = response.into_parts();
        let mut reader = body.into_reader();
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| RulegenError::FetchError {
                kind: FetchErrorKind::Io,
                message: format!("reading body of {} failed: {}", url, e),
            })?;
        Ok(text)
    }
}

fn classify_error(err: &ureq::Error) -> FetchErrorKind {
    match err {
        ureq::Error::StatusCode(_) => FetchErrorKind::HttpStatus,
        ureq::Error::Timeout(_) => FetchErrorKind::Timeout,
        ureq::Error::Io(_) => FetchErrorKind::Io,
        _ => FetchErrorKind::ConnectionFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_retries_then_reports_failure() {
        // Unroutable port on localhost: every attempt fails fast
        let config = RequestConfig {
            timeout_secs: 1,
            retry_count: 2,
            retry_delay_secs: 0,
        };
        let fetcher = Fetcher::new(&config);
        let result = fetcher.fetch_text("http://127.0.0.1:1/list.txt");
        assert!(result.is_err());
        match result.unwrap_err() {
            RulegenError::FetchError { .. } => {}
            other => panic!("expected FetchError, got {}", other),
        }
    }

    #[test]
    fn test_retry_count_floor() {
        // retry_count 0 still attempts once
        let config = RequestConfig {
            timeout_secs: 1,
            retry_count: 0,
            retry_delay_secs: 0,
        };
        let fetcher = Fetcher::new(&config);
        assert!(fetcher.fetch_text("http://127.0.0.1:1/").is_err());
    }
}
