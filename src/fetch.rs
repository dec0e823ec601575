//! Article page fetching with retries.
//!
//! News hosts rate-limit and front-end their pages aggressively, so the
//! fetcher rotates a small desktop user-agent pool, follows redirects, and
//! retries transient failures with exponential backoff plus jitter. A 404 is
//! terminal and never retried. The final post-redirect URL is reported so
//! the caller can re-check domain exclusions.

use once_cell::sync::Lazy;
use rand::Rng;
use reqwest::StatusCode;
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("reqwest client builds with static configuration")
});

/// A fetched page body plus the URL it actually came from.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The post-redirect URL.
    pub final_url: String,
    pub body: String,
}

/// Fetches article pages with bounded retries.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl PageFetcher {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Fetch `url`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns an error on a 404, or once every attempt has failed.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, Box<dyn Error>> {
        let mut last_error: Option<Box<dyn Error>> = None;

        for attempt in 1..=self.max_attempts {
            match self.attempt(url).await {
                Ok(page) => return Ok(page),
                Err(FetchAttemptError::NotFound) => {
                    return Err(format!("404 Not Found: {url}").into());
                }
                Err(FetchAttemptError::Retryable(e)) => {
                    warn!(url, attempt, error = %e, "Fetch attempt failed");
                    last_error = Some(e);
                }
            }
            if attempt < self.max_attempts {
                let delay = self.backoff_delay(attempt);
                debug!(url, delay_ms = delay.as_millis() as u64, "Backing off");
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| format!("fetch failed: {url}").into()))
    }

    async fn attempt(&self, url: &str) -> Result<FetchedPage, FetchAttemptError> {
        let user_agent = USER_AGENTS[rand::rng().random_range(0..USER_AGENTS.len())];
        let response = CLIENT
            .get(url)
            .header("User-Agent", user_agent)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "ru-RU,ru;q=0.9,en;q=0.5")
            .send()
            .await
            .map_err(|e| FetchAttemptError::Retryable(e.into()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchAttemptError::NotFound);
        }
        let response = response
            .error_for_status()
            .map_err(|e| FetchAttemptError::Retryable(e.into()))?;

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchAttemptError::Retryable(e.into()))?;
        Ok(FetchedPage { final_url, body })
    }

    /// Exponential backoff capped at 30s, with up to 250ms of jitter.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(Duration::from_secs(30));
        capped + Duration::from_millis(rand::rng().random_range(0..=250))
    }
}

enum FetchAttemptError {
    NotFound,
    Retryable(Box<dyn Error>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let fetcher = PageFetcher::new(6, Duration::from_secs(2));
        let d1 = fetcher.backoff_delay(1);
        let d2 = fetcher.backoff_delay(2);
        let d5 = fetcher.backoff_delay(5);
        assert!(d1 >= Duration::from_secs(2) && d1 < Duration::from_millis(2251));
        assert!(d2 >= Duration::from_secs(4) && d2 < Duration::from_millis(4251));
        // 2 * 2^4 = 32s, capped at 30s plus jitter
        assert!(d5 >= Duration::from_secs(30) && d5 < Duration::from_millis(30251));
    }

    #[test]
    fn test_user_agent_pool_is_desktop_only() {
        for ua in USER_AGENTS {
            assert!(ua.starts_with("Mozilla/5.0"));
            assert!(!ua.contains("Mobile"));
        }
    }
}
