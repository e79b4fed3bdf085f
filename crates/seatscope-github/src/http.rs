//! HTTP plumbing for the GitHub REST API.
//!
//! Provides a thin client over reqwest with bearer authentication, the
//! GitHub media-type and API-version headers, retry with exponential
//! backoff, `Retry-After` handling on secondary rate limits, a local
//! request rate limiter, and page-numbered pagination.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::GithubConfig;
use crate::error::{SourceError, SourceResult};
use crate::token::SecureToken;

/// Type alias for the rate limiter.
type RateLimiterType = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Local request-rate configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per period.
    pub max_requests: u32,
    /// Period duration.
    pub period: Duration,
    /// Maximum burst size.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            period: Duration::from_secs(60),
            burst_size: 10,
        }
    }
}

/// GitHub REST client. Tokens are supplied per request so one client can
/// serve several organizations with different credentials.
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
    rate_limiter: Option<Arc<RateLimiterType>>,
}

impl GithubClient {
    /// Creates a client with the default local rate limit.
    pub fn new(config: GithubConfig) -> SourceResult<Self> {
        Self::with_rate_limit(config, Some(RateLimitConfig::default()))
    }

    /// Creates a client with an explicit (or no) local rate limit.
    pub fn with_rate_limit(
        config: GithubConfig,
        rate_limit: Option<RateLimitConfig>,
    ) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::ConfigError(e.to_string()))?;

        let rate_limiter = rate_limit.map(|rl| {
            let quota = Quota::with_period(rl.period / rl.max_requests)
                .unwrap_or_else(|| Quota::per_minute(NonZeroU32::MIN))
                .allow_burst(NonZeroU32::new(rl.burst_size).unwrap_or(NonZeroU32::MIN));
            Arc::new(GovernorRateLimiter::direct(quota))
        });

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Builds a URL from a path.
    pub fn build_url(&self, path: &str) -> String {
        let base = self.config.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Executes a GET request with retry logic.
    pub async fn get(
        &self,
        token: &SecureToken,
        path: &str,
        query: &[(&str, String)],
    ) -> SourceResult<Response> {
        let url = self.build_url(path);

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let mut last_error = None;
        let mut delay = Duration::from_millis(100);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retry attempt {} after {:?}", attempt, delay);
                sleep(delay).await;
                // Exponential backoff with jitter
                delay = std::cmp::min(delay * 2 + jitter(), Duration::from_secs(30));
            }

            let request = self
                .client
                .get(&url)
                .header("Authorization", format!("Bearer {}", token.expose_secret()))
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", &self.config.api_version)
                .header("User-Agent", "seatscope")
                .query(query);

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);

                        warn!("Rate limited, waiting {} seconds", retry_after);

                        if attempt < self.config.max_retries {
                            sleep(Duration::from_secs(retry_after)).await;
                            continue;
                        }

                        return Err(SourceError::RateLimited(retry_after));
                    }

                    if status.is_server_error() && attempt < self.config.max_retries {
                        warn!("Server error {}, retrying...", status);
                        last_error = Some(SourceError::RequestFailed(format!(
                            "Server error: {}",
                            status
                        )));
                        continue;
                    }

                    if status.is_client_error() {
                        return Err(map_client_error(status, &url));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(SourceError::Timeout(e.to_string()));
                    } else if e.is_connect() {
                        last_error = Some(SourceError::ConnectionFailed(e.to_string()));
                    } else {
                        last_error = Some(SourceError::RequestFailed(e.to_string()));
                    }

                    if attempt >= self.config.max_retries {
                        break;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| SourceError::RequestFailed("Unknown error".to_string())))
    }

    /// Executes a GET request and deserializes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        token: &SecureToken,
        path: &str,
        query: &[(&str, String)],
    ) -> SourceResult<T> {
        let response = self.get(token, path, query).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| {
            SourceError::InvalidResponse(format!(
                "Failed to parse response (status {}): {} - Body: {}",
                status,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Fetches every page of a list endpoint whose body is a JSON array,
    /// stopping at the first short page.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        token: &SecureToken,
        path: &str,
        query: &[(&str, String)],
    ) -> SourceResult<Vec<T>> {
        let per_page = self.config.per_page;
        let mut items = Vec::new();

        for page in 1u32.. {
            let mut page_query: Vec<(&str, String)> = query.to_vec();
            page_query.push(("per_page", per_page.to_string()));
            page_query.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(token, path, &page_query).await?;
            let batch_len = batch.len();
            items.extend(batch);

            if batch_len < per_page as usize {
                break;
            }
        }

        debug!(path, items = items.len(), "fetched all pages");
        Ok(items)
    }

    /// Page size used by [`Self::get_all_pages`]; exposed so callers with
    /// envelope-shaped responses can run the same loop themselves.
    pub fn per_page(&self) -> u32 {
        self.config.per_page
    }
}

fn map_client_error(status: StatusCode, url: &str) -> SourceError {
    match status {
        StatusCode::UNAUTHORIZED => SourceError::AuthenticationFailed("Unauthorized".into()),
        StatusCode::FORBIDDEN => SourceError::AuthorizationDenied("Forbidden".into()),
        StatusCode::NOT_FOUND => SourceError::NotFound(format!("Resource not found: {}", url)),
        _ => SourceError::RequestFailed(format!("Client error: {}", status)),
    }
}

/// Generate a small random jitter for exponential backoff.
fn jitter() -> Duration {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::time::Instant::now().hash(&mut hasher);
    Duration::from_millis(hasher.finish() % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let client = GithubClient::new(GithubConfig::default()).unwrap();
        assert_eq!(
            client.build_url("/orgs/acme/teams"),
            "https://api.github.com/orgs/acme/teams"
        );
        assert_eq!(
            client.build_url("orgs/acme/teams"),
            "https://api.github.com/orgs/acme/teams"
        );
    }

    #[test]
    fn test_client_error_mapping() {
        assert!(matches!(
            map_client_error(StatusCode::UNAUTHORIZED, "u"),
            SourceError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            map_client_error(StatusCode::FORBIDDEN, "u"),
            SourceError::AuthorizationDenied(_)
        ));
        assert!(matches!(
            map_client_error(StatusCode::NOT_FOUND, "u"),
            SourceError::NotFound(_)
        ));
    }

    #[test]
    fn test_rate_limit_config_default() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.period, Duration::from_secs(60));
        assert_eq!(config.burst_size, 10);
    }
}
