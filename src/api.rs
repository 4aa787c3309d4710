//! Blocking HTTP client shared by the hosted backends.
//!
//! Wraps a `reqwest` blocking client with basic authentication, a
//! per-attempt timeout and a bounded exponential backoff for rate-limited
//! responses. HTTP statuses are mapped onto the crate's error taxonomy:
//!
//! | Status | Error |
//! |---|---|
//! | 401, 403, 203 | `Authorization` |
//! | 404 | `NotFound` |
//! | 429 | retried, then `Transport` |
//! | anything else unsuccessful | `Transport` |
//!
//! A body that does not decode into the expected type is a `Parse` error.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::source::SourceSpec;

/// Backoff settings for rate-limited requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// The delay before the next attempt, doubling from the initial backoff
    /// and capped at the maximum. `attempt` counts from 1.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }
}

/// Transport options taken from the command line.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Extra PEM CA certificate to trust
    pub ca_cert: Option<PathBuf>,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            ca_cert: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// A decoded response body together with the response headers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub body: T,
    pub headers: HeaderMap,
}

/// Authenticated JSON client for one backend.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(spec: &SourceSpec, options: &ClientOptions) -> Result<Self> {
        let base_url = Url::parse(&spec.url).map_err(|e| {
            Error::config(format!("Invalid base URL '{}': {}", spec.url, e))
        })?;

        let mut builder = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("active-contributors/", env!("CARGO_PKG_VERSION")));

        if let Some(path) = &options.ca_cert {
            let pem = fs::read(path).map_err(|e| {
                Error::config(format!("Cannot read CA certificate {}: {}", path.display(), e))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                Error::config(format!("Invalid CA certificate {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        let (username, password) = spec.basic_auth();

        Ok(Self {
            client,
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            retry: options.retry.clone(),
        })
    }

    /// Builds `base/segment/segment/...`, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("Base URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetches and decodes one JSON document.
    ///
    /// Rate-limited responses are retried according to the retry policy;
    /// `target` names the repository or discovery target in errors.
    pub fn get_json<T: DeserializeOwned>(&self, url: &Url, target: &str) -> Result<ApiResponse<T>> {
        for attempt in 1..=self.retry.max_attempts {
            debug!("GET {} (attempt {})", url, attempt);

            let response = self
                .client
                .get(url.clone())
                .basic_auth(&self.username, Some(&self.password))
                .header(ACCEPT, "application/json")
                .send()
                .map_err(|e| transport_error(target, &e))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt == self.retry.max_attempts {
                    break;
                }
                let backoff = self.retry.backoff_for(attempt);
                let wait = retry_after(&response)
                    .filter(|d| *d < self.retry.max_backoff)
                    .unwrap_or(backoff);
                warn!(
                    "Rate limited while fetching {}, retrying in {:.1}s",
                    target,
                    wait.as_secs_f64()
                );
                thread::sleep(wait);
                continue;
            }

            check_status(status, url, target)?;

            let headers = response.headers().clone();
            let text = response.text().map_err(|e| transport_error(target, &e))?;
            let body = serde_json::from_str(&text).map_err(|e| Error::Parse {
                target: target.to_string(),
                message: format!("Unexpected response from {}: {}", url, e),
            })?;

            return Ok(ApiResponse { body, headers });
        }

        Err(Error::Transport {
            target: target.to_string(),
            message: format!(
                "Still rate limited after {} attempts",
                self.retry.max_attempts
            ),
        })
    }
}

fn check_status(status: StatusCode, url: &Url, target: &str) -> Result<()> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NON_AUTHORITATIVE_INFORMATION => {
            Err(Error::Authorization {
                target: target.to_string(),
                message: format!("HTTP {} from {}; check the token and its permissions", status, url),
            })
        }
        StatusCode::NOT_FOUND => Err(Error::NotFound {
            target: target.to_string(),
            message: format!("HTTP {} from {}", status, url),
        }),
        s if s.is_success() => Ok(()),
        s => Err(Error::Transport {
            target: target.to_string(),
            message: format!("HTTP {} from {}", s, url),
        }),
    }
}

fn transport_error(target: &str, e: &reqwest::Error) -> Error {
    let message = if e.is_timeout() {
        format!("Request timed out: {}", e)
    } else {
        e.to_string()
    };
    Error::Transport {
        target: target.to_string(),
        message,
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
