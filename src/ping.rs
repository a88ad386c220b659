use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, error, warn};


/// Timeout of a single ping request.
pub const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Number of ping attempts before giving up.
pub const MAX_ATTEMPTS: u32 = 5;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingResult {
    Success,
    /// The service does not know the check (HTTP 400).
    NotFound,
    /// All attempts failed.
    Failed,
}

/// Reason for a failed ping attempt. All of these are retried.
#[derive(Debug, Error)]
pub enum PingError {
    #[error("connection timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(reqwest::Error),
    #[error("request failed: {0}")]
    Request(reqwest::Error),
    #[error("received HTTP status {}", .0.as_u16())]
    UnexpectedStatus(StatusCode),
}

impl From<reqwest::Error> for PingError {
    fn from(e: reqwest::Error) -> Self
    {
        if e.is_timeout() {
            PingError::Timeout
        } else if e.is_connect() {
            PingError::Connection(e)
        } else {
            PingError::Request(e)
        }
    }
}


pub trait Sleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()>
    {
        tokio::time::sleep(delay)
    }
}


/// Delay after the given failed attempt (counting from 0): 1s, 2s, 4s, ...
pub fn backoff_delay(attempt: u32) -> Duration
{
    Duration::from_secs(1 << attempt)
}


pub struct Pinger<S = TokioSleeper> {
    http: reqwest::Client,
    sleeper: S,
    timeout: Duration,
}

impl<S: Sleeper> Pinger<S> {

    pub fn new(http: reqwest::Client, sleeper: S) -> Self
    {
        Pinger { http, sleeper, timeout: PING_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self
    {
        self.timeout = timeout;
        self
    }

    /// Ping the URL, retrying with exponential backoff on transient failures.
    ///
    /// A "not found" response is returned as-is; recreating the check is up to the caller.
    pub async fn ping(&self, ping_url: &str) -> PingResult
    {
        for attempt in 0..MAX_ATTEMPTS {
            let e =
                match self.attempt(ping_url).await {
                    Ok(result) => return result,
                    Err(e) => e,
                };
            let delay = backoff_delay(attempt);
            warn!("ping attempt {}/{} failed: {}; backing off for {}",
                attempt + 1, MAX_ATTEMPTS, e, humantime::Duration::from(delay));
            self.sleeper.sleep(delay).await;
        }
        error!("exceeded max retries, giving up on {}", ping_url);
        PingResult::Failed
    }

    /// A single ping request, without retries.
    pub async fn attempt(&self, ping_url: &str) -> Result<PingResult, PingError>
    {
        let response = self.http.get(ping_url)
            .timeout(self.timeout)
            .send().await?;
        let status = response.status();
        debug!("ping {}: {}", ping_url, status);
        match status {
            StatusCode::OK => Ok(PingResult::Success),
            StatusCode::BAD_REQUEST => Ok(PingResult::NotFound),
            _ => Err(PingError::UnexpectedStatus(status)),
        }
    }

}
