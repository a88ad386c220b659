use std::time::Duration;

use anyhow::{Context, Result};

pub use cfg::{Settings, DEFAULT_API_URL};

pub mod api;
pub mod check;
pub mod ping;
pub mod store;
pub mod workflow;
mod cfg;


/// Sent as User-Agent with every request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);


/// HTTP client shared by the API client and the pinger.
pub fn http_client() -> Result<reqwest::Client>
{
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context("unable to create HTTP client")
}
