use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hchk::check::CheckSpec;
use hchk::{Settings, DEFAULT_API_URL};

/// A CLI interface to healthchecks.io
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Options {
    /// Config file holding the API key and the known checks [default: ~/.hchk]
    #[arg(long = "config", env = "HCHK_CONFIG", global = true)]
    pub config_path: Option<PathBuf>,

    /// Base URL of the monitoring service.
    #[arg(long, env = "HCHK_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Options {
    /// Parse CLI options. Exit on failure.
    pub fn parse() -> Self
    {
        <Self as Parser>::parse()
    }

    pub fn settings(&self, api_key: Option<&str>) -> Result<Settings>
    {
        let mut settings = Settings::new(self.config_path.clone())?;
        settings.api_url = self.api_url.clone();
        settings.api_key = api_key.filter(|key| !key.is_empty()).map(str::to_string);
        Ok(settings)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a check if necessary, then ping it.
    Ping(PingOptions),
    /// Save the API key in the config file.
    Setkey(SetkeyOptions),
}

#[derive(Parser, Debug)]
pub struct PingOptions {
    /// Name for the new check.
    #[arg(short, long)]
    pub name: Option<String>,
    /// Space-delimited list of tags for the new check.
    #[arg(short, long)]
    pub tags: Option<String>,
    /// Period, a number of seconds or a duration such as "1h".
    #[arg(short, long, value_parser = parse_seconds)]
    pub period: Option<u64>,
    /// Grace time, a number of seconds or a duration such as "15m".
    #[arg(short, long, value_parser = parse_seconds)]
    pub grace: Option<u64>,
    /// API key to use instead of the saved one.
    #[arg(long, env = "HCHK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl PingOptions {
    pub fn spec(&self) -> CheckSpec
    {
        CheckSpec::new(self.name.clone(), self.tags.clone(), self.period, self.grace)
    }
}

#[derive(Parser, Debug)]
pub struct SetkeyOptions {
    /// The API key of your healthchecks.io project.
    pub api_key: String,
}

fn parse_seconds(s: &str) -> Result<u64>
{
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    let duration = humantime::parse_duration(s)
        .context("expected a number of seconds or a duration")?;
    Ok(duration.as_secs())
}
