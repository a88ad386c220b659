use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

use crate::store::ConfigStore;


pub const DEFAULT_API_URL: &str = "https://healthchecks.io";


/// Settings for a single invocation.
#[derive(Clone)]
pub struct Settings {
    /// Location of the config file.
    pub config_path: PathBuf,
    /// Base URL of the monitoring service.
    pub api_url: String,
    /// API key given on the command line. Takes precedence over the saved key.
    pub api_key: Option<String>,
}

impl Settings {

    /// Settings for the default service. Without a path, the config file is `~/.hchk`.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self>
    {
        let config_path =
            match config_path {
                Some(path) => path,
                None => ConfigStore::default_path()?,
            };
        Ok(Self {
            config_path,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
        })
    }

    pub fn store(&self) -> ConfigStore
    {
        ConfigStore::new(&self.config_path)
    }

}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Settings")
            .field("config_path", &self.config_path)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
