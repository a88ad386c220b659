use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::check::{CachedCheck, CheckSpec};

mod legacy;


/// Name of the reserved section holding the API key.
pub const SERVICE_SECTION: &str = "hchk";

/// File name of the config file in the user's home directory.
pub const CONFIG_FILE_NAME: &str = ".hchk";


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ServiceSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    /// Keys added by hand.
    #[serde(flatten)]
    extra: toml::Table,
}

/// On-disk form of a cached check.
#[derive(Debug, Serialize, Deserialize)]
struct CheckSection {
    ping_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grace: Option<u64>,
    #[serde(flatten)]
    extra: toml::Table,
}

impl CheckSection {

    fn new(check: &CachedCheck, extra: &toml::Table) -> Self
    {
        CheckSection {
            ping_url: check.ping_url.clone(),
            name: check.spec.name.clone(),
            tags: check.spec.tags.clone(),
            period: check.spec.period,
            grace: check.spec.grace,
            extra: extra.clone(),
        }
    }

    fn into_section(self, section_id: String) -> Section
    {
        let spec = CheckSpec::new(self.name, self.tags, self.period, self.grace);
        let check = CachedCheck { section_id, ping_url: self.ping_url, spec };
        Section::Check(check, self.extra)
    }

}


#[derive(Debug, Clone, PartialEq)]
enum Section {
    Service(ServiceSection),
    Check(CachedCheck, toml::Table),
    /// A section we don't understand. It is written back unchanged.
    Opaque(String, toml::Value),
}

impl Section {
    fn name(&self) -> &str
    {
        match self {
            Section::Service(_) => SERVICE_SECTION,
            Section::Check(check, _) => &check.section_id,
            Section::Opaque(name, _) => name,
        }
    }
}


/// Contents of the config file, in file order.
///
/// At most one cached check matches any given spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    sections: Vec<Section>,
}

impl Config {

    /// Parse TOML, or the INI dialect written by earlier versions of hchk.
    pub fn parse(text: &str) -> Result<Self>
    {
        let table =
            match text.parse::<toml::Table>() {
                Ok(table) => table,
                Err(toml_error) =>
                    match legacy::parse(text) {
                        Ok(table) => {
                            debug!("config file is in the legacy INI format");
                            table
                        }
                        Err(_) => return Err(toml_error).context("invalid config file syntax"),
                    },
            };

        let mut config = Config::default();
        for (name, value) in table {
            let section =
                if name == SERVICE_SECTION {
                    let service = value.try_into::<ServiceSection>()
                        .with_context(|| format!("invalid section [{}]", name))?;
                    Section::Service(service)
                } else {
                    match value.clone().try_into::<CheckSection>() {
                        Ok(record) => record.into_section(name),
                        Err(e) => {
                            warn!("ignoring config section [{}]: {}", name, e);
                            Section::Opaque(name, value)
                        }
                    }
                };
            config.sections.push(section);
        }
        Ok(config)
    }

    /// Comments are not preserved.
    pub fn to_toml(&self) -> Result<String>
    {
        let mut table = toml::Table::new();
        for section in &self.sections {
            let value =
                match section {
                    Section::Service(service) => toml::Value::try_from(service)?,
                    Section::Check(check, extra) => toml::Value::try_from(CheckSection::new(check, extra))?,
                    Section::Opaque(_, value) => value.clone(),
                };
            table.insert(section.name().to_string(), value);
        }
        Ok(toml::to_string(&table)?)
    }

    pub fn api_key(&self) -> Option<&str>
    {
        self.sections.iter()
            .find_map(|section| match section {
                Section::Service(service) => service.api_key.as_deref(),
                _ => None,
            })
            .filter(|key| !key.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: &str)
    {
        let service = self.sections.iter_mut().find_map(|section| match section {
            Section::Service(service) => Some(service),
            _ => None,
        });
        if let Some(service) = service {
            service.api_key = Some(api_key.to_string());
            return;
        }
        self.sections.push(Section::Service(ServiceSection {
            api_key: Some(api_key.to_string()),
            extra: toml::Table::new(),
        }));
    }

    pub fn checks(&self) -> Vec<&CachedCheck>
    {
        self.sections.iter()
            .filter_map(|section| match section {
                Section::Check(check, _) => Some(check),
                _ => None,
            })
            .collect()
    }

    /// Returns the cached check whose spec equals `spec`, if any.
    pub fn find(&self, spec: &CheckSpec) -> Option<&CachedCheck>
    {
        self.checks().into_iter().find(|check| &check.spec == spec)
    }

    /// Inserts `check`, replacing every section with the same spec or the same section id.
    /// The new check takes the place of the first replaced section.
    pub fn upsert(&mut self, check: CachedCheck)
    {
        let replaces = |section: &Section| match section {
            Section::Check(other, _) => other.spec == check.spec || other.section_id == check.section_id,
            Section::Opaque(name, _) => name == &check.section_id,
            Section::Service(_) => false,
        };

        let position = self.sections.iter().position(&replaces);
        let extra = self.sections.iter()
            .find_map(|section| match section {
                Section::Check(other, extra) if other.section_id == check.section_id => Some(extra.clone()),
                _ => None,
            })
            .unwrap_or_default();

        self.sections.retain(|section| {
            let replaced = replaces(section);
            if replaced {
                debug!("removing config section [{}]", section.name());
            }
            !replaced
        });

        let section = Section::Check(check, extra);
        match position {
            Some(index) => self.sections.insert(index, section),
            None => self.sections.push(section),
        }
    }

}


/// The config file on disk.
///
/// There is no locking: concurrent invocations race and the last writer wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {

    pub fn new(path: impl Into<PathBuf>) -> Self
    {
        ConfigStore { path: path.into() }
    }

    /// `~/.hchk`
    pub fn default_path() -> Result<PathBuf>
    {
        let home = dirs::home_dir().context("unable to determine home directory")?;
        Ok(home.join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Load the config file. A missing file is an empty config.
    pub fn load(&self) -> Result<Config>
    {
        let text =
            match fs::read_to_string(&self.path) {
                Ok(text) => text,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("config file {:?} does not exist yet", self.path);
                    return Ok(Config::default());
                }
                Err(e) =>
                    return Err(e).with_context(|| format!("unable to read config file {:?}", self.path)),
            };
        Config::parse(&text)
            .with_context(|| format!("unable to parse config file {:?}", self.path))
    }

    pub fn save(&self, config: &Config) -> Result<()>
    {
        let text = config.to_toml()?;
        fs::write(&self.path, text)
            .with_context(|| format!("unable to write config file {:?}", self.path))?;
        debug!("saved config file {:?}", self.path);
        Ok(())
    }

    pub fn get_api_key(&self) -> Result<Option<String>>
    {
        Ok(self.load()?.api_key().map(str::to_string))
    }

    pub fn set_api_key(&self, api_key: &str) -> Result<()>
    {
        let mut config = self.load()?;
        config.set_api_key(api_key);
        self.save(&config)
    }

}
