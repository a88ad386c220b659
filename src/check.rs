use anyhow::{bail, Context, Result};

use crate::store::SERVICE_SECTION;


/// Identifying attributes of a check on the monitoring service.
///
/// Two specs are equal iff all four attributes agree, where an absent attribute
/// only equals another absent attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSpec {
    pub name: Option<String>,
    /// Space-delimited list of tags.
    pub tags: Option<String>,
    /// Expected time between pings, in seconds.
    pub period: Option<u64>,
    /// Grace time, in seconds.
    pub grace: Option<u64>,
}

impl CheckSpec {

    /// Empty strings are treated as absent.
    pub fn new(name: Option<String>, tags: Option<String>, period: Option<u64>, grace: Option<u64>) -> Self
    {
        Self {
            name: non_empty(name),
            tags: non_empty(tags),
            period,
            grace,
        }
    }

}

fn non_empty(s: Option<String>) -> Option<String>
{
    s.filter(|s| !s.is_empty())
}


/// A check we created earlier, as remembered in the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCheck {
    /// Name of the config section, derived from the ping URL.
    pub section_id: String,
    pub ping_url: String,
    pub spec: CheckSpec,
}

impl CachedCheck {

    pub fn new(ping_url: String, spec: CheckSpec) -> Result<Self>
    {
        let section_id = section_id(&ping_url)?;
        Ok(CachedCheck { section_id, ping_url, spec })
    }

}


/// The section id of a check is the last path segment of its ping URL.
pub fn section_id(ping_url: &str) -> Result<String>
{
    let url = reqwest::Url::parse(ping_url)
        .with_context(|| format!("invalid ping URL {:?}", ping_url))?;
    let Some(id) = url.path_segments().and_then(|segments| segments.filter(|s| !s.is_empty()).last()) else {
        bail!("ping URL {:?} has no path", ping_url);
    };
    if id == SERVICE_SECTION {
        bail!("ping URL {:?} would overwrite the [{}] section", ping_url, SERVICE_SECTION);
    }
    Ok(id.to_string())
}
