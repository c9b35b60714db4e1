use anyhow::Context;
use serde::Deserialize;

/// Channel label conda assigns to packages installed from local source.
pub const DEVELOP_CHANNEL: &str = "<develop>";

pub type PackageKey = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub build: Option<String>,
    pub channel: String,
    pub depends: Vec<String>,
    pub is_editable_install: bool,
}

#[derive(Debug, Deserialize)]
struct RawPackageRecord {
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    build: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    schannel: Option<String>,
    #[serde(default)]
    depends: Vec<String>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, channel: impl Into<String>, depends: Vec<String>) -> Self {
        let channel = channel.into();
        Self {
            name: name.into(),
            version: String::new(),
            build: None,
            is_editable_install: channel == DEVELOP_CHANNEL,
            channel,
            depends,
        }
    }

    /// Parses one `conda-meta/<key>.json` document.
    pub fn from_json_str(input: &str) -> anyhow::Result<Self> {
        let raw: RawPackageRecord =
            serde_json::from_str(input).context("failed to parse installed package record")?;
        if raw.name.trim().is_empty() {
            anyhow::bail!("installed package record has an empty name");
        }

        let channel = raw.channel.unwrap_or_default();
        let is_editable_install =
            channel == DEVELOP_CHANNEL || raw.schannel.as_deref() == Some(DEVELOP_CHANNEL);
        Ok(Self {
            name: raw.name,
            version: raw.version,
            build: raw.build,
            channel,
            depends: raw.depends,
            is_editable_install,
        })
    }
}
