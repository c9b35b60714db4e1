use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::spec::{parse_spec, PackageSpec};

/// The declarative environment file (`environment.yml`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EnvironmentManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    pub prefix: PathBuf,
    pub channels: Vec<String>,
    pub specs: Vec<PackageSpec>,
}

impl EnvironmentManifest {
    pub fn from_yaml_str(input: &str) -> anyhow::Result<Self> {
        let manifest: Option<Self> =
            serde_yaml::from_str(input).context("failed to parse environment manifest")?;
        Ok(manifest.unwrap_or_default())
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("failed to serialize environment manifest")
    }

    pub fn parsed_specs(&self) -> anyhow::Result<Vec<PackageSpec>> {
        self.dependencies
            .iter()
            .map(|dependency| {
                parse_spec(dependency).context("invalid dependency in environment manifest")
            })
            .collect()
    }

    /// Picks the prefix (`override` > manifest > `default_prefix`), expands a
    /// leading `~/` against `home` and anchors relative paths at `cwd`.
    pub fn resolve(
        &self,
        prefix_override: Option<&str>,
        default_prefix: &str,
        cwd: &Path,
        home: Option<&Path>,
    ) -> anyhow::Result<ResolvedEnvironment> {
        let raw_prefix = prefix_override
            .or(self.prefix.as_deref())
            .unwrap_or(default_prefix);
        let prefix = resolve_prefix_path(raw_prefix, cwd, home)?;
        Ok(ResolvedEnvironment {
            prefix,
            channels: self.channels.clone(),
            specs: self.parsed_specs()?,
        })
    }
}

impl ResolvedEnvironment {
    pub fn spec_names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.name.as_str())
    }
}

pub fn resolve_prefix_path(raw: &str, cwd: &Path, home: Option<&Path>) -> anyhow::Result<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("environment prefix must not be empty"));
    }

    let path = if trimmed.contains('~') {
        let Some(rest) = trimmed.strip_prefix("~/") else {
            return Err(anyhow!(
                "environment prefix may only use '~' as a leading '~/': {trimmed}"
            ));
        };
        let home = home.ok_or_else(|| anyhow!("HOME is not set; cannot expand prefix {trimmed}"))?;
        home.join(rest)
    } else {
        PathBuf::from(trimmed)
    };

    let anchored = if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    };
    Ok(anchored
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect())
}
