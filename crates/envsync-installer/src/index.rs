use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use envsync_core::{PackageKey, PackageRecord};
use tracing::debug;

use crate::PrefixLayout;

/// Reads every `conda-meta/<key>.json` record of the environment.
///
/// A prefix without a `conda-meta` directory has nothing installed.
pub fn read_installed_packages(layout: &PrefixLayout) -> Result<BTreeMap<PackageKey, PackageRecord>> {
    let dir = layout.conda_meta_dir();
    if !dir.exists() {
        return Ok(BTreeMap::new());
    }

    let mut records = BTreeMap::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read installed package index: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|v| v.to_str()) != Some("json") {
            continue;
        }

        let Some(key) = path.file_stem().and_then(|v| v.to_str()) else {
            continue;
        };
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read installed package: {}", path.display()))?;
        let record = PackageRecord::from_json_str(&raw)
            .with_context(|| format!("failed to parse installed package: {}", path.display()))?;
        records.insert(key.to_string(), record);
    }

    debug!(
        prefix = %layout.prefix().display(),
        packages = records.len(),
        "read installed package index"
    );
    Ok(records)
}
