use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use envsync_core::PackageSpec;

use crate::fs_utils::remove_file_if_exists;
use crate::PrefixLayout;

/// Pin lines for the specs that carry a channel or a version constraint.
pub fn pin_lines(specs: &[PackageSpec]) -> Vec<String> {
    specs
        .iter()
        .filter(|spec| spec.is_constrained())
        .map(ToString::to_string)
        .collect()
}

pub fn write_pinned_file(layout: &PrefixLayout, specs: &[PackageSpec]) -> Result<PathBuf> {
    let pin_path = layout.pinned_path();
    if let Some(parent) = pin_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create pin dir: {}", parent.display()))?;
    }

    let mut payload = String::new();
    for line in pin_lines(specs) {
        payload.push_str(&line);
        payload.push('\n');
    }

    fs::write(&pin_path, payload.as_bytes())
        .with_context(|| format!("failed to write pins: {}", pin_path.display()))?;
    Ok(pin_path)
}

pub fn read_pinned_file(layout: &PrefixLayout) -> Result<Vec<String>> {
    let pin_path = layout.pinned_path();
    if !pin_path.exists() {
        return Ok(Vec::new());
    }

    let value = fs::read_to_string(&pin_path)
        .with_context(|| format!("failed to read pins: {}", pin_path.display()))?;
    Ok(value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect())
}

pub fn remove_pinned_file(layout: &PrefixLayout) -> Result<bool> {
    let pin_path = layout.pinned_path();
    if !pin_path.exists() {
        return Ok(false);
    }

    remove_file_if_exists(&pin_path)
        .with_context(|| format!("failed to remove pins: {}", pin_path.display()))?;
    Ok(true)
}
