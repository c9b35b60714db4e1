use std::fs;
use std::io;
use std::path::Path;

pub fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Deletes an environment prefix directory tree; a missing prefix is a no-op.
pub fn remove_prefix_dir(path: &Path) -> io::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path)?;
    Ok(true)
}
