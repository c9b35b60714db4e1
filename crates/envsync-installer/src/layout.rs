use std::path::{Path, PathBuf};

/// Paths inside a conda-style environment prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixLayout {
    prefix: PathBuf,
}

impl PrefixLayout {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn exists(&self) -> bool {
        self.prefix.exists()
    }

    pub fn conda_meta_dir(&self) -> PathBuf {
        self.prefix.join("conda-meta")
    }

    pub fn pinned_path(&self) -> PathBuf {
        self.conda_meta_dir().join("pinned")
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.conda_meta_dir().join(format!("{key}.json"))
    }
}
