mod config;
mod manifest;
mod record;
mod spec;

pub use config::{SyncConfig, CONFIG_FILE_NAME, CONFIG_PATH_ENV, EXECUTABLE_ENV};
pub use manifest::{resolve_prefix_path, EnvironmentManifest, ResolvedEnvironment};
pub use record::{PackageKey, PackageRecord, DEVELOP_CHANNEL};
pub use spec::{parse_spec, PackageSpec, SpecError};
