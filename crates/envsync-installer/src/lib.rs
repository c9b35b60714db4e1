mod fs_utils;
mod index;
mod invocation;
mod layout;
mod pins;
mod runner;

pub use fs_utils::{remove_file_if_exists, remove_prefix_dir};
pub use index::read_installed_packages;
pub use invocation::{Invocation, PackageManager};
pub use layout::PrefixLayout;
pub use pins::{pin_lines, read_pinned_file, remove_pinned_file, write_pinned_file};
pub use runner::{CommandRunner, ProcessRunner};
