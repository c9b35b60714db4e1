use std::fmt;
use std::path::Path;

use envsync_core::{ResolvedEnvironment, SyncConfig};

/// A package-manager command line, passed as argv without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// The subcommand (`install`, `remove`, ...), used in progress and error text.
    pub fn operation(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_shell_word(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote_shell_word(arg))?;
        }
        Ok(())
    }
}

fn quote_shell_word(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_./:=+,@".contains(ch));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\"'\"'"))
    }
}

/// Builds the argument lists for every environment change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    executable: String,
    strict_channel_priority: bool,
    assume_yes: bool,
}

impl PackageManager {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            strict_channel_priority: true,
            assume_yes: false,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            strict_channel_priority: config.strict_channel_priority,
            assume_yes: config.assume_yes,
        }
    }

    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    pub fn create(&self, env: &ResolvedEnvironment) -> Invocation {
        let invocation = Invocation::new(&self.executable)
            .arg("create")
            .arg("--no-default-packages");
        self.with_environment_args(invocation, env)
    }

    pub fn install(&self, env: &ResolvedEnvironment) -> Invocation {
        let invocation = Invocation::new(&self.executable).arg("install");
        self.with_environment_args(invocation, env)
    }

    pub fn update(&self, env: &ResolvedEnvironment) -> Invocation {
        let invocation = Invocation::new(&self.executable).arg("update");
        self.with_environment_args(invocation, env)
    }

    pub fn remove(
        &self,
        prefix: &Path,
        channels: &[String],
        names: &[String],
        extra_args: &[String],
    ) -> Invocation {
        let mut invocation = Invocation::new(&self.executable)
            .arg("remove")
            .arg("--no-pin")
            .arg("--use-index-cache")
            .arg("--override-channels");
        if self.assume_yes {
            invocation = invocation.arg("--yes");
        }
        invocation
            .args(channel_args(channels))
            .arg("--prefix")
            .arg(prefix.display().to_string())
            .args(extra_args.iter().cloned())
            .args(names.iter().cloned())
    }

    pub fn list_explicit(&self, prefix: &Path) -> Invocation {
        Invocation::new(&self.executable)
            .arg("list")
            .arg("--prefix")
            .arg(prefix.display().to_string())
            .arg("--explicit")
    }

    pub fn create_from_file(&self, prefix: &Path, spec_file: &Path) -> Invocation {
        let mut invocation = Invocation::new(&self.executable).arg("create");
        if self.assume_yes {
            invocation = invocation.arg("--yes");
        }
        invocation
            .arg("--prefix")
            .arg(prefix.display().to_string())
            .arg("--file")
            .arg(spec_file.display().to_string())
    }

    fn with_environment_args(
        &self,
        mut invocation: Invocation,
        env: &ResolvedEnvironment,
    ) -> Invocation {
        if self.assume_yes {
            invocation = invocation.arg("--yes");
        }
        invocation = invocation
            .arg("--prefix")
            .arg(env.prefix.display().to_string())
            .arg("--override-channels");
        if self.strict_channel_priority {
            invocation = invocation.arg("--strict-channel-priority");
        }
        invocation
            .args(channel_args(&env.channels))
            .args(env.specs.iter().map(ToString::to_string))
    }
}

fn channel_args(channels: &[String]) -> Vec<String> {
    channels
        .iter()
        .flat_map(|channel| ["-c".to_string(), channel.clone()])
        .collect()
}
