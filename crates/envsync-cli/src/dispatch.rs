use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use envsync_core::{
    EnvironmentManifest, SyncConfig, CONFIG_FILE_NAME, CONFIG_PATH_ENV, EXECUTABLE_ENV,
};
use envsync_installer::{CommandRunner, ProcessRunner};
use tracing::info;

use crate::completion::write_completions_script;
use crate::dry_run::DryRunRunner;
use crate::flows::{
    freeze_environment, prune_environment, replicate_environment, sync_environment, PruneOutcome,
    Session, SyncOutcome,
};
use crate::render::{current_output_style, TerminalRenderer};
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let command = cli.command.clone().unwrap_or(Commands::Sync);
    if let Commands::Completions { shell } = command {
        return write_completions_script(shell, &mut io::stdout());
    }

    let renderer = TerminalRenderer::from_style(current_output_style(cli.color));
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let config = load_config(
        cli.config.as_deref(),
        std::env::var_os(CONFIG_PATH_ENV).as_deref(),
        &cwd,
    )?;

    let manifest = load_or_init_manifest(
        &cli.file,
        cli.prefix.as_deref(),
        &config,
        cli.dry_run,
        renderer,
    )?;
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let env = manifest
        .resolve(
            cli.prefix.as_deref(),
            &config.default_prefix,
            &cwd,
            home.as_deref(),
        )
        .with_context(|| format!("failed to load environment from {}", cli.file.display()))?;
    info!(prefix = %env.prefix.display(), "resolved environment");

    let session = Session::new(
        env,
        &config,
        cwd.join(&config.spec_file),
        cli.yes,
        cli.dry_run,
        renderer,
    );

    if cli.dry_run {
        let mut runner = DryRunRunner::new(renderer);
        run_command(&session, &command, &mut runner)?;
        renderer.print_status(
            "dry-run",
            &format!("{} command(s) planned, nothing changed", runner.planned.len()),
        );
        Ok(())
    } else {
        run_command(&session, &command, &mut ProcessRunner)
    }
}

pub(crate) fn run_command(
    session: &Session,
    command: &Commands,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    match command {
        Commands::Sync => match sync_environment(session, runner)? {
            SyncOutcome::Created => session.renderer.print_status(
                "synced",
                &format!("created {}", session.layout.prefix().display()),
            ),
            SyncOutcome::Updated(pruned) => {
                let detail = match pruned {
                    PruneOutcome::NothingToRemove => "nothing pruned".to_string(),
                    PruneOutcome::Removed(plan) => {
                        format!("pruned {} package(s)", plan.removal.len())
                    }
                };
                session.renderer.print_status(
                    "synced",
                    &format!("updated {} ({detail})", session.layout.prefix().display()),
                );
            }
        },
        Commands::Prune { extra } => {
            if !session.layout.exists() {
                session.renderer.print_status(
                    "warning",
                    &format!(
                        "environment prefix does not exist: {}",
                        session.layout.prefix().display()
                    ),
                );
                return Ok(());
            }
            if let PruneOutcome::Removed(plan) = prune_environment(session, runner, extra)? {
                session.renderer.print_status(
                    "pruned",
                    &format!("removed {} package(s)", plan.removal.len()),
                );
            }
        }
        Commands::Freeze => freeze_environment(session, runner)?,
        Commands::Replicate => replicate_environment(session, runner)?,
        Commands::Completions { shell } => write_completions_script(*shell, &mut io::stdout())?,
    }
    Ok(())
}

/// `--config`, then `ENVSYNC_CONFIG`, then `./envsync.toml` when present.
pub(crate) fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<&OsStr>,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(value));
    }
    let local = cwd.join(CONFIG_FILE_NAME);
    local.exists().then_some(local)
}

pub(crate) fn load_config(
    explicit: Option<&Path>,
    env_value: Option<&OsStr>,
    cwd: &Path,
) -> Result<SyncConfig> {
    let mut config = match resolve_config_path(explicit, env_value, cwd) {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            SyncConfig::from_file(&path)?
        }
        None => SyncConfig::default(),
    };
    config.apply_env_overrides(std::env::var(EXECUTABLE_ENV).ok().as_deref());
    Ok(config)
}

/// Reads the manifest, writing a default one first when the file is missing.
pub(crate) fn load_or_init_manifest(
    path: &Path,
    prefix_override: Option<&str>,
    config: &SyncConfig,
    dry_run: bool,
    renderer: TerminalRenderer,
) -> Result<EnvironmentManifest> {
    if !path.exists() {
        let manifest = config.default_manifest(prefix_override);
        if dry_run {
            renderer.print_status("dry-run", &format!("would write {}", path.display()));
            return Ok(manifest);
        }
        fs::write(path, manifest.to_yaml_string()?.as_bytes())
            .with_context(|| format!("failed to write environment manifest: {}", path.display()))?;
        renderer.print_status("init", &format!("wrote {}", path.display()));
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read environment manifest: {}", path.display()))?;
    EnvironmentManifest::from_yaml_str(&raw)
        .with_context(|| format!("failed to load environment manifest: {}", path.display()))
}
