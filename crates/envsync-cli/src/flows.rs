use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use envsync_core::{ResolvedEnvironment, SyncConfig};
use envsync_graph::{build_graph, collect_keep_roots, plan_prune, PrunePlan};
use envsync_installer::{
    read_installed_packages, remove_pinned_file, remove_prefix_dir, write_pinned_file,
    CommandRunner, PackageManager, PrefixLayout,
};
use tracing::info;

use crate::render::{format_prune_plan_lines, TerminalRenderer};

/// Everything a flow needs to act on one environment.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) env: ResolvedEnvironment,
    pub(crate) layout: PrefixLayout,
    pub(crate) manager: PackageManager,
    pub(crate) protected: Vec<String>,
    pub(crate) spec_file: PathBuf,
    pub(crate) dry_run: bool,
    pub(crate) renderer: TerminalRenderer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PruneOutcome {
    NothingToRemove,
    Removed(PrunePlan),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SyncOutcome {
    Created,
    Updated(PruneOutcome),
}

impl Session {
    pub(crate) fn new(
        env: ResolvedEnvironment,
        config: &SyncConfig,
        spec_file: PathBuf,
        assume_yes: bool,
        dry_run: bool,
        renderer: TerminalRenderer,
    ) -> Self {
        let layout = PrefixLayout::new(env.prefix.clone());
        let manager =
            PackageManager::from_config(config).with_assume_yes(config.assume_yes || assume_yes);
        Self {
            env,
            layout,
            manager,
            protected: config.protected.clone(),
            spec_file,
            dry_run,
            renderer,
        }
    }
}

pub(crate) fn sync_environment(
    session: &Session,
    runner: &mut dyn CommandRunner,
) -> Result<SyncOutcome> {
    if !session.layout.exists() {
        create_environment(session, runner)?;
        return Ok(SyncOutcome::Created);
    }

    let pruned = prune_environment(session, runner, &[])?;
    update_environment(session, runner)?;
    Ok(SyncOutcome::Updated(pruned))
}

pub(crate) fn create_environment(session: &Session, runner: &mut dyn CommandRunner) -> Result<()> {
    session.renderer.print_status(
        "create",
        &format!("creating {}", session.layout.prefix().display()),
    );
    runner.run(&session.manager.create(&session.env))?;
    write_pins(session)
}

/// Removes installed packages that neither the manifest, the protected list
/// nor an editable install still requires.
pub(crate) fn prune_environment(
    session: &Session,
    runner: &mut dyn CommandRunner,
    extra_args: &[String],
) -> Result<PruneOutcome> {
    let installed = read_installed_packages(&session.layout)?;
    let graph = build_graph(&installed).with_context(|| {
        format!(
            "failed to build dependency graph for {}",
            session.layout.prefix().display()
        )
    })?;
    let roots = collect_keep_roots(
        &graph,
        session.env.spec_names(),
        session.protected.iter().map(String::as_str),
    );
    info!(
        roots = %roots.iter().cloned().collect::<Vec<_>>().join(" "),
        "collected keep roots"
    );

    let plan = plan_prune(&graph, &roots);
    session.renderer.print_section("prune");
    session
        .renderer
        .print_lines(&format_prune_plan_lines(&plan));
    if plan.is_empty() {
        return Ok(PruneOutcome::NothingToRemove);
    }

    let invocation = session.manager.remove(
        session.layout.prefix(),
        &session.env.channels,
        &plan.removal,
        extra_args,
    );
    runner
        .run(&invocation)
        .with_context(|| format!("failed to remove {} package(s)", plan.removal.len()))?;
    Ok(PruneOutcome::Removed(plan))
}

/// Installs the manifest specs, then updates under the manifest pins.
///
/// Pins are dropped before the install step so that a changed constraint can
/// move an already pinned package.
pub(crate) fn update_environment(session: &Session, runner: &mut dyn CommandRunner) -> Result<()> {
    session.renderer.print_section("update");
    session.renderer.print_status(
        "update",
        &format!("updating {}", session.layout.prefix().display()),
    );

    if session.dry_run {
        session.renderer.print_status(
            "dry-run",
            &format!("would remove {}", session.layout.pinned_path().display()),
        );
    } else {
        remove_pinned_file(&session.layout)?;
    }

    runner.run(&session.manager.install(&session.env))?;
    write_pins(session)?;
    runner.run(&session.manager.update(&session.env))?;
    Ok(())
}

fn write_pins(session: &Session) -> Result<()> {
    if session.dry_run {
        session.renderer.print_status(
            "dry-run",
            &format!("would write {}", session.layout.pinned_path().display()),
        );
        return Ok(());
    }
    let path = write_pinned_file(&session.layout, &session.env.specs)?;
    info!(path = %path.display(), "wrote pinned specs");
    Ok(())
}

pub(crate) fn freeze_environment(session: &Session, runner: &mut dyn CommandRunner) -> Result<()> {
    if !session.layout.exists() {
        return Err(anyhow!(
            "environment prefix does not exist: {}",
            session.layout.prefix().display()
        ));
    }

    let explicit = runner.capture(&session.manager.list_explicit(session.layout.prefix()))?;
    if session.dry_run {
        session.renderer.print_status(
            "dry-run",
            &format!("would write {}", session.spec_file.display()),
        );
        return Ok(());
    }

    fs::write(&session.spec_file, explicit.as_bytes()).with_context(|| {
        format!(
            "failed to write spec file: {}",
            session.spec_file.display()
        )
    })?;
    session.renderer.print_status(
        "freeze",
        &format!("wrote {}", session.spec_file.display()),
    );
    Ok(())
}

/// Recreates the environment from the explicit spec file written by `freeze`.
pub(crate) fn replicate_environment(
    session: &Session,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    if !session.spec_file.exists() {
        return Err(anyhow!(
            "spec file not found: {} (run `envsync freeze` first)",
            session.spec_file.display()
        ));
    }

    let prefix = session.layout.prefix();
    if session.dry_run {
        if session.layout.exists() {
            session
                .renderer
                .print_status("dry-run", &format!("would delete {}", prefix.display()));
        }
    } else if remove_prefix_dir(prefix)
        .with_context(|| format!("failed to delete environment: {}", prefix.display()))?
    {
        session
            .renderer
            .print_status("removed", &format!("deleted {}", prefix.display()));
    }

    runner.run(
        &session
            .manager
            .create_from_file(prefix, &session.spec_file),
    )
}
