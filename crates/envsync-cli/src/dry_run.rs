use anyhow::Result;
use envsync_installer::{CommandRunner, Invocation};

use crate::render::TerminalRenderer;

/// Prints invocations instead of running them.
pub(crate) struct DryRunRunner {
    renderer: TerminalRenderer,
    pub(crate) planned: Vec<Invocation>,
}

impl DryRunRunner {
    pub(crate) fn new(renderer: TerminalRenderer) -> Self {
        Self {
            renderer,
            planned: Vec::new(),
        }
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        self.renderer
            .print_status("dry-run", &format!("would run: {invocation}"));
        self.planned.push(invocation.clone());
        Ok(())
    }

    fn capture(&mut self, invocation: &Invocation) -> Result<String> {
        self.run(invocation)?;
        Ok(String::new())
    }
}
