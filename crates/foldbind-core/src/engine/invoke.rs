use super::error::EngineError;
use crate::core::process::{ProcessOutput, ProcessRunner, StdioMode};
use crate::core::tools::{Locator, ToolSpec, ToolVars};
use std::path::PathBuf;
use tracing::{debug, info};

/// Locates and runs a single [`ToolSpec`].
///
/// The invoker does not look at what the tool produced; callers check the
/// output contract themselves.
pub struct ToolInvoker<'a> {
    runner: &'a dyn ProcessRunner,
    locator: &'a Locator,
}

impl<'a> ToolInvoker<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, locator: &'a Locator) -> Self {
        Self { runner, locator }
    }

    pub fn locate(&self, tool: &ToolSpec) -> Result<PathBuf, EngineError> {
        tool.locate(self.locator)
            .map_err(|unavailable| EngineError::ToolUnavailable {
                tool: tool.display_name.clone(),
                reason: unavailable.reason,
                hint: tool.install_hint.clone(),
            })
    }

    /// Runs `tool` from an already located entry point.
    pub fn run_located(
        &self,
        tool: &ToolSpec,
        entry_point: &std::path::Path,
        vars: &ToolVars,
        stdio: StdioMode,
    ) -> Result<ProcessOutput, EngineError> {
        let mut command = tool.command(entry_point, vars)?;
        command.stdio = stdio;
        info!("Running {}: {}", tool.display_name, command);
        let output = self
            .runner
            .run(&command)
            .map_err(|source| EngineError::Execution {
                tool: tool.display_name.clone(),
                source,
            })?;
        debug!("{} finished successfully.", tool.display_name);
        Ok(output)
    }

    /// Locates `tool` and runs it.
    pub fn run(
        &self,
        tool: &ToolSpec,
        vars: &ToolVars,
        stdio: StdioMode,
    ) -> Result<ProcessOutput, EngineError> {
        let entry_point = self.locate(tool)?;
        self.run_located(tool, &entry_point, vars, stdio)
    }
}
