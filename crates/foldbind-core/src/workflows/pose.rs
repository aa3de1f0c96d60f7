use crate::core::inputs::JobDescriptor;
use crate::core::process::{ProcessRunner, StdioMode};
use crate::core::tools::{Locator, ToolSpec, ToolVars};
use crate::engine::error::EngineError;
use crate::engine::invoke::ToolInvoker;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Runs one pose predictor for `job`, writing its pose to `output`.
///
/// Inputs are passed to the tool as given; checking them is left to the tool
/// or to the dispatcher that called this wrapper. The tool's terminal output
/// is not captured.
#[instrument(skip_all, name = "pose_tool", fields(tool = %tool.key))]
pub fn run(
    tool: &ToolSpec,
    job: &JobDescriptor,
    output: &Path,
    locator: &Locator,
    runner: &dyn ProcessRunner,
) -> Result<PathBuf, EngineError> {
    let ligand = job.require_ligand()?;
    let invoker = ToolInvoker::new(runner, locator);
    let entry_point = invoker.locate(tool)?;

    let output_dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);
    if let Some(dir) = &output_dir {
        fs::create_dir_all(dir)?;
    }

    let vars = ToolVars {
        protein: Some(job.protein().to_path_buf()),
        ligand: Some(ligand.to_path_buf()),
        output: Some(output.to_path_buf()),
        output_dir: Some(output_dir.unwrap_or_else(|| PathBuf::from("."))),
        config: None,
    };
    invoker.run_located(tool, &entry_point, &vars, StdioMode::Inherit)?;

    info!("{} finished: {}", tool.display_name, output.display());
    Ok(output.to_path_buf())
}
