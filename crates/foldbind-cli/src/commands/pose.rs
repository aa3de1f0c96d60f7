use crate::cli::PoseArgs;
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use foldbind::{
    core::{inputs::JobDescriptor, process::SystemRunner},
    workflows,
};
use tracing::info;

pub fn run(args: PoseArgs, config: &AppConfig) -> Result<()> {
    let tool = config
        .registry
        .require(args.tool.key())
        .map_err(|e| CliError::Config(e.to_string()))?;

    let job = JobDescriptor::new(args.protein, Some(args.ligand), None, None);
    let runner = SystemRunner::new().with_timeout(config.timeout);

    info!("Running {}...", tool.display_name);
    let output = workflows::pose::run(tool, &job, &args.output, &config.locator, &runner).map_err(
        |source| CliError::Tool {
            tool: tool.display_name.clone(),
            source,
        },
    )?;

    println!("[{}] Output written to {}", tool.display_name, output.display());
    Ok(())
}
