use crate::cli::{PoseTool, PosesArgs};
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use foldbind::{
    core::{inputs::JobDescriptor, process::SystemRunner},
    engine::{
        config::{DispatchConfigBuilder, WrapperCommand},
        progress::ProgressReporter,
    },
    workflows,
};
use std::ffi::OsString;
use tracing::info;

pub fn run(args: PosesArgs, config: &AppConfig) -> Result<()> {
    // Each tool runs as `foldbind pose <tool>` so a crash in one cannot take
    // down the dispatcher.
    let program = std::env::current_exe()?;
    let mut leading_args = config.source.forwarded_args();
    leading_args.push(OsString::from("pose"));
    let wrapper = WrapperCommand::new(program).with_leading_args(leading_args);

    let dispatch_config = DispatchConfigBuilder::new()
        .output_dir(args.output_dir.unwrap_or_else(|| config.pose_output_dir.clone()))
        .log_dir(args.log_dir.unwrap_or_else(|| config.log_dir.clone()))
        .wrapper(wrapper)
        .timeout(config.timeout)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let selection: Vec<&str> = args
        .models
        .as_deref()
        .unwrap_or(&PoseTool::ALL[..])
        .iter()
        .map(|tool| tool.key())
        .collect();

    let job = JobDescriptor::new(
        args.protein,
        Some(args.ligand),
        Some(args.protein_id),
        Some(args.ligand_id),
    );
    let runner = SystemRunner::new().with_timeout(dispatch_config.timeout);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Dispatching {} pose tool(s)...", selection.len());
    let report = workflows::poses::run(&job, &selection, &dispatch_config, &runner, &reporter)?;

    for outcome in report.failures() {
        if let Some(error) = &outcome.error {
            eprintln!("[{}] Failed: {}", outcome.tool, error);
        }
    }
    info!(
        "Pose dispatch finished: {} succeeded, {} failed.",
        report.successes().count(),
        report.failures().count()
    );

    Ok(())
}
