use crate::cli::AffinityArgs;
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use foldbind::{
    core::{inputs::JobDescriptor, process::SystemRunner, tools::AFFINITY_TOOL},
    workflows::{self, affinity::BoltzCliPredictor},
};
use tracing::{info, warn};

pub fn run(args: AffinityArgs, config: &AppConfig) -> Result<()> {
    let tool = config
        .registry
        .require(AFFINITY_TOOL)
        .map_err(|e| CliError::Config(e.to_string()))?
        .clone();
    let display_name = tool.display_name.clone();

    let runner = SystemRunner::new().with_timeout(config.timeout);
    let predictor = BoltzCliPredictor::new(tool, config.locator.clone(), &runner);

    let job = JobDescriptor::new(
        args.protein,
        Some(args.ligand),
        Some(args.protein_id),
        Some(args.ligand_id),
    );

    info!("Invoking the affinity workflow...");
    let outcome = workflows::affinity::run(&job, &args.output, &predictor)?;

    if let Some(error) = &outcome.record.error {
        warn!("{} fell back to an empty prediction: {}", display_name, error);
    }
    println!(
        "[{}] Output written to {} (runtime: {:.2}s)",
        display_name,
        outcome.output.display(),
        outcome.runtime.as_secs_f64()
    );
    Ok(())
}
