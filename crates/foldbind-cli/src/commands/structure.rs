use crate::cli::StructureArgs;
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use foldbind::{
    core::{inputs::JobDescriptor, process::SystemRunner},
    engine::{config::ResolverConfigBuilder, progress::ProgressReporter},
    workflows::{self, structure::StructureOutcome},
};
use tracing::info;

pub fn run(args: StructureArgs, config: &AppConfig) -> Result<()> {
    let cache_dir = args.output_dir.unwrap_or_else(|| config.cache_dir.clone());
    let backends = config
        .registry
        .resolve_all(&config.backends)
        .map_err(|e| CliError::Config(e.to_string()))?;

    let resolver_config = ResolverConfigBuilder::new()
        .cache_dir(cache_dir)
        .backends(backends)
        .locator(config.locator.clone())
        .timeout(config.timeout)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let job = JobDescriptor::new(args.protein, None, args.protein_id, None);
    let runner = SystemRunner::new().with_timeout(resolver_config.timeout);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the structure workflow...");
    let outcome = workflows::structure::run(&job, &resolver_config, &runner, &reporter)?;

    match outcome {
        StructureOutcome::Cached(entry) => {
            println!("[CACHE] Structure already exists: {}", entry.structure.display());
            println!("[CACHE] Log: {}", entry.metadata.display());
        }
        StructureOutcome::Predicted {
            entry,
            backend,
            runtime,
        } => {
            info!("{} finished in {:.2}s.", backend, runtime.as_secs_f64());
            println!(
                "[SUCCESS] {} prediction complete. Output: {}",
                backend,
                entry.structure.display()
            );
        }
    }

    Ok(())
}
