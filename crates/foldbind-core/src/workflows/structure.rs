use crate::core::hashing::ContentHash;
use crate::core::inputs::{InputRules, JobDescriptor};
use crate::core::process::{ProcessRunner, StdioMode};
use crate::core::records::StructureMetadata;
use crate::core::tools::{ToolSpec, ToolVars};
use crate::engine::cache::{CacheEntry, CacheKey, StructureCache};
use crate::engine::config::ResolverConfig;
use crate::engine::error::{BackendAttempt, EngineError};
use crate::engine::invoke::ToolInvoker;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum StructureOutcome {
    /// A non-empty structure was already cached; no backend ran.
    Cached(CacheEntry),
    Predicted {
        entry: CacheEntry,
        /// Display name of the backend that succeeded.
        backend: String,
        /// Measured from the start of the first backend attempt.
        runtime: Duration,
    },
}

impl StructureOutcome {
    pub fn entry(&self) -> &CacheEntry {
        match self {
            StructureOutcome::Cached(entry) => entry,
            StructureOutcome::Predicted { entry, .. } => entry,
        }
    }
}

/// Resolves the structure of `job`'s protein sequence.
///
/// The cache is consulted first. On a miss the configured backends are tried
/// in order and the first one that leaves a structure file behind wins. When
/// every backend fails, metadata recording the exhaustion is still written and
/// [`EngineError::AllBackendsFailed`] is returned.
#[instrument(skip_all, name = "structure_workflow", fields(protein_id = job.protein_id()))]
pub fn run(
    job: &JobDescriptor,
    config: &ResolverConfig,
    runner: &dyn ProcessRunner,
    reporter: &ProgressReporter,
) -> Result<StructureOutcome, EngineError> {
    job.validate(&InputRules::SEQUENCE)?;
    for backend in &config.backends {
        backend.validate_template()?;
    }

    let cache = StructureCache::open(&config.cache_dir)?;
    let key = CacheKey::new(job.protein_id(), ContentHash::of_file(job.protein())?);

    if let Some(entry) = cache.lookup(&key) {
        info!("Cache hit for {}: {}", key.stem(), entry.structure.display());
        return Ok(StructureOutcome::Cached(entry));
    }
    debug!("Cache miss for {}.", key.stem());

    let invoker = ToolInvoker::new(runner, &config.locator);
    let total = config.backends.len();
    let started = Instant::now();
    let mut attempts = Vec::with_capacity(total);

    for (index, backend) in config.backends.iter().enumerate() {
        reporter.report(Progress::BackendStart {
            name: backend.display_name.clone(),
            index,
            total,
        });

        match attempt_backend(backend, job, &key, &cache, &invoker) {
            Ok(structure) => {
                let runtime = started.elapsed();
                let metadata = cache.write_metadata(
                    &key,
                    &StructureMetadata::success(&backend.display_name, runtime),
                )?;
                reporter.report(Progress::BackendSucceeded {
                    name: backend.display_name.clone(),
                });
                info!(
                    backend = %backend.display_name,
                    "Structure stored at {}.",
                    structure.display()
                );
                return Ok(StructureOutcome::Predicted {
                    entry: CacheEntry {
                        structure,
                        metadata,
                    },
                    backend: backend.display_name.clone(),
                    runtime,
                });
            }
            Err(e) => {
                info!("{} failed: {}", backend.display_name, e);
                reporter.report(Progress::BackendFailed {
                    name: backend.display_name.clone(),
                    reason: e.to_string(),
                });
                attempts.push(BackendAttempt {
                    backend: backend.display_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let metadata_path =
        cache.write_metadata(&key, &StructureMetadata::exhausted(started.elapsed()))?;
    Err(EngineError::AllBackendsFailed {
        attempts,
        metadata_path,
    })
}

fn attempt_backend(
    backend: &ToolSpec,
    job: &JobDescriptor,
    key: &CacheKey,
    cache: &StructureCache,
    invoker: &ToolInvoker,
) -> Result<PathBuf, EngineError> {
    let entry_point = invoker.locate(backend)?;

    let scratch = cache.scratch_dir()?;
    let vars = ToolVars {
        protein: Some(job.protein().to_path_buf()),
        output: Some(scratch.path().join(format!("{}.pdb", key.stem()))),
        output_dir: Some(scratch.path().to_path_buf()),
        ..ToolVars::default()
    };
    let output = invoker.run_located(backend, &entry_point, &vars, StdioMode::Capture)?;

    let candidates = backend.output.find_candidates(scratch.path())?;
    let Some((chosen, ignored)) = candidates.split_first() else {
        return Err(EngineError::MissingOutput {
            tool: backend.display_name.clone(),
            dir: scratch.path().to_path_buf(),
            expected: backend.output.extensions.join("/"),
        });
    };
    for other in ignored {
        debug!("Ignoring additional candidate {}.", other.display());
    }

    // A lost log only warns. The structure is stored last so a cached file
    // always belongs to a successful attempt.
    if let Err(e) = cache.write_backend_log(key, &backend.key, &output.combined_log()) {
        warn!("Could not keep the {} log: {}", backend.display_name, e);
    }
    cache.store(key, chosen)
}
