use crate::core::inputs::{InputRules, JobDescriptor};
use crate::core::process::ProcessRunner;
use crate::core::records::rounded_seconds;
use crate::engine::config::{ConfigError, DispatchConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tool_log::{LogLevel, ToolLog};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// What happened to one pose tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub tool: String,
    pub output: PathBuf,
    pub runtime: Duration,
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub outcomes: Vec<ToolOutcome>,
}

impl DispatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &ToolOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn successes(&self) -> impl Iterator<Item = &ToolOutcome> {
        self.outcomes.iter().filter(|o| o.succeeded())
    }
}

/// Runs every selected pose tool, in the order of `config.tools`.
///
/// Each tool runs as its own wrapper subprocess and failures never stop the
/// remaining tools. Only invalid inputs or an unknown selection abort the
/// dispatch, and they do so before any tool starts.
#[instrument(
    skip_all,
    name = "pose_dispatch",
    fields(protein_id = job.protein_id(), ligand_id = job.ligand_id())
)]
pub fn run<S: AsRef<str>>(
    job: &JobDescriptor,
    selection: &[S],
    config: &DispatchConfig,
    runner: &dyn ProcessRunner,
    reporter: &ProgressReporter,
) -> Result<DispatchReport, EngineError> {
    let ligand = job.require_ligand()?;
    job.validate(&InputRules::POSE)?;
    for selected in selection {
        let selected = selected.as_ref();
        if !config.tools.iter().any(|t| t == selected) {
            return Err(ConfigError::UnknownTool(selected.to_string()).into());
        }
    }

    let mut report = DispatchReport::default();
    for tool in &config.tools {
        if !selection.iter().any(|s| s.as_ref() == tool) {
            continue;
        }
        reporter.report(Progress::ToolStart { name: tool.clone() });
        let outcome = dispatch_one(tool, job, ligand, config, runner);
        reporter.report(Progress::ToolFinish {
            name: tool.clone(),
            success: outcome.succeeded(),
        });
        report.outcomes.push(outcome);
    }

    info!(
        succeeded = report.successes().count(),
        failed = report.failures().count(),
        "Pose dispatch finished."
    );
    Ok(report)
}

fn dispatch_one(
    tool: &str,
    job: &JobDescriptor,
    ligand: &Path,
    config: &DispatchConfig,
    runner: &dyn ProcessRunner,
) -> ToolOutcome {
    let tool_dir = config.output_dir.join(tool);
    let output = tool_dir.join(format!("{}_{}.pdb", job.ligand_id(), job.protein_id()));
    let started = Instant::now();

    let mut log = ToolLog::open(config.log_dir.join(format!("pose_{}.log", tool)));
    let mut note = |level: LogLevel, message: &str| match &mut log {
        Ok(log) => {
            if let Err(e) = log.write(level, message) {
                warn!("Could not write to {}: {}", log.path().display(), e);
            }
        }
        Err(e) => warn!("Pose log for {} is unavailable: {}", tool, e),
    };

    note(
        LogLevel::Info,
        &format!("Running {} for {} and {}", tool, job.ligand_id(), job.protein_id()),
    );

    let result = fs::create_dir_all(&tool_dir)
        .map_err(EngineError::from)
        .and_then(|()| {
            let command = config
                .wrapper
                .command_for(tool, job.protein(), ligand, &output);
            runner
                .run(&command)
                .map(|_| ())
                .map_err(|source| EngineError::Execution {
                    tool: tool.to_string(),
                    source,
                })
        });
    let runtime = started.elapsed();

    let error = match result {
        Ok(()) => {
            note(
                LogLevel::Info,
                &format!(
                    "Success: {} (runtime: {:.2}s)",
                    output.display(),
                    rounded_seconds(runtime)
                ),
            );
            None
        }
        Err(e) => {
            note(LogLevel::Error, &format!("Failure: {}", e));
            info!("{} failed: {}", tool, e);
            Some(e.to_string())
        }
    };

    ToolOutcome {
        tool: tool.to_string(),
        output,
        runtime,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::{ProcessError, ProcessOutput};
    use crate::engine::config::{DispatchConfigBuilder, WrapperCommand};
    use crate::engine::testing::MockRunner;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        dir: TempDir,
        config: DispatchConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("target.pdb"), "ATOM").unwrap();
            fs::write(dir.path().join("ligand.sdf"), "$$$$").unwrap();
            let config = DispatchConfigBuilder::new()
                .output_dir(dir.path().join("data").join("output").join("poses"))
                .log_dir(dir.path().join("logs"))
                .wrapper(WrapperCommand::new("foldbind").with_leading_args(["pose"]))
                .build()
                .unwrap();
            Self { dir, config }
        }

        fn job(&self) -> JobDescriptor {
            JobDescriptor::new(
                self.dir.path().join("target.pdb"),
                Some(self.dir.path().join("ligand.sdf")),
                Some("PROT1".into()),
                Some("LIG1".into()),
            )
        }

        fn log(&self, tool: &str) -> String {
            fs::read_to_string(self.config.log_dir.join(format!("pose_{}.log", tool))).unwrap()
        }
    }

    fn tool_of(command: &crate::core::process::CommandSpec) -> String {
        command.args[1].to_string_lossy().into_owned()
    }

    #[test]
    fn only_selected_tools_run() {
        let fx = Fixture::new();
        let runner = MockRunner::succeeding();
        let report = run(
            &fx.job(),
            &["equibind"],
            &fx.config,
            &runner,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(runner.call_count(), 1);
        let call = &runner.calls()[0];
        assert_eq!(tool_of(call), "equibind");
        let expected_output = fx.config.output_dir.join("equibind").join("LIG1_PROT1.pdb");
        assert_eq!(call.args.last().unwrap(), expected_output.as_os_str());
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcomes[0].succeeded());
        assert!(fx.config.output_dir.join("equibind").is_dir());
    }

    #[test]
    fn tools_run_in_registry_order_regardless_of_selection_order() {
        let fx = Fixture::new();
        let runner = MockRunner::succeeding();
        run(
            &fx.job(),
            &["umol", "equibind"],
            &fx.config,
            &runner,
            &ProgressReporter::new(),
        )
        .unwrap();

        let order: Vec<_> = runner.calls().iter().map(tool_of).collect();
        assert_eq!(order, vec!["equibind", "umol"]);
    }

    #[test]
    fn one_failure_does_not_stop_the_others() {
        let fx = Fixture::new();
        let runner = MockRunner::new(|cmd| {
            if tool_of(cmd) == "neuralplexer" {
                Err(ProcessError::NonZeroExit {
                    program: cmd.program_name(),
                    code: Some(1),
                    stderr_tail: String::new(),
                })
            } else {
                Ok(ProcessOutput::default())
            }
        });
        let report = run(
            &fx.job(),
            &["equibind", "neuralplexer", "umol"],
            &fx.config,
            &runner,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(runner.call_count(), 3);
        let failed: Vec<_> = report.failures().map(|o| o.tool.as_str()).collect();
        assert_eq!(failed, vec!["neuralplexer"]);

        assert!(fx.log("neuralplexer").contains(" ERROR Failure: "));
        let umol_log = fx.log("umol");
        assert!(umol_log.contains(" INFO Running umol for LIG1 and PROT1"));
        assert!(umol_log.contains(" INFO Success: "));
        assert!(umol_log.contains("LIG1_PROT1.pdb (runtime: "));
    }

    #[test]
    fn failing_sole_selection_is_isolated() {
        let fx = Fixture::new();
        let runner = MockRunner::failing();
        let report = run(
            &fx.job(),
            &["equibind"],
            &fx.config,
            &runner,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(runner.call_count(), 1);
        assert_eq!(tool_of(&runner.calls()[0]), "equibind");
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(report.outcomes[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("mock failure")));

        let log = fx.log("equibind");
        assert!(log.contains(" INFO Running equibind for LIG1 and PROT1"));
        assert!(log.contains(" ERROR Failure: "));
        assert!(log.contains("mock failure"));

        for other in ["neuralplexer", "umol"] {
            assert!(!fx.config.output_dir.join(other).exists());
            assert!(!fx.config.log_dir.join(format!("pose_{}.log", other)).exists());
        }
    }

    #[test]
    fn logs_accumulate_across_runs() {
        let fx = Fixture::new();
        let runner = MockRunner::succeeding();
        for _ in 0..2 {
            run(&fx.job(), &["umol"], &fx.config, &runner, &ProgressReporter::new()).unwrap();
        }
        assert_eq!(fx.log("umol").lines().count(), 4);
    }

    #[test]
    fn invalid_inputs_abort_before_any_tool_runs() {
        let fx = Fixture::new();
        let job = JobDescriptor::new(
            fx.dir.path().join("target.pdb"),
            Some(fx.dir.path().join("ligand.xyz")),
            Some("PROT1".into()),
            Some("LIG1".into()),
        );
        fs::write(fx.dir.path().join("ligand.xyz"), "").unwrap();
        let runner = MockRunner::succeeding();

        let err = run(&job, &["umol"], &fx.config, &runner, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::Input(_)));
        assert_eq!(runner.call_count(), 0);
        assert!(!fx.config.log_dir.exists());
    }

    #[test]
    fn unknown_tool_in_selection_is_rejected() {
        let fx = Fixture::new();
        let runner = MockRunner::succeeding();
        let err = run(
            &fx.job(),
            &["diffdock"],
            &fx.config,
            &runner,
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config(ConfigError::UnknownTool(ref t)) if t == "diffdock"
        ));
        assert_eq!(runner.call_count(), 0);
    }
}
