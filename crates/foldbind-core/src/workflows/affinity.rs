use crate::core::inputs::{InputRules, JobDescriptor};
use crate::core::process::{ProcessRunner, StdioMode};
use crate::core::records::{self, AffinityRecord, rounded_seconds};
use crate::core::tools::{Locator, ToolSpec, ToolVars};
use crate::engine::error::EngineError;
use crate::engine::invoke::ToolInvoker;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

const INPUT_FILE_NAME: &str = "input.yaml";
const DELTA_G_KEY: &str = "affinity_pred_value";
const CONFIDENCE_KEY: &str = "affinity_probability_binary";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AffinityPrediction {
    pub delta_g: Option<f64>,
    pub confidence: Option<f64>,
}

impl AffinityPrediction {
    /// Reads the known keys of a Boltz affinity document. Absent or
    /// non-numeric values stay `None`.
    pub fn from_json(value: &Value) -> Self {
        Self {
            delta_g: value.get(DELTA_G_KEY).and_then(Value::as_f64),
            confidence: value.get(CONFIDENCE_KEY).and_then(Value::as_f64),
        }
    }
}

/// Something that turns a Boltz YAML input document into an affinity estimate.
pub trait AffinityPredictor {
    /// Recorded as `model` in the result document.
    fn model_name(&self) -> &str;

    fn predict(&self, input_yaml: &Path) -> Result<AffinityPrediction, EngineError>;
}

/// Runs the `boltz` command line tool and reads the affinity document it writes.
pub struct BoltzCliPredictor<'a> {
    tool: ToolSpec,
    locator: Locator,
    runner: &'a dyn ProcessRunner,
}

impl<'a> BoltzCliPredictor<'a> {
    pub fn new(tool: ToolSpec, locator: Locator, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            tool,
            locator,
            runner,
        }
    }
}

impl AffinityPredictor for BoltzCliPredictor<'_> {
    fn model_name(&self) -> &str {
        &self.tool.display_name
    }

    fn predict(&self, input_yaml: &Path) -> Result<AffinityPrediction, EngineError> {
        let invoker = ToolInvoker::new(self.runner, &self.locator);
        let entry_point = invoker.locate(&self.tool)?;

        let out_dir = tempfile::Builder::new().prefix("boltz-").tempdir()?;
        let vars = ToolVars {
            config: Some(input_yaml.to_path_buf()),
            output_dir: Some(out_dir.path().to_path_buf()),
            ..ToolVars::default()
        };
        let output = invoker.run_located(&self.tool, &entry_point, &vars, StdioMode::Capture)?;
        debug!(
            "{} output:\n{}",
            self.tool.display_name,
            String::from_utf8_lossy(&output.combined_log())
        );

        let document = self
            .tool
            .output
            .find_first(out_dir.path())?
            .ok_or_else(|| EngineError::MissingOutput {
                tool: self.tool.display_name.clone(),
                dir: out_dir.path().to_path_buf(),
                expected: self.tool.output.extensions.join("/"),
            })?;
        let value: Value = serde_json::from_str(&fs::read_to_string(&document)?)?;
        Ok(AffinityPrediction::from_json(&value))
    }
}

#[derive(Serialize)]
struct BoltzInput {
    protein: ProteinInput,
    ligand: LigandInput,
    properties: Vec<&'static str>,
}

#[derive(Serialize)]
struct ProteinInput {
    fasta_path: PathBuf,
}

#[derive(Serialize)]
struct LigandInput {
    smiles_path: PathBuf,
}

/// Writes the Boltz input document for `protein` and `ligand` into `dir`.
/// Paths are made absolute so the document does not depend on the working
/// directory of the predictor.
pub fn write_input_yaml(dir: &Path, protein: &Path, ligand: &Path) -> Result<PathBuf, EngineError> {
    let input = BoltzInput {
        protein: ProteinInput {
            fasta_path: std::path::absolute(protein)?,
        },
        ligand: LigandInput {
            smiles_path: std::path::absolute(ligand)?,
        },
        properties: vec!["affinity"],
    };
    let path = dir.join(INPUT_FILE_NAME);
    serde_yaml::to_writer(File::create(&path)?, &input)?;
    Ok(path)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffinityOutcome {
    pub record: AffinityRecord,
    pub output: PathBuf,
    pub runtime: Duration,
}

/// Predicts the binding affinity of `job` and writes the result record to
/// `output`.
///
/// A record is written whether or not the prediction succeeds; failures are
/// recorded as `fallback: true` with the error text. Only invalid inputs and a
/// record that cannot be written are errors.
#[instrument(
    skip_all,
    name = "affinity_workflow",
    fields(protein_id = job.protein_id(), ligand_id = job.ligand_id())
)]
pub fn run(
    job: &JobDescriptor,
    output: &Path,
    predictor: &dyn AffinityPredictor,
) -> Result<AffinityOutcome, EngineError> {
    let ligand = job.require_ligand()?;
    job.validate(&InputRules::SEQUENCE)?;

    let started = Instant::now();
    let prediction = predict_in_scratch(job.protein(), ligand, predictor);
    let runtime = started.elapsed();

    let (prediction, error) = match prediction {
        Ok(prediction) => (prediction, None),
        Err(e) => {
            warn!("{} prediction failed, writing fallback record: {}", predictor.model_name(), e);
            (AffinityPrediction::default(), Some(e.to_string()))
        }
    };
    let record = AffinityRecord {
        protein: job.protein().to_path_buf(),
        ligand: ligand.to_path_buf(),
        protein_id: job.protein_id().to_string(),
        ligand_id: job.ligand_id().to_string(),
        model: predictor.model_name().to_string(),
        fallback: error.is_some(),
        delta_g: prediction.delta_g,
        confidence: prediction.confidence,
        error,
        runtime_sec: rounded_seconds(runtime),
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    records::write_json(output, &record)?;
    info!(fallback = record.fallback, "Affinity record written to {}.", output.display());

    Ok(AffinityOutcome {
        record,
        output: output.to_path_buf(),
        runtime,
    })
}

fn predict_in_scratch(
    protein: &Path,
    ligand: &Path,
    predictor: &dyn AffinityPredictor,
) -> Result<AffinityPrediction, EngineError> {
    let scratch = tempfile::tempdir()?;
    let input = write_input_yaml(scratch.path(), protein, ligand)?;
    predictor.predict(&input)
}
