use crate::core::inputs::InputError;
use crate::core::process::ProcessError;
use crate::core::tools::ToolError;
use super::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// One failed structure backend and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAttempt {
    pub backend: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] ToolError),

    #[error("{tool} is not available: {reason}{}", format_hint(.hint))]
    ToolUnavailable {
        tool: String,
        reason: String,
        hint: Option<String>,
    },

    #[error("{tool} failed: {source}")]
    Execution {
        tool: String,
        #[source]
        source: ProcessError,
    },

    #[error("{tool} did not produce a .{expected} file in {}", .dir.display())]
    MissingOutput {
        tool: String,
        dir: PathBuf,
        expected: String,
    },

    #[error("All structure predictors failed. See log: {}", .metadata_path.display())]
    AllBackendsFailed {
        attempts: Vec<BackendAttempt>,
        metadata_path: PathBuf,
    },

    #[error("Cache error at {}: {source}", .path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!("\nPlease run:\n{}", hint),
        None => String::new(),
    }
}

impl EngineError {
    pub(crate) fn cache(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> EngineError {
        let path = path.into();
        move |source| EngineError::Cache { path, source }
    }
}
