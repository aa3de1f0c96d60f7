use foldbind::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Exit status for an invocation that failed for any reason other than
/// structure backend exhaustion.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when every structure backend failed.
pub const EXIT_ALL_BACKENDS_FAILED: u8 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A single wrapped tool failed; `tool` is its display name.
    #[error("[{tool}] Failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: EngineError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Engine(EngineError::AllBackendsFailed { .. }) => EXIT_ALL_BACKENDS_FAILED,
            _ => EXIT_FAILURE,
        }
    }

    /// The line printed to stderr when a command fails.
    pub fn report(&self) -> String {
        match self {
            CliError::Tool { .. } => self.to_string(),
            _ => format!("[ERROR] {}", self),
        }
    }
}
