use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileToolConfig {
    pub display_name: Option<String>,
    pub executable: Option<String>,
    pub repo: Option<PathBuf>,
    pub script: Option<String>,
    pub interpreter: Option<String>,
    pub args: Option<Vec<String>>,
    pub extra_args: Option<Vec<String>>,
    pub install_hint: Option<String>,
    pub output_extensions: Option<Vec<String>>,
    pub output_prefix: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileStructureConfig {
    pub cache_dir: Option<PathBuf>,
    pub backends: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePosesConfig {
    pub output_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    /// Interpreter for Python-script tools.
    pub python: Option<String>,
    /// Per-invocation timeout; `0` disables it.
    pub timeout_secs: Option<u64>,
    /// Replaces `PATH` when looking up tool executables.
    pub search_path: Option<String>,
    pub structure: Option<FileStructureConfig>,
    pub poses: Option<FilePosesConfig>,
    #[serde(default)]
    pub tools: BTreeMap<String, FileToolConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
