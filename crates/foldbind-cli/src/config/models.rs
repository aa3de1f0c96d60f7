use foldbind::core::tools::Locator;
use foldbind::engine::config::ToolRegistry;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Settings after defaults, the config file and `--set` values are merged.
/// Command-line flags of individual commands are applied on top by the
/// commands themselves.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub registry: ToolRegistry,
    pub locator: Locator,
    pub timeout: Option<Duration>,
    pub cache_dir: PathBuf,
    pub backends: Vec<String>,
    pub pose_output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub source: ConfigSource,
}

/// Where the configuration came from, so child invocations can see the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: Option<PathBuf>,
    pub set_values: Vec<String>,
}

impl ConfigSource {
    /// `--config <path>` and one `--set` per override.
    pub fn forwarded_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(path) = &self.path {
            args.push(OsString::from("--config"));
            args.push(path.clone().into_os_string());
        }
        for value in &self.set_values {
            args.push(OsString::from("--set"));
            args.push(OsString::from(value));
        }
        args
    }
}
