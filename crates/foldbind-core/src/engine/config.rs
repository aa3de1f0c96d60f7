use crate::core::process::CommandSpec;
use crate::core::tools::{self, Locator, ToolSpec};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    #[error("Tool '{0}' is defined more than once")]
    DuplicateTool(String),

    #[error("'{0}' must not be empty")]
    Empty(&'static str),
}

/// The ordered table of known tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<ToolSpec>) -> Result<Self, ConfigError> {
        for (i, tool) in tools.iter().enumerate() {
            if tools[..i].iter().any(|t| t.key == tool.key) {
                return Err(ConfigError::DuplicateTool(tool.key.clone()));
            }
        }
        Ok(Self { tools })
    }

    pub fn with_defaults(python: &str) -> Self {
        Self {
            tools: tools::default_tools(python),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.key == key)
    }

    pub fn require(&self, key: &str) -> Result<&ToolSpec, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::UnknownTool(key.to_string()))
    }

    /// Replaces the tool with the same key, or appends a new one.
    pub fn upsert(&mut self, spec: ToolSpec) {
        match self.tools.iter_mut().find(|t| t.key == spec.key) {
            Some(existing) => *existing = spec,
            None => self.tools.push(spec),
        }
    }

    /// The specs for `keys`, in the order given.
    pub fn resolve_all<S: AsRef<str>>(&self, keys: &[S]) -> Result<Vec<ToolSpec>, ConfigError> {
        keys.iter()
            .map(|k| self.require(k.as_ref()).cloned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub cache_dir: PathBuf,
    /// Tried in order; the first success wins.
    pub backends: Vec<ToolSpec>,
    pub locator: Locator,
    pub timeout: Option<Duration>,
}

#[derive(Default)]
pub struct ResolverConfigBuilder {
    cache_dir: Option<PathBuf>,
    backends: Option<Vec<ToolSpec>>,
    locator: Option<Locator>,
    timeout: Option<Duration>,
}

impl ResolverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }
    pub fn backends(mut self, backends: Vec<ToolSpec>) -> Self {
        self.backends = Some(backends);
        self
    }
    pub fn locator(mut self, locator: Locator) -> Self {
        self.locator = Some(locator);
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ResolverConfig, ConfigError> {
        let backends = self
            .backends
            .ok_or(ConfigError::MissingParameter("backends"))?;
        if backends.is_empty() {
            return Err(ConfigError::Empty("backends"));
        }
        Ok(ResolverConfig {
            cache_dir: self
                .cache_dir
                .ok_or(ConfigError::MissingParameter("cache_dir"))?,
            backends,
            locator: self.locator.unwrap_or_default(),
            timeout: self.timeout,
        })
    }
}

/// The command the dispatcher runs for each tool: `program leading_args... <tool>
/// --protein P --ligand L --output O`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperCommand {
    pub program: PathBuf,
    pub leading_args: Vec<OsString>,
}

impl WrapperCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn command_for(
        &self,
        tool: &str,
        protein: &Path,
        ligand: &Path,
        output: &Path,
    ) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(self.leading_args.iter())
            .arg(tool)
            .arg("--protein")
            .arg(protein)
            .arg("--ligand")
            .arg(ligand)
            .arg("--output")
            .arg(output)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub wrapper: WrapperCommand,
    /// Known pose tools, in dispatch order.
    pub tools: Vec<String>,
    pub timeout: Option<Duration>,
}

#[derive(Default)]
pub struct DispatchConfigBuilder {
    output_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    wrapper: Option<WrapperCommand>,
    tools: Option<Vec<String>>,
    timeout: Option<Duration>,
}

impl DispatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = Some(dir);
        self
    }
    pub fn wrapper(mut self, wrapper: WrapperCommand) -> Self {
        self.wrapper = Some(wrapper);
        self
    }
    pub fn tools(mut self, tools: Vec<String>) -> Self {
        self.tools = Some(tools);
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<DispatchConfig, ConfigError> {
        Ok(DispatchConfig {
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            log_dir: self.log_dir.ok_or(ConfigError::MissingParameter("log_dir"))?,
            wrapper: self.wrapper.ok_or(ConfigError::MissingParameter("wrapper"))?,
            tools: self.tools.unwrap_or_else(|| {
                tools::POSE_TOOLS.iter().map(|t| t.to_string()).collect()
            }),
            timeout: self.timeout,
        })
    }
}
