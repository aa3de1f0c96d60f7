//! Declarative descriptions of the external tools foldbind drives.
//!
//! A [`ToolSpec`] is plain data: how to find the tool, how to build its command
//! line from an argument template, and which files it leaves behind. The default
//! table below mirrors the upstream installation layouts; every entry can be
//! replaced or extended from configuration.

use super::outputs::OutputContract;
use super::process::CommandSpec;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structure predictors, in fallback order.
pub const STRUCTURE_BACKENDS: [&str; 3] = ["colabfold", "openfold", "esmfold"];
/// Pose predictors, in dispatch order.
pub const POSE_TOOLS: [&str; 3] = ["equibind", "neuralplexer", "umol"];
/// The affinity predictor.
pub const AFFINITY_TOOL: &str = "boltz";

/// Placeholders understood by argument templates.
pub const PLACEHOLDERS: [&str; 5] = ["protein", "ligand", "output", "output_dir", "config"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Tool '{tool}' needs a value for '{{{placeholder}}}' but none was provided")]
    MissingPlaceholder { tool: String, placeholder: String },

    #[error(
        "Tool '{tool}' uses unknown placeholder '{{{placeholder}}}' \
         (known: protein, ligand, output, output_dir, config)"
    )]
    UnknownPlaceholder { tool: String, placeholder: String },

    #[error("Tool '{tool}' has an unterminated placeholder in argument '{arg}'")]
    UnterminatedPlaceholder { tool: String, arg: String },
}

/// Why a tool could not be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unavailable {
    pub reason: String,
}

impl Unavailable {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// How a tool's entry point is found on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// A checked-out repository containing a script.
    RepoScript { repo: PathBuf, script: String },
    /// A checked-out repository plus a command-line entry point on the search path.
    RepoAndPath { repo: PathBuf, executable: String },
    /// An executable on the search path.
    PathExecutable { executable: String },
}

/// Resolves [`Discovery`] strategies against the filesystem.
///
/// By default executables are looked up on `PATH`; an explicit search path
/// replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    search_path: Option<OsString>,
}

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(name, Some(paths), cwd).ok()
            }
            None => which::which(name).ok(),
        }
    }

    pub fn locate(&self, discovery: &Discovery) -> Result<PathBuf, Unavailable> {
        match discovery {
            Discovery::RepoScript { repo, script } => {
                if !repo.is_dir() {
                    return Err(Unavailable::new(format!(
                        "repository not found: {}",
                        repo.display()
                    )));
                }
                let script_path = repo.join(script);
                if !script_path.is_file() {
                    return Err(Unavailable::new(format!(
                        "{} not found in {}.",
                        script,
                        repo.display()
                    )));
                }
                Ok(script_path)
            }
            Discovery::RepoAndPath { repo, executable } => {
                if !repo.is_dir() {
                    return Err(Unavailable::new(format!(
                        "repository not found: {}",
                        repo.display()
                    )));
                }
                self.find_executable(executable).ok_or_else(|| {
                    Unavailable::new(format!("{} not found in PATH.", executable))
                })
            }
            Discovery::PathExecutable { executable } => {
                self.find_executable(executable).ok_or_else(|| {
                    Unavailable::new(format!("{} not found in PATH.", executable))
                })
            }
        }
    }
}

/// Values substituted into argument templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolVars {
    pub protein: Option<PathBuf>,
    pub ligand: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl ToolVars {
    fn lookup(&self, name: &str) -> Option<Option<&Path>> {
        let value = match name {
            "protein" => &self.protein,
            "ligand" => &self.ligand,
            "output" => &self.output,
            "output_dir" => &self.output_dir,
            "config" => &self.config,
            _ => return None,
        };
        Some(value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    /// Lower-case key used on the command line, in configuration and in file names.
    pub key: String,
    /// Human-readable name recorded in metadata and messages.
    pub display_name: String,
    pub discovery: Discovery,
    /// Program that runs the entry point (`python3`, `bash`), if it is not executable itself.
    pub interpreter: Option<String>,
    pub args: Vec<String>,
    /// Appended verbatim after the rendered template.
    pub extra_args: Vec<String>,
    pub install_hint: Option<String>,
    pub output: OutputContract,
}

impl ToolSpec {
    pub fn new(key: &str, display_name: &str, discovery: Discovery) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            discovery,
            interpreter: None,
            args: Vec::new(),
            extra_args: Vec::new(),
            install_hint: None,
            output: OutputContract::default(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: &str) -> Self {
        self.interpreter = Some(interpreter.to_string());
        self
    }

    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_install_hint(mut self, hint: &str) -> Self {
        self.install_hint = Some(hint.to_string());
        self
    }

    pub fn with_output(mut self, output: OutputContract) -> Self {
        self.output = output;
        self
    }

    pub fn locate(&self, locator: &Locator) -> Result<PathBuf, Unavailable> {
        locator.locate(&self.discovery)
    }

    /// Checks that every placeholder in the template is a known one.
    pub fn validate_template(&self) -> Result<(), ToolError> {
        for arg in &self.args {
            for name in self.placeholders_in(arg)? {
                if !PLACEHOLDERS.contains(&name.as_str()) {
                    return Err(ToolError::UnknownPlaceholder {
                        tool: self.key.clone(),
                        placeholder: name,
                    });
                }
            }
        }
        Ok(())
    }

    /// Builds `[interpreter] entry_point args... extra_args...`.
    pub fn command(&self, entry_point: &Path, vars: &ToolVars) -> Result<CommandSpec, ToolError> {
        let mut spec = match &self.interpreter {
            Some(interpreter) => CommandSpec::new(interpreter).arg(entry_point),
            None => CommandSpec::new(entry_point),
        };
        for arg in &self.args {
            spec = spec.arg(self.render(arg, vars)?);
        }
        Ok(spec.args(self.extra_args.iter()))
    }

    fn placeholders_in(&self, arg: &str) -> Result<Vec<String>, ToolError> {
        let mut names = Vec::new();
        let mut rest = arg;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let end = after
                .find('}')
                .ok_or_else(|| ToolError::UnterminatedPlaceholder {
                    tool: self.key.clone(),
                    arg: arg.to_string(),
                })?;
            names.push(after[..end].to_string());
            rest = &after[end + 1..];
        }
        Ok(names)
    }

    fn render(&self, arg: &str, vars: &ToolVars) -> Result<OsString, ToolError> {
        let mut rendered = OsString::new();
        let mut rest = arg;
        while let Some(start) = rest.find('{') {
            rendered.push(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find('}')
                .ok_or_else(|| ToolError::UnterminatedPlaceholder {
                    tool: self.key.clone(),
                    arg: arg.to_string(),
                })?;
            let name = &after[..end];
            let value = vars
                .lookup(name)
                .ok_or_else(|| ToolError::UnknownPlaceholder {
                    tool: self.key.clone(),
                    placeholder: name.to_string(),
                })?
                .ok_or_else(|| ToolError::MissingPlaceholder {
                    tool: self.key.clone(),
                    placeholder: name.to_string(),
                })?;
            rendered.push(value.as_os_str());
            rest = &after[end + 1..];
        }
        rendered.push(rest);
        Ok(rendered)
    }

    pub fn equibind(python: &str) -> Self {
        Self::new(
            "equibind",
            "EquiBind",
            Discovery::RepoScript {
                repo: PathBuf::from("EquiBind"),
                script: "inference.py".to_string(),
            },
        )
        .with_interpreter(python)
        .with_args(&[
            "--protein",
            "{protein}",
            "--ligand",
            "{ligand}",
            "--output",
            "{output}",
        ])
        .with_install_hint(
            "git clone https://github.com/HannesStark/EquiBind.git\n\
             cd EquiBind && conda env create -f environment.yml && conda activate equibind",
        )
    }

    pub fn neuralplexer() -> Self {
        Self::new(
            "neuralplexer",
            "NeuralPLexer",
            Discovery::RepoAndPath {
                repo: PathBuf::from("NeuralPLexer"),
                executable: "neuralplexer-inference".to_string(),
            },
        )
        .with_args(&[
            "--protein",
            "{protein}",
            "--ligand",
            "{ligand}",
            "--output",
            "{output}",
        ])
        .with_install_hint(
            "git clone https://github.com/zrqiao/NeuralPLexer.git\n\
             cd NeuralPLexer && make environment && make install",
        )
    }

    pub fn umol() -> Self {
        Self::new(
            "umol",
            "UMol",
            Discovery::RepoScript {
                repo: PathBuf::from("Umol"),
                script: "predict.sh".to_string(),
            },
        )
        .with_interpreter("bash")
        .with_args(&["{protein}", "{ligand}", "{output}"])
        .with_install_hint(
            "git clone https://github.com/patrickbryant1/Umol.git\n\
             cd Umol && bash install_dependencies.sh",
        )
    }

    pub fn colabfold() -> Self {
        Self::new(
            "colabfold",
            "ColabFold",
            Discovery::PathExecutable {
                executable: "colabfold_batch".to_string(),
            },
        )
        .with_args(&["{protein}", "{output_dir}"])
        .with_install_hint("Please install ColabFold.")
    }

    pub fn openfold() -> Self {
        Self::new(
            "openfold",
            "OpenFold",
            Discovery::PathExecutable {
                executable: "openfold_predict.py".to_string(),
            },
        )
        .with_args(&["--fasta", "{protein}", "--out", "{output_dir}"])
        .with_install_hint("Please install OpenFold or provide the correct script.")
    }

    pub fn esmfold() -> Self {
        Self::new(
            "esmfold",
            "ESMFold",
            Discovery::PathExecutable {
                executable: "esmfold_predict.py".to_string(),
            },
        )
        .with_args(&["--fasta", "{protein}", "--out", "{output_dir}"])
        .with_install_hint("Please install ESMFold or provide the correct script.")
    }

    pub fn boltz() -> Self {
        Self::new(
            AFFINITY_TOOL,
            "Boltz2",
            Discovery::PathExecutable {
                executable: "boltz".to_string(),
            },
        )
        .with_args(&["predict", "{config}", "--out_dir", "{output_dir}"])
        .with_install_hint("pip install boltz")
        .with_output(OutputContract::with_extension("json").prefixed("affinity_"))
    }
}

/// The built-in tool table.
pub fn default_tools(python: &str) -> Vec<ToolSpec> {
    vec![
        ToolSpec::colabfold(),
        ToolSpec::openfold(),
        ToolSpec::esmfold(),
        ToolSpec::equibind(python),
        ToolSpec::neuralplexer(),
        ToolSpec::umol(),
        ToolSpec::boltz(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn vars() -> ToolVars {
        ToolVars {
            protein: Some(PathBuf::from("in/prot.fasta")),
            ligand: Some(PathBuf::from("in/lig.smi")),
            output: Some(PathBuf::from("out/pose.pdb")),
            output_dir: Some(PathBuf::from("scratch")),
            config: None,
        }
    }

    #[test]
    fn renders_interpreter_entry_point_and_arguments() {
        let spec = ToolSpec::equibind("python3");
        let command = spec
            .command(Path::new("EquiBind/inference.py"), &vars())
            .unwrap();
        assert_eq!(
            command.to_string(),
            "python3 EquiBind/inference.py --protein in/prot.fasta --ligand in/lig.smi --output out/pose.pdb"
        );
    }

    #[test]
    fn extra_args_follow_the_template() {
        let mut spec = ToolSpec::colabfold();
        spec.extra_args = vec!["--num-models".into(), "1".into()];
        let command = spec
            .command(Path::new("/usr/bin/colabfold_batch"), &vars())
            .unwrap();
        assert_eq!(
            command.to_string(),
            "/usr/bin/colabfold_batch in/prot.fasta scratch --num-models 1"
        );
    }

    #[test]
    fn placeholders_can_be_embedded_in_text() {
        let spec = ToolSpec::new(
            "custom",
            "Custom",
            Discovery::PathExecutable {
                executable: "custom".into(),
            },
        )
        .with_args(&["--in={protein}", "--out={output_dir}/model"]);
        let command = spec.command(Path::new("custom"), &vars()).unwrap();
        assert_eq!(
            command.to_string(),
            "custom --in=in/prot.fasta --out=scratch/model"
        );
    }

    #[test]
    fn unbound_placeholder_is_rejected() {
        let spec = ToolSpec::boltz();
        let err = spec.command(Path::new("boltz"), &vars()).unwrap_err();
        assert_eq!(
            err,
            ToolError::MissingPlaceholder {
                tool: "boltz".into(),
                placeholder: "config".into()
            }
        );
    }

    #[test]
    fn unknown_placeholder_fails_template_validation() {
        let spec = ToolSpec::colabfold().with_args(&["{fasta}", "{output_dir}"]);
        assert!(matches!(
            spec.validate_template(),
            Err(ToolError::UnknownPlaceholder { .. })
        ));
        assert!(ToolSpec::umol().validate_template().is_ok());

        let broken = ToolSpec::colabfold().with_args(&["{protein"]);
        assert!(matches!(
            broken.validate_template(),
            Err(ToolError::UnterminatedPlaceholder { .. })
        ));
    }

    #[test]
    fn repo_script_discovery_checks_directory_then_script() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("EquiBind");
        let discovery = Discovery::RepoScript {
            repo: repo.clone(),
            script: "inference.py".into(),
        };
        let locator = Locator::new();

        let err = locator.locate(&discovery).unwrap_err();
        assert!(err.reason.contains("repository not found"));

        fs::create_dir(&repo).unwrap();
        let err = locator.locate(&discovery).unwrap_err();
        assert!(err.reason.contains("inference.py not found"));

        fs::write(repo.join("inference.py"), "print('hi')").unwrap();
        assert_eq!(
            locator.locate(&discovery).unwrap(),
            repo.join("inference.py")
        );
    }

    #[test]
    fn path_discovery_respects_an_explicit_search_path() {
        let dir = tempdir().unwrap();
        let locator = Locator::with_search_path(dir.path().as_os_str());
        let err = locator
            .locate(&Discovery::PathExecutable {
                executable: "colabfold_batch".into(),
            })
            .unwrap_err();
        assert_eq!(err.reason, "colabfold_batch not found in PATH.");
    }

    #[cfg(unix)]
    #[test]
    fn path_discovery_finds_executables() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let exe = dir.path().join("neuralplexer-inference");
        fs::write(&exe, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        let repo = dir.path().join("NeuralPLexer");
        fs::create_dir(&repo).unwrap();

        let locator = Locator::with_search_path(dir.path().as_os_str());
        let found = locator
            .locate(&Discovery::RepoAndPath {
                repo,
                executable: "neuralplexer-inference".into(),
            })
            .unwrap();
        assert_eq!(found, exe);
    }

    #[test]
    fn default_table_has_every_tool_once() {
        let tools = default_tools("python3");
        for key in STRUCTURE_BACKENDS
            .iter()
            .chain(POSE_TOOLS.iter())
            .chain(std::iter::once(&AFFINITY_TOOL))
        {
            assert_eq!(tools.iter().filter(|t| t.key == *key).count(), 1, "{}", key);
        }
        assert!(tools.iter().all(|t| t.validate_template().is_ok()));
    }
}
