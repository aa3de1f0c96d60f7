use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileToolConfig};
use super::models::{AppConfig, ConfigSource};
use crate::error::{CliError, Result};
use crate::utils::parser;
use foldbind::core::outputs::OutputContract;
use foldbind::core::tools::{Discovery, Locator, ToolSpec};
use foldbind::engine::config::ToolRegistry;
use std::path::{Path, PathBuf};

pub fn build_config(config_path: Option<&Path>, set_values: &[String]) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(path) = config_path {
        FileConfig::from_file(path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, set_values)?;

    let python = file_config.python.take().unwrap_or(defaults.python);
    let mut registry = ToolRegistry::with_defaults(&python);
    for (key, tool_file) in std::mem::take(&mut file_config.tools) {
        parser::validate_tool_key(&key, &format!("tools.{}", key))
            .map_err(|e| CliError::Config(e.to_string()))?;
        let spec = merge_tool(registry.get(&key).cloned(), &key, tool_file)?;
        spec.validate_template()
            .map_err(|e| CliError::Config(e.to_string()))?;
        registry.upsert(spec);
    }

    let locator = file_config
        .search_path
        .map(Locator::with_search_path)
        .unwrap_or_default();

    let timeout_secs = file_config.timeout_secs.unwrap_or(defaults.timeout_secs);
    let timeout = (timeout_secs > 0).then(|| std::time::Duration::from_secs(timeout_secs));

    let structure_file = file_config.structure.unwrap_or_default();
    let backends = structure_file.backends.unwrap_or(defaults.backends);
    if backends.is_empty() {
        return Err(CliError::Config(
            "`structure.backends` must name at least one backend.".to_string(),
        ));
    }
    registry
        .resolve_all(&backends)
        .map_err(|e| CliError::Config(e.to_string()))?;

    let poses_file = file_config.poses.unwrap_or_default();

    Ok(AppConfig {
        registry,
        locator,
        timeout,
        cache_dir: structure_file.cache_dir.unwrap_or(defaults.cache_dir),
        backends,
        pose_output_dir: poses_file.output_dir.unwrap_or(defaults.pose_output_dir),
        log_dir: poses_file.log_dir.unwrap_or(defaults.log_dir),
        source: ConfigSource {
            path: config_path.map(Path::to_path_buf),
            set_values: set_values.to_vec(),
        },
    })
}

/// Applies the fields of a `[tools.<key>]` table onto the built-in tool of the
/// same key, or builds a new tool when there is none.
fn merge_tool(existing: Option<ToolSpec>, key: &str, file: FileToolConfig) -> Result<ToolSpec> {
    let discovery = merge_discovery(
        existing.as_ref().map(|t| t.discovery.clone()),
        key,
        &file,
    )?;
    let mut spec = existing.unwrap_or_else(|| ToolSpec::new(key, key, discovery.clone()));
    spec.discovery = discovery;

    if let Some(name) = file.display_name {
        spec.display_name = name;
    }
    if let Some(interpreter) = file.interpreter {
        spec.interpreter = (!interpreter.is_empty()).then_some(interpreter);
    }
    if let Some(args) = file.args {
        spec.args = args;
    }
    if let Some(extra) = file.extra_args {
        spec.extra_args = extra;
    }
    if let Some(hint) = file.install_hint {
        spec.install_hint = Some(hint);
    }
    if let Some(extensions) = file.output_extensions {
        if extensions.is_empty() {
            return Err(CliError::Config(format!(
                "`tools.{}.output-extensions` must not be empty.",
                key
            )));
        }
        spec.output = OutputContract {
            extensions,
            file_prefix: spec.output.file_prefix.take(),
        };
    }
    if let Some(prefix) = file.output_prefix {
        spec.output.file_prefix = (!prefix.is_empty()).then_some(prefix);
    }
    Ok(spec)
}

fn merge_discovery(
    existing: Option<Discovery>,
    key: &str,
    file: &FileToolConfig,
) -> Result<Discovery> {
    let (mut repo, mut script, mut executable): (Option<PathBuf>, Option<String>, Option<String>) =
        match existing {
            Some(Discovery::RepoScript { repo, script }) => (Some(repo), Some(script), None),
            Some(Discovery::RepoAndPath { repo, executable }) => {
                (Some(repo), None, Some(executable))
            }
            Some(Discovery::PathExecutable { executable }) => (None, None, Some(executable)),
            None => (None, None, None),
        };

    if let Some(r) = &file.repo {
        repo = Some(r.clone());
    }
    if let Some(s) = &file.script {
        script = Some(s.clone());
        executable = None;
    }
    if let Some(e) = &file.executable {
        executable = Some(e.clone());
        script = None;
    }

    match (repo, script, executable) {
        (Some(repo), Some(script), None) => Ok(Discovery::RepoScript { repo, script }),
        (Some(repo), None, Some(executable)) => Ok(Discovery::RepoAndPath { repo, executable }),
        (None, None, Some(executable)) => Ok(Discovery::PathExecutable { executable }),
        (None, Some(_), _) => Err(CliError::Config(format!(
            "`tools.{}.script` requires `tools.{}.repo`.",
            key, key
        ))),
        _ => Err(CliError::Config(format!(
            "`tools.{}` needs either `executable` or `repo` and `script`.",
            key
        ))),
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }

    for kv_pair in set_values {
        let (key, value_str) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        match key {
            "python" => config.python = Some(value_str.to_string()),
            "timeout-secs" => {
                let timeout = parser::parse_timeout_secs(key, value_str)
                    .map_err(|e| CliError::Config(e.to_string()))?;
                config.timeout_secs = Some(timeout.map_or(0, |t| t.as_secs()));
            }
            "search-path" => config.search_path = Some(value_str.to_string()),
            "structure.cache-dir" => {
                config
                    .structure
                    .get_or_insert_with(Default::default)
                    .cache_dir = Some(PathBuf::from(value_str));
            }
            "structure.backends" => {
                config
                    .structure
                    .get_or_insert_with(Default::default)
                    .backends = Some(parser::parse_list(value_str));
            }
            "poses.output-dir" => {
                config.poses.get_or_insert_with(Default::default).output_dir =
                    Some(PathBuf::from(value_str));
            }
            "poses.log-dir" => {
                config.poses.get_or_insert_with(Default::default).log_dir =
                    Some(PathBuf::from(value_str));
            }
            _ => match key.strip_prefix("tools.").and_then(|rest| rest.split_once('.')) {
                Some((tool, field)) => {
                    let tool = parser::validate_tool_key(tool, key)
                        .map_err(|e| CliError::Config(e.to_string()))?;
                    let entry = config.tools.entry(tool.to_string()).or_default();
                    apply_tool_value(entry, key, field, value_str)?;
                }
                None => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            },
        }
    }

    Ok(config)
}

fn apply_tool_value(tool: &mut FileToolConfig, key: &str, field: &str, value: &str) -> Result<()> {
    match field {
        "display-name" => tool.display_name = Some(value.to_string()),
        "executable" => tool.executable = Some(value.to_string()),
        "repo" => tool.repo = Some(PathBuf::from(value)),
        "script" => tool.script = Some(value.to_string()),
        "interpreter" => tool.interpreter = Some(value.to_string()),
        "args" => tool.args = Some(parser::parse_words(value)),
        "extra-args" => tool.extra_args = Some(parser::parse_words(value)),
        "install-hint" => tool.install_hint = Some(value.to_string()),
        "output-extensions" => tool.output_extensions = Some(parser::parse_list(value)),
        "output-prefix" => tool.output_prefix = Some(value.to_string()),
        _ => {
            return Err(CliError::Config(format!(
                "Unsupported configuration key for --set: '{}'",
                key
            )));
        }
    }
    Ok(())
}
