//! Test doubles shared by the engine and workflow tests.

use crate::core::process::{CommandSpec, ProcessError, ProcessOutput, ProcessRunner};
use crate::core::tools::Locator;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

type Behaviour = Box<dyn Fn(&CommandSpec) -> Result<ProcessOutput, ProcessError> + Send + Sync>;

/// A [`ProcessRunner`] that records every command and answers with a closure.
pub struct MockRunner {
    calls: Mutex<Vec<CommandSpec>>,
    behaviour: Behaviour,
}

impl MockRunner {
    pub fn new<F>(behaviour: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<ProcessOutput, ProcessError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            behaviour: Box::new(behaviour),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ProcessOutput::default()))
    }

    pub fn failing() -> Self {
        Self::new(|cmd| {
            Err(ProcessError::NonZeroExit {
                program: cmd.program_name(),
                code: Some(1),
                stderr_tail: "mock failure".into(),
            })
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProcessRunner for MockRunner {
    fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(command.clone());
        (self.behaviour)(command)
    }
}

/// The last argument of `command` as a path.
pub fn last_arg(command: &CommandSpec) -> PathBuf {
    command
        .args
        .last()
        .map(PathBuf::from)
        .unwrap_or_default()
}

/// Writes `contents` to `dir/name`, creating `dir`.
pub fn write_into(dir: &Path, name: &str, contents: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

/// Creates an executable stub called `name` in `dir`.
pub fn fake_tool(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

pub fn search_path_with(dir: &Path) -> Locator {
    Locator::with_search_path(dir.as_os_str())
}
