use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STDERR_TAIL_CHARS: usize = 2000;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {}{}", describe_code(.code), describe_stderr(.stderr_tail))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("'{program}' timed out after {:.1}s and was killed", .timeout.as_secs_f64())]
    TimedOut { program: String, timeout: Duration },

    #[error("'{program}' was cancelled")]
    Cancelled { program: String },

    #[error("Failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

fn describe_stderr(tail: &str) -> String {
    if tail.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", tail.trim())
    }
}

/// How the child's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// The child shares the parent's terminal.
    #[default]
    Inherit,
    /// stdout and stderr are collected into [`ProcessOutput`].
    Capture,
}

/// A fully rendered command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub working_dir: Option<PathBuf>,
    pub stdio: StdioMode,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            stdio: StdioMode::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn capture(mut self) -> Self {
        self.stdio = StdioMode::Capture;
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// What a successful child left behind. Streams are empty unless captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// stdout, a newline, then stderr.
    pub fn combined_log(&self) -> Vec<u8> {
        let mut log = Vec::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        log.extend_from_slice(&self.stdout);
        log.push(b'\n');
        log.extend_from_slice(&self.stderr);
        log
    }
}

/// Runs external commands to completion.
///
/// A non-zero exit status is an error. Implementations must block until the
/// child has finished or has been killed.
pub trait ProcessRunner {
    fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError>;
}

/// [`ProcessRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Children are killed as soon as `flag` becomes `true`.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn wait_for(&self, child: &mut Child, program: &str) -> Result<ExitStatus, ProcessError> {
        let wait_error = |source: io::Error| ProcessError::Wait {
            program: program.to_string(),
            source,
        };

        if self.timeout.is_none() && self.cancel.is_none() {
            return child.wait().map_err(wait_error);
        }

        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(wait_error)? {
                return Ok(status);
            }
            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    warn!("'{}' exceeded its {:?} timeout, killing it.", program, timeout);
                    kill_and_reap(child);
                    return Err(ProcessError::TimedOut {
                        program: program.to_string(),
                        timeout,
                    });
                }
            }
            if self
                .cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::SeqCst))
            {
                warn!("Cancellation requested, killing '{}'.", program);
                kill_and_reap(child);
                return Err(ProcessError::Cancelled {
                    program: program.to_string(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill() failed, child probably already exited: {}", e);
    }
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    stream.map(|mut stream| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = stream.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let count = text.chars().count();
    if count <= STDERR_TAIL_CHARS {
        text.into_owned()
    } else {
        text.chars().skip(count - STDERR_TAIL_CHARS).collect()
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        let program = spec.program_name();
        debug!("Executing: {}", spec);

        let mut command = Command::new(&spec.program);
        command.args(&spec.args).stdin(Stdio::null());
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }
        if spec.stdio == StdioMode::Capture {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait_for(&mut child, &program)?;
        let output = ProcessOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
        };

        if status.success() {
            Ok(output)
        } else {
            Err(ProcessError::NonZeroExit {
                program,
                code: status.code(),
                stderr_tail: tail(&output.stderr),
            })
        }
    }
}
