use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// An append-only text log for one tool, one line per event:
/// `YYYY-MM-DD HH:MM:SS,mmm LEVEL message`.
#[derive(Debug)]
pub struct ToolLog {
    path: PathBuf,
    file: File,
}

impl ToolLog {
    /// Opens `path` for appending, creating it and its parent directory.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&mut self, message: &str) -> io::Result<()> {
        self.write(LogLevel::Info, message)
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.write(LogLevel::Error, message)
    }

    pub fn write(&mut self, level: LogLevel, message: &str) -> io::Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        writeln!(self.file, "{} {} {}", timestamp, level, message)?;
        self.file.flush()
    }
}
