use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Describes which files a tool run is expected to produce in its output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputContract {
    /// Accepted extensions, compared case-insensitively, without the leading dot.
    pub extensions: Vec<String>,
    /// Required file-name prefix, if any.
    pub file_prefix: Option<String>,
}

impl OutputContract {
    pub fn with_extension(ext: &str) -> Self {
        Self {
            extensions: vec![ext.to_string()],
            file_prefix: None,
        }
    }

    /// Structure files in PDB format.
    pub fn pdb() -> Self {
        Self::with_extension("pdb")
    }

    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.file_prefix = Some(prefix.to_string());
        self
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if let Some(prefix) = &self.file_prefix {
            if !name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Every matching file below `dir`, sorted by path.
    ///
    /// Sorting makes the choice among several candidates independent of the
    /// order in which the filesystem returns directory entries.
    pub fn find_candidates(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        self.walk(dir, &mut found)?;
        found.sort();
        Ok(found)
    }

    /// The first candidate in sorted order.
    pub fn find_first(&self, dir: &Path) -> io::Result<Option<PathBuf>> {
        Ok(self.find_candidates(dir)?.into_iter().next())
    }

    fn walk(&self, dir: &Path, found: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                self.walk(&path, found)?;
            } else if file_type.is_file() && self.matches(&path) {
                found.push(path);
            }
        }
        Ok(())
    }
}

impl Default for OutputContract {
    fn default() -> Self {
        Self::pdb()
    }
}
