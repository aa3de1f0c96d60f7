use super::error::EngineError;
use crate::core::hashing::ContentHash;
use crate::core::records::{self, StructureMetadata};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

const SCRATCH_PREFIX: &str = ".scratch-";

/// Identity of a cached structure: the caller's protein id plus the content
/// hash of the sequence file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub protein_id: String,
    pub hash: ContentHash,
}

impl CacheKey {
    pub fn new(protein_id: &str, hash: ContentHash) -> Self {
        Self {
            protein_id: protein_id.to_string(),
            hash,
        }
    }

    /// `<protein_id>_<hash>`, the shared stem of every file of the entry.
    pub fn stem(&self) -> String {
        format!("{}_{}", self.protein_id, self.hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub structure: PathBuf,
    pub metadata: PathBuf,
}

/// Structure files keyed by [`CacheKey`], stored flat in one directory.
///
/// Entries are created on first success and never evicted. All writes go
/// through a temporary file or scratch directory inside the cache root followed
/// by a rename, so a concurrent reader sees either nothing or a complete file.
#[derive(Debug, Clone)]
pub struct StructureCache {
    root: PathBuf,
}

impl StructureCache {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(EngineError::cache(&root))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_paths(&self, key: &CacheKey) -> CacheEntry {
        let stem = key.stem();
        CacheEntry {
            structure: self.root.join(format!("{}.pdb", stem)),
            metadata: self.root.join(format!("{}.log.json", stem)),
        }
    }

    /// `<stem>.pdb.<backend>.log`, the captured output of the backend that
    /// produced the structure.
    pub fn backend_log_path(&self, key: &CacheKey, backend: &str) -> PathBuf {
        self.root.join(format!("{}.pdb.{}.log", key.stem(), backend))
    }

    /// The entry for `key` if its structure file exists and is non-empty.
    pub fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entry_paths(key);
        match fs::metadata(&entry.structure) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Some(entry),
            Ok(meta) if meta.is_file() => {
                warn!(
                    "Cached structure {} is empty, treating it as a miss.",
                    entry.structure.display()
                );
                None
            }
            Ok(_) => None,
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(
                    "Could not inspect cached structure {}: {}",
                    entry.structure.display(),
                    e
                );
                None
            }
        }
    }

    /// A fresh directory inside the cache root, removed when dropped.
    pub fn scratch_dir(&self) -> Result<TempDir, EngineError> {
        tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.root)
            .map_err(EngineError::cache(&self.root))
    }

    /// Moves `produced` into the cache as the structure of `key`.
    ///
    /// `produced` normally lives in a scratch directory of this cache, so the
    /// rename stays on one filesystem. If the rename fails anyway the file is
    /// copied to a temporary file in the cache root and that is renamed.
    pub fn store(&self, key: &CacheKey, produced: &Path) -> Result<PathBuf, EngineError> {
        let target = self.entry_paths(key).structure;
        if let Err(e) = fs::rename(produced, &target) {
            debug!(
                "Rename of {} failed ({}), copying instead.",
                produced.display(),
                e
            );
            let tmp = tempfile::NamedTempFile::new_in(&self.root)
                .map_err(EngineError::cache(&self.root))?;
            fs::copy(produced, tmp.path()).map_err(EngineError::cache(produced))?;
            tmp.persist(&target)
                .map_err(|e| EngineError::cache(&target)(e.error))?;
        }
        Ok(target)
    }

    /// Writes the captured backend output next to the structure.
    pub fn write_backend_log(
        &self,
        key: &CacheKey,
        backend: &str,
        contents: &[u8],
    ) -> Result<PathBuf, EngineError> {
        let path = self.backend_log_path(key, backend);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(EngineError::cache(&self.root))?;
        io::Write::write_all(&mut tmp, contents).map_err(EngineError::cache(&path))?;
        tmp.persist(&path)
            .map_err(|e| EngineError::cache(&path)(e.error))?;
        Ok(path)
    }

    pub fn write_metadata(
        &self,
        key: &CacheKey,
        metadata: &StructureMetadata,
    ) -> Result<PathBuf, EngineError> {
        let path = self.entry_paths(key).metadata;
        records::write_json(&path, metadata).map_err(EngineError::cache(&path))?;
        Ok(path)
    }
}
