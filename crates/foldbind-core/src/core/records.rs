use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error message recorded when every structure backend failed.
pub const ALL_MODELS_FAILED: &str = "All models failed.";

/// Seconds rounded to two decimals, the precision used in every record.
pub fn rounded_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

/// Sidecar metadata stored next to a cached structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureMetadata {
    pub model_used: Option<String>,
    pub runtime_sec: f64,
    pub error: Option<String>,
}

impl StructureMetadata {
    pub fn success(model: &str, elapsed: Duration) -> Self {
        Self {
            model_used: Some(model.to_string()),
            runtime_sec: rounded_seconds(elapsed),
            error: None,
        }
    }

    pub fn exhausted(elapsed: Duration) -> Self {
        Self {
            model_used: None,
            runtime_sec: rounded_seconds(elapsed),
            error: Some(ALL_MODELS_FAILED.to_string()),
        }
    }
}

/// Result document of the affinity wrapper.
///
/// Field order is the on-disk key order. `error` is only emitted for fallback
/// records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityRecord {
    pub protein: PathBuf,
    pub ligand: PathBuf,
    pub protein_id: String,
    pub ligand_id: String,
    pub model: String,
    pub fallback: bool,
    pub delta_g: Option<f64>,
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub runtime_sec: f64,
}

/// Writes `value` as pretty-printed JSON.
///
/// The document is written to a temporary file in the destination directory and
/// renamed into place, so readers never see a partial document.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut tmp, value).map_err(io::Error::other)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> io::Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn runtime_is_rounded_to_two_decimals() {
        assert_eq!(rounded_seconds(Duration::from_millis(1234)), 1.23);
        assert_eq!(rounded_seconds(Duration::from_millis(1236)), 1.24);
        assert_eq!(rounded_seconds(Duration::ZERO), 0.0);
    }

    #[test]
    fn exhausted_metadata_serializes_null_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p_hash.log.json");
        write_json(&path, &StructureMetadata::exhausted(Duration::from_secs(3))).unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["model_used"].is_null());
        assert_eq!(value["runtime_sec"], 3.0);
        assert_eq!(value["error"], ALL_MODELS_FAILED);
    }

    #[test]
    fn success_metadata_keeps_error_key_as_null() {
        let json = serde_json::to_string(&StructureMetadata::success(
            "ColabFold",
            Duration::from_millis(500),
        ))
        .unwrap();
        assert_eq!(
            json,
            r#"{"model_used":"ColabFold","runtime_sec":0.5,"error":null}"#
        );
    }

    #[test]
    fn affinity_record_omits_error_unless_fallback() {
        let mut record = AffinityRecord {
            protein: PathBuf::from("p.fasta"),
            ligand: PathBuf::from("l.smi"),
            protein_id: "PROT".into(),
            ligand_id: "LIG".into(),
            model: "Boltz2".into(),
            fallback: false,
            delta_g: Some(-7.2),
            confidence: Some(0.81),
            error: None,
            runtime_sec: 1.5,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("error").is_none());

        record.fallback = true;
        record.error = Some("boom".into());
        let json = serde_json::to_string(&record).unwrap();
        let error_at = json.find("\"error\"").unwrap();
        let runtime_at = json.find("\"runtime_sec\"").unwrap();
        assert!(error_at < runtime_at);
    }

    #[test]
    fn write_json_overwrites_existing_documents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        write_json(&path, &StructureMetadata::exhausted(Duration::ZERO)).unwrap();
        write_json(
            &path,
            &StructureMetadata::success("ESMFold", Duration::from_secs(1)),
        )
        .unwrap();

        let back: StructureMetadata = read_json(&path).unwrap();
        assert_eq!(back.model_used.as_deref(), Some("ESMFold"));
        assert!(back.error.is_none());
    }
}
