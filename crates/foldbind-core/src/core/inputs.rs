use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Identifier used for proteins when none is supplied and no file stem is available.
pub const DEFAULT_PROTEIN_ID: &str = "PROT";
/// Identifier used for ligands when none is supplied.
pub const DEFAULT_LIGAND_ID: &str = "LIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Protein,
    Ligand,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRole::Protein => write!(f, "Protein"),
            InputRole::Ligand => write!(f, "Ligand"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{role} file not found: {}", .path.display())]
    NotFound { role: InputRole, path: PathBuf },

    #[error("{role} must be one of [{}]: {}", .expected.join(", "), .path.display())]
    UnexpectedExtension {
        role: InputRole,
        path: PathBuf,
        expected: Vec<&'static str>,
    },

    #[error("{role} file is required but was not provided")]
    Missing { role: InputRole },
}

/// Accepted file extensions for the protein and ligand inputs of an operation.
///
/// Extensions are compared case-insensitively and without the leading dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRules {
    pub protein_extensions: &'static [&'static str],
    pub ligand_extensions: &'static [&'static str],
}

impl InputRules {
    /// FASTA protein sequences and SMILES ligands.
    pub const SEQUENCE: InputRules = InputRules {
        protein_extensions: &["fasta", "fa"],
        ligand_extensions: &["smi"],
    };

    /// Inputs accepted by pose predictors, which also take structure files and
    /// 3D ligand formats.
    pub const POSE: InputRules = InputRules {
        protein_extensions: &["fasta", "fa", "pdb"],
        ligand_extensions: &["smi", "sdf", "mol2", "mol", "pdb"],
    };

    pub fn validate_protein(&self, path: &Path) -> Result<(), InputError> {
        check_file(path, InputRole::Protein, self.protein_extensions)
    }

    pub fn validate_ligand(&self, path: &Path) -> Result<(), InputError> {
        check_file(path, InputRole::Ligand, self.ligand_extensions)
    }

    /// Validates both inputs of a job.
    ///
    /// Existence of every file is checked before any extension so that a missing
    /// file is always reported as such, protein first.
    pub fn validate(&self, protein: &Path, ligand: Option<&Path>) -> Result<(), InputError> {
        ensure_exists(protein, InputRole::Protein)?;
        if let Some(ligand) = ligand {
            ensure_exists(ligand, InputRole::Ligand)?;
        }
        self.validate_protein(protein)?;
        if let Some(ligand) = ligand {
            self.validate_ligand(ligand)?;
        }
        Ok(())
    }
}

fn ensure_exists(path: &Path, role: InputRole) -> Result<(), InputError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(InputError::NotFound {
            role,
            path: path.to_path_buf(),
        })
    }
}

fn check_file(path: &Path, role: InputRole, accepted: &[&'static str]) -> Result<(), InputError> {
    ensure_exists(path, role)?;
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| accepted.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false);
    if matches {
        Ok(())
    } else {
        Err(InputError::UnexpectedExtension {
            role,
            path: path.to_path_buf(),
            expected: accepted.to_vec(),
        })
    }
}

/// The inputs of one invocation. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    protein: PathBuf,
    ligand: Option<PathBuf>,
    protein_id: String,
    ligand_id: String,
}

impl JobDescriptor {
    /// Creates a descriptor, falling back to the protein file stem and
    /// [`DEFAULT_LIGAND_ID`] for missing or empty identifiers.
    pub fn new(
        protein: impl Into<PathBuf>,
        ligand: Option<PathBuf>,
        protein_id: Option<String>,
        ligand_id: Option<String>,
    ) -> Self {
        let protein = protein.into();
        let protein_id = protein_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| default_protein_id(&protein));
        Self {
            protein,
            ligand,
            protein_id,
            ligand_id: ligand_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| DEFAULT_LIGAND_ID.to_string()),
        }
    }

    pub fn protein(&self) -> &Path {
        &self.protein
    }

    pub fn ligand(&self) -> Option<&Path> {
        self.ligand.as_deref()
    }

    /// The ligand path, or [`InputError::Missing`] for jobs that need one.
    pub fn require_ligand(&self) -> Result<&Path, InputError> {
        self.ligand().ok_or(InputError::Missing {
            role: InputRole::Ligand,
        })
    }

    pub fn protein_id(&self) -> &str {
        &self.protein_id
    }

    pub fn ligand_id(&self) -> &str {
        &self.ligand_id
    }

    pub fn validate(&self, rules: &InputRules) -> Result<(), InputError> {
        rules.validate(&self.protein, self.ligand())
    }
}

/// The file stem of `path` (`proteins/abc.fasta` -> `abc`).
pub fn default_protein_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_PROTEIN_ID.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, ">seq\nMKT\n").unwrap();
        path
    }

    #[test]
    fn accepts_fasta_and_smiles_inputs() {
        let dir = tempdir().unwrap();
        let protein = touch(dir.path(), "prot.fasta");
        let ligand = touch(dir.path(), "lig.smi");

        assert!(InputRules::SEQUENCE.validate(&protein, Some(&ligand)).is_ok());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let protein = touch(dir.path(), "PROT.FA");

        assert!(InputRules::SEQUENCE.validate(&protein, None).is_ok());
    }

    #[test]
    fn missing_protein_is_reported_before_ligand_problems() {
        let dir = tempdir().unwrap();
        let ligand = touch(dir.path(), "lig.txt");
        let missing = dir.path().join("absent.fasta");

        let err = InputRules::SEQUENCE
            .validate(&missing, Some(&ligand))
            .unwrap_err();
        assert_eq!(
            err,
            InputError::NotFound {
                role: InputRole::Protein,
                path: missing
            }
        );
    }

    #[test]
    fn missing_ligand_wins_over_bad_protein_extension() {
        let dir = tempdir().unwrap();
        let protein = touch(dir.path(), "prot.txt");
        let missing = dir.path().join("lig.smi");

        let err = InputRules::SEQUENCE
            .validate(&protein, Some(&missing))
            .unwrap_err();
        assert!(matches!(
            err,
            InputError::NotFound {
                role: InputRole::Ligand,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unexpected_extensions() {
        let dir = tempdir().unwrap();
        let protein = touch(dir.path(), "prot.pdb");
        let ligand = touch(dir.path(), "lig.sdf");

        let err = InputRules::SEQUENCE.validate(&protein, None).unwrap_err();
        assert!(matches!(
            err,
            InputError::UnexpectedExtension {
                role: InputRole::Protein,
                ..
            }
        ));

        let fasta = touch(dir.path(), "prot.fasta");
        let err = InputRules::SEQUENCE
            .validate(&fasta, Some(&ligand))
            .unwrap_err();
        assert!(err.to_string().contains("smi"));
    }

    #[test]
    fn pose_rules_accept_structure_inputs() {
        let dir = tempdir().unwrap();
        let protein = touch(dir.path(), "receptor.pdb");
        let ligand = touch(dir.path(), "ligand.sdf");

        assert!(InputRules::POSE.validate(&protein, Some(&ligand)).is_ok());
    }

    #[test]
    fn directories_are_not_accepted_as_files() {
        let dir = tempdir().unwrap();
        let fake = dir.path().join("dir.fasta");
        fs::create_dir(&fake).unwrap();

        assert!(matches!(
            InputRules::SEQUENCE.validate(&fake, None),
            Err(InputError::NotFound { .. })
        ));
    }

    #[test]
    fn job_descriptor_defaults_identifiers() {
        let job = JobDescriptor::new("data/proteins/abc1.fasta", None, None, None);
        assert_eq!(job.protein_id(), "abc1");
        assert_eq!(job.ligand_id(), DEFAULT_LIGAND_ID);
        assert!(job.require_ligand().is_err());

        let job = JobDescriptor::new(
            "x.fa",
            Some(PathBuf::from("y.smi")),
            Some("P1".into()),
            Some("L1".into()),
        );
        assert_eq!(job.protein_id(), "P1");
        assert_eq!(job.ligand_id(), "L1");
        assert_eq!(job.require_ligand().unwrap(), Path::new("y.smi"));
    }

    #[test]
    fn empty_identifiers_fall_back_to_defaults() {
        let job = JobDescriptor::new(
            "data/proteins/abc1.fasta",
            Some(PathBuf::from("lig.smi")),
            Some(String::new()),
            Some(String::new()),
        );
        assert_eq!(job.protein_id(), "abc1");
        assert_eq!(job.ligand_id(), DEFAULT_LIGAND_ID);
    }
}
