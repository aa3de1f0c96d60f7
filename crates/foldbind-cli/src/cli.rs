use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "foldbind",
    author = "foldbind contributors",
    version,
    about = "foldbind - Run protein structure, pose and affinity predictors with fallback and caching.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output. Status and error lines are still printed
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S structure.backends=esmfold
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict a protein structure from a FASTA file, trying each backend in turn.
    Structure(StructureArgs),
    /// Run the selected pose predictors one after another, isolating failures.
    Poses(PosesArgs),
    /// Run a single pose predictor.
    Pose(PoseArgs),
    /// Estimate protein-ligand binding affinity with Boltz2.
    Affinity(AffinityArgs),
}

#[derive(Args, Debug)]
pub struct StructureArgs {
    /// Input protein sequence (.fasta or .fa).
    #[arg(long, required = true, value_name = "PATH")]
    pub protein: PathBuf,

    /// Cache directory for predicted structures.
    #[arg(long, alias = "output_dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Protein identifier used in file names. Defaults to the FASTA file stem.
    #[arg(long, alias = "protein_id", value_name = "ID")]
    pub protein_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct PosesArgs {
    /// Protein input (.fasta, .fa or .pdb).
    #[arg(long, required = true, value_name = "PATH")]
    pub protein: PathBuf,

    /// Ligand input (.smi, .sdf, .mol2, .mol or .pdb).
    #[arg(long, required = true, value_name = "PATH")]
    pub ligand: PathBuf,

    #[arg(long, alias = "protein_id", required = true, value_name = "ID")]
    pub protein_id: String,

    #[arg(long, alias = "ligand_id", required = true, value_name = "ID")]
    pub ligand_id: String,

    /// Pose predictors to run. Defaults to all of them.
    #[arg(long, value_enum, num_args = 0.., value_name = "MODEL")]
    pub models: Option<Vec<PoseTool>>,

    /// Root directory for per-tool pose outputs.
    #[arg(long, alias = "output_dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for the per-tool log files.
    #[arg(long, alias = "log_dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PoseArgs {
    /// The pose predictor to run.
    #[arg(value_enum)]
    pub tool: PoseTool,

    #[arg(long, required = true, value_name = "PATH")]
    pub protein: PathBuf,

    #[arg(long, required = true, value_name = "PATH")]
    pub ligand: PathBuf,

    /// Where the predictor writes the pose.
    #[arg(long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct AffinityArgs {
    /// Protein sequence (.fasta or .fa).
    #[arg(long, required = true, value_name = "PATH")]
    pub protein: PathBuf,

    /// Ligand SMILES file (.smi).
    #[arg(long, required = true, value_name = "PATH")]
    pub ligand: PathBuf,

    /// Output JSON record.
    #[arg(long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[arg(long, alias = "protein_id", default_value = "PROT", value_name = "ID")]
    pub protein_id: String,

    #[arg(long, alias = "ligand_id", default_value = "LIG", value_name = "ID")]
    pub ligand_id: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseTool {
    Equibind,
    Neuralplexer,
    Umol,
}

impl PoseTool {
    pub const ALL: [PoseTool; 3] = [PoseTool::Equibind, PoseTool::Neuralplexer, PoseTool::Umol];

    /// The tool's key in the tool table.
    pub fn key(self) -> &'static str {
        match self {
            PoseTool::Equibind => "equibind",
            PoseTool::Neuralplexer => "neuralplexer",
            PoseTool::Umol => "umol",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_accepts_underscore_aliases() {
        let cli = Cli::try_parse_from([
            "foldbind",
            "structure",
            "--protein",
            "p.fasta",
            "--output_dir",
            "cache",
            "--protein_id",
            "P1",
        ])
        .unwrap();
        let Commands::Structure(args) = cli.command else {
            panic!("expected structure");
        };
        assert_eq!(args.output_dir, Some(PathBuf::from("cache")));
        assert_eq!(args.protein_id.as_deref(), Some("P1"));
    }

    #[test]
    fn poses_models_default_to_none_and_parse_lists() {
        let base = [
            "foldbind",
            "poses",
            "--protein",
            "p.pdb",
            "--ligand",
            "l.sdf",
            "--protein_id",
            "P",
            "--ligand_id",
            "L",
        ];
        let cli = Cli::try_parse_from(base).unwrap();
        let Commands::Poses(args) = cli.command else {
            panic!("expected poses");
        };
        assert_eq!(args.models, None);

        let cli = Cli::try_parse_from(base.iter().copied().chain(["--models", "umol", "equibind"]))
            .unwrap();
        let Commands::Poses(args) = cli.command else {
            panic!("expected poses");
        };
        assert_eq!(args.models, Some(vec![PoseTool::Umol, PoseTool::Equibind]));
    }

    #[test]
    fn poses_require_both_identifiers() {
        let result = Cli::try_parse_from([
            "foldbind", "poses", "--protein", "p.pdb", "--ligand", "l.sdf", "--protein-id", "P",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn pose_tool_is_positional_and_validated() {
        let cli = Cli::try_parse_from([
            "foldbind",
            "--config",
            "foldbind.toml",
            "pose",
            "-S",
            "python=python3.11",
            "neuralplexer",
            "--protein",
            "p.pdb",
            "--ligand",
            "l.sdf",
            "--output",
            "out.pdb",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("foldbind.toml")));
        assert_eq!(cli.set_values, vec!["python=python3.11"]);
        let Commands::Pose(args) = cli.command else {
            panic!("expected pose");
        };
        assert_eq!(args.tool, PoseTool::Neuralplexer);

        assert!(
            Cli::try_parse_from([
                "foldbind", "pose", "diffdock", "--protein", "p", "--ligand", "l", "--output", "o",
            ])
            .is_err()
        );
    }

    #[test]
    fn affinity_identifiers_have_defaults() {
        let cli = Cli::try_parse_from([
            "foldbind",
            "affinity",
            "--protein",
            "p.fasta",
            "--ligand",
            "l.smi",
            "--output",
            "a.json",
        ])
        .unwrap();
        let Commands::Affinity(args) = cli.command else {
            panic!("expected affinity");
        };
        assert_eq!(args.protein_id, "PROT");
        assert_eq!(args.ligand_id, "LIG");
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let args = ["foldbind", "-v", "-q", "structure", "--protein", "p.fasta"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn forwarded_configuration_precedes_the_pose_subcommand() {
        let cli = Cli::try_parse_from([
            "foldbind",
            "--config",
            "foldbind.toml",
            "--set",
            "python=python3.11",
            "pose",
            "umol",
            "--protein",
            "p.pdb",
            "--ligand",
            "l.sdf",
            "--output",
            "out/umol/L_P.pdb",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("foldbind.toml")));
        assert_eq!(cli.set_values, vec!["python=python3.11"]);
        let Commands::Pose(args) = cli.command else {
            panic!("expected pose");
        };
        assert_eq!(args.tool, PoseTool::Umol);
    }
}
