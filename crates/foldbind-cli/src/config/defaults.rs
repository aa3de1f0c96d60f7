use foldbind::core::tools::STRUCTURE_BACKENDS;
use std::path::PathBuf;

pub struct DefaultsConfig {
    pub python: String,
    pub timeout_secs: u64,
    pub cache_dir: PathBuf,
    pub backends: Vec<String>,
    pub pose_output_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            timeout_secs: 0,
            cache_dir: PathBuf::from("data/cache/structures"),
            backends: STRUCTURE_BACKENDS.iter().map(|b| b.to_string()).collect(),
            pose_output_dir: PathBuf::from("data/output/poses"),
            log_dir: PathBuf::from("logs"),
        }
    }
}
