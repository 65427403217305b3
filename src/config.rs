use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

pub const DEFAULT_INPUT: &str = "data/online_retail.csv";
pub const DEFAULT_OUTPUT: &str = "data/cleaned_retail.parquet";
pub const DEFAULT_REPORT: &str = "data/cleaning_report.json";
pub const CONFIG_FILE: &str = "retail_clean.yaml";
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Where the stage reads from and writes to, plus the description sentinel.
///
/// Every field has a default; a YAML file may override any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub report_path: PathBuf,
    pub missing_description: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            report_path: PathBuf::from(DEFAULT_REPORT),
            missing_description: UNKNOWN_PRODUCT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load `retail_clean.yaml` from the working directory if present,
    /// else fall back to the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let cfg: PipelineConfig =
            serde_yaml::from_str(&text).map_err(|source| PipelineError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        info!(config = %path.display(), "loaded config overrides");
        Ok(cfg)
    }
}
