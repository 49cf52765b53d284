use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::LoadOptions;
use crate::data::risk::RiskRule;

/// Config file picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Dashboard settings. Every key is optional in the JSON file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub risk: RiskRule,
    pub drop_duplicates: bool,
    /// Rows shown in the preview table.
    pub preview_rows: usize,
    /// Dataset opened at start-up when no file is given on the command line.
    pub default_dataset: Option<PathBuf>,
    /// Excel sheet to read; first sheet when unset.
    pub excel_sheet: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            risk: RiskRule::default(),
            drop_duplicates: true,
            preview_rows: 500,
            default_dataset: Some(PathBuf::from("data/students_sample.csv")),
            excel_sheet: None,
        }
    }
}

impl DashboardConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            sheet: self.excel_sheet.clone(),
            drop_duplicates: self.drop_duplicates,
        }
    }

    fn validate(&self) -> Result<()> {
        let threshold = self.risk.engagement_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            bail!("risk.engagement_threshold must be within [0, 100], got {threshold}");
        }
        if self.preview_rows == 0 {
            bail!("preview_rows must be greater than zero");
        }
        Ok(())
    }
}

/// Read and validate a config file.
pub fn load_config_file(path: &Path) -> Result<DashboardConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: DashboardConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Resolve the config: an explicit path must exist; otherwise
/// [`DEFAULT_CONFIG_FILE`] is used when present, else built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<DashboardConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    if fallback.exists() {
        log::info!("Using config {}", fallback.display());
        return load_config_file(fallback);
    }
    Ok(DashboardConfig::default())
}
