//! Runtime configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use brdoc_core::error::{BrError, BrResult};
use brdoc_llm::ModelConfig;

fn default_base_url() -> String {
    "http://localhost:81".to_string()
}

fn default_data_root() -> PathBuf {
    PathBuf::from("reports/br_docs")
}

fn default_locale() -> String {
    "pl_PL".to_string()
}

/// Configuration of the documentation engine.
///
/// Loaded from YAML with environment overrides for the secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrConfig {
    /// Postgres DSN for the read model; SQL sources degrade gracefully
    /// when absent.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Root directory of generated artifacts and their versions.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    /// Base URL used to synthesise verification URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model chain, lowest priority first; empty disables model paths.
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    /// Locale for money/date formatting. Fixed to pl_PL.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// TTF embedded into PDFs for full Polish diacritics.
    #[serde(default)]
    pub pdf_font_path: Option<PathBuf>,
}

impl Default for BrConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            data_root: default_data_root(),
            base_url: default_base_url(),
            models: Vec::new(),
            locale: default_locale(),
            pdf_font_path: None,
        }
    }
}

impl BrConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> BrResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: BrConfig =
            serde_yaml::from_str(&text).map_err(|e| BrError::config(e.to_string()))?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides (`DATABASE_URL`, `BR_BASE_URL`,
    /// `BR_DATA_ROOT`).
    pub fn apply_env(&mut self) {
        if let Ok(dsn) = std::env::var("DATABASE_URL") {
            self.database_url = Some(dsn);
        }
        if let Ok(url) = std::env::var("BR_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(root) = std::env::var("BR_DATA_ROOT") {
            self.data_root = PathBuf::from(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_knobs() {
        let config = BrConfig::default();
        assert_eq!(config.base_url, "http://localhost:81");
        assert_eq!(config.locale, "pl_PL");
        assert!(config.models.is_empty());
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = "base_url: http://api.example\ndata_root: /tmp/docs\n";
        let config: BrConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.base_url, "http://api.example");
        assert_eq!(config.data_root, PathBuf::from("/tmp/docs"));
    }
}
