use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sheetwright::llm::GeminiConfig;
use sheetwright::llm::gemini::{DEFAULT_MODEL, GEMINI_API_URL};
use sheetwright::llm::types::DEFAULT_MAX_OUTPUT_TOKENS;
use sheetwright::repair::{DEFAULT_MAX_ATTEMPTS, RepairConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub repair: RepairSection,
    pub output: OutputConfig,
}

/// Sampling is always deterministic, so there is no temperature key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_URL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout_ms: 120000,
        }
    }
}

impl LlmConfig {
    pub fn client_config(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairSection {
    pub max_attempts: u32,
}

impl Default for RepairSection {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            file_prefix: "excel_gen".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            repair: RepairSection::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    pub fn repair_config(&self) -> RepairConfig {
        RepairConfig {
            max_output_tokens: self.llm.max_output_tokens,
            ..Default::default()
        }
        .with_max_attempts(self.repair.max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.max_output_tokens, 8000);
        assert_eq!(config.repair.max_attempts, 3);
        assert_eq!(config.output.file_prefix, "excel_gen");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sheetwright.yml");
        fs::write(&path, "llm:\n  model: gemini-2.5-pro\nrepair:\n  max_attempts: 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.llm.base_url, GEMINI_API_URL);
        assert_eq!(config.repair.max_attempts, 5);
        assert_eq!(config.repair_config().max_attempts, 5);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_repair_config_clamps_attempts() {
        let mut config = Config::default();
        config.repair.max_attempts = 0;
        assert_eq!(config.repair_config().max_attempts, 1);
    }

    #[test]
    fn test_client_config() {
        let mut config = Config::default();
        config.llm.timeout_ms = 5000;
        let client = config.llm.client_config();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.base_url, GEMINI_API_URL);
    }

    #[test]
    fn test_temperature_is_not_configurable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sheetwright.yml");
        fs::write(&path, "llm:\n  temperature: 0.9\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }
}
