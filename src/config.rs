use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::clinical::ClinicalSettings;
use crate::error::CoachError;
use crate::logging::LogConfig;
use crate::plan::PlanningSettings;
use crate::scoring::ScoringWeights;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Configuration metadata
    #[serde(default)]
    pub metadata: ConfigMetadata,

    /// Weights of the 14 exercise scoring dimensions
    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Clinical analysis windows and thresholds
    #[serde(default)]
    pub clinical: ClinicalSettings,

    /// Plan generation settings
    #[serde(default)]
    pub planning: PlanningSettings,

    /// Logging used by the command-line driver
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            metadata: ConfigMetadata::default(),
            scoring: ScoringWeights::default(),
            clinical: ClinicalSettings::default(),
            planning: PlanningSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: EngineConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.as_ref().display()))?;
        debug!(path = %path.as_ref().display(), "loaded engine configuration");

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coachrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    path = %config_path.display(),
                    error = %err,
                    "Config file not usable, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Check the invariants the engine relies on
    pub fn validate(&self) -> crate::error::Result<()> {
        let weights = self.scoring.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CoachError::Configuration(
                "scoring weights must be finite and non-negative".to_string(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(CoachError::Configuration(
                "scoring weights sum to zero".to_string(),
            ));
        }

        let clinical = &self.clinical;
        if clinical.min_span_days == 0 || clinical.lookback_days < clinical.min_span_days {
            return Err(CoachError::Configuration(format!(
                "lookback window of {} days cannot hold a {}-day minimum span",
                clinical.lookback_days, clinical.min_span_days
            )));
        }
        if !(clinical.dead_zone >= 0.0) || !(clinical.min_projection_rate >= 0.0) {
            return Err(CoachError::Configuration(
                "dead zone and projection rate must be non-negative".to_string(),
            ));
        }
        if clinical.max_projection_weeks <= 0.0 {
            return Err(CoachError::Configuration(
                "projection cap must be positive".to_string(),
            ));
        }
        if clinical.min_correlation_samples < 3 {
            return Err(CoachError::Configuration(
                "correlations need at least 3 samples".to_string(),
            ));
        }

        if self.planning.candidates_per_slot == 0 {
            return Err(CoachError::Configuration(
                "at least one candidate per slot is required".to_string(),
            ));
        }

        Ok(())
    }
}
