use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sequencer::{
    steps_from_labels, ForcedOutcome, SequencerSettings, Step, DEFAULT_FAILURE_STEP_INDEX,
    DEFAULT_SUCCESS_PROBABILITY,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sequencer: SequencerConfig,
    #[serde(default)]
    pub steps: StepsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Timing and outcome policy of a simulated run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Simulated work per step in milliseconds (default: 2000)
    #[serde(default = "default_step_duration_ms")]
    pub step_duration_ms: u64,
    /// Pause before the result is shown in milliseconds (default: 1000)
    #[serde(default = "default_result_delay_ms")]
    pub result_delay_ms: u64,
    /// Chance that a run succeeds (default: 0.85)
    #[serde(default = "default_success_probability")]
    pub success_probability: f64,
    /// Step index where a failing run fails (default: 2)
    #[serde(default = "default_failure_step_index")]
    pub failure_step_index: usize,
    /// Force every run to succeed or fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_outcome: Option<ForcedOutcome>,
}

fn default_step_duration_ms() -> u64 {
    2000 // 2 seconds
}

fn default_result_delay_ms() -> u64 {
    1000 // 1 second
}

fn default_success_probability() -> f64 {
    DEFAULT_SUCCESS_PROBABILITY
}

fn default_failure_step_index() -> usize {
    DEFAULT_FAILURE_STEP_INDEX
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            step_duration_ms: default_step_duration_ms(),
            result_delay_ms: default_result_delay_ms(),
            success_probability: default_success_probability(),
            failure_step_index: default_failure_step_index(),
            forced_outcome: None,
        }
    }
}

/// Display labels of the processing steps, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepsConfig {
    #[serde(default = "default_step_labels")]
    pub labels: Vec<String>,
}

fn default_step_labels() -> Vec<String> {
    vec![
        "Validating payment details".to_string(),
        "Running security checks".to_string(),
        "Processing payment".to_string(),
        "Confirming transaction".to_string(),
    ]
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            labels: default_step_labels(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to a file under the state directory instead of stderr
    #[serde(default)]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    ".paysim".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

impl Config {
    /// Path to the project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".paysim/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so paysim works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let project_config = Self::project_config_path();
        if project_config.exists() {
            builder = builder.add_source(config::File::from(project_config));
        }

        // User config in ~/.config/paysim/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("paysim").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables, e.g. PAYSIM_SEQUENCER__STEP_DURATION_MS=500
        builder = builder.add_source(
            config::Environment::with_prefix("PAYSIM")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("steps.labels")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to .paysim/config.toml
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::project_config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        std::fs::write(path, self.to_toml()?).context("Failed to write config file")?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Sequencer parameters derived from this config
    pub fn sequencer_settings(&self) -> SequencerSettings {
        SequencerSettings {
            step_duration: Duration::from_millis(self.sequencer.step_duration_ms),
            result_delay: Duration::from_millis(self.sequencer.result_delay_ms),
            success_probability: self.sequencer.success_probability,
            failure_step_index: self.sequencer.failure_step_index,
            forced_outcome: self.sequencer.forced_outcome,
        }
    }

    /// Fresh pending steps for a run
    pub fn steps(&self) -> Vec<Step> {
        steps_from_labels(self.steps.labels.iter().cloned())
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sequencer: SequencerConfig::default(),
            steps: StepsConfig::default(),
            logging: LoggingConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests that call Config::load read the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_settings() {
        let settings = Config::default().sequencer_settings();
        assert_eq!(settings.step_duration, Duration::from_millis(2000));
        assert_eq!(settings.result_delay, Duration::from_millis(1000));
        assert!((settings.success_probability - 0.85).abs() < f64::EPSILON);
        assert_eq!(settings.failure_step_index, 2);
        assert_eq!(settings.forced_outcome, None);
    }

    #[test]
    fn test_default_steps() {
        let steps = Config::default().steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[2].label, "Processing payment");
        assert_eq!(steps[3].index, 3);
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[sequencer]
step_duration_ms = 10
failure_step_index = 1
forced_outcome = "failure"

[steps]
labels = ["Authorize", "Capture"]
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.sequencer.step_duration_ms, 10);
        assert_eq!(config.sequencer.result_delay_ms, 1000);
        assert_eq!(config.sequencer.failure_step_index, 1);
        assert_eq!(config.sequencer.forced_outcome, Some(ForcedOutcome::Failure));
        assert_eq!(config.steps.labels, vec!["Authorize", "Capture"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_round_trips_through_toml() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.sequencer.success_probability = 0.5;
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert!((loaded.sequencer.success_probability - 0.5).abs() < f64::EPSILON);
        assert_eq!(loaded.steps.labels, config.steps.labels);
    }

    #[test]
    fn test_env_overrides_sequencer_and_step_labels() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("PAYSIM_SEQUENCER__STEP_DURATION_MS", "500");
        std::env::set_var("PAYSIM_STEPS__LABELS", "Authorize,Capture");

        let loaded = Config::load(None);

        std::env::remove_var("PAYSIM_SEQUENCER__STEP_DURATION_MS");
        std::env::remove_var("PAYSIM_STEPS__LABELS");

        let config = loaded.unwrap();
        assert_eq!(config.sequencer.step_duration_ms, 500);
        assert_eq!(config.steps.labels, vec!["Authorize", "Capture"]);
        assert_eq!(config.sequencer.result_delay_ms, 1000);
        assert_eq!(config.sequencer_settings().step_duration, Duration::from_millis(500));
    }

    #[test]
    fn test_logs_path_under_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        let logs_dir = config.logs_path();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(temp_dir.path()));
    }
}
