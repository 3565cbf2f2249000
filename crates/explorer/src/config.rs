use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clearsky_core::poll::{PollConfig, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use clearsky_core::request::VisualizationForm;
use clearsky_harmony::{ConfigError, HarmonyConfig};

/// What the explorer binary does once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Load the sample visualizations.
    Preload,
    /// Validate the configured form and generate it.
    Submit,
    /// Only check that the backend is reachable.
    Health,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preload" => Ok(Self::Preload),
            "submit" => Ok(Self::Submit),
            "health" => Ok(Self::Health),
            other => Err(format!(
                "EXPLORER_MODE must be one of preload, submit, health, got '{other}'"
            )),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExplorerConfigError {
    #[error(transparent)]
    Harmony(#[from] ConfigError),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub harmony: HarmonyConfig,
    pub poll: PollConfig,
    pub mode: Mode,
    pub form: VisualizationForm,
    /// Where decoded plot images are written.
    pub output_dir: PathBuf,
}

impl ExplorerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                          |
    /// |-----------------------|----------------------------------|
    /// | `EXPLORER_MODE`       | `submit`                         |
    /// | `EXPLORER_START_TIME` | `2023-12-30T22:30`               |
    /// | `EXPLORER_END_TIME`   | `2023-12-30T22:45`               |
    /// | `EXPLORER_BBOX`       | `-150, -40, 14, 65`              |
    /// | `EXPLORER_VARIABLE`   | `product/vertical_column`        |
    /// | `EXPLORER_PLOT_TYPE`  | `map`                            |
    /// | `EXPLORER_OUTPUT_DIR` | `.`                              |
    /// | `POLL_INTERVAL_SECS`  | `2`                              |
    /// | `POLL_MAX_SECS`       | `600` (`0` polls without limit)  |
    ///
    /// Harmony settings are read by [`HarmonyConfig::from_env`]. Form
    /// fields are taken as typed; they are validated on submit.
    pub fn from_env() -> Result<Self, ExplorerConfigError> {
        let harmony = HarmonyConfig::from_env()?;

        let mode = match std::env::var("EXPLORER_MODE") {
            Ok(value) => value.parse().map_err(ExplorerConfigError::Invalid)?,
            Err(_) => Mode::Submit,
        };

        let defaults = VisualizationForm::default();
        let form = VisualizationForm {
            start_time: env_or("EXPLORER_START_TIME", defaults.start_time),
            end_time: env_or("EXPLORER_END_TIME", defaults.end_time),
            bbox: env_or("EXPLORER_BBOX", defaults.bbox),
            variable: env_or("EXPLORER_VARIABLE", defaults.variable),
            plot_type: env_or("EXPLORER_PLOT_TYPE", defaults.plot_type),
        };

        let interval = secs_var("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL.as_secs())?;
        if interval == 0 {
            return Err(ExplorerConfigError::Invalid(
                "POLL_INTERVAL_SECS must be greater than zero".into(),
            ));
        }
        let max_secs = secs_var("POLL_MAX_SECS", DEFAULT_POLL_TIMEOUT.as_secs())?;
        let poll = PollConfig {
            interval: Duration::from_secs(interval),
            max_duration: (max_secs > 0).then(|| Duration::from_secs(max_secs)),
        };

        let output_dir = PathBuf::from(env_or("EXPLORER_OUTPUT_DIR", ".".to_string()));

        Ok(Self {
            harmony,
            poll,
            mode,
            form,
            output_dir,
        })
    }
}

fn env_or(var: &str, default: String) -> String {
    std::env::var(var).unwrap_or(default)
}

fn secs_var(var: &'static str, default: u64) -> Result<u64, ExplorerConfigError> {
    match std::env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| {
            ExplorerConfigError::Harmony(ConfigError::InvalidNumber {
                var,
                expected: "u64",
                value,
            })
        }),
        Err(_) => Ok(default),
    }
}
