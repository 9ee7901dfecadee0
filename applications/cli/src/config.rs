/// Terminal player configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "podcastr.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// How often the simulated device clock advances, in milliseconds
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    /// `tracing` filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub start_looping: bool,

    #[serde(default)]
    pub start_shuffling: bool,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `podcastr.toml` in the
    /// working directory is used when present. `PODCASTR_*` variables
    /// override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {:?}",
                        path
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with PODCASTR_)
        settings = settings.add_source(config::Environment::with_prefix("PODCASTR").try_parsing(true));

        let config: Self = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tick_millis == 0 {
            return Err(CliError::Config(
                "tick_millis must be greater than zero (set PODCASTR_TICK_MILLIS)".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_tick_millis() -> u64 {
    1000
}

fn default_log_filter() -> String {
    "podcastr_cli=info,podcastr_playback=info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
            log_filter: default_log_filter(),
            start_looping: false,
            start_shuffling: false,
        }
    }
}
