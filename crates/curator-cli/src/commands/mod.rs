pub mod config;
pub mod daemon;
pub mod journal;
pub mod progress;
pub mod prompts;
pub mod run;

use crate::output::Output;
use color_eyre::Result;
use curator_config::{Config, PathManager};
use curator_sources::Collaborators;
use std::path::PathBuf;
use tracing::debug;

/// Loaded configuration plus the paths it came from
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub paths: PathManager,
}

impl AppContext {
    /// Load and validate the configuration; a missing file means defaults
    pub fn load(paths: PathManager, config_path: PathBuf, output: &Output) -> Result<Self> {
        let config = if config_path.exists() {
            Config::load_from_file(&config_path).map_err(|e| {
                color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_path.display(), e)
            })?
        } else {
            output.warn(format!(
                "Configuration file not found at {}, using defaults (run 'curator config init' to create one)",
                config_path.display()
            ));
            Config::default()
        };

        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
        debug!(operation = "config_load", path = %config_path.display(), "Configuration loaded");

        Ok(Self { config, config_path, paths })
    }

    pub fn collaborators(&self) -> Result<Collaborators> {
        Collaborators::from_config(&self.config, &self.paths)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to open host data: {}", e))
    }
}
