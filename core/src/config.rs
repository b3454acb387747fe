//! Core configuration file (`<system dir>/dolphin-libretro.toml`)
//!
//! Holds settings that are not exposed as host options: the initial log
//! level, throttle tuning and overrides for built-in option defaults.
//! Every field is optional; a missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::environment::Environment;
use crate::error::ConfigError;
use crate::logging::LogLevel;

/// File name looked up in the host system directory.
pub const CONFIG_FILE_NAME: &str = "dolphin-libretro.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    /// Logging before options are read
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Frame pacing tuning
    #[serde(default)]
    pub pacing: PacingConfig,
    /// Built-in option default overrides (`key = "value"`)
    #[serde(default)]
    pub options: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Level used until the log level option is read (default: info)
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Final part of each throttle wait spent spinning (default: 500µs)
    #[serde(default = "default_spin_window_us")]
    pub spin_window_us: u64,
}

fn default_spin_window_us() -> u64 {
    500
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            spin_window_us: default_spin_window_us(),
        }
    }
}

impl PacingConfig {
    pub fn spin_window(&self) -> Duration {
        Duration::from_micros(self.spin_window_us)
    }
}

/// Path of the config file inside the host system directory.
pub fn config_path(env: &dyn Environment) -> Option<PathBuf> {
    env.system_directory().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Read and parse a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_from(path: &Path) -> Result<CoreConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config from the host system directory.
///
/// Returns defaults if the host has no system directory, the file does not
/// exist, or it cannot be parsed.
pub fn load(env: &dyn Environment) -> CoreConfig {
    let Some(path) = config_path(env) else {
        debug!("Host has no system directory, using default core config");
        return CoreConfig::default();
    };

    if !path.exists() {
        debug!("No core config at {}, using defaults", path.display());
        return CoreConfig::default();
    }

    match load_from(&path) {
        Ok(config) => {
            debug!("Loaded core config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}; using default core config", e);
            CoreConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::keys;
    use crate::test_utils::FakeEnvironment;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.pacing.spin_window(), Duration::from_micros(500));
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: CoreConfig = toml::from_str("[logging]\nlevel = \"warning\"\n").unwrap();
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.pacing.spin_window_us, 500);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            format!(
                "[pacing]\nspin_window_us = 250\n\n[options]\n{} = \"48000\"\n",
                keys::audio::MIXER_RATE
            ),
        )
        .unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.pacing.spin_window_us, 250);
        assert_eq!(
            config.options.get(keys::audio::MIXER_RATE).map(String::as_str),
            Some("48000")
        );
    }

    #[test]
    fn test_load_from_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(load_from(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[pacing\nspin_window_us = ").unwrap();
        assert!(matches!(load_from(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_uses_system_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let env = FakeEnvironment::new();
        env.host().system_directory = Some(dir.path().to_path_buf());
        assert_eq!(load(&env).logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_load_falls_back_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "not = [valid").unwrap();

        let env = FakeEnvironment::new();
        env.host().system_directory = Some(dir.path().to_path_buf());
        assert_eq!(load(&env), CoreConfig::default());

        assert_eq!(load(&FakeEnvironment::bare()), CoreConfig::default());
    }
}
