//! Configuration file management for itinera.
//!
//! Provides a TOML config file at `~/.config/itinera/config.toml` and a
//! resolution chain: explicit argument > env var > config file > default.
//!
//! ```toml
//! [scheduler]
//! seed = 42
//!
//! [alerts]
//! booking_lead_days = 14
//! upcoming_window_days = 7
//!
//! [store]
//! dir = "/home/me/trips"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use itinera_store::StoreConfig;

/// Env var holding a fixed scheduler seed.
pub const SEED_ENV_VAR: &str = "ITINERA_SEED";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Fixed seed for reproducible schedules. Unset means OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Days before the first occurrence by which an activity should be booked.
    #[serde(default = "default_booking_lead_days")]
    pub booking_lead_days: i64,
    /// Look-ahead used by upcoming-alert queries.
    #[serde(default = "default_upcoming_window_days")]
    pub upcoming_window_days: i64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            booking_lead_days: default_booking_lead_days(),
            upcoming_window_days: default_upcoming_window_days(),
        }
    }
}

fn default_booking_lead_days() -> i64 {
    14
}

fn default_upcoming_window_days() -> i64 {
    7
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the itinera config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/itinera` or `~/.config/itinera`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("itinera");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("itinera")
}

/// Return the path to the itinera config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub scheduler: SchedulerSettings,
    pub alerts: AlertSettings,
    pub store: StoreConfig,
}

impl PlannerConfig {
    /// Resolve configuration using the chain: explicit > env var > config file > default.
    ///
    /// - Store dir: `cli_store_dir` > `ITINERA_STORE_DIR` > `[store] dir` > `StoreConfig::default_dir()`
    /// - Seed: `ITINERA_SEED` > `[scheduler] seed` > none
    /// - Alert settings: `[alerts]` > defaults
    ///
    /// A missing config file is not an error; an unreadable one is ignored the
    /// same way. A malformed `ITINERA_SEED` is an error.
    pub fn resolve(cli_store_dir: Option<&Path>) -> Result<Self> {
        let file_config = load_config().ok();
        Self::resolve_from(cli_store_dir, file_config, |key| std::env::var(key).ok())
    }

    /// Resolution with the config file and environment supplied by the caller.
    pub fn resolve_from(
        cli_store_dir: Option<&Path>,
        file_config: Option<ConfigFile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file_config = file_config.unwrap_or_default();

        let store_dir = if let Some(dir) = cli_store_dir {
            dir.to_path_buf()
        } else if let Some(dir) = env(StoreConfig::ENV_VAR) {
            PathBuf::from(dir)
        } else if let Some(dir) = file_config.store.dir {
            dir
        } else {
            StoreConfig::default_dir()
        };

        let seed = match env(SEED_ENV_VAR) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{SEED_ENV_VAR} is not a valid u64: {raw:?}"))?,
            ),
            None => file_config.scheduler.seed,
        };

        Ok(Self {
            scheduler: SchedulerSettings { seed },
            alerts: file_config.alerts,
            store: StoreConfig::new(store_dir),
        })
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerSettings::default(),
            alerts: AlertSettings::default(),
            store: StoreConfig::new(StoreConfig::default_dir()),
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
