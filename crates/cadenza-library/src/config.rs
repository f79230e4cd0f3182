use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for cadenza.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (CADENZA_* prefix)
/// 3. Config file (~/.config/cadenza/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite snapshot database.
    ///
    /// Can be set via:
    /// - CLI: --snapshot /path/to/library.db
    /// - ENV: CADENZA_SNAPSHOT_PATH
    /// - Config: snapshot_path = "/path/to/library.db"
    /// - Default: ~/.local/share/cadenza/library.db
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Directory of JSON track lists read by `rebuild`.
    ///
    /// Can be set via:
    /// - CLI: rebuild --tracklists /path/to/dir
    /// - ENV: CADENZA_TRACKLISTS_DIR
    /// - Config: tracklists_dir = "/path/to/dir"
    /// - Default: ~/.local/share/cadenza/tracklists
    #[serde(default = "default_tracklists_dir")]
    pub tracklists_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            tracklists_dir: default_tracklists_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("cadenza");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration, overriding the snapshot path (the --snapshot flag).
    pub fn load_with_snapshot_path(snapshot_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.snapshot_path = snapshot_path;
        Ok(config)
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadenza")
}

fn default_snapshot_path() -> PathBuf {
    data_dir().join("library.db")
}

fn default_tracklists_dir() -> PathBuf {
    data_dir().join("tracklists")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/cadenza/config.toml
/// - macOS: ~/Library/Application Support/cadenza/config.toml
/// - Windows: %APPDATA%\cadenza\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadenza")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Cadenza Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CADENZA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite snapshot database
#
# Holds the whole catalog, including the prebuilt sorted indexes
#
# Can also be set via:
# - CLI: cadenza --snapshot /custom/library.db status
# - Environment: CADENZA_SNAPSHOT_PATH=/custom/library.db
#
# Default: Platform-specific data directory
#snapshot_path = "/path/to/custom/library.db"

# Directory of JSON track lists, one list per file
#
# Each file holds an array of records:
#   [{"service": "mpd", "uri": "...", "metadata": {"title": "...", "album": "...",
#     "artists": ["..."], "genres": ["..."], "tracknumber": 1, "date": "2020"}}]
#
# Can also be set via:
# - CLI: cadenza rebuild --tracklists /custom/dir
# - Environment: CADENZA_TRACKLISTS_DIR=/custom/dir
#tracklists_dir = "/path/to/tracklists"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
