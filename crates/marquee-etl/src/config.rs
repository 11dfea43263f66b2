use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// User agent sent to Wikidata when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "marquee/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/oxur/marquee)"
);

/// Default delay between two country lookups.
pub const DEFAULT_PACING_MS: u64 = 1000;

/// Configuration for marquee.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (MARQUEE_* prefix)
/// 3. Config file (~/.config/marquee/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: MARQUEE_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/marquee/marquee.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// User agent for Wikidata requests. Wikimedia asks for a contact URL
    /// or address in it.
    #[serde(default = "default_user_agent")]
    pub wikidata_user_agent: String,

    /// Milliseconds to wait between two titles during country enrichment.
    #[serde(default = "default_pacing_ms")]
    pub enrichment_pacing_ms: u64,

    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            wikidata_user_agent: default_user_agent(),
            enrichment_pacing_ms: default_pacing_ms(),
            log_level: default_log_level(),
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

        let env_opts = env::Options::with_top_level("marquee");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration, overriding the database path (the `--db` flag).
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    /// Pacing between lookups, never below one millisecond.
    #[must_use]
    pub fn enrichment_pacing(&self) -> Duration {
        Duration::from_millis(self.enrichment_pacing_ms.max(1))
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marquee")
        .join("marquee.db")
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_pacing_ms() -> u64 {
    DEFAULT_PACING_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/marquee/config.toml
/// - macOS: ~/Library/Application Support/marquee/config.toml
/// - Windows: %APPDATA%\marquee\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marquee")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Marquee Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (MARQUEE_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database holding every imported snapshot
#
# Can also be set via:
# - CLI: marquee --db /custom/path.db import exports/
# - Environment: MARQUEE_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/marquee.db"

# User agent sent with Wikidata requests. Put a way to reach you in it.
#wikidata_user_agent = "marquee (you@example.com)"

# Delay between two country lookups, in milliseconds
#enrichment_pacing_ms = 1000

# Log filter used when RUST_LOG is unset (error, warn, info, debug, trace)
#log_level = "info"
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
