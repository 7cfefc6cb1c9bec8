//! Configuration file management for cadence.
//!
//! Provides a TOML-based config file at `~/.config/cadence/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cadence_core::RetryPolicy;
use cadence_core::generator::gemini::DEFAULT_MODEL;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeneratorSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// First retry delay; doubled per retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_delay_ms: Option<u64>,
    /// Pause before every generator call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing_ms: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the cadence config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/cadence` or `~/.config/cadence`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("cadence");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cadence")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(path)
}

/// Show the first and last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line. `None` means "not passed".
#[derive(Debug, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq)]
pub struct CadenceConfig {
    /// Absent means only the offline generator is available.
    pub api_key: Option<String>,
    pub model: String,
    pub retry: RetryPolicy,
    pub bind: String,
    pub port: u16,
}

impl CadenceConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `CADENCE_API_KEY` env > `generator.api_key` > none
    /// - Model: `CADENCE_MODEL` env > `generator.model` > [`DEFAULT_MODEL`]
    /// - Bind/port: flag > `CADENCE_BIND`/`CADENCE_PORT` env > `[server]` > defaults
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let file_config = load_config().ok();
        Self::resolve_from(overrides, file_config.unwrap_or_default())
    }

    fn resolve_from(overrides: Overrides, file: ConfigFile) -> Result<Self> {
        let api_key = env_var("CADENCE_API_KEY")
            .or(file.generator.api_key)
            .filter(|k| !k.trim().is_empty());

        let model = env_var("CADENCE_MODEL")
            .or(file.generator.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: defaults.max_attempts,
            base_delay: file
                .generator
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            pacing: file
                .generator
                .pacing_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.pacing),
        };

        let bind = overrides
            .bind
            .or_else(|| env_var("CADENCE_BIND"))
            .or(file.server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = match overrides.port {
            Some(port) => port,
            None => match env_var("CADENCE_PORT") {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("CADENCE_PORT is not a valid port: {raw}"))?,
                None => file.server.port.unwrap_or(DEFAULT_PORT),
            },
        };

        Ok(Self {
            api_key,
            model,
            retry,
            bind,
            port,
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
