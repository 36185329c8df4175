//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment if one exists
//! 2. Attempts to load from environment variables (`PAWSIT_MODE` required)
//! 3. If that fails, probes standard paths for a config file
//! 4. Validates the result
//!
//! ## Environment Variables
//! - `PAWSIT_MODE`: `production` or `development`
//! - `PAWSIT_PRODUCTION_URL`: Base URL used in production
//! - `PAWSIT_DEFAULT_HOST`: Host used when discovery finds nothing
//! - `PAWSIT_PORT`: Port appended to candidate hosts without one
//! - `PAWSIT_PRIORITY_HOSTS`: Comma separated `host[@network]` list probed
//!   concurrently
//! - `PAWSIT_FALLBACK_HOSTS`: Comma separated `host[@network]` list probed
//!   one at a time
//! - `PAWSIT_PROBE_TIMEOUT_MS`: Liveness probe timeout
//! - `PAWSIT_REQUEST_TIMEOUT_MS`: Per-send request timeout
//! - `PAWSIT_STORAGE_BACKEND`: `file`, `keychain` or `memory`
//! - `PAWSIT_STORAGE_DIR`: Directory for the file backend
//!
//! ## File Locations
//! `pawsit.{json,toml}` then `config.{json,toml}` in the working directory,
//! its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use pawsit_domain::{
    ClientConfig, DeploymentMode, EndpointCandidate, PawsitError, Result, StorageBackend,
};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] = ["pawsit.json", "pawsit.toml", "config.json", "config.toml"];

/// Load and validate configuration with automatic fallback
///
/// # Errors
/// Returns `PawsitError::Config` if neither source yields a configuration
/// or the result fails validation.
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!(mode = ?config.mode, "Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only `PAWSIT_MODE` is required; every other setting keeps its default
/// when unset.
///
/// # Errors
/// Returns `PawsitError::Config` if `PAWSIT_MODE` is missing or any set
/// variable has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let mode = parse_mode(&env_var("PAWSIT_MODE")?)?;
    let mut config = ClientConfig { mode, ..ClientConfig::default() };

    if let Some(url) = env_opt("PAWSIT_PRODUCTION_URL") {
        config.production_base_url = url;
    }
    if let Some(host) = env_opt("PAWSIT_DEFAULT_HOST") {
        config.default_host = host;
    }
    if let Some(port) = env_opt("PAWSIT_PORT") {
        let port = port
            .parse::<u16>()
            .map_err(|e| PawsitError::Config(format!("Invalid port '{port}': {e}")))?;
        config.port = Some(port);
    }
    if let Some(hosts) = env_opt("PAWSIT_PRIORITY_HOSTS") {
        config.priority_candidates = parse_candidates(&hosts)?;
    }
    if let Some(hosts) = env_opt("PAWSIT_FALLBACK_HOSTS") {
        config.fallback_candidates = parse_candidates(&hosts)?;
    }
    if let Some(ms) = env_opt("PAWSIT_PROBE_TIMEOUT_MS") {
        config.probe_timeout = parse_millis("probe timeout", &ms)?;
    }
    if let Some(ms) = env_opt("PAWSIT_REQUEST_TIMEOUT_MS") {
        config.request_timeout = parse_millis("request timeout", &ms)?;
    }
    if let Some(backend) = env_opt("PAWSIT_STORAGE_BACKEND") {
        config.storage.backend = parse_backend(&backend)?;
    }
    if let Some(dir) = env_opt("PAWSIT_STORAGE_DIR") {
        config.storage.directory = PathBuf::from(dir);
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. JSON and TOML are
/// supported (detected by file extension).
///
/// # Errors
/// Returns `PawsitError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PawsitError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PawsitError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PawsitError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration content, format chosen by the path's extension
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PawsitError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PawsitError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations
#[must_use]
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn parse_mode(value: &str) -> Result<DeploymentMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "production" | "prod" => Ok(DeploymentMode::Production),
        "development" | "dev" => Ok(DeploymentMode::Development),
        other => Err(PawsitError::Config(format!("Invalid PAWSIT_MODE: {other}"))),
    }
}

fn parse_backend(value: &str) -> Result<StorageBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "file" => Ok(StorageBackend::File),
        "keychain" => Ok(StorageBackend::Keychain),
        "memory" => Ok(StorageBackend::Memory),
        other => Err(PawsitError::Config(format!("Invalid storage backend: {other}"))),
    }
}

fn parse_candidates(value: &str) -> Result<Vec<EndpointCandidate>> {
    value
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| EndpointCandidate::from_str(entry).map_err(PawsitError::Config))
        .collect()
}

fn parse_millis(what: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| PawsitError::Config(format!("Invalid {what} '{value}': {e}")))
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| PawsitError::Config(format!("Missing required environment variable: {key}")))
}

/// Optional variable; empty counts as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
