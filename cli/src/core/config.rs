//! # carchive Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! Loads, merges and validates the settings that shape how archives are
//! written when the command line does not say otherwise: the default output
//! format, the gzip level, atomic replacement and a default output directory.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. The file named by the `CARCHIVE_CONFIG` environment variable
//! 2. Project-specific `.carchive.toml` in current directory or ancestors
//!    (the search stops at the first directory containing `.git`)
//! 3. User-specific `config.toml` in the platform config directory
//! 4. Default values defined in the code
//!
//! Every field is optional in every file; a field set in a higher-precedence
//! source overrides the same field from lower ones. After merging, `~` in
//! `output_dir` is expanded and the result is validated.
//!
//! ```toml
//! [archive]
//! default_format = "tgz"
//! compression_level = 9
//! atomic_writes = true
//! output_dir = "~/archives"
//! ```
//!
//! ## Examples
//!
//! ```rust,no_run
//! use carchive::core::config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = config::load_config()?;
//! let format = cfg.archive.default_format()?;
//! let level = cfg.archive.compression_level();
//! # Ok(())
//! # }
//! ```
//!
use crate::common::archive::compression::{DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};
use crate::component::format::{validate_output_format, OutputFormat};
use crate::core::error::{ArchiveError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "CARCHIVE_CONFIG";

const PROJECT_CONFIG_FILENAME: &str = ".carchive.toml";

/// Format used when neither the command line nor any configuration names one.
pub const DEFAULT_FORMAT: OutputFormat = OutputFormat::Tar;

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Settings for writing component archives. Unset fields fall back to defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// `fs`, `tar` or `tgz`. Empty means the built-in default.
    pub default_format: Option<String>,
    /// Gzip level for `tgz`, 0..=9.
    pub compression_level: Option<u32>,
    /// Write `tar`/`tgz` to a temporary sibling and rename on success.
    pub atomic_writes: Option<bool>,
    /// Directory for archives whose output path is not given (can use ~).
    pub output_dir: Option<String>,
}

impl ArchiveConfig {
    /// The configured default format, or [`DEFAULT_FORMAT`] when unset or empty.
    pub fn default_format(&self) -> Result<OutputFormat> {
        let value = self.default_format.as_deref().unwrap_or("");
        Ok(validate_output_format(value, true)?.unwrap_or(DEFAULT_FORMAT))
    }

    pub fn compression_level(&self) -> u32 {
        self.compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL)
    }

    pub fn atomic_writes(&self) -> bool {
        self.atomic_writes.unwrap_or(false)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output_dir.as_ref().map(PathBuf::from)
    }
}

/// Loads the effective configuration for the current directory.
pub fn load_config() -> Result<Config> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let explicit = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    load_config_from(&current_dir, explicit.as_deref())
}

/// Loads the effective configuration as seen from `start_dir`, with an
/// optional explicit file taking precedence over everything else.
pub fn load_config_from(start_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    let mut merged = load_user_config()?.unwrap_or_default();
    if let Some(project) = load_project_config(start_dir)? {
        merged = merge_configs(merged, project);
    }
    if let Some(path) = explicit {
        info!(
            "Loading configuration from {}: {}",
            CONFIG_ENV_VAR,
            path.display()
        );
        merged = merge_configs(merged, load_config_from_path(path)?);
    }
    expand_config_paths(&mut merged).context("Failed to expand paths in configuration")?;
    validate_config(&merged).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged);
    Ok(merged)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "carchive", "carchive") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.is_file() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(start_dir: &Path) -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path(start_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!(
            "No project configuration file ({}) found in {} or ancestors.",
            PROJECT_CONFIG_FILENAME,
            start_dir.display()
        );
        Ok(None)
    }
}

fn find_project_config_path(start_dir: &Path) -> Option<PathBuf> {
    for path in start_dir.ancestors() {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
    }
    None
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Overlays every field `higher` sets onto `lower`.
fn merge_configs(lower: Config, higher: Config) -> Config {
    Config {
        archive: ArchiveConfig {
            default_format: higher.archive.default_format.or(lower.archive.default_format),
            compression_level: higher
                .archive
                .compression_level
                .or(lower.archive.compression_level),
            atomic_writes: higher.archive.atomic_writes.or(lower.archive.atomic_writes),
            output_dir: higher.archive.output_dir.or(lower.archive.output_dir),
        },
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(dir) = config.archive.output_dir.as_mut() {
        *dir = shellexpand::tilde(dir.as_str()).into_owned();
        debug!("Expanded output directory: {}", dir);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    if let Err(err) = config.archive.default_format() {
        return Err(anyhow!(ArchiveError::Config(format!(
            "Invalid default_format: {}",
            err
        ))));
    }
    if let Some(level) = config.archive.compression_level {
        if level > MAX_COMPRESSION_LEVEL {
            return Err(anyhow!(ArchiveError::Config(format!(
                "Invalid compression_level {}. Expected a value between 0 and {}.",
                level, MAX_COMPRESSION_LEVEL
            ))));
        }
    }
    if let Some(dir) = config.archive.output_dir() {
        if !dir.exists() {
            warn!(
                "Configured output directory '{}' does not exist.",
                dir.display()
            );
        } else if !dir.is_dir() {
            return Err(anyhow!(ArchiveError::Config(format!(
                "Configured output path '{}' exists but is not a directory.",
                dir.display()
            ))));
        }
    }
    debug!("Configuration validation successful.");
    Ok(())
}
