mod file_config;

pub use file_config::FileConfig;

use crate::driver::{MalformedFilePolicy, DEFAULT_FILE_EXTENSION};
use crate::handlers::DEFAULT_SONG_PLAY_PAGE;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "sparkify.db";
pub const DEFAULT_SONG_DATA: &str = "data/song_data";
pub const DEFAULT_LOG_DATA: &str = "data/log_data";

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub database: Option<PathBuf>,
    pub song_data: Option<PathBuf>,
    pub log_data: Option<PathBuf>,
    pub song_play_page: Option<String>,
    pub file_extension: Option<String>,
    pub on_malformed: Option<MalformedFilePolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    /// SQLite database file, created if missing.
    pub database: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub song_play_page: String,
    pub file_extension: String,
    pub on_malformed: MalformedFilePolicy,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            song_data: PathBuf::from(DEFAULT_SONG_DATA),
            log_data: PathBuf::from(DEFAULT_LOG_DATA),
            song_play_page: DEFAULT_SONG_PLAY_PAGE.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            on_malformed: MalformedFilePolicy::default(),
        }
    }
}

impl EtlConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let defaults = EtlConfig::default();

        let database = file
            .database
            .map(PathBuf::from)
            .or_else(|| cli.database.clone())
            .unwrap_or(defaults.database);
        let song_data = file
            .song_data
            .map(PathBuf::from)
            .or_else(|| cli.song_data.clone())
            .unwrap_or(defaults.song_data);
        let log_data = file
            .log_data
            .map(PathBuf::from)
            .or_else(|| cli.log_data.clone())
            .unwrap_or(defaults.log_data);

        let song_play_page = file
            .song_play_page
            .or_else(|| cli.song_play_page.clone())
            .unwrap_or(defaults.song_play_page);
        if song_play_page.trim().is_empty() {
            bail!("song_play_page must not be empty");
        }

        let file_extension = file
            .file_extension
            .or_else(|| cli.file_extension.clone())
            .unwrap_or(defaults.file_extension);
        let file_extension = file_extension.trim_start_matches('.').to_string();
        if file_extension.is_empty() {
            bail!("file_extension must not be empty");
        }

        let on_malformed = match file.on_malformed {
            Some(value) => match parse_malformed_policy(&value) {
                Some(policy) => policy,
                None => bail!(
                    "Invalid on_malformed value {:?}, expected \"skip\" or \"abort\"",
                    value
                ),
            },
            None => cli.on_malformed.unwrap_or(defaults.on_malformed),
        };

        Ok(Self {
            database,
            song_data,
            log_data,
            song_play_page,
            file_extension,
            on_malformed,
        })
    }

    /// Fails unless both data roots are existing directories.
    pub fn validate_roots(&self) -> Result<()> {
        validate_dir("song_data", &self.song_data)?;
        validate_dir("log_data", &self.log_data)
    }
}

fn validate_dir(name: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("{} directory does not exist: {:?}", name, path);
    }
    if !path.is_dir() {
        bail!("{} is not a directory: {:?}", name, path);
    }
    Ok(())
}

/// Resolves a command line path against the working directory.
///
/// SQLite `file:` URIs are passed through untouched.
pub fn parse_path(s: &str) -> Result<PathBuf> {
    if s.starts_with("file:") {
        return Ok(PathBuf::from(s));
    }
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Uses clap's ValueEnum trait for parsing.
fn parse_malformed_policy(s: &str) -> Option<MalformedFilePolicy> {
    MalformedFilePolicy::from_str(s, true).ok()
}
