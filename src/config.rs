//! Configuration management for the studio editor.
//!
//! Handles:
//! - Command-line argument parsing
//! - The optional TOML config file
//! - Defaults for timing, upload limits and media storage
//!
//! Command-line values win over the config file, which wins over defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::media::DEFAULT_CATEGORY;
use crate::observer::{RemovalTiming, DEFAULT_GUARD_WINDOW, DEFAULT_REMOVAL_DELAY};
use crate::upload::{UploadPolicy, DEFAULT_MAX_UPLOAD_BYTES};

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR: &str = "studio-editor";

/// Command-line arguments for the studio editor
#[derive(Debug, Default, Parser)]
#[command(name = "studio-editor")]
#[command(about = "Article editor session for the studio website")]
#[command(version)]
pub struct Args {
    /// Config file to load instead of the default location
    #[arg(long, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    /// Directory of the local media library
    #[arg(long, help = "Directory where uploaded media is stored")]
    pub media_dir: Option<PathBuf>,

    /// URL prefix under which the media library is served
    #[arg(long, help = "Public URL prefix of the media library (e.g. '/media')")]
    pub media_base_url: Option<String>,

    /// Remote upload endpoint; the local media library is used when unset
    #[arg(long, help = "HTTP endpoint for uploads and deletions")]
    pub upload_endpoint: Option<String>,

    /// Log level for the editor
    #[arg(long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
}

/// Contents of the TOML config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub removal_delay_ms: Option<u64>,
    pub guard_window_ms: Option<u64>,
    pub max_upload_bytes: Option<u64>,
    pub default_category: Option<String>,
    pub media_dir: Option<PathBuf>,
    pub media_base_url: Option<String>,
    pub upload_endpoint: Option<String>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {:?}", path))
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Delay between an image removal and its callback
    pub removal_delay: Duration,
    /// Window during which the same image does not fire again
    pub guard_window: Duration,
    pub max_upload_bytes: u64,
    pub default_category: String,
    pub media_dir: PathBuf,
    pub media_base_url: String,
    pub upload_endpoint: Option<String>,
    pub log_level: String,
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::merge(Args::default(), FileConfig::default(), None)
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let config_path = match &args.config {
            Some(path) => Some(path.clone()),
            None => default_config_path().filter(|p| p.is_file()),
        };

        let file = match &config_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        Ok(Self::merge(args, file, config_path))
    }

    fn merge(args: Args, file: FileConfig, config_path: Option<PathBuf>) -> Self {
        let media_dir = args
            .media_dir
            .or(file.media_dir)
            .unwrap_or_else(default_media_dir);

        Config {
            removal_delay: file
                .removal_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REMOVAL_DELAY),
            guard_window: file
                .guard_window_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_GUARD_WINDOW),
            max_upload_bytes: file.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            default_category: file
                .default_category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            media_dir,
            media_base_url: args
                .media_base_url
                .or(file.media_base_url)
                .unwrap_or_else(|| "/media".to_string()),
            upload_endpoint: args.upload_endpoint.or(file.upload_endpoint),
            log_level: args
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            config_path,
        }
    }

    pub fn removal_timing(&self) -> RemovalTiming {
        RemovalTiming {
            removal_delay: self.removal_delay,
            guard_window: self.guard_window,
        }
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::with_max_bytes(self.max_upload_bytes)
    }
}

/// `<config_dir>/studio-editor/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
}

fn default_media_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join("media"))
        .unwrap_or_else(|| PathBuf::from("media"))
}
