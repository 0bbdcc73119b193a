use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::DateFilter;
use crate::render::Format;

pub const DEFAULT_PORT: u16 = 993;

/// Contents of `config.toml`. Every field is optional; command-line flags
/// take precedence over anything set here.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub folder: Option<String>,
    /// days; 0 = unlimited
    pub max_age: Option<u32>,
    pub vcard: Option<bool>,
    pub email_as_name: Option<bool>,
    pub from: Option<String>,
}

impl Config {
    /// Fields set in `over` replace ours.
    pub fn merged_with(self, over: Config) -> Config {
        Config {
            server: over.server.or(self.server),
            port: over.port.or(self.port),
            user: over.user.or(self.user),
            folder: over.folder.or(self.folder),
            max_age: over.max_age.or(self.max_age),
            vcard: over.vcard.or(self.vcard),
            email_as_name: over.email_as_name.or(self.email_as_name),
            from: over.from.or(self.from),
        }
    }
}

/// Fully resolved settings for one harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub folder: String,
    pub max_age: u32,
    pub format: Format,
    pub email_as_name: bool,
    pub from: Option<String>,
}

impl Settings {
    pub fn date_filter(&self, now: chrono::DateTime<chrono::Utc>) -> DateFilter {
        DateFilter::from_max_age(self.max_age, now).with_from(self.from.clone())
    }
}

impl TryFrom<Config> for Settings {
    type Error = anyhow::Error;

    fn try_from(cfg: Config) -> Result<Self> {
        let required = |v: Option<String>, what: &str| {
            v.filter(|s| !s.trim().is_empty())
                .ok_or_else(|| anyhow!("{what} not set (use --{what} or config file)"))
        };

        Ok(Settings {
            server: required(cfg.server, "server")?,
            port: cfg.port.unwrap_or(DEFAULT_PORT),
            user: required(cfg.user, "user")?,
            folder: required(cfg.folder, "folder")?,
            max_age: cfg.max_age.unwrap_or(0),
            format: if cfg.vcard.unwrap_or(false) {
                Format::Vcard
            } else {
                Format::Tsv
            },
            email_as_name: cfg.email_as_name.unwrap_or(false),
            from: cfg.from,
        })
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("imap2abook"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load `path`, or the default location when `path` is `None`. A missing
/// default file yields an empty config; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match config_path() {
            Ok(p) => (p, false),
            Err(_) => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        if explicit {
            return Err(anyhow!("config file {} does not exist", path.display()));
        }
        return Ok(Config::default());
    }

    let s = fs::read_to_string(&path)?;
    parse_config(&s).map_err(|e| anyhow!("{}: {e}", path.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}
