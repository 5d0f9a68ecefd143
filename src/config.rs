use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::content::markdown::ShortcodeOptions;

pub const CFG_FILE_NAME: &str = "blog2md.toml";

#[derive(Deserialize, Debug)]
pub struct Log {
    pub level: LogLevel,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, PartialOrd)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Images {
    pub shortcode_title: String,
    pub shortcode_size: String,
}

impl Default for Images {
    fn default() -> Self {
        let defaults = ShortcodeOptions::default();
        Images {
            shortcode_title: defaults.title,
            shortcode_size: defaults.size,
        }
    }
}

impl Images {
    pub fn shortcode(&self) -> ShortcodeOptions {
        ShortcodeOptions {
            title: self.shortcode_title.clone(),
            size: self.shortcode_size.clone(),
        }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Comments {
    pub date_format: String,
}

impl Default for Comments {
    fn default() -> Self {
        Comments {
            date_format: "%b %-d, %Y".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    pub log: Option<Log>,
    #[serde(default)]
    pub images: Images,
    #[serde(default)]
    pub comments: Comments,
}

fn default_true() -> bool {
    true
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => Ok(cfg),
        Err(e) => Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    }
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let mut cfg = parse_config(&cfg_content)?;

    if let Some(ref mut log) = cfg.log {
        if log.location.is_none() {
            log.location = dirs::cache_dir().map(|dir| dir.join("blog2md").join("log").join("blog2md.log"));
        }
    }

    Ok(cfg)
}

/// Next to the executable, then the current directory, then the user config directory
pub fn find_config() -> Option<PathBuf> {
    let mut candidates = vec![];

    if let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(|dir| dir.to_path_buf())) {
        candidates.push(exe_dir.join(CFG_FILE_NAME));
    }

    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir.join(CFG_FILE_NAME));
    }

    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir.join(CFG_FILE_NAME));
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Explicit path must exist; without one, a missing file means built-in defaults
pub fn open_config(cfg_path: Option<PathBuf>) -> io::Result<(Config, Option<PathBuf>)> {
    let cfg_path = match cfg_path {
        Some(path) => Some(path),
        None => find_config(),
    };

    match cfg_path {
        Some(path) => Ok((read_config(&path)?, Some(path))),
        None => Ok((Config::default(), None)),
    }
}
