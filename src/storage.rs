use crate::config::GlobalConfig;
use crate::features::series::{DailyRecord, DailySeries, SeriesError};
use crate::roster::ProbeRoster;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const APP_DIR: &str = "geopulse";
const CONFIG_FILE: &str = "config.json";
const ROSTER_FILE: &str = "roster.json";
const CACHE_FILE: &str = "dns_cache.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: invalid json: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: {source}", path.display())]
    Series {
        path: PathBuf,
        #[source]
        source: SeriesError,
    },
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

fn default_path(file: &str) -> Result<PathBuf, StorageError> {
    config_dir()
        .map(|dir| dir.join(file))
        .ok_or(StorageError::NoConfigDir)
}

pub fn default_roster_path() -> Result<PathBuf, StorageError> {
    default_path(ROSTER_FILE)
}

pub fn default_cache_path() -> Result<PathBuf, StorageError> {
    default_path(CACHE_FILE)
}

/// Reads `path`, or the default config file. A missing file yields defaults;
/// a malformed one is an error.
pub fn load_config(path: Option<&Path>) -> Result<GlobalConfig, StorageError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match config_dir() {
            Some(dir) => dir.join(CONFIG_FILE),
            None => return Ok(GlobalConfig::default()),
        },
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(GlobalConfig::default());
    }
    read_json(&path)
}

pub fn load_roster(path: &Path) -> Result<ProbeRoster, StorageError> {
    read_json(path)
}

pub fn save_roster(path: &Path, roster: &ProbeRoster) -> Result<(), StorageError> {
    write_json(path, roster)
}

/// Loads a cache snapshot, rejecting empty, unordered or gapped files.
pub fn load_snapshot(path: &Path) -> Result<DailySeries, StorageError> {
    let records: Vec<DailyRecord> = read_json(path)?;
    DailySeries::new(records).map_err(|source| StorageError::Series {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_snapshot(path: &Path, series: &DailySeries) -> Result<(), StorageError> {
    write_json(path, series.records())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let io_error = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_error)?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(io_error)?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}
