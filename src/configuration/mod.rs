use crate::configuration::console::ConsoleConfiguration;
use crate::configuration::target::TargetConfiguration;
use crate::report::OutputFormat;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod console;
pub mod target;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct OutputConfiguration {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DiscoveryConfiguration {
    pub target: TargetConfiguration,
    pub console: ConsoleConfiguration,
    #[serde(default)]
    pub output: OutputConfiguration,
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("failed to read configuration file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("missing required setting '{name}': pass the flag or add it to the configuration file")]
    Missing { name: &'static str },
}

impl DiscoveryConfiguration {
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigurationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
