// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Configuration of the `dotlang` command-line tools

use dotlang_compiler::CompilerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "DOTLANG_CONFIG";
pub const REPOSITORY_ENV: &str = "DOTLANG_REPOSITORY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestsConfig {
    /// Program that runs a test suite
    pub executor: String,
    /// Arguments passed to the executor after the suite directory
    pub extra_args: Vec<String>,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            executor: "dotlang-test-launcher".to_string(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Root of the package repository
    pub repository: PathBuf,
    /// Build output directory; test caches live below it
    pub target_dir: PathBuf,
    /// Completion index file
    pub index_path: PathBuf,
    pub compiler: CompilerConfig,
    pub tests: TestsConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("dotlang");
        Self {
            repository: data_dir.join("repository"),
            target_dir: PathBuf::from("target"),
            index_path: data_dir.join("completion-index.json"),
            compiler: CompilerConfig::default(),
            tests: TestsConfig::default(),
        }
    }
}

impl ToolsConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
    }

    /// Resolve the configuration from command-line flags and the environment.
    ///
    /// The config file comes from `--config`, then `DOTLANG_CONFIG`, else defaults.
    /// `--repository` and then `DOTLANG_REPOSITORY` override the repository path.
    pub fn resolve_config(cli_config: Option<PathBuf>, cli_repository: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve_with(cli_config, cli_repository, std::env::var(CONFIG_ENV).ok(), std::env::var(REPOSITORY_ENV).ok())
    }

    fn resolve_with(cli_config: Option<PathBuf>, cli_repository: Option<PathBuf>, env_config: Option<String>, env_repository: Option<String>) -> Result<Self, ConfigError> {
        let mut config = if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)?
        } else if let Some(env_config) = env_config {
            Self::load_from_file(env_config)?
        } else {
            Self::default()
        };

        if let Some(repository) = cli_repository {
            config.repository = repository;
        } else if let Some(env_repository) = env_repository {
            config.repository = PathBuf::from(env_repository);
        }

        Ok(config)
    }
}
