//! Copyright © 2025-2026 Touchlink Team. All Rights Reserved.
//!
//! This file is part of Touchlink.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Engine Configuration
//!
//! [`TlEngineConfig`] gathers the knobs of the analytics engine: how many rows
//! are sampled per source table, where results are written and how logging
//! behaves.
//!
//! ## Sources, lowest precedence first
//!
//! 1. Built-in defaults
//! 2. A YAML (`.yaml`/`.yml`) or JSON (`.json`) file, any subset of fields
//! 3. Environment variables:
//!    - `TOUCHLINK_SAMPLE_LIMIT`
//!    - `TOUCHLINK_RESULTS_DIR`
//!    - `TOUCHLINK_LOG_LEVEL`
//!
//! ## Example
//!
//! ```yaml
//! sample_limit: 500
//! results_dir: /var/lib/touchlink/results
//! log:
//!   level: DEBUG
//!   json: false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TlError};
use crate::executor::{TlExecutorConfig, DEFAULT_SAMPLE_LIMIT};
use crate::logging::{TlLogConfig, TlLogConfigBuilder, TlLogger};

pub const ENV_SAMPLE_LIMIT: &str = "TOUCHLINK_SAMPLE_LIMIT";
pub const ENV_RESULTS_DIR: &str = "TOUCHLINK_RESULTS_DIR";
pub const ENV_LOG_LEVEL: &str = "TOUCHLINK_LOG_LEVEL";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlEngineConfig {
    pub sample_limit: usize,
    pub results_dir: PathBuf,
    pub log: TlLogConfig,
}

impl Default for TlEngineConfig {
    fn default() -> Self {
        TlEngineConfig {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            results_dir: PathBuf::from("results"),
            log: TlLogConfig::default(),
        }
    }
}

impl TlEngineConfig {
    /// Loads a configuration file, merges it over the defaults and applies
    /// environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let builder = TlEngineConfigBuilder::from_file(path)?;
        builder.with_env().build()
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        TlEngineConfigBuilder::default().with_env().build()
    }

    /// Installs the process-wide logger from the `log` section. Returns
    /// false when a logger was already installed.
    pub fn init_logging(&self) -> bool {
        TlLogger::init(&self.log)
    }

    pub fn executor_config(&self) -> TlExecutorConfig {
        TlExecutorConfig {
            sample_limit: self.sample_limit,
        }
    }
}

/// All-optional mirror of [`TlEngineConfig`]; unset fields keep defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlEngineConfigBuilder {
    pub sample_limit: Option<usize>,
    pub results_dir: Option<PathBuf>,
    pub log: Option<TlLogConfigBuilder>,
}

impl TlEngineConfigBuilder {
    pub fn sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    pub fn results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(dir.into());
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.log.get_or_insert_with(TlLogConfigBuilder::default).level = Some(level.to_string());
        self
    }

    /// Reads a YAML or JSON file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&text),
            "json" => Self::from_json(&text),
            other => Err(TlError::validation(format!(
                "unsupported config format '{other}' for {}",
                path.display()
            ))),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by environment variable name. Lookups
    /// returning `None` leave the field untouched.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(limit) = lookup(ENV_SAMPLE_LIMIT) {
            match limit.trim().parse::<usize>() {
                Ok(limit) => self.sample_limit = Some(limit),
                Err(_) => log::warn!(
                    "config.env.invalid: ignoring override - key={}, value={}",
                    ENV_SAMPLE_LIMIT,
                    limit
                ),
            }
        }
        if let Some(dir) = lookup(ENV_RESULTS_DIR) {
            self.results_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self = self.log_level(&level);
        }
        self
    }

    pub fn build(self) -> Result<TlEngineConfig> {
        let base = TlEngineConfig::default();
        let config = TlEngineConfig {
            sample_limit: self.sample_limit.unwrap_or(base.sample_limit),
            results_dir: self.results_dir.unwrap_or(base.results_dir),
            log: self.log.map(TlLogConfigBuilder::build).unwrap_or(base.log),
        };
        if config.sample_limit == 0 {
            return Err(TlError::validation("sample_limit must be greater than zero"));
        }
        Ok(config)
    }
}
