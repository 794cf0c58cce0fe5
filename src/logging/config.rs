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

use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Configuration for [`TlLogger`](super::TlLogger): threshold level, console
/// output, JSON or text lines, and an optional append-only log file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlLogConfig {
    pub level: String,
    pub console_enabled: bool,
    pub json: bool,
    /// Log file to append to, if any.
    pub file_path: Option<String>,
}

impl Default for TlLogConfig {
    fn default() -> Self {
        TlLogConfig {
            level: "INFO".to_string(),
            console_enabled: true,
            json: true,
            file_path: None,
        }
    }
}

impl TlLogConfig {
    /// Threshold as a `log` filter. Unknown names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.to_ascii_uppercase().as_str() {
            "OFF" => LevelFilter::Off,
            "ERROR" => LevelFilter::Error,
            "WARN" | "WARNING" => LevelFilter::Warn,
            "DEBUG" => LevelFilter::Debug,
            "TRACE" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlLogConfigBuilder {
    pub level: Option<String>,
    pub console_enabled: Option<bool>,
    pub json: Option<bool>,
    pub file_path: Option<String>,
}

impl TlLogConfigBuilder {
    pub fn build(self) -> TlLogConfig {
        let base = TlLogConfig::default();
        TlLogConfig {
            level: self.level.unwrap_or(base.level),
            console_enabled: self.console_enabled.unwrap_or(base.console_enabled),
            json: self.json.unwrap_or(base.json),
            file_path: self.file_path.or(base.file_path),
        }
    }
}
