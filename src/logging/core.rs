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

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::{json, Map, Value};

use crate::logging::config::TlLogConfig;
use crate::logging::handlers::{TlFileHandler, TlLogHandler, TlStdoutHandler};

/// One log line, split into the `event.name` prefix and the message that
/// follows it when the message uses the `event.name: message` convention.
#[derive(Clone, Debug)]
pub struct TlLogRecord {
    pub level: Level,
    pub target: String,
    pub event: Option<String>,
    pub message: String,
    pub timestamp: SystemTime,
}

impl TlLogRecord {
    #[allow(non_snake_case)]
    pub fn new(level: Level, target: &str, text: &str) -> Self {
        let (event, message) = split_event(text);
        TlLogRecord {
            level,
            target: target.to_string(),
            event,
            message,
            timestamp: SystemTime::now(),
        }
    }

    pub fn timestamp_ms(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }

    pub fn to_json(&self) -> Value {
        let mut data = Map::new();
        data.insert("level".into(), json!(self.level.as_str()));
        data.insert("target".into(), json!(self.target));
        if let Some(event) = &self.event {
            data.insert("event".into(), json!(event));
        }
        data.insert("message".into(), json!(self.message));
        data.insert("timestamp_ms".into(), json!(self.timestamp_ms() as u64));
        Value::Object(data)
    }
}

/// Splits `"pipeline.step.failed: step failed - ..."` into its event name and
/// message. Text without a dotted, space-free prefix has no event.
pub fn split_event(text: &str) -> (Option<String>, String) {
    if let Some((prefix, rest)) = text.split_once(": ") {
        let is_event = prefix.contains('.')
            && !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
        if is_event {
            return (Some(prefix.to_string()), rest.to_string());
        }
    }
    (None, text.to_string())
}

/// `log` backend that writes to the configured handlers.
pub struct TlLogger {
    level: LevelFilter,
    handlers: Vec<Box<dyn TlLogHandler + Send + Sync>>,
}

static LOGGER: OnceLock<TlLogger> = OnceLock::new();

impl TlLogger {
    #[allow(non_snake_case)]
    pub fn new(config: &TlLogConfig) -> Self {
        let mut handlers: Vec<Box<dyn TlLogHandler + Send + Sync>> = Vec::new();
        if config.console_enabled {
            handlers.push(Box::new(TlStdoutHandler::new(config.json)));
        }
        if let Some(path) = &config.file_path {
            handlers.push(Box::new(TlFileHandler::new(path.clone(), config.json)));
        }
        TlLogger {
            level: config.level_filter(),
            handlers,
        }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Installs the process-wide logger. Safe to call multiple times; the
    /// first call wins. Returns whether this call installed it.
    pub fn init(config: &TlLogConfig) -> bool {
        let mut created = false;
        let logger = LOGGER.get_or_init(|| {
            created = true;
            TlLogger::new(config)
        });
        if !created {
            return false;
        }
        match log::set_logger(logger) {
            Ok(()) => {
                log::set_max_level(logger.level);
                true
            }
            Err(_) => false,
        }
    }
}

impl Log for TlLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = TlLogRecord::new(record.level(), record.target(), &record.args().to_string());
        for handler in &self.handlers {
            handler.handle(&entry);
        }
    }

    fn flush(&self) {}
}
