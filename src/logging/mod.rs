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

//! # Logging Module
//!
//! Touchlink logs through the `log` facade. Messages follow the
//! `event.name: message - key=value, key2=value` convention, for example:
//!
//! ```text
//! pipeline.step.failed: step failed - pipeline=..., position=2, operator=join
//! ```
//!
//! This module provides an optional backend, [`TlLogger`], that renders each
//! record as a single JSON or text line with a millisecond timestamp and the
//! event name split out, filters by level, and writes to stdout and/or an
//! append-only file. Applications that already install another `log` backend
//! do not need it.
//!
//! ## Usage
//!
//! ```rust
//! use touchlink::logging::{TlLogConfig, TlLogger};
//!
//! TlLogger::init(&TlLogConfig::default());
//! log::info!("app.started: ready - version={}", "0.1.0");
//! ```

pub mod config;
pub mod core;
pub mod formatters;
pub mod handlers;

pub use self::config::{TlLogConfig, TlLogConfigBuilder};
pub use self::core::{split_event, TlLogRecord, TlLogger};
pub use self::formatters::{TlJsonFormatter, TlTextFormatter};
pub use self::handlers::{TlFileHandler, TlLogHandler, TlStdoutHandler};
