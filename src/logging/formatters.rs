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

use crate::logging::core::TlLogRecord;

pub struct TlJsonFormatter;

impl TlJsonFormatter {
    pub fn format(record: &TlLogRecord) -> String {
        record.to_json().to_string()
    }
}

pub struct TlTextFormatter;

impl TlTextFormatter {
    /// `<timestamp_ms> <LEVEL> <target> <event>: <message>`
    pub fn format(record: &TlLogRecord) -> String {
        match &record.event {
            Some(event) => format!(
                "{} {:<5} {} {}: {}",
                record.timestamp_ms(),
                record.level.as_str(),
                record.target,
                event,
                record.message
            ),
            None => format!(
                "{} {:<5} {} {}",
                record.timestamp_ms(),
                record.level.as_str(),
                record.target,
                record.message
            ),
        }
    }
}
