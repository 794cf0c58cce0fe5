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

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::logging::core::TlLogRecord;
use crate::logging::formatters::{TlJsonFormatter, TlTextFormatter};

pub trait TlLogHandler {
    fn handle(&self, record: &TlLogRecord);
}

fn render(record: &TlLogRecord, json: bool) -> String {
    if json {
        TlJsonFormatter::format(record)
    } else {
        TlTextFormatter::format(record)
    }
}

pub struct TlStdoutHandler {
    json: bool,
}

impl TlStdoutHandler {
    #[allow(non_snake_case)]
    pub fn new(json: bool) -> Self {
        TlStdoutHandler { json }
    }
}

impl TlLogHandler for TlStdoutHandler {
    fn handle(&self, record: &TlLogRecord) {
        println!("{}", render(record, self.json));
    }
}

/// Appends one line per record to a file, opened per write.
pub struct TlFileHandler {
    path: String,
    json: bool,
    file: Mutex<()>,
}

impl TlFileHandler {
    #[allow(non_snake_case)]
    pub fn new(path: String, json: bool) -> Self {
        TlFileHandler {
            path,
            json,
            file: Mutex::new(()),
        }
    }
}

impl TlLogHandler for TlFileHandler {
    fn handle(&self, record: &TlLogRecord) {
        let _guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let line = render(record, self.json);
        if let Ok(mut f) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = writeln!(f, "{}", line);
        }
    }
}
