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

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TlError};

pub const INDEX_FILE_NAME: &str = "index.json";

/// One persisted dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlResultFile {
    pub name: String,
    pub path: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub size: u64,
    /// Hex-encoded BLAKE3 digest of the file contents.
    pub hash: String,
}

/// Contents of `index.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlResultIndex {
    pub task_id: String,
    pub timestamp: String,
    /// Dataset name to file path.
    pub files: BTreeMap<String, String>,
    #[serde(default)]
    pub datasets: Vec<TlResultFile>,
}

impl TlResultIndex {
    #[allow(non_snake_case)]
    pub fn new(task_id: &str, timestamp: String) -> Self {
        TlResultIndex {
            task_id: task_id.to_string(),
            timestamp,
            files: BTreeMap::new(),
            datasets: Vec::new(),
        }
    }

    pub fn add_file(&mut self, file: TlResultFile) {
        self.files.insert(file.name.clone(), file.path.clone());
        self.datasets.push(file);
    }

    pub fn total_rows(&self) -> usize {
        self.datasets.iter().map(|file| file.rows).sum()
    }

    pub fn total_size(&self) -> u64 {
        self.datasets.iter().map(|file| file.size).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TlError::internal(format!("failed to serialize result index: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TlError::validation(format!("invalid result index JSON: {}", e)))
    }

    /// Reads an index from its file, or from `index.json` inside a directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = if path.is_dir() {
            path.join(INDEX_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        let text = std::fs::read_to_string(file)?;
        Self::from_json(&text)
    }
}

/// Hex-encoded BLAKE3 digest of a file.
pub fn compute_file_hash(path: impl AsRef<Path>) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(File::open(path)?)?;
    Ok(hex::encode(hasher.finalize().as_bytes()))
}
