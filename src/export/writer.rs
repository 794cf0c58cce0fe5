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

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::dataset::{TlDataset, TlNamespace};
use crate::errors::Result;
use crate::export::index::{compute_file_hash, TlResultFile, TlResultIndex, INDEX_FILE_NAME};
use crate::pipeline::format_timestamp;
use crate::value::to_text;

/// Writes pipeline results under `<results_dir>/<task_id>/`.
#[derive(Clone, Debug)]
pub struct TlResultWriter {
    results_dir: PathBuf,
}

impl TlResultWriter {
    #[allow(non_snake_case)]
    pub fn new(results_dir: impl AsRef<Path>) -> Self {
        TlResultWriter {
            results_dir: results_dir.as_ref().to_path_buf(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Writes every dataset as CSV plus `index.json` and returns the
    /// directory holding them. Datasets are written in name order.
    pub fn save(&self, namespace: &TlNamespace, task_id: &str) -> Result<PathBuf> {
        let dir = self.results_dir.join(sanitize_file_name(task_id));
        std::fs::create_dir_all(&dir)?;

        let mut names: Vec<&String> = namespace.keys().collect();
        names.sort();

        let mut index = TlResultIndex::new(task_id, format_timestamp(&Utc::now()));
        let mut used: HashSet<String> = HashSet::new();
        used.insert(INDEX_FILE_NAME.to_string());

        for name in names {
            let dataset = &namespace[name];
            let file_name = unique_file_name(&mut used, name);
            let path = dir.join(&file_name);
            write_csv(dataset, &path)?;

            let size = std::fs::metadata(&path)?.len();
            index.add_file(TlResultFile {
                name: name.clone(),
                path: path.to_string_lossy().into_owned(),
                rows: dataset.len(),
                columns: dataset.columns().to_vec(),
                size,
                hash: compute_file_hash(&path)?,
            });
        }

        let mut writer = BufWriter::new(File::create(dir.join(INDEX_FILE_NAME))?);
        writer.write_all(index.to_json()?.as_bytes())?;
        writer.flush()?;

        log::info!(
            "export.results.saved: results written - task_id={}, datasets={}, rows={}, bytes={}, dir={}",
            task_id,
            index.datasets.len(),
            index.total_rows(),
            index.total_size(),
            dir.display()
        );
        Ok(dir)
    }
}

/// Writes a dataset as CSV with a header row. Null cells are empty; strings
/// are written verbatim and other values as JSON.
fn write_csv(dataset: &TlDataset, path: &Path) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    csv_writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        csv_writer.write_record(row.iter().map(to_text))?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn unique_file_name(used: &mut HashSet<String>, name: &str) -> String {
    let stem = sanitize_file_name(name);
    let mut candidate = format!("{stem}.csv");
    let mut counter = 2;
    while used.contains(&candidate) {
        candidate = format!("{stem}_{counter}.csv");
        counter += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Replaces characters that are unsafe in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "dataset".to_string()
    } else {
        cleaned.to_string()
    }
}
