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

//! # Data Source Module
//!
//! Data sources are the origin of the tables a pipeline starts from. The
//! executor only needs three things from a source: a name for error
//! reporting, the list of its tables, and a bounded sample of rows per table.
//!
//! ## Sources
//!
//! - [`TlMemorySource`]: tables held in memory
//! - [`TlCsvDirectorySource`] (feature `csv`): one table per `*.csv` file in a
//!   directory, with cell types inferred from the text

use std::collections::BTreeMap;
#[cfg(feature = "csv")]
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::dataset::TlDataset;
use crate::errors::{Result, TlError};

/// Source of named tables.
pub trait TlDataSource: Send + Sync {
    /// Identifier used in logs and `DataSourceLoad` errors.
    fn name(&self) -> &str;

    /// Names of the tables this source can serve.
    fn get_tables(&self) -> Result<Vec<String>>;

    /// Up to `limit` rows of `table`, in source order.
    fn get_sample_data(&self, table: &str, limit: usize) -> Result<TlDataset>;
}

/// In-memory tables, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct TlMemorySource {
    name: String,
    tables: BTreeMap<String, TlDataset>,
}

impl TlMemorySource {
    #[allow(non_snake_case)]
    pub fn new(name: &str) -> Self {
        TlMemorySource {
            name: name.to_string(),
            tables: BTreeMap::new(),
        }
    }

    pub fn with_table(mut self, name: &str, dataset: TlDataset) -> Self {
        self.insert(name, dataset);
        self
    }

    pub fn insert(&mut self, name: &str, dataset: TlDataset) {
        self.tables.insert(name.to_string(), dataset);
    }
}

impl TlDataSource for TlMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn get_sample_data(&self, table: &str, limit: usize) -> Result<TlDataset> {
        self.tables
            .get(table)
            .map(|dataset| dataset.head(limit))
            .ok_or_else(|| TlError::dataset_not_found(table))
    }
}

/// Directory of CSV files. Each `<table>.csv` is one table with a header row.
#[cfg(feature = "csv")]
#[derive(Clone, Debug)]
pub struct TlCsvDirectorySource {
    name: String,
    root: PathBuf,
}

#[cfg(feature = "csv")]
impl TlCsvDirectorySource {
    #[allow(non_snake_case)]
    pub fn new(name: &str, root: impl AsRef<Path>) -> Self {
        TlCsvDirectorySource {
            name: name.to_string(),
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.csv"))
    }
}

#[cfg(feature = "csv")]
impl TlDataSource for TlCsvDirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if !is_csv || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                tables.push(stem.to_string_lossy().into_owned());
            }
        }
        tables.sort();
        Ok(tables)
    }

    fn get_sample_data(&self, table: &str, limit: usize) -> Result<TlDataset> {
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(TlError::dataset_not_found(table));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let width = columns.len();
        let rows = reader
            .records()
            .take(limit)
            .map(|record| -> Result<Vec<Value>> {
                let record = record?;
                Ok((0..width)
                    .map(|i| record.get(i).map_or(Value::Null, infer_cell))
                    .collect())
            })
            .collect::<Result<Vec<_>>>()?;
        let dataset = TlDataset::from_rows(columns, rows)?;

        log::debug!(
            "source.csv.loaded: table sampled - source={}, table={}, rows={}",
            self.name,
            table,
            dataset.len()
        );
        Ok(dataset)
    }
}

/// Types a CSV cell: empty is null, then integer, float, boolean, string.
pub fn infer_cell(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = text.parse::<f64>() {
        if float.is_finite() {
            return crate::value::number_value(float);
        }
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}
