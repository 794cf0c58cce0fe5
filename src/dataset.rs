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

//! # Touchlink Dataset Module
//!
//! This module provides the tabular value that flows between pipeline steps.
//! A [`TlDataset`] is an ordered list of named columns plus ordered rows whose
//! cells are `serde_json::Value`s, and a [`TlNamespace`] maps dataset names to
//! datasets for the duration of one pipeline run.
//!
//! ## Design Principles
//!
//! - **Value semantics**: operators read datasets by reference and build new
//!   ones; nothing mutates a dataset that is already in a namespace
//! - **Flexible cells**: JSON cells hold whatever the data source returned;
//!   column types are inferred on demand rather than enforced
//! - **Record interop**: datasets convert to and from arrays of JSON objects,
//!   which is how tests, APIs and documents usually describe tables
//!
//! ## Usage Example
//!
//! ```rust
//! use touchlink::dataset::TlDataset;
//! use serde_json::json;
//!
//! let sales = TlDataset::from_records(&[
//!     json!({"region": "A", "amt": 10}),
//!     json!({"region": "B", "amt": 5}),
//! ]).unwrap();
//!
//! assert_eq!(sales.columns(), &["region".to_string(), "amt".to_string()]);
//! assert_eq!(sales.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, TlError};

/// Named datasets threaded through one pipeline execution.
pub type TlNamespace = HashMap<String, TlDataset>;

/// A single row of cells, positionally aligned with the dataset's columns.
pub type TlRow = Vec<Value>;

/// Column type inferred from the non-null cells of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlColumnType {
    /// Every cell is null (or the dataset has no rows).
    Null,
    Boolean,
    Integer,
    /// Numbers where at least one is not an integer.
    Float,
    String,
    /// Arrays or objects.
    Json,
    /// More than one of the above.
    Mixed,
}

impl fmt::Display for TlColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TlColumnType::Null => "null",
            TlColumnType::Boolean => "boolean",
            TlColumnType::Integer => "integer",
            TlColumnType::Float => "float",
            TlColumnType::String => "string",
            TlColumnType::Json => "json",
            TlColumnType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

impl TlColumnType {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => TlColumnType::Null,
            Value::Bool(_) => TlColumnType::Boolean,
            Value::Number(number) if number.is_i64() || number.is_u64() => TlColumnType::Integer,
            Value::Number(_) => TlColumnType::Float,
            Value::String(_) => TlColumnType::String,
            Value::Array(_) | Value::Object(_) => TlColumnType::Json,
        }
    }

    fn merge(self, other: TlColumnType) -> Self {
        use TlColumnType::*;
        match (self, other) {
            (Null, t) | (t, Null) => t,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Mixed,
        }
    }
}

/// In-memory table with named columns and ordered rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TlDataset {
    columns: Vec<String>,
    rows: Vec<TlRow>,
}

impl TlDataset {
    /// Creates an empty dataset with the given columns.
    #[allow(non_snake_case)]
    pub fn new(columns: Vec<String>) -> Self {
        TlDataset {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a dataset from columns and rows, checking that every row has
    /// one cell per column and that column names are unique.
    pub fn from_rows(columns: Vec<String>, rows: Vec<TlRow>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(TlError::validation(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TlError::validation(format!(
                    "row {index} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(TlDataset { columns, rows })
    }

    /// Builds a dataset from JSON objects. Columns appear in first-seen order
    /// and keys missing from a record become null cells.
    pub fn from_records(records: &[Value]) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                TlError::validation(format!("record {index} must be a JSON object"))
            })?;
            for key in object.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(Value::as_object)
            .map(|object| {
                columns
                    .iter()
                    .map(|column| object.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(TlDataset { columns, rows })
    }

    /// Renders every row as a JSON object keyed by column name.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for (column, cell) in self.columns.iter().zip(row) {
                    object.insert(column.clone(), cell.clone());
                }
                Value::Object(object)
            })
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TlRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Resolves a column position or fails with `ColumnNotFound`, naming the
    /// dataset as it is known in the namespace.
    pub fn require_column(&self, dataset: &str, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| TlError::column_not_found(dataset, name))
    }

    /// Iterates the cells of one column in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Infers the type of a column from its cells.
    pub fn column_type(&self, name: &str) -> Option<TlColumnType> {
        let index = self.column_index(name)?;
        Some(
            self.column_values(index)
                .map(TlColumnType::of)
                .fold(TlColumnType::Null, TlColumnType::merge),
        )
    }

    /// Column names paired with their inferred types.
    pub fn schema(&self) -> Vec<(String, TlColumnType)> {
        self.columns
            .iter()
            .map(|name| {
                let kind = self.column_type(name).unwrap_or(TlColumnType::Null);
                (name.clone(), kind)
            })
            .collect()
    }

    /// Appends a row, checking its width.
    pub fn push_row(&mut self, row: TlRow) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(TlError::validation(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns a dataset holding the first `limit` rows.
    pub fn head(&self, limit: usize) -> TlDataset {
        TlDataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }

    /// Returns a dataset with the rows at `indices`, in that order.
    pub fn take_rows(&self, indices: &[usize]) -> TlDataset {
        TlDataset {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Returns a dataset with the columns at `indices`, in that order.
    pub fn take_columns(&self, indices: &[usize]) -> TlDataset {
        TlDataset {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Reads a single cell by row position and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|cells| &cells[index])
    }
}
