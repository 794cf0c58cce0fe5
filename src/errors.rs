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

//! # Touchlink Error Module
//!
//! This module defines the error taxonomy shared by operators, the registry,
//! pipelines and the executor.
//!
//! ## Error Categories
//!
//! - **ParamValidation**: a step's parameter bag is structurally invalid
//! - **UnknownOperator**: operator type missing from the registry
//! - **DatasetNotFound** / **ColumnNotFound**: references that only fail at
//!   execution time
//! - **UnsupportedJoinType** / **UnsupportedAggregationFunction** /
//!   **UnsupportedFilterOperator**: enum-constrained values outside the
//!   supported set
//! - **DataSourceLoad**: the data source failed to enumerate or fetch tables
//! - **Step**: the first failing pipeline step, with its 1-based position
//! - **Operator**: a type or value error raised inside an operator
//! - **Validation**, **Io**, **Serde**, **Internal**: ambient failures
//!
//! Errors derive `Serialize`/`Deserialize` so task records can persist them.
//!
//! ## Usage
//!
//! ```rust
//! use touchlink::errors::{Result, TlError};
//!
//! fn lookup(name: &str, known: &[&str]) -> Result<()> {
//!     if !known.contains(&name) {
//!         return Err(TlError::dataset_not_found(name));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Touchlink.
pub type Result<T> = std::result::Result<T, TlError>;

/// Canonical error enumeration for the analytics core.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum TlError {
    /// A parameter bag is missing a key or has the wrong shape.
    #[error("invalid params for operator '{operator}': {message}")]
    ParamValidation { operator: String, message: String },

    /// The operator type is not present in the registry.
    #[error("unsupported operator type: {operator}")]
    UnknownOperator { operator: String },

    /// A step referenced a dataset absent from the namespace.
    #[error("dataset not found: {dataset}")]
    DatasetNotFound { dataset: String },

    /// A step referenced a column absent from a dataset's schema.
    #[error("column not found in dataset '{dataset}': {column}")]
    ColumnNotFound { dataset: String, column: String },

    #[error("unsupported join type: {0}")]
    UnsupportedJoinType(String),

    #[error("unsupported aggregation function: {0}")]
    UnsupportedAggregationFunction(String),

    #[error("unsupported filter operator: {0}")]
    UnsupportedFilterOperator(String),

    /// The data source failed to enumerate or fetch tables.
    #[error("failed to load data from source '{source_name}': {message}")]
    DataSourceLoad { source_name: String, message: String },

    /// First failing step of a pipeline run.
    ///
    /// `available` lists the datasets present in the namespace when the step
    /// failed, so callers can see what earlier steps produced.
    #[error("pipeline execution failed at step {index} ({operator}): {source}")]
    Step {
        index: usize,
        operator: String,
        available: Vec<String>,
        source: Box<TlError>,
    },

    /// Any other failure raised by an operator implementation.
    #[error("operator '{operator}' failed: {message}")]
    Operator { operator: String, message: String },

    /// Validation errors triggered by invalid documents or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serialization issues (JSON, YAML, CSV).
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for TlError {
    fn from(err: io::Error) -> Self {
        TlError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TlError {
    fn from(err: serde_json::Error) -> Self {
        TlError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for TlError {
    fn from(err: serde_yaml::Error) -> Self {
        TlError::Serde(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for TlError {
    fn from(err: csv::Error) -> Self {
        TlError::Serde(err.to_string())
    }
}

impl TlError {
    /// Helper to construct parameter validation errors.
    pub fn params(operator: impl Into<String>, message: impl Into<String>) -> Self {
        TlError::ParamValidation {
            operator: operator.into(),
            message: message.into(),
        }
    }

    pub fn unknown_operator(operator: impl Into<String>) -> Self {
        TlError::UnknownOperator {
            operator: operator.into(),
        }
    }

    pub fn dataset_not_found(dataset: impl Into<String>) -> Self {
        TlError::DatasetNotFound {
            dataset: dataset.into(),
        }
    }

    pub fn column_not_found(dataset: impl Into<String>, column: impl Into<String>) -> Self {
        TlError::ColumnNotFound {
            dataset: dataset.into(),
            column: column.into(),
        }
    }

    pub fn data_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        TlError::DataSourceLoad {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct operator errors.
    pub fn operator(name: impl Into<String>, message: impl Into<String>) -> Self {
        TlError::Operator {
            operator: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        TlError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        TlError::Internal(message.into())
    }

    /// Wraps a step failure with its 1-based position and operator type.
    pub fn step(
        index: usize,
        operator: impl Into<String>,
        available: Vec<String>,
        source: TlError,
    ) -> Self {
        TlError::Step {
            index,
            operator: operator.into(),
            available,
            source: Box::new(source),
        }
    }

    /// Returns the innermost error, unwrapping step context.
    pub fn root_cause(&self) -> &TlError {
        match self {
            TlError::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
