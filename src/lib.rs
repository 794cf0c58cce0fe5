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

//! # Touchlink Analytics Core
//!
//! This is the library entry point for the Touchlink analytics engine. It
//! turns a declarative list of tabular operations into results: pipelines of
//! operator steps run over a namespace of named datasets, loaded from a data
//! source and persisted as CSV files.
//!
//! ## Module Overview
//!
//! - **dataset**: `TlDataset` tables and the `TlNamespace` they live in
//! - **value**: comparison, ordering and key rules for cells
//! - **operator**: the operator trait and operator descriptors
//! - **operators**: built-in operators (column_select, filter, sort,
//!   aggregate, join, union)
//! - **params**: typed access to untyped step parameters
//! - **registry**: operator type keys to factories, process-wide or local
//! - **pipeline**: ordered, serializable steps and their execution
//! - **executor**: loading tables from a data source and running a pipeline
//! - **source**: data source trait with in-memory and CSV directory sources
//! - **export**: CSV result files and the `index.json` artifact
//! - **task**: analysis tasks, their store, runner and service facade
//! - **config**: engine configuration from files and environment
//! - **logging**: optional `log` backend with JSON/text lines
//!
//! ## Feature Flags
//!
//! - `csv` (default): CSV directory source, result export and tasks
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use touchlink::{TlDataset, TlNamespace, TlPipeline};
//!
//! let mut namespace = TlNamespace::new();
//! namespace.insert(
//!     "sales".to_string(),
//!     TlDataset::from_records(&[
//!         json!({"region": "A", "amt": 10}),
//!         json!({"region": "B", "amt": 5}),
//!         json!({"region": "A", "amt": 7}),
//!     ])?,
//! );
//!
//! let mut pipeline = TlPipeline::new(Some("regional totals"), None);
//! pipeline
//!     .add_step("filter", json!({
//!         "dataset_name": "sales",
//!         "conditions": [{"column": "amt", "operator": "gt", "value": 6}]
//!     }))?
//!     .add_step("aggregate", json!({
//!         "dataset_name": "sales_filtered",
//!         "group_by": ["region"],
//!         "aggregations": [{"column": "amt", "function": "sum"}]
//!     }))?;
//!
//! let result = pipeline.execute(&namespace)?;
//! assert_eq!(result["sales_aggregated"].len(), 1);
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, TlError>`. Pipeline failures are wrapped
//! in `TlError::Step` with the 1-based position of the failing step.

pub mod config;
pub mod dataset;
pub mod errors;
pub mod executor;
#[cfg(feature = "csv")]
pub mod export;
pub mod logging;
pub mod operator;
pub mod operators;
pub mod params;
pub mod pipeline;
pub mod registry;
pub mod source;
#[cfg(feature = "csv")]
pub mod task;
pub mod value;

pub use config::{TlEngineConfig, TlEngineConfigBuilder};
pub use dataset::{TlColumnType, TlDataset, TlNamespace, TlRow};
pub use errors::{Result, TlError};
pub use executor::{TlExecutorConfig, TlPipelineExecutor};
pub use operator::{execute_operator, TlOperator, TlOperatorInfo, TlParamSpec, TlParamType};
pub use pipeline::{TlPipeline, TlPipelineStep};
pub use registry::{global_registry, TlOperatorEntry, TlOperatorFactory, TlOperatorRegistry};
pub use source::{TlDataSource, TlMemorySource};

#[cfg(feature = "csv")]
pub use export::{TlResultIndex, TlResultWriter};
#[cfg(feature = "csv")]
pub use source::TlCsvDirectorySource;
#[cfg(feature = "csv")]
pub use task::{
    TlAnalysisTask, TlAnalyticsService, TlDataSourceResolver, TlMemoryTaskStore, TlSourceCatalog,
    TlTaskOutcome, TlTaskRunner, TlTaskStatus, TlTaskStore,
};
