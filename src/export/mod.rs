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

//! # Result Export Module
//!
//! This module persists the namespace produced by a pipeline run.
//!
//! ## Module Components
//!
//! - **Writer** ([writer.rs](writer/index.html)): one CSV file per dataset
//! - **Index** ([index.rs](index/index.html)): the `index.json` artifact that
//!   lists the files of a run with row counts, sizes and BLAKE3 digests
//!
//! ## Layout
//!
//! ```text
//! <results_dir>/<task_id>/
//!     sales_filtered.csv
//!     sales_aggregated.csv
//!     index.json
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use touchlink::export::{TlResultIndex, TlResultWriter};
//!
//! let writer = TlResultWriter::new("results");
//! let dir = writer.save(&namespace, "task-1")?;
//! let index = TlResultIndex::load(&dir)?;
//! ```

pub mod index;
pub mod writer;

pub use index::{compute_file_hash, TlResultFile, TlResultIndex, INDEX_FILE_NAME};
pub use writer::{sanitize_file_name, TlResultWriter};
