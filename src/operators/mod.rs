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

//! # Operators Module
//!
//! This module contains the built-in tabular operators available in Touchlink.
//! Every operator reads one or more datasets from the namespace by name and
//! returns a single-entry delta keyed by its output name.
//!
//! ## Operators
//!
//! - **column_select**: projection of named columns (`{dataset}_selected`)
//! - **filter**: AND-chained row conditions (`{dataset}_filtered`)
//! - **sort**: stable multi-key ordering with nulls last (`{dataset}_sorted`)
//! - **aggregate**: group-by with aggregation functions (`{dataset}_aggregated`)
//! - **join**: inner, left, right, outer and cross joins (`{left}_{right}_joined`)
//! - **union**: row concatenation over the union of columns (`union_result`)
//!
//! ## Usage
//!
//! Operators are normally created by the registry from a step's type key and
//! parameter bag. Each module also exposes a factory function, a typed
//! parameter struct and an `*_info()` descriptor.

pub mod aggregate;
pub mod column_select;
pub mod filter;
pub mod join;
pub mod sort;
pub mod union;

pub use aggregate::{aggregate_factory, aggregate_info, TlAggregate};
pub use column_select::{column_select_factory, column_select_info, TlColumnSelect};
pub use filter::{filter_factory, filter_info, TlFilter};
pub use join::{join_factory, join_info, TlJoin};
pub use sort::{sort_factory, sort_info, TlSort};
pub use union::{union_factory, union_info, TlUnion};

use crate::dataset::{TlDataset, TlNamespace};
use crate::errors::{Result, TlError};

/// Looks up an input dataset, failing with `DatasetNotFound`.
pub(crate) fn input<'a>(namespace: &'a TlNamespace, name: &str) -> Result<&'a TlDataset> {
    namespace
        .get(name)
        .ok_or_else(|| TlError::dataset_not_found(name))
}

/// Wraps a single result dataset into a namespace delta.
pub(crate) fn single_output(name: String, dataset: TlDataset) -> TlNamespace {
    let mut delta = TlNamespace::with_capacity(1);
    delta.insert(name, dataset);
    delta
}
