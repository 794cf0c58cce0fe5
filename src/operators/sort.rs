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

use std::cmp::Ordering;

use serde_json::Value;

use crate::dataset::{TlDataset, TlNamespace};
use crate::errors::Result;
use crate::operator::{TlOperator, TlOperatorInfo, TlParamSpec, TlParamType};
use crate::operators::{input, single_output};
use crate::params::TlParamBag;
use crate::value::total_cmp;

pub const SORT: &str = "sort";

/// One sort key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlSortKey {
    pub column: String,
    pub ascending: bool,
}

/// Typed parameters of [`TlSort`].
#[derive(Clone, Debug, PartialEq)]
pub struct TlSortParams {
    pub dataset_name: String,
    pub sort_by: Vec<TlSortKey>,
    pub output_name: String,
}

impl TlSortParams {
    pub fn from_value(params: &Value) -> Result<Self> {
        let bag = TlParamBag::parse(SORT, params)?;
        let dataset_name = bag.required_str("dataset_name")?;
        let sort_by = bag
            .required_array("sort_by")?
            .iter()
            .map(|item| {
                let key = bag.item("sort_by", item)?;
                Ok(TlSortKey {
                    column: key.required_str("column")?,
                    ascending: key.optional_bool("ascending", true)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let output_name = bag.output_name(|| format!("{dataset_name}_sorted"))?;
        Ok(TlSortParams {
            dataset_name,
            sort_by,
            output_name,
        })
    }
}

/// Stable multi-key sort. Nulls are placed last for every key, whichever
/// direction that key sorts in.
#[derive(Debug)]
pub struct TlSort {
    params: Value,
}

impl TlSort {
    #[allow(non_snake_case)]
    pub fn new(params: Value) -> Self {
        Self { params }
    }

    fn apply(dataset_name: &str, dataset: &TlDataset, keys: &[TlSortKey]) -> Result<TlDataset> {
        let resolved = keys
            .iter()
            .map(|key| {
                dataset
                    .require_column(dataset_name, &key.column)
                    .map(|index| (index, key.ascending))
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = dataset.rows();
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by(|&a, &b| {
            resolved
                .iter()
                .map(|&(index, ascending)| compare_key(&rows[a][index], &rows[b][index], ascending))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        Ok(dataset.take_rows(&order))
    }
}

fn compare_key(left: &Value, right: &Value, ascending: bool) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if ascending => total_cmp(left, right),
        (false, false) => total_cmp(right, left),
    }
}

impl TlOperator for TlSort {
    fn name(&self) -> &'static str {
        SORT
    }

    fn check_params(&self) -> Result<()> {
        TlSortParams::from_value(&self.params).map(|_| ())
    }

    fn execute(&self, namespace: &TlNamespace) -> Result<TlNamespace> {
        let params = TlSortParams::from_value(&self.params)?;
        let dataset = input(namespace, &params.dataset_name)?;
        let sorted = Self::apply(&params.dataset_name, dataset, &params.sort_by)?;
        Ok(single_output(params.output_name, sorted))
    }

    fn info(&self) -> TlOperatorInfo {
        sort_info()
    }
}

pub fn sort_info() -> TlOperatorInfo {
    TlOperatorInfo::new(SORT, "Sort", "Order rows by one or more columns")
        .param(TlParamSpec::required(
            "dataset_name",
            TlParamType::String,
            "Input dataset name",
        ))
        .param(
            TlParamSpec::required("sort_by", TlParamType::Array, "Sort keys, most significant first")
                .with_items(vec![
                    TlParamSpec::required("column", TlParamType::String, "Column name"),
                    TlParamSpec::optional("ascending", TlParamType::Boolean, "Sort ascending")
                        .with_default(Value::Bool(true)),
                ]),
        )
        .with_output_name()
}

#[allow(non_snake_case)]
pub fn sort_factory(params: Value) -> Box<dyn TlOperator + Send + Sync> {
    Box::new(TlSort::new(params))
}
