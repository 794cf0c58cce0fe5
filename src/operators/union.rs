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

use serde_json::Value;

use crate::dataset::{TlDataset, TlNamespace, TlRow};
use crate::errors::Result;
use crate::operator::{TlOperator, TlOperatorInfo, TlParamSpec, TlParamType};
use crate::operators::{input, single_output};
use crate::params::TlParamBag;

pub const UNION: &str = "union";

/// Typed parameters of [`TlUnion`].
#[derive(Clone, Debug, PartialEq)]
pub struct TlUnionParams {
    pub datasets: Vec<String>,
    /// Accepted for compatibility with stored pipelines. Datasets carry no
    /// row index, so output rows are always renumbered.
    pub ignore_index: bool,
    pub output_name: String,
}

impl TlUnionParams {
    pub fn from_value(params: &Value) -> Result<Self> {
        let bag = TlParamBag::parse(UNION, params)?;
        let datasets = bag.string_list("datasets")?;
        if datasets.len() < 2 {
            return Err(bag.error("'datasets' must list at least two datasets"));
        }
        let ignore_index = bag.optional_bool("ignore_index", true)?;
        let output_name = bag.output_name(|| "union_result".to_string())?;
        Ok(TlUnionParams {
            datasets,
            ignore_index,
            output_name,
        })
    }
}

/// Concatenates datasets in list order. The output columns are the union of
/// the input columns in first-appearance order; absent cells are null.
#[derive(Debug)]
pub struct TlUnion {
    params: Value,
}

impl TlUnion {
    #[allow(non_snake_case)]
    pub fn new(params: Value) -> Self {
        Self { params }
    }

    fn apply(inputs: &[&TlDataset]) -> Result<TlDataset> {
        let mut columns: Vec<String> = Vec::new();
        for dataset in inputs {
            for column in dataset.columns() {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut rows: Vec<TlRow> = Vec::with_capacity(inputs.iter().map(|d| d.len()).sum());
        for dataset in inputs {
            let positions: Vec<Option<usize>> = columns
                .iter()
                .map(|column| dataset.column_index(column))
                .collect();
            rows.extend(dataset.rows().iter().map(|row| {
                positions
                    .iter()
                    .map(|position| position.map_or(Value::Null, |i| row[i].clone()))
                    .collect::<TlRow>()
            }));
        }

        TlDataset::from_rows(columns, rows)
    }
}

impl TlOperator for TlUnion {
    fn name(&self) -> &'static str {
        UNION
    }

    fn check_params(&self) -> Result<()> {
        TlUnionParams::from_value(&self.params).map(|_| ())
    }

    fn execute(&self, namespace: &TlNamespace) -> Result<TlNamespace> {
        let params = TlUnionParams::from_value(&self.params)?;
        let inputs = params
            .datasets
            .iter()
            .map(|name| input(namespace, name))
            .collect::<Result<Vec<_>>>()?;
        let combined = Self::apply(&inputs)?;
        Ok(single_output(params.output_name, combined))
    }

    fn info(&self) -> TlOperatorInfo {
        union_info()
    }
}

pub fn union_info() -> TlOperatorInfo {
    TlOperatorInfo::new(UNION, "Union", "Concatenate the rows of several datasets")
        .param(TlParamSpec::required(
            "datasets",
            TlParamType::Array,
            "Dataset names, at least two",
        ))
        .param(
            TlParamSpec::optional("ignore_index", TlParamType::Boolean, "Renumber output rows")
                .with_default(Value::Bool(true)),
        )
        .with_output_name()
}

#[allow(non_snake_case)]
pub fn union_factory(params: Value) -> Box<dyn TlOperator + Send + Sync> {
    Box::new(TlUnion::new(params))
}
