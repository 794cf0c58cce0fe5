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

use crate::dataset::TlNamespace;
use crate::errors::{Result, TlError};
use crate::operator::{TlOperator, TlOperatorInfo, TlParamSpec, TlParamType};
use crate::operators::{input, single_output};
use crate::params::TlParamBag;

pub const COLUMN_SELECT: &str = "column_select";

/// Typed parameters of [`TlColumnSelect`].
#[derive(Clone, Debug, PartialEq)]
pub struct TlColumnSelectParams {
    pub dataset_name: String,
    pub columns: Vec<String>,
    pub output_name: String,
}

impl TlColumnSelectParams {
    pub fn from_value(params: &Value) -> Result<Self> {
        let bag = TlParamBag::parse(COLUMN_SELECT, params)?;
        let dataset_name = bag.required_str("dataset_name")?;
        let columns = bag.string_list("columns")?;
        let output_name = bag.output_name(|| format!("{dataset_name}_selected"))?;
        Ok(TlColumnSelectParams {
            dataset_name,
            columns,
            output_name,
        })
    }
}

/// Projects a dataset onto the requested columns, in the requested order.
#[derive(Debug)]
pub struct TlColumnSelect {
    params: Value,
}

impl TlColumnSelect {
    #[allow(non_snake_case)]
    pub fn new(params: Value) -> Self {
        Self { params }
    }
}

impl TlOperator for TlColumnSelect {
    fn name(&self) -> &'static str {
        COLUMN_SELECT
    }

    fn check_params(&self) -> Result<()> {
        TlColumnSelectParams::from_value(&self.params).map(|_| ())
    }

    fn execute(&self, namespace: &TlNamespace) -> Result<TlNamespace> {
        let params = TlColumnSelectParams::from_value(&self.params)?;
        let dataset = input(namespace, &params.dataset_name)?;

        let missing: Vec<&str> = params
            .columns
            .iter()
            .filter(|column| !dataset.has_column(column))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(TlError::column_not_found(
                &params.dataset_name,
                missing.join(", "),
            ));
        }

        let indices: Vec<usize> = params
            .columns
            .iter()
            .filter_map(|column| dataset.column_index(column))
            .collect();
        Ok(single_output(
            params.output_name,
            dataset.take_columns(&indices),
        ))
    }

    fn info(&self) -> TlOperatorInfo {
        column_select_info()
    }
}

pub fn column_select_info() -> TlOperatorInfo {
    TlOperatorInfo::new(COLUMN_SELECT, "Column Select", "Keep a subset of columns")
        .param(TlParamSpec::required(
            "dataset_name",
            TlParamType::String,
            "Input dataset name",
        ))
        .param(TlParamSpec::required(
            "columns",
            TlParamType::Array,
            "Columns to keep, in output order",
        ))
        .with_output_name()
}

#[allow(non_snake_case)]
pub fn column_select_factory(params: Value) -> Box<dyn TlOperator + Send + Sync> {
    Box::new(TlColumnSelect::new(params))
}
