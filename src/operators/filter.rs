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

//! # Filter Operator
//!
//! Keeps the rows of a dataset that satisfy every condition in
//! `conditions`. Conditions are applied sequentially, so the result is the
//! AND of all of them.
//!
//! ## Null Handling
//!
//! Null cells never satisfy `eq`, the ordering comparisons or the positive
//! text operators (`contains`, `starts_with`, `ends_with`). They always pass
//! `ne`, `not_in` (unless null is listed) and `not_contains`.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::dataset::{TlDataset, TlNamespace};
use crate::errors::{Result, TlError};
use crate::operator::{TlOperator, TlOperatorInfo, TlParamSpec, TlParamType};
use crate::operators::{input, single_output};
use crate::params::TlParamBag;
use crate::value::{compare_comparable, to_text, values_equal};

pub const FILTER: &str = "filter";

/// Comparison operators supported in filter conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlFilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    NotIn,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
}

impl TlFilterOp {
    pub const ALL: [TlFilterOp; 14] = [
        TlFilterOp::Eq,
        TlFilterOp::Ne,
        TlFilterOp::Gt,
        TlFilterOp::Ge,
        TlFilterOp::Lt,
        TlFilterOp::Le,
        TlFilterOp::In,
        TlFilterOp::NotIn,
        TlFilterOp::Contains,
        TlFilterOp::NotContains,
        TlFilterOp::StartsWith,
        TlFilterOp::EndsWith,
        TlFilterOp::IsNull,
        TlFilterOp::IsNotNull,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TlFilterOp::Eq => "eq",
            TlFilterOp::Ne => "ne",
            TlFilterOp::Gt => "gt",
            TlFilterOp::Ge => "ge",
            TlFilterOp::Lt => "lt",
            TlFilterOp::Le => "le",
            TlFilterOp::In => "in",
            TlFilterOp::NotIn => "not_in",
            TlFilterOp::Contains => "contains",
            TlFilterOp::NotContains => "not_contains",
            TlFilterOp::StartsWith => "starts_with",
            TlFilterOp::EndsWith => "ends_with",
            TlFilterOp::IsNull => "is_null",
            TlFilterOp::IsNotNull => "is_not_null",
        }
    }

    /// Whether the operator reads the condition's `value`.
    pub fn needs_value(&self) -> bool {
        !matches!(self, TlFilterOp::IsNull | TlFilterOp::IsNotNull)
    }
}

impl fmt::Display for TlFilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{column, operator, value}` condition, with its pattern compiled.
#[derive(Clone, Debug)]
pub struct TlCondition {
    pub column: String,
    pub op: TlFilterOp,
    pub value: Value,
    pattern: Option<Regex>,
}

impl TlCondition {
    fn from_bag(bag: &TlParamBag<'_>) -> Result<Self> {
        let column = bag.required_str("column")?;
        let op_name = bag.required_str("operator")?;
        let op = TlFilterOp::parse(&op_name)
            .ok_or_else(|| TlError::UnsupportedFilterOperator(op_name.clone()))?;

        let value = match bag.get("value") {
            Some(value) => value.clone(),
            None if op.needs_value() => {
                return Err(bag.error(format!(
                    "condition on '{column}' with operator '{op}' requires 'value'"
                )))
            }
            None => Value::Null,
        };

        if matches!(op, TlFilterOp::In | TlFilterOp::NotIn) && !value.is_array() {
            return Err(bag.error(format!(
                "operator '{op}' on '{column}' requires a list value"
            )));
        }

        let pattern = match op {
            TlFilterOp::Contains | TlFilterOp::NotContains => {
                let source = to_text(&value);
                Some(Regex::new(&source).map_err(|err| {
                    bag.error(format!("invalid pattern '{source}' for '{column}': {err}"))
                })?)
            }
            _ => None,
        };

        Ok(TlCondition {
            column,
            op,
            value,
            pattern,
        })
    }

    /// Evaluates the condition against one cell.
    pub fn matches(&self, cell: &Value) -> bool {
        match self.op {
            TlFilterOp::Eq => values_equal(cell, &self.value),
            TlFilterOp::Ne => !values_equal(cell, &self.value),
            TlFilterOp::Gt => self.ordered(cell, |ord| ord == Ordering::Greater),
            TlFilterOp::Ge => self.ordered(cell, |ord| ord != Ordering::Less),
            TlFilterOp::Lt => self.ordered(cell, |ord| ord == Ordering::Less),
            TlFilterOp::Le => self.ordered(cell, |ord| ord != Ordering::Greater),
            TlFilterOp::In => self.listed(cell),
            TlFilterOp::NotIn => !self.listed(cell),
            TlFilterOp::Contains => !cell.is_null() && self.pattern_matches(cell),
            TlFilterOp::NotContains => cell.is_null() || !self.pattern_matches(cell),
            TlFilterOp::StartsWith => {
                !cell.is_null() && to_text(cell).starts_with(&to_text(&self.value))
            }
            TlFilterOp::EndsWith => {
                !cell.is_null() && to_text(cell).ends_with(&to_text(&self.value))
            }
            TlFilterOp::IsNull => cell.is_null(),
            TlFilterOp::IsNotNull => !cell.is_null(),
        }
    }

    fn ordered(&self, cell: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
        compare_comparable(cell, &self.value).map_or(false, accept)
    }

    fn listed(&self, cell: &Value) -> bool {
        let Some(items) = self.value.as_array() else {
            return false;
        };
        if cell.is_null() {
            return items.iter().any(Value::is_null);
        }
        items.iter().any(|item| values_equal(cell, item))
    }

    fn pattern_matches(&self, cell: &Value) -> bool {
        self.pattern
            .as_ref()
            .map_or(false, |pattern| pattern.is_match(&to_text(cell)))
    }
}

/// Typed parameters of [`TlFilter`].
#[derive(Clone, Debug)]
pub struct TlFilterParams {
    pub dataset_name: String,
    pub conditions: Vec<TlCondition>,
    pub output_name: String,
}

impl TlFilterParams {
    pub fn from_value(params: &Value) -> Result<Self> {
        let bag = TlParamBag::parse(FILTER, params)?;
        let dataset_name = bag.required_str("dataset_name")?;
        let conditions = bag
            .required_array("conditions")?
            .iter()
            .map(|item| TlCondition::from_bag(&bag.item("conditions", item)?))
            .collect::<Result<Vec<_>>>()?;
        let output_name = bag.output_name(|| format!("{dataset_name}_filtered"))?;
        Ok(TlFilterParams {
            dataset_name,
            conditions,
            output_name,
        })
    }
}

/// Row filter over an AND chain of conditions.
#[derive(Debug)]
pub struct TlFilter {
    params: Value,
}

impl TlFilter {
    #[allow(non_snake_case)]
    pub fn new(params: Value) -> Self {
        Self { params }
    }

    fn apply(dataset_name: &str, dataset: &TlDataset, conditions: &[TlCondition]) -> Result<TlDataset> {
        let resolved = conditions
            .iter()
            .map(|condition| {
                dataset
                    .require_column(dataset_name, &condition.column)
                    .map(|index| (index, condition))
            })
            .collect::<Result<Vec<_>>>()?;

        let kept: Vec<usize> = dataset
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                resolved
                    .iter()
                    .all(|(index, condition)| condition.matches(&row[*index]))
            })
            .map(|(position, _)| position)
            .collect();

        Ok(dataset.take_rows(&kept))
    }
}

impl TlOperator for TlFilter {
    fn name(&self) -> &'static str {
        FILTER
    }

    fn check_params(&self) -> Result<()> {
        TlFilterParams::from_value(&self.params).map(|_| ())
    }

    fn execute(&self, namespace: &TlNamespace) -> Result<TlNamespace> {
        let params = TlFilterParams::from_value(&self.params)?;
        let dataset = input(namespace, &params.dataset_name)?;
        let filtered = Self::apply(&params.dataset_name, dataset, &params.conditions)?;

        log::debug!(
            "operator.filter.applied: rows filtered - dataset={}, input={}, output={}",
            params.dataset_name,
            dataset.len(),
            filtered.len()
        );

        Ok(single_output(params.output_name, filtered))
    }

    fn info(&self) -> TlOperatorInfo {
        filter_info()
    }
}

pub fn filter_info() -> TlOperatorInfo {
    let operators: Vec<&str> = TlFilterOp::ALL.iter().map(TlFilterOp::as_str).collect();
    TlOperatorInfo::new(FILTER, "Filter", "Keep rows matching every condition")
        .param(TlParamSpec::required(
            "dataset_name",
            TlParamType::String,
            "Input dataset name",
        ))
        .param(
            TlParamSpec::required("conditions", TlParamType::Array, "Conditions, combined with AND")
                .with_items(vec![
                    TlParamSpec::required("column", TlParamType::String, "Column name"),
                    TlParamSpec::required("operator", TlParamType::String, "Comparison operator")
                        .with_enum(&operators),
                    TlParamSpec::optional(
                        "value",
                        TlParamType::Any,
                        "Comparison value; a list for in/not_in, a pattern for contains",
                    ),
                ]),
        )
        .with_output_name()
}

#[allow(non_snake_case)]
pub fn filter_factory(params: Value) -> Box<dyn TlOperator + Send + Sync> {
    Box::new(TlFilter::new(params))
}
