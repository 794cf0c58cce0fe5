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

//! # Aggregate Operator
//!
//! Groups a dataset by zero or more key columns and computes one value per
//! aggregation for each group. Output columns are the group keys followed by
//! the aggregation aliases (`{column}_{function}` unless `alias` is given).
//!
//! ## Grouping Rules
//!
//! - Rows with a null in any key column are dropped.
//! - Groups are emitted in ascending key order.
//! - With an empty `group_by` the whole dataset is one group and the result
//!   has exactly one row, even when the input is empty.
//!
//! ## Functions
//!
//! | Function | Result |
//! |---|---|
//! | `sum` | sum of non-null numbers, `0` when there are none |
//! | `avg` / `mean` | arithmetic mean, null when there are no numbers |
//! | `median` | middle value (mean of the two middle values for even counts) |
//! | `std` / `var` | sample deviation / variance (n-1), null below two values |
//! | `min` / `max` | smallest / largest non-null cell |
//! | `count` | number of non-null cells |
//! | `distinct_count` | number of distinct non-null cells |
//! | `first` / `last` | first / last non-null cell in row order |

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde_json::Value;

use crate::dataset::{TlDataset, TlNamespace, TlRow};
use crate::errors::{Result, TlError};
use crate::operator::{TlOperator, TlOperatorInfo, TlParamSpec, TlParamType};
use crate::operators::{input, single_output};
use crate::params::TlParamBag;
use crate::value::{as_number, key_of, number_value, total_cmp};

pub const AGGREGATE: &str = "aggregate";

/// Aggregation functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlAggFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    DistinctCount,
    Median,
    Std,
    Var,
    First,
    Last,
}

impl TlAggFunction {
    /// Function names accepted in parameter bags. `mean` is accepted as an
    /// alias of `avg` but not advertised.
    pub const NAMES: [&'static str; 11] = [
        "sum",
        "avg",
        "min",
        "max",
        "count",
        "distinct_count",
        "median",
        "std",
        "var",
        "first",
        "last",
    ];

    pub fn parse(name: &str) -> Option<Self> {
        let function = match name {
            "sum" => TlAggFunction::Sum,
            "avg" | "mean" => TlAggFunction::Avg,
            "min" => TlAggFunction::Min,
            "max" => TlAggFunction::Max,
            "count" => TlAggFunction::Count,
            "distinct_count" => TlAggFunction::DistinctCount,
            "median" => TlAggFunction::Median,
            "std" => TlAggFunction::Std,
            "var" => TlAggFunction::Var,
            "first" => TlAggFunction::First,
            "last" => TlAggFunction::Last,
            _ => return None,
        };
        Some(function)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TlAggFunction::Sum => "sum",
            TlAggFunction::Avg => "avg",
            TlAggFunction::Min => "min",
            TlAggFunction::Max => "max",
            TlAggFunction::Count => "count",
            TlAggFunction::DistinctCount => "distinct_count",
            TlAggFunction::Median => "median",
            TlAggFunction::Std => "std",
            TlAggFunction::Var => "var",
            TlAggFunction::First => "first",
            TlAggFunction::Last => "last",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            TlAggFunction::Sum
                | TlAggFunction::Avg
                | TlAggFunction::Median
                | TlAggFunction::Std
                | TlAggFunction::Var
        )
    }

    /// Reduces the cells of one group to a single value.
    pub fn evaluate(&self, column: &str, cells: &[&Value]) -> Result<Value> {
        let present: Vec<&Value> = cells.iter().copied().filter(|v| !v.is_null()).collect();

        if self.is_numeric() {
            let numbers = numeric_cells(*self, column, &present)?;
            return Ok(match self {
                TlAggFunction::Sum => sum(&present, &numbers),
                TlAggFunction::Avg => mean(&numbers).map_or(Value::Null, number_value),
                TlAggFunction::Median => median(numbers).map_or(Value::Null, number_value),
                TlAggFunction::Var => variance(&numbers).map_or(Value::Null, number_value),
                TlAggFunction::Std => variance(&numbers)
                    .map_or(Value::Null, |var| number_value(var.sqrt())),
                _ => Value::Null,
            });
        }

        Ok(match self {
            TlAggFunction::Min => present
                .iter()
                .min_by(|a, b| total_cmp(a, b))
                .map_or(Value::Null, |v| (*v).clone()),
            TlAggFunction::Max => present
                .iter()
                .max_by(|a, b| total_cmp(a, b))
                .map_or(Value::Null, |v| (*v).clone()),
            TlAggFunction::Count => Value::from(present.len() as u64),
            TlAggFunction::DistinctCount => {
                let distinct: HashSet<String> = present.iter().map(|v| key_of(v)).collect();
                Value::from(distinct.len() as u64)
            }
            TlAggFunction::First => present.first().map_or(Value::Null, |v| (*v).clone()),
            TlAggFunction::Last => present.last().map_or(Value::Null, |v| (*v).clone()),
            _ => Value::Null,
        })
    }
}

impl fmt::Display for TlAggFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn numeric_cells(function: TlAggFunction, column: &str, cells: &[&Value]) -> Result<Vec<f64>> {
    cells
        .iter()
        .map(|cell| {
            as_number(cell).ok_or_else(|| {
                TlError::operator(
                    AGGREGATE,
                    format!(
                        "function '{function}' requires numeric values in column '{column}', found {cell}"
                    ),
                )
            })
        })
        .collect()
}

fn sum(cells: &[&Value], numbers: &[f64]) -> Value {
    let integers: Option<Vec<i64>> = cells.iter().map(|cell| cell.as_i64()).collect();
    if let Some(total) = integers.and_then(|ints| {
        ints.into_iter()
            .try_fold(0i64, |acc, value| acc.checked_add(value))
    }) {
        return Value::from(total);
    }
    number_value(numbers.iter().sum())
}

fn mean(numbers: &[f64]) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

fn median(mut numbers: Vec<f64>) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    numbers.sort_by(f64::total_cmp);
    let mid = numbers.len() / 2;
    if numbers.len() % 2 == 1 {
        Some(numbers[mid])
    } else {
        Some((numbers[mid - 1] + numbers[mid]) / 2.0)
    }
}

fn variance(numbers: &[f64]) -> Option<f64> {
    if numbers.len() < 2 {
        return None;
    }
    let mean = mean(numbers)?;
    let squares: f64 = numbers.iter().map(|x| (x - mean).powi(2)).sum();
    Some(squares / (numbers.len() - 1) as f64)
}

/// One `{column, function, alias}` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlAggregation {
    pub column: String,
    pub function: TlAggFunction,
    pub alias: String,
}

/// Typed parameters of [`TlAggregate`].
#[derive(Clone, Debug, PartialEq)]
pub struct TlAggregateParams {
    pub dataset_name: String,
    pub group_by: Vec<String>,
    pub aggregations: Vec<TlAggregation>,
    pub output_name: String,
}

impl TlAggregateParams {
    pub fn from_value(params: &Value) -> Result<Self> {
        let bag = TlParamBag::parse(AGGREGATE, params)?;
        let dataset_name = bag.required_str("dataset_name")?;
        let group_by = bag.string_list("group_by")?;

        let items = bag.required_array("aggregations")?;
        if items.is_empty() {
            return Err(bag.error("'aggregations' must not be empty"));
        }
        let aggregations = items
            .iter()
            .map(|item| {
                let entry = bag.item("aggregations", item)?;
                let column = entry.required_str("column")?;
                let function_name = entry.required_str("function")?;
                let function = TlAggFunction::parse(&function_name)
                    .ok_or_else(|| TlError::UnsupportedAggregationFunction(function_name.clone()))?;
                let alias = entry
                    .optional_str("alias")?
                    .unwrap_or_else(|| format!("{column}_{function_name}"));
                Ok(TlAggregation {
                    column,
                    function,
                    alias,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        for name in group_by
            .iter()
            .chain(aggregations.iter().map(|agg| &agg.alias))
        {
            if !seen.insert(name.as_str()) {
                return Err(bag.error(format!("duplicate output column '{name}'")));
            }
        }

        let output_name = bag.output_name(|| format!("{dataset_name}_aggregated"))?;
        Ok(TlAggregateParams {
            dataset_name,
            group_by,
            aggregations,
            output_name,
        })
    }
}

/// Group-by aggregation.
#[derive(Debug)]
pub struct TlAggregate {
    params: Value,
}

impl TlAggregate {
    #[allow(non_snake_case)]
    pub fn new(params: Value) -> Self {
        Self { params }
    }

    fn apply(params: &TlAggregateParams, dataset: &TlDataset) -> Result<TlDataset> {
        let name = &params.dataset_name;
        let key_indices = params
            .group_by
            .iter()
            .map(|column| dataset.require_column(name, column))
            .collect::<Result<Vec<_>>>()?;
        let value_indices = params
            .aggregations
            .iter()
            .map(|agg| dataset.require_column(name, &agg.column))
            .collect::<Result<Vec<_>>>()?;

        let groups = group_rows(dataset, &key_indices);

        let mut rows: Vec<TlRow> = Vec::with_capacity(groups.len());
        for (keys, members) in groups {
            let mut row = keys;
            for (agg, &index) in params.aggregations.iter().zip(&value_indices) {
                let cells: Vec<&Value> = members
                    .iter()
                    .map(|&position| &dataset.rows()[position][index])
                    .collect();
                row.push(agg.function.evaluate(&agg.column, &cells)?);
            }
            rows.push(row);
        }

        let columns = params
            .group_by
            .iter()
            .cloned()
            .chain(params.aggregations.iter().map(|agg| agg.alias.clone()))
            .collect();
        TlDataset::from_rows(columns, rows)
    }
}

/// Partitions row positions by key, dropping rows with a null key, and
/// returns the groups in ascending key order.
fn group_rows(dataset: &TlDataset, key_indices: &[usize]) -> Vec<(Vec<Value>, Vec<usize>)> {
    if key_indices.is_empty() {
        return vec![(Vec::new(), (0..dataset.len()).collect())];
    }

    let mut lookup: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<Value>, Vec<usize>)> = Vec::new();
    for (position, row) in dataset.rows().iter().enumerate() {
        let keys: Vec<&Value> = key_indices.iter().map(|&i| &row[i]).collect();
        if keys.iter().any(|key| key.is_null()) {
            continue;
        }
        let hashed: Vec<String> = keys.iter().map(|key| key_of(key)).collect();
        match lookup.get(&hashed) {
            Some(&group) => groups[group].1.push(position),
            None => {
                lookup.insert(hashed, groups.len());
                groups.push((keys.into_iter().cloned().collect(), vec![position]));
            }
        }
    }

    groups.sort_by(|(a, _), (b, _)| {
        a.iter()
            .zip(b)
            .map(|(x, y)| total_cmp(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    groups
}

impl TlOperator for TlAggregate {
    fn name(&self) -> &'static str {
        AGGREGATE
    }

    fn check_params(&self) -> Result<()> {
        TlAggregateParams::from_value(&self.params).map(|_| ())
    }

    fn execute(&self, namespace: &TlNamespace) -> Result<TlNamespace> {
        let params = TlAggregateParams::from_value(&self.params)?;
        let dataset = input(namespace, &params.dataset_name)?;
        let aggregated = Self::apply(&params, dataset)?;
        Ok(single_output(params.output_name, aggregated))
    }

    fn info(&self) -> TlOperatorInfo {
        aggregate_info()
    }
}

pub fn aggregate_info() -> TlOperatorInfo {
    TlOperatorInfo::new(AGGREGATE, "Aggregate", "Group rows and compute aggregates")
        .param(TlParamSpec::required(
            "dataset_name",
            TlParamType::String,
            "Input dataset name",
        ))
        .param(TlParamSpec::required(
            "group_by",
            TlParamType::Array,
            "Grouping columns; empty aggregates the whole dataset",
        ))
        .param(
            TlParamSpec::required("aggregations", TlParamType::Array, "Aggregations to compute")
                .with_items(vec![
                    TlParamSpec::required("column", TlParamType::String, "Column name"),
                    TlParamSpec::required("function", TlParamType::String, "Aggregation function")
                        .with_enum(&TlAggFunction::NAMES),
                    TlParamSpec::optional("alias", TlParamType::String, "Result column name"),
                ]),
        )
        .with_output_name()
}

#[allow(non_snake_case)]
pub fn aggregate_factory(params: Value) -> Box<dyn TlOperator + Send + Sync> {
    Box::new(TlAggregate::new(params))
}
