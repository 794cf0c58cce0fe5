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

//! # Join Operator
//!
//! Combines two datasets on key columns.
//!
//! ## Output Layout
//!
//! Left columns come first, then right columns. A key pair whose left and
//! right column share a name is emitted once; its value comes from whichever
//! side matched. Any other column name present on both sides is emitted
//! twice, with `suffixes[0]` appended on the left and `suffixes[1]` on the
//! right.
//!
//! ## Row Order
//!
//! - `inner` / `left`: left row order, matches in right row order
//! - `right`: right row order, matches in left row order
//! - `outer`: the left join, followed by unmatched right rows
//! - `cross`: every left row paired with every right row, left-major
//!
//! Keys compare with numeric-aware equality, and null keys match each other.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::dataset::{TlDataset, TlNamespace, TlRow};
use crate::errors::{Result, TlError};
use crate::operator::{TlOperator, TlOperatorInfo, TlParamSpec, TlParamType};
use crate::operators::{input, single_output};
use crate::params::TlParamBag;
use crate::value::key_of;

pub const JOIN: &str = "join";

/// Supported join strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlJoinType {
    Inner,
    Left,
    Right,
    Outer,
    Cross,
}

impl TlJoinType {
    pub const NAMES: [&'static str; 5] = ["inner", "left", "right", "outer", "cross"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "inner" => Some(TlJoinType::Inner),
            "left" => Some(TlJoinType::Left),
            "right" => Some(TlJoinType::Right),
            "outer" => Some(TlJoinType::Outer),
            "cross" => Some(TlJoinType::Cross),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TlJoinType::Inner => "inner",
            TlJoinType::Left => "left",
            TlJoinType::Right => "right",
            TlJoinType::Outer => "outer",
            TlJoinType::Cross => "cross",
        }
    }
}

impl fmt::Display for TlJoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed parameters of [`TlJoin`]. For cross joins both key lists are empty.
#[derive(Clone, Debug, PartialEq)]
pub struct TlJoinParams {
    pub left_dataset: String,
    pub right_dataset: String,
    pub join_type: TlJoinType,
    pub left_on: Vec<String>,
    pub right_on: Vec<String>,
    pub suffixes: (String, String),
    pub output_name: String,
}

impl TlJoinParams {
    pub fn from_value(params: &Value) -> Result<Self> {
        let bag = TlParamBag::parse(JOIN, params)?;
        let left_dataset = bag.required_str("left_dataset")?;
        let right_dataset = bag.required_str("right_dataset")?;
        let type_name = bag.required_str("join_type")?;
        let join_type = TlJoinType::parse(&type_name)
            .ok_or_else(|| TlError::UnsupportedJoinType(type_name.clone()))?;

        let (left_on, right_on) = if join_type == TlJoinType::Cross {
            (Vec::new(), Vec::new())
        } else {
            Self::keys(&bag)?
        };

        let suffixes = match bag.get("suffixes") {
            None | Some(Value::Null) => ("_x".to_string(), "_y".to_string()),
            Some(_) => {
                let list = bag.string_list("suffixes")?;
                match list.as_slice() {
                    [left, right] => (left.clone(), right.clone()),
                    _ => return Err(bag.error("'suffixes' must hold exactly two strings")),
                }
            }
        };

        let output_name = bag.output_name(|| format!("{left_dataset}_{right_dataset}_joined"))?;
        Ok(TlJoinParams {
            left_dataset,
            right_dataset,
            join_type,
            left_on,
            right_on,
            suffixes,
            output_name,
        })
    }

    fn keys(bag: &TlParamBag<'_>) -> Result<(Vec<String>, Vec<String>)> {
        if let Some(on) = bag.string_or_list("on")? {
            if on.is_empty() {
                return Err(bag.error("'on' must name at least one column"));
            }
            return Ok((on.clone(), on));
        }

        match (bag.string_or_list("left_on")?, bag.string_or_list("right_on")?) {
            (None, None) => Err(bag.error("join condition required: 'on' or 'left_on'/'right_on'")),
            (Some(_), None) => Err(bag.error("'left_on' requires 'right_on'")),
            (None, Some(_)) => Err(bag.error("'right_on' requires 'left_on'")),
            (Some(left), Some(right)) if left.len() != right.len() => Err(bag.error(format!(
                "'left_on' and 'right_on' must have the same length ({} vs {})",
                left.len(),
                right.len()
            ))),
            (Some(left), Some(_)) if left.is_empty() => {
                Err(bag.error("'left_on' must name at least one column"))
            }
            (Some(left), Some(right)) => Ok((left, right)),
        }
    }
}

/// Where an output column takes its value from.
#[derive(Clone, Copy, Debug)]
enum TlColumnSource {
    Left(usize),
    Right(usize),
    /// Shared key column: left value when the left side matched, else right.
    Key(usize, usize),
}

/// Two-dataset join.
#[derive(Debug)]
pub struct TlJoin {
    params: Value,
}

impl TlJoin {
    #[allow(non_snake_case)]
    pub fn new(params: Value) -> Self {
        Self { params }
    }

    fn apply(params: &TlJoinParams, left: &TlDataset, right: &TlDataset) -> Result<TlDataset> {
        let left_keys = params
            .left_on
            .iter()
            .map(|column| left.require_column(&params.left_dataset, column))
            .collect::<Result<Vec<_>>>()?;
        let right_keys = params
            .right_on
            .iter()
            .map(|column| right.require_column(&params.right_dataset, column))
            .collect::<Result<Vec<_>>>()?;

        let (columns, sources) = layout(params, left, right, &left_keys, &right_keys);
        let pairs = match_rows(params.join_type, left, right, &left_keys, &right_keys);

        let rows: Vec<TlRow> = pairs
            .into_iter()
            .map(|(l, r)| {
                sources
                    .iter()
                    .map(|source| match *source {
                        TlColumnSource::Left(i) => cell(left, l, i),
                        TlColumnSource::Right(i) => cell(right, r, i),
                        TlColumnSource::Key(li, ri) => match l {
                            Some(_) => cell(left, l, li),
                            None => cell(right, r, ri),
                        },
                    })
                    .collect()
            })
            .collect();

        TlDataset::from_rows(columns, rows).map_err(|err| TlError::operator(JOIN, err.to_string()))
    }
}

fn cell(dataset: &TlDataset, row: Option<usize>, column: usize) -> Value {
    row.map_or(Value::Null, |r| dataset.rows()[r][column].clone())
}

fn layout(
    params: &TlJoinParams,
    left: &TlDataset,
    right: &TlDataset,
    left_keys: &[usize],
    right_keys: &[usize],
) -> (Vec<String>, Vec<TlColumnSource>) {
    // Key pairs with the same name on both sides collapse into one column.
    let shared_keys: Vec<(usize, usize)> = left_keys
        .iter()
        .zip(right_keys)
        .filter(|&(&l, &r)| left.columns()[l] == right.columns()[r])
        .map(|(&l, &r)| (l, r))
        .collect();

    let (left_suffix, right_suffix) = &params.suffixes;
    let mut columns = Vec::new();
    let mut sources = Vec::new();

    for (index, name) in left.columns().iter().enumerate() {
        if let Some(&(_, r)) = shared_keys.iter().find(|(l, _)| *l == index) {
            columns.push(name.clone());
            sources.push(TlColumnSource::Key(index, r));
        } else if right.has_column(name) {
            columns.push(format!("{name}{left_suffix}"));
            sources.push(TlColumnSource::Left(index));
        } else {
            columns.push(name.clone());
            sources.push(TlColumnSource::Left(index));
        }
    }

    for (index, name) in right.columns().iter().enumerate() {
        if shared_keys.iter().any(|(_, r)| *r == index) {
            continue;
        }
        if left.has_column(name) {
            columns.push(format!("{name}{right_suffix}"));
        } else {
            columns.push(name.clone());
        }
        sources.push(TlColumnSource::Right(index));
    }

    (columns, sources)
}

fn row_key(row: &TlRow, keys: &[usize]) -> Vec<String> {
    keys.iter().map(|&i| key_of(&row[i])).collect()
}

fn index_rows(dataset: &TlDataset, keys: &[usize]) -> HashMap<Vec<String>, Vec<usize>> {
    let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
    for (position, row) in dataset.rows().iter().enumerate() {
        index.entry(row_key(row, keys)).or_default().push(position);
    }
    index
}

/// Produces `(left row, right row)` pairs in output order.
fn match_rows(
    join_type: TlJoinType,
    left: &TlDataset,
    right: &TlDataset,
    left_keys: &[usize],
    right_keys: &[usize],
) -> Vec<(Option<usize>, Option<usize>)> {
    let mut pairs = Vec::new();

    match join_type {
        TlJoinType::Cross => {
            for l in 0..left.len() {
                for r in 0..right.len() {
                    pairs.push((Some(l), Some(r)));
                }
            }
        }
        TlJoinType::Right => {
            let left_index = index_rows(left, left_keys);
            for (r, row) in right.rows().iter().enumerate() {
                match left_index.get(&row_key(row, right_keys)) {
                    Some(matches) => pairs.extend(matches.iter().map(|&l| (Some(l), Some(r)))),
                    None => pairs.push((None, Some(r))),
                }
            }
        }
        TlJoinType::Inner | TlJoinType::Left | TlJoinType::Outer => {
            let right_index = index_rows(right, right_keys);
            let mut right_matched = vec![false; right.len()];
            for (l, row) in left.rows().iter().enumerate() {
                match right_index.get(&row_key(row, left_keys)) {
                    Some(matches) => {
                        for &r in matches {
                            right_matched[r] = true;
                            pairs.push((Some(l), Some(r)));
                        }
                    }
                    None if join_type != TlJoinType::Inner => pairs.push((Some(l), None)),
                    None => {}
                }
            }
            if join_type == TlJoinType::Outer {
                pairs.extend(
                    right_matched
                        .iter()
                        .enumerate()
                        .filter(|(_, matched)| !**matched)
                        .map(|(r, _)| (None, Some(r))),
                );
            }
        }
    }

    pairs
}

impl TlOperator for TlJoin {
    fn name(&self) -> &'static str {
        JOIN
    }

    fn check_params(&self) -> Result<()> {
        TlJoinParams::from_value(&self.params).map(|_| ())
    }

    fn execute(&self, namespace: &TlNamespace) -> Result<TlNamespace> {
        let params = TlJoinParams::from_value(&self.params)?;
        let left = input(namespace, &params.left_dataset)?;
        let right = input(namespace, &params.right_dataset)?;
        let joined = Self::apply(&params, left, right)?;

        log::debug!(
            "operator.join.applied: datasets joined - type={}, left={}, right={}, rows={}",
            params.join_type,
            params.left_dataset,
            params.right_dataset,
            joined.len()
        );

        Ok(single_output(params.output_name, joined))
    }

    fn info(&self) -> TlOperatorInfo {
        join_info()
    }
}

pub fn join_info() -> TlOperatorInfo {
    TlOperatorInfo::new(JOIN, "Join", "Join two datasets on key columns")
        .param(TlParamSpec::required(
            "left_dataset",
            TlParamType::String,
            "Left dataset name",
        ))
        .param(TlParamSpec::required(
            "right_dataset",
            TlParamType::String,
            "Right dataset name",
        ))
        .param(
            TlParamSpec::required("join_type", TlParamType::String, "Join type")
                .with_enum(&TlJoinType::NAMES),
        )
        .param(TlParamSpec::optional(
            "on",
            TlParamType::StringOrArray,
            "Key columns present on both sides",
        ))
        .param(TlParamSpec::optional(
            "left_on",
            TlParamType::StringOrArray,
            "Left key columns",
        ))
        .param(TlParamSpec::optional(
            "right_on",
            TlParamType::StringOrArray,
            "Right key columns",
        ))
        .param(
            TlParamSpec::optional("suffixes", TlParamType::Array, "Suffixes for overlapping columns")
                .with_default(serde_json::json!(["_x", "_y"])),
        )
        .with_output_name()
}

#[allow(non_snake_case)]
pub fn join_factory(params: Value) -> Box<dyn TlOperator + Send + Sync> {
    Box::new(TlJoin::new(params))
}
