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

//! # Cell Value Semantics
//!
//! Dataset cells are `serde_json::Value`s. This module fixes how cells are
//! compared, ordered, coerced to strings and hashed into join/group keys, so
//! every operator agrees on the same rules:
//!
//! - integers and floats compare numerically (`1 == 1.0`)
//! - ordering across types ranks booleans, then numbers, then strings, then
//!   arrays and objects; nulls are handled by callers (sorted last)
//! - string coercion renders strings verbatim and everything else as JSON

use std::cmp::Ordering;

use serde_json::Value;

/// Numeric view of a cell, if it holds a number.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}

/// Equality used by filters and joins. Null is never equal to anything here;
/// callers that want null-matches-null check for it explicitly.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(_), Value::Number(_)) => as_number(left) == as_number(right),
        _ => left == right,
    }
}

/// Partial comparison for `gt`/`ge`/`lt`/`le`: only numbers against numbers
/// and strings against strings are comparable.
pub fn compare_comparable(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => as_number(left)?.partial_cmp(&as_number(right)?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over non-null cells, used by sort, min/max and group ordering.
pub fn total_cmp(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(_), Value::Number(_)) => {
            let a = as_number(left).unwrap_or(f64::NAN);
            let b = as_number(right).unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            left.to_string().cmp(&right.to_string())
        }
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

/// Total order that places nulls after every other value.
pub fn nulls_last_cmp(left: &Value, right: &Value) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => total_cmp(left, right),
    }
}

/// String coercion applied by the text filter operators and CSV export.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Hashable key for a cell. Numerically equal numbers share a key and null
/// has its own key, so nulls group and join with each other.
pub fn key_of(value: &Value) -> String {
    match value {
        Value::Null => "n:".to_string(),
        Value::Bool(flag) => format!("b:{flag}"),
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(int), _) => format!("d:{int}"),
            (None, Some(float)) if float.fract() == 0.0 && float.abs() < 9.0e15 => {
                format!("d:{}", float as i64)
            }
            (None, Some(float)) => format!("f:{float}"),
            (None, None) => format!("f:{number}"),
        },
        Value::String(text) => format!("s:{text}"),
        other => format!("j:{other}"),
    }
}

/// Builds a JSON number from an `f64`, mapping non-finite results to null.
pub fn number_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
