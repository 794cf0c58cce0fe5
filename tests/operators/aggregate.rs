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


use serde_json::{json, Value};
use touchlink::dataset::{TlDataset, TlNamespace};
use touchlink::errors::TlError;
use touchlink::operator::TlOperator;
use touchlink::operators::aggregate::{TlAggFunction, TlAggregate, TlAggregateParams};

fn namespace() -> TlNamespace {
    let mut namespace = TlNamespace::new();
    namespace.insert(
        "sales".to_string(),
        TlDataset::from_records(&[
            json!({"region": "B", "rep": "x", "amt": 10, "price": 1.5}),
            json!({"region": "A", "rep": "y", "amt": 5, "price": 2.0}),
            json!({"region": "B", "rep": "x", "amt": 7, "price": null}),
            json!({"region": null, "rep": "z", "amt": 100, "price": 9.0}),
            json!({"region": "A", "rep": "z", "amt": 1, "price": 4.0}),
        ])
        .unwrap(),
    );
    namespace
}

fn aggregate(params: Value) -> Vec<Value> {
    let delta = TlAggregate::new(params).execute(&namespace()).unwrap();
    assert_eq!(delta.len(), 1);
    delta.into_values().next().unwrap().to_records()
}

#[test]
fn groups_in_ascending_key_order_and_drop_null_keys() {
    let records = aggregate(json!({
        "dataset_name": "sales",
        "group_by": ["region"],
        "aggregations": [
            {"column": "amt", "function": "sum"},
            {"column": "amt", "function": "count", "alias": "n"}
        ]
    }));
    assert_eq!(
        records,
        vec![
            json!({"region": "A", "amt_sum": 6, "n": 2}),
            json!({"region": "B", "amt_sum": 17, "n": 2}),
        ]
    );
}

#[test]
fn empty_group_by_yields_one_row() {
    let records = aggregate(json!({
        "dataset_name": "sales",
        "group_by": [],
        "aggregations": [
            {"column": "amt", "function": "max"},
            {"column": "rep", "function": "distinct_count"},
            {"column": "price", "function": "avg"}
        ]
    }));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["amt_max"], json!(100));
    assert_eq!(records[0]["rep_distinct_count"], json!(3));
    assert_eq!(records[0]["price_avg"], json!(4.125));
}

#[test]
fn statistical_functions() {
    let records = aggregate(json!({
        "dataset_name": "sales",
        "group_by": ["region"],
        "aggregations": [
            {"column": "price", "function": "mean"},
            {"column": "amt", "function": "median"},
            {"column": "amt", "function": "var"},
            {"column": "price", "function": "std"},
            {"column": "price", "function": "sum"}
        ]
    }));

    let a = &records[0];
    assert_eq!(a["price_mean"], json!(3.0));
    assert_eq!(a["amt_median"], json!(3.0));
    assert_eq!(a["amt_var"], json!(8.0));
    assert_eq!(a["price_sum"], json!(6.0));
    let std = a["price_std"].as_f64().unwrap();
    assert!((std - 2f64.sqrt()).abs() < 1e-12);

    // region B has a single non-null price
    let b = &records[1];
    assert_eq!(b["price_std"], Value::Null);
    assert_eq!(b["price_mean"], json!(1.5));
    assert_eq!(b["amt_var"], json!(4.5));
}

#[test]
fn first_last_min_skip_nulls() {
    let records = aggregate(json!({
        "dataset_name": "sales",
        "group_by": ["rep"],
        "aggregations": [
            {"column": "price", "function": "first"},
            {"column": "price", "function": "last"},
            {"column": "region", "function": "min"}
        ]
    }));
    assert_eq!(records[0]["rep"], json!("x"));
    assert_eq!(records[0]["price_first"], json!(1.5));
    assert_eq!(records[0]["price_last"], json!(1.5));
    assert_eq!(records[2]["rep"], json!("z"));
    assert_eq!(records[2]["region_min"], json!("A"));
}

#[test]
fn numeric_function_on_text_fails() {
    let params = json!({
        "dataset_name": "sales",
        "group_by": [],
        "aggregations": [{"column": "rep", "function": "sum"}]
    });
    assert!(matches!(
        TlAggregate::new(params).execute(&namespace()).unwrap_err(),
        TlError::Operator { .. }
    ));
}

#[test]
fn unsupported_function() {
    let params = json!({
        "dataset_name": "sales",
        "group_by": [],
        "aggregations": [{"column": "amt", "function": "mode"}]
    });
    let operator = TlAggregate::new(params);
    assert!(!operator.validate_params());
    assert!(matches!(
        operator.execute(&namespace()).unwrap_err(),
        TlError::UnsupportedAggregationFunction(name) if name == "mode"
    ));
}

#[test]
fn duplicate_output_names_are_rejected() {
    let err = TlAggregateParams::from_value(&json!({
        "dataset_name": "sales",
        "group_by": ["region"],
        "aggregations": [{"column": "amt", "function": "sum", "alias": "region"}]
    }))
    .unwrap_err();
    assert!(matches!(err, TlError::ParamValidation { .. }));
}

#[test]
fn aggregations_must_not_be_empty() {
    let operator = TlAggregate::new(json!({
        "dataset_name": "sales",
        "group_by": ["region"],
        "aggregations": []
    }));
    assert!(!operator.validate_params());
}

#[test]
fn unknown_group_column() {
    let params = json!({
        "dataset_name": "sales",
        "group_by": ["country"],
        "aggregations": [{"column": "amt", "function": "sum"}]
    });
    assert!(matches!(
        TlAggregate::new(params).execute(&namespace()).unwrap_err(),
        TlError::ColumnNotFound { column, .. } if column == "country"
    ));
}

#[test]
fn function_names() {
    for name in TlAggFunction::NAMES {
        assert_eq!(TlAggFunction::parse(name).unwrap().as_str(), name);
    }
    assert_eq!(TlAggFunction::parse("mean"), Some(TlAggFunction::Avg));
}
