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
use touchlink::operators::column_select::{TlColumnSelect, TlColumnSelectParams};

fn namespace() -> TlNamespace {
    let mut namespace = TlNamespace::new();
    namespace.insert(
        "people".to_string(),
        TlDataset::from_records(&[
            json!({"id": 1, "name": "ann", "age": 31, "city": "Oslo"}),
            json!({"id": 2, "name": "bob", "age": null, "city": "Rome"}),
        ])
        .unwrap(),
    );
    namespace
}

fn select(params: Value) -> TlColumnSelect {
    TlColumnSelect::new(params)
}

#[test]
fn projects_in_requested_order() {
    let operator = select(json!({"dataset_name": "people", "columns": ["city", "id"]}));
    let delta = operator.execute(&namespace()).unwrap();

    assert_eq!(delta.len(), 1);
    let output = &delta["people_selected"];
    assert_eq!(output.columns(), &["city", "id"]);
    assert_eq!(
        output.to_records(),
        vec![json!({"city": "Oslo", "id": 1}), json!({"city": "Rome", "id": 2})]
    );
}

#[test]
fn output_name_overrides_default() {
    let operator = select(json!({
        "dataset_name": "people",
        "columns": ["name"],
        "output_name": "names"
    }));
    let delta = operator.execute(&namespace()).unwrap();
    assert!(delta.contains_key("names"));
    assert!(!delta.contains_key("people_selected"));
}

#[test]
fn null_output_name_falls_back_to_default() {
    let params = TlColumnSelectParams::from_value(&json!({
        "dataset_name": "people",
        "columns": [],
        "output_name": null
    }))
    .unwrap();
    assert_eq!(params.output_name, "people_selected");
    assert!(params.columns.is_empty());
}

#[test]
fn missing_columns_are_all_reported() {
    let operator = select(json!({"dataset_name": "people", "columns": ["id", "zip", "phone"]}));
    match operator.execute(&namespace()).unwrap_err() {
        TlError::ColumnNotFound { dataset, column } => {
            assert_eq!(dataset, "people");
            assert_eq!(column, "zip, phone");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_dataset_is_reported() {
    let operator = select(json!({"dataset_name": "ghosts", "columns": ["id"]}));
    assert!(matches!(
        operator.execute(&namespace()).unwrap_err(),
        TlError::DatasetNotFound { dataset } if dataset == "ghosts"
    ));
}

#[test]
fn shape_checks() {
    assert!(select(json!({"dataset_name": "people", "columns": ["id"]})).validate_params());
    assert!(!select(json!({"columns": ["id"]})).validate_params());
    assert!(!select(json!({"dataset_name": "people", "columns": "id"})).validate_params());
    assert!(!select(json!({"dataset_name": "people", "columns": [1]})).validate_params());
    assert!(!select(json!("people")).validate_params());
}

#[test]
fn input_is_left_untouched() {
    let namespace = namespace();
    select(json!({"dataset_name": "people", "columns": ["id"]}))
        .execute(&namespace)
        .unwrap();
    assert_eq!(namespace["people"].columns().len(), 4);
}
