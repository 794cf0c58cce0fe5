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
use touchlink::dataset::{TlColumnType, TlDataset};
use touchlink::errors::TlError;

#[test]
fn from_records_keeps_first_seen_column_order() {
    let dataset = TlDataset::from_records(&[
        json!({"b": 1, "a": "x"}),
        json!({"a": "y", "c": true}),
    ])
    .unwrap();

    assert_eq!(dataset.columns(), &["b", "a", "c"]);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.value(1, "b"), Some(&Value::Null));
    assert_eq!(dataset.value(0, "c"), Some(&Value::Null));
    assert_eq!(dataset.value(1, "c"), Some(&json!(true)));
}

#[test]
fn from_records_rejects_non_objects() {
    let err = TlDataset::from_records(&[json!({"a": 1}), json!([1, 2])]).unwrap_err();
    assert!(matches!(err, TlError::Validation { .. }));
}

#[test]
fn to_records_renders_objects_by_column() {
    let dataset = TlDataset::from_rows(
        vec!["id".into(), "name".into()],
        vec![vec![json!(1), json!("a")], vec![json!(2), Value::Null]],
    )
    .unwrap();

    assert_eq!(
        dataset.to_records(),
        vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": null})]
    );
}

#[test]
fn from_rows_rejects_duplicate_columns() {
    let err = TlDataset::from_rows(vec!["a".into(), "a".into()], Vec::new()).unwrap_err();
    assert!(err.to_string().contains("duplicate column name 'a'"));
}

#[test]
fn schema_infers_each_column() {
    let dataset = TlDataset::from_records(&[
        json!({"i": 1, "f": 1, "s": "x", "m": 1, "n": null, "j": {"k": 1}}),
        json!({"i": 2, "f": 0.5, "s": null, "m": "one", "n": null, "j": [1]}),
    ])
    .unwrap();

    let schema = dataset.schema();
    let kinds: Vec<TlColumnType> = schema.iter().map(|(_, kind)| *kind).collect();
    assert_eq!(
        kinds,
        vec![
            TlColumnType::Integer,
            TlColumnType::Float,
            TlColumnType::String,
            TlColumnType::Mixed,
            TlColumnType::Null,
            TlColumnType::Json,
        ]
    );
    assert_eq!(TlColumnType::Float.to_string(), "float");
}

#[test]
fn projections_copy_without_touching_the_source() {
    let dataset = TlDataset::from_records(&[
        json!({"a": 1, "b": 2, "c": 3}),
        json!({"a": 4, "b": 5, "c": 6}),
        json!({"a": 7, "b": 8, "c": 9}),
    ])
    .unwrap();

    let head = dataset.head(2);
    assert_eq!(head.len(), 2);

    let picked = dataset.take_columns(&[2, 0]).take_rows(&[2, 0]);
    assert_eq!(picked.columns(), &["c", "a"]);
    assert_eq!(picked.to_records(), vec![json!({"c": 9, "a": 7}), json!({"c": 3, "a": 1})]);

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.columns().len(), 3);
}

#[test]
fn push_row_checks_width() {
    let mut dataset = TlDataset::new(vec!["a".into(), "b".into()]);
    dataset.push_row(vec![json!(1), json!(2)]).unwrap();
    assert!(dataset.push_row(vec![json!(1)]).is_err());
    assert_eq!(dataset.len(), 1);
}

#[test]
fn require_column_names_the_dataset() {
    let dataset = TlDataset::from_records(&[json!({"a": 1})]).unwrap();
    match dataset.require_column("orders", "missing").unwrap_err() {
        TlError::ColumnNotFound { dataset, column } => {
            assert_eq!(dataset, "orders");
            assert_eq!(column, "missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
