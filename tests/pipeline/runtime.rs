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
use touchlink::operator::{TlOperator, TlOperatorInfo};
use touchlink::pipeline::{TlPipeline, TlPipelineStep};
use touchlink::registry::{TlOperatorEntry, TlOperatorRegistry};

fn t1() -> TlNamespace {
    let mut namespace = TlNamespace::new();
    namespace.insert(
        "t1".to_string(),
        TlDataset::from_records(&[
            json!({"x": 1, "y": 10}),
            json!({"x": 2, "y": 20}),
            json!({"x": 3, "y": 30}),
        ])
        .unwrap(),
    );
    namespace
}

#[test]
fn add_step_rejects_invalid_params_without_appending() {
    let mut pipeline = TlPipeline::new(Some("p1"), None);
    pipeline
        .add_step("filter", json!({"dataset_name": "t1", "conditions": []}))
        .unwrap();

    let err = pipeline
        .add_step("sort", json!({"dataset_name": "t1"}))
        .unwrap_err();
    assert!(matches!(err, TlError::ParamValidation { ref operator, .. } if operator == "sort"));
    assert_eq!(pipeline.len(), 1);

    let err = pipeline.add_step("pivot", json!({})).unwrap_err();
    assert!(matches!(err, TlError::UnknownOperator { .. }));
    assert_eq!(pipeline.len(), 1);
}

#[test]
fn unsupported_enum_values_surface_their_own_errors() {
    let mut pipeline = TlPipeline::new(None, None);
    let err = pipeline
        .add_step(
            "join",
            json!({"left_dataset": "a", "right_dataset": "b", "join_type": "anti", "on": "id"}),
        )
        .unwrap_err();
    assert!(matches!(err, TlError::UnsupportedJoinType(_)));
    assert!(pipeline.is_empty());
}

#[test]
fn document_round_trip_keeps_step_order() {
    let mut pipeline = TlPipeline::new(Some("ordered"), Some("three steps"));
    pipeline
        .add_step("filter", json!({"dataset_name": "t1", "conditions": []}))
        .unwrap()
        .add_step("sort", json!({"dataset_name": "t1_filtered", "sort_by": [{"column": "y"}]}))
        .unwrap()
        .add_step("column_select", json!({"dataset_name": "t1_filtered_sorted", "columns": ["x"]}))
        .unwrap();

    let restored = TlPipeline::from_dict(&pipeline.to_dict()).unwrap();
    assert_eq!(restored.id(), pipeline.id());
    assert_eq!(restored.name(), "ordered");
    assert_eq!(restored.description(), Some("three steps"));
    assert_eq!(restored.steps(), pipeline.steps());

    let kinds: Vec<&str> = restored
        .steps()
        .iter()
        .map(|step| step.operator_type.as_str())
        .collect();
    assert_eq!(kinds, vec!["filter", "sort", "column_select"]);

    let reparsed = TlPipeline::from_json(&pipeline.to_json().unwrap()).unwrap();
    assert_eq!(reparsed.steps(), pipeline.steps());
}

#[test]
fn filter_then_sort_flows_through_outputs() {
    let mut pipeline = TlPipeline::new(None, None);
    pipeline
        .add_step(
            "filter",
            json!({
                "dataset_name": "t1",
                "conditions": [{"column": "x", "operator": "gt", "value": 1}],
                "output_name": "t1f"
            }),
        )
        .unwrap()
        .add_step(
            "sort",
            json!({
                "dataset_name": "t1f",
                "sort_by": [{"column": "y", "ascending": false}],
                "output_name": "t1s"
            }),
        )
        .unwrap();

    let input = t1();
    let result = pipeline.execute(&input).unwrap();
    assert_eq!(
        result["t1s"].to_records(),
        vec![json!({"x": 3, "y": 30}), json!({"x": 2, "y": 20})]
    );
    assert!(result.contains_key("t1"));
    assert!(result.contains_key("t1f"));
    assert_eq!(input.len(), 1);
}

#[test]
fn aggregate_sums_per_region() {
    let mut namespace = TlNamespace::new();
    namespace.insert(
        "sales".to_string(),
        TlDataset::from_records(&[
            json!({"region": "A", "amt": 10}),
            json!({"region": "A", "amt": 20}),
            json!({"region": "B", "amt": 5}),
        ])
        .unwrap(),
    );

    let mut pipeline = TlPipeline::new(None, None);
    pipeline
        .add_step(
            "aggregate",
            json!({
                "dataset_name": "sales",
                "group_by": ["region"],
                "aggregations": [{"column": "amt", "function": "sum", "alias": "total"}]
            }),
        )
        .unwrap();

    let result = pipeline.execute(&namespace).unwrap();
    assert_eq!(
        result["sales_aggregated"].to_records(),
        vec![json!({"region": "A", "total": 30}), json!({"region": "B", "total": 5})]
    );
}

#[test]
fn join_types_on_a_shared_key() {
    let mut namespace = TlNamespace::new();
    namespace.insert(
        "left".to_string(),
        TlDataset::from_records(&[json!({"id": 1, "v": "a"})]).unwrap(),
    );
    namespace.insert(
        "right".to_string(),
        TlDataset::from_records(&[json!({"id": 1, "w": "x"}), json!({"id": 2, "w": "y"})]).unwrap(),
    );

    let run = |join_type: &str| -> Vec<Value> {
        let mut pipeline = TlPipeline::new(None, None);
        pipeline
            .add_step(
                "join",
                json!({
                    "left_dataset": "left",
                    "right_dataset": "right",
                    "join_type": join_type,
                    "on": "id",
                    "output_name": "joined"
                }),
            )
            .unwrap();
        pipeline.execute(&namespace).unwrap()["joined"].to_records()
    };

    let single = vec![json!({"id": 1, "v": "a", "w": "x"})];
    assert_eq!(run("left"), single);
    assert_eq!(run("inner"), single);

    // one matched pair plus the unmatched right row
    let outer = run("outer");
    assert_eq!(outer.len(), 2);
    assert!(outer.contains(&json!({"id": 2, "v": null, "w": "y"})));
}

#[test]
fn failure_reports_position_and_available_datasets() {
    let mut pipeline = TlPipeline::new(None, None);
    pipeline
        .add_step(
            "column_select",
            json!({"dataset_name": "t1", "columns": ["x"], "output_name": "ds1"}),
        )
        .unwrap()
        .add_step("column_select", json!({"dataset_name": "missing", "columns": ["x"]}))
        .unwrap()
        .add_step("column_select", json!({"dataset_name": "ds1", "columns": ["x"], "output_name": "never"}))
        .unwrap();

    match pipeline.execute(&t1()).unwrap_err() {
        TlError::Step {
            index,
            operator,
            available,
            source,
        } => {
            assert_eq!(index, 2);
            assert_eq!(operator, "column_select");
            assert_eq!(available, vec!["ds1", "t1"]);
            assert!(matches!(*source, TlError::DatasetNotFound { ref dataset } if dataset == "missing"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn root_cause_unwraps_step_context() {
    let mut pipeline = TlPipeline::new(None, None);
    pipeline
        .add_step("sort", json!({"dataset_name": "t1", "sort_by": [{"column": "z"}]}))
        .unwrap();
    let err = pipeline.execute(&t1()).unwrap_err();
    assert!(err.to_string().contains("step 1 (sort)"));
    assert!(matches!(err.root_cause(), TlError::ColumnNotFound { .. }));
}

#[test]
fn empty_pipeline_is_identity() {
    let input = t1();
    let output = TlPipeline::new(None, None).execute(&input).unwrap();
    assert_eq!(output, input);
}

#[derive(Debug)]
struct Tag(&'static str);

impl TlOperator for Tag {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn check_params(&self) -> touchlink::errors::Result<()> {
        Ok(())
    }

    fn execute(&self, _namespace: &TlNamespace) -> touchlink::errors::Result<TlNamespace> {
        let mut delta = TlNamespace::new();
        delta.insert(
            "tag".to_string(),
            TlDataset::from_records(&[json!({ "version": self.0 })])?,
        );
        Ok(delta)
    }

    fn info(&self) -> TlOperatorInfo {
        tag_info()
    }
}

fn tag_info() -> TlOperatorInfo {
    TlOperatorInfo::new("tag", "Tag", "Writes a version marker")
}

fn tag_v1(_params: Value) -> Box<dyn TlOperator + Send + Sync> {
    Box::new(Tag("v1"))
}

fn tag_v2(_params: Value) -> Box<dyn TlOperator + Send + Sync> {
    Box::new(Tag("v2"))
}

#[test]
fn re_registration_uses_the_latest_factory() {
    let mut registry = TlOperatorRegistry::with_defaults();
    registry.register("tag", TlOperatorEntry::new(tag_v1, tag_info));
    registry.register("tag", TlOperatorEntry::new(tag_v2, tag_info));

    let mut pipeline = TlPipeline::new(None, None);
    pipeline.add_step_in(&registry, "tag", json!({})).unwrap();

    let result = pipeline.execute_with(&registry, &TlNamespace::new()).unwrap();
    assert_eq!(result["tag"].to_records(), vec![json!({"version": "v2"})]);

    // the process-wide registry never saw "tag"
    assert!(matches!(
        pipeline.execute(&TlNamespace::new()).unwrap_err().root_cause(),
        TlError::UnknownOperator { .. }
    ));
}

#[test]
fn add_step_advances_updated_at() {
    let mut pipeline = TlPipeline::new(Some("stamps"), None);
    let created = pipeline.created_at();
    let before = pipeline.updated_at();

    pipeline
        .add_step("filter", json!({"dataset_name": "t1", "conditions": []}))
        .unwrap();
    let first = pipeline.updated_at();
    assert!(first > before);
    assert!(first >= created);

    pipeline
        .add_step("sort", json!({"dataset_name": "t1", "sort_by": [{"column": "x"}]}))
        .unwrap();
    let second = pipeline.updated_at();
    assert!(second > first);

    assert!(pipeline.add_step("pivot", json!({})).is_err());
    assert!(pipeline.add_step("sort", json!({"dataset_name": "t1"})).is_err());
    assert_eq!(pipeline.updated_at(), second);
    assert_eq!(pipeline.created_at(), created);
    assert_eq!(pipeline.len(), 2);
}

#[test]
fn from_dict_is_tolerant_of_missing_fields() {
    let pipeline = TlPipeline::from_dict(&json!({
        "steps": [{"operator_type": "filter", "params": {"dataset_name": "t1", "conditions": []}}],
        "created_at": "2024-05-01T08:00:00"
    }))
    .unwrap();

    assert!(pipeline.name().starts_with("Pipeline-"));
    assert_eq!(pipeline.len(), 1);
    assert!(!pipeline.steps()[0].id.is_empty());
    assert_eq!(pipeline.created_at(), pipeline.updated_at());
    assert_eq!(pipeline.to_dict()["created_at"], json!("2024-05-01T08:00:00Z"));
}

#[test]
fn from_dict_rejects_malformed_documents() {
    assert!(TlPipeline::from_dict(&json!([])).is_err());
    assert!(TlPipeline::from_dict(&json!({"steps": {}})).is_err());
    assert!(TlPipeline::from_dict(&json!({"steps": [{"params": {}}]})).is_err());
    assert!(TlPipeline::from_dict(&json!({"created_at": "yesterday"})).is_err());
}

#[test]
fn validate_reports_bad_loaded_steps() {
    let pipeline = TlPipeline::from_dict(&json!({
        "steps": [
            {"operator_type": "filter", "params": {"dataset_name": "t1", "conditions": []}},
            {"operator_type": "union", "params": {"datasets": ["t1"]}}
        ]
    }))
    .unwrap();

    match pipeline.validate().unwrap_err() {
        TlError::Step { index, operator, .. } => {
            assert_eq!(index, 2);
            assert_eq!(operator, "union");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn referenced_datasets_are_distinct_and_ordered() {
    let mut pipeline = TlPipeline::new(None, None);
    pipeline
        .add_step("union", json!({"datasets": ["b", "a", "b"]}))
        .unwrap()
        .add_step(
            "join",
            json!({"left_dataset": "a", "right_dataset": "c", "join_type": "cross"}),
        )
        .unwrap();

    assert_eq!(pipeline.referenced_datasets(), vec!["b", "a", "c"]);
    assert_eq!(
        TlPipelineStep::new("filter", json!({"dataset_name": "x"})).input_datasets(),
        vec!["x"]
    );
}
