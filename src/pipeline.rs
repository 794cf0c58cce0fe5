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

//! # Touchlink Pipeline Module
//!
//! A [`TlPipeline`] is an ordered, serializable list of steps. Each step names
//! an operator type and carries its parameter bag. Executing a pipeline
//! instantiates a fresh operator per step, runs the steps in order over a
//! namespace and merges every step's output into it.
//!
//! ## Execution Semantics
//!
//! - The caller's namespace is never mutated; execution works on a copy.
//! - A step output replaces any dataset of the same name.
//! - The first failing step aborts the run with [`TlError::Step`], carrying
//!   its 1-based position, its operator type and the underlying error.
//! - An empty pipeline returns its input unchanged.
//!
//! ## Document Format
//!
//! ```json
//! {
//!   "id": "4f1c...",
//!   "name": "Pipeline-4f1c2a9b",
//!   "description": null,
//!   "steps": [{"id": "...", "operator_type": "filter", "params": {}}],
//!   "created_at": "2026-01-01T00:00:00Z",
//!   "updated_at": "2026-01-01T00:00:00Z"
//! }
//! ```

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dataset::TlNamespace;
use crate::errors::{Result, TlError};
use crate::operator::{execute_operator, TlOperator};
use crate::registry::{self, TlOperatorRegistry};

/// Parameter keys through which steps name the datasets they read.
const DATASET_KEYS: [&str; 3] = ["dataset_name", "left_dataset", "right_dataset"];

/// One step of a pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlPipelineStep {
    pub id: String,
    pub operator_type: String,
    pub params: Value,
}

impl TlPipelineStep {
    #[allow(non_snake_case)]
    pub fn new(operator_type: &str, params: Value) -> Self {
        TlPipelineStep {
            id: Uuid::new_v4().to_string(),
            operator_type: operator_type.to_string(),
            params,
        }
    }

    /// Dataset names this step reads, in parameter order.
    pub fn input_datasets(&self) -> Vec<String> {
        let mut names: Vec<String> = DATASET_KEYS
            .iter()
            .filter_map(|key| self.params.get(key).and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        if let Some(list) = self.params.get("datasets").and_then(Value::as_array) {
            names.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }
        names
    }
}

/// Ordered sequence of operator steps with identity and timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct TlPipeline {
    id: String,
    name: String,
    description: Option<String>,
    steps: Vec<TlPipelineStep>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

type Factory<'a> = dyn Fn(&str, Value) -> Option<Box<dyn TlOperator + Send + Sync>> + 'a;

impl TlPipeline {
    /// Creates an empty pipeline. Without a name it is called
    /// `Pipeline-{first 8 characters of its id}`.
    #[allow(non_snake_case)]
    pub fn new(name: Option<&str>, description: Option<&str>) -> Self {
        let id = Uuid::new_v4().to_string();
        let name = name.map(str::to_string).unwrap_or_else(|| default_name(&id));
        let now = Utc::now();
        TlPipeline {
            id,
            name,
            description: description.map(str::to_string),
            steps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn steps(&self) -> &[TlPipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Appends a step after checking it against the process-wide registry.
    ///
    /// Fails with `UnknownOperator` for an unregistered type and with
    /// `ParamValidation` (or the matching `Unsupported*` error) for a bad
    /// parameter bag. Nothing is appended on failure.
    pub fn add_step(&mut self, operator_type: &str, params: Value) -> Result<&mut Self> {
        self.push_step(&registry::create, operator_type, params)
    }

    /// Same as [`add_step`](Self::add_step), against an explicit registry.
    pub fn add_step_in(
        &mut self,
        registry: &TlOperatorRegistry,
        operator_type: &str,
        params: Value,
    ) -> Result<&mut Self> {
        self.push_step(&|name, params| registry.create(name, params), operator_type, params)
    }

    fn push_step(&mut self, create: &Factory<'_>, operator_type: &str, params: Value) -> Result<&mut Self> {
        let operator = create(operator_type, params.clone())
            .ok_or_else(|| TlError::unknown_operator(operator_type))?;
        operator.check_params()?;

        let step = TlPipelineStep::new(operator_type, params);
        log::info!(
            "pipeline.step.added: step appended - pipeline={}, position={}, operator={}, step_id={}",
            self.id,
            self.steps.len() + 1,
            operator_type,
            step.id
        );
        self.steps.push(step);
        // strictly later than the previous stamp, even on a coarse clock
        self.updated_at = Utc::now().max(self.updated_at + Duration::nanoseconds(1));
        Ok(self)
    }

    /// Executes every step against the process-wide registry.
    pub fn execute(&self, namespace: &TlNamespace) -> Result<TlNamespace> {
        self.run_steps(&registry::create, namespace)
    }

    /// Executes every step against an explicit registry.
    pub fn execute_with(&self, registry: &TlOperatorRegistry, namespace: &TlNamespace) -> Result<TlNamespace> {
        self.run_steps(&|name, params| registry.create(name, params), namespace)
    }

    fn run_steps(&self, create: &Factory<'_>, namespace: &TlNamespace) -> Result<TlNamespace> {
        let mut data = namespace.clone();

        log::info!(
            "pipeline.execute.start: running pipeline - pipeline={}, steps={}, datasets={}",
            self.id,
            self.steps.len(),
            data.len()
        );

        for (index, step) in self.steps.iter().enumerate() {
            let position = index + 1;
            let outcome = create(&step.operator_type, step.params.clone())
                .ok_or_else(|| TlError::unknown_operator(&step.operator_type))
                .and_then(|operator| execute_operator(operator.as_ref(), &data));

            match outcome {
                Ok(delta) => {
                    log::info!(
                        "pipeline.step.completed: step finished - pipeline={}, position={}, operator={}, outputs={:?}",
                        self.id,
                        position,
                        step.operator_type,
                        delta.keys().collect::<Vec<_>>()
                    );
                    data.extend(delta);
                }
                Err(err) => {
                    log::error!(
                        "pipeline.step.failed: step failed - pipeline={}, position={}, operator={}, error={}",
                        self.id,
                        position,
                        step.operator_type,
                        err
                    );
                    return Err(TlError::step(
                        position,
                        &step.operator_type,
                        sorted_names(&data),
                        err,
                    ));
                }
            }
        }

        log::info!(
            "pipeline.execute.completed: pipeline finished - pipeline={}, datasets={}",
            self.id,
            data.len()
        );
        Ok(data)
    }

    /// Re-checks every stored step against the process-wide registry.
    /// Intended for pipelines loaded from documents.
    pub fn validate(&self) -> Result<()> {
        self.check_steps(&registry::create)
    }

    pub fn validate_with(&self, registry: &TlOperatorRegistry) -> Result<()> {
        self.check_steps(&|name, params| registry.create(name, params))
    }

    fn check_steps(&self, create: &Factory<'_>) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            create(&step.operator_type, step.params.clone())
                .ok_or_else(|| TlError::unknown_operator(&step.operator_type))
                .and_then(|operator| operator.check_params())
                .map_err(|err| TlError::step(index + 1, &step.operator_type, Vec::new(), err))?;
        }
        Ok(())
    }

    /// Distinct dataset names read by the steps, in first-seen order.
    pub fn referenced_datasets(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.steps.iter().flat_map(TlPipelineStep::input_datasets) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Renders the pipeline document.
    pub fn to_dict(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "steps": self.steps,
            "created_at": format_timestamp(&self.created_at),
            "updated_at": format_timestamp(&self.updated_at),
        })
    }

    /// Rebuilds a pipeline from its document.
    ///
    /// Missing ids get fresh UUIDs, a missing step list means no steps, and
    /// timestamps without an offset are read as UTC. Steps are not checked
    /// against the registry here; see [`validate`](Self::validate).
    pub fn from_dict(document: &Value) -> Result<Self> {
        let object = document
            .as_object()
            .ok_or_else(|| TlError::validation("pipeline document must be an object"))?;

        let id = optional_string(object.get("id"), "id")?
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let name = optional_string(object.get("name"), "name")?
            .unwrap_or_else(|| default_name(&id));
        let description = optional_string(object.get("description"), "description")?;

        let steps = match object.get("steps") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| parse_step(index, item))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(TlError::validation("pipeline 'steps' must be a list")),
        };

        let created_at = match optional_string(object.get("created_at"), "created_at")? {
            Some(text) => parse_timestamp(&text)?,
            None => Utc::now(),
        };
        let updated_at = match optional_string(object.get("updated_at"), "updated_at")? {
            Some(text) => parse_timestamp(&text)?,
            None => created_at,
        };

        Ok(TlPipeline {
            id,
            name,
            description,
            steps,
            created_at,
            updated_at,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_dict())?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_dict(&document)
    }
}

fn default_name(id: &str) -> String {
    format!("Pipeline-{}", id.chars().take(8).collect::<String>())
}

fn sorted_names(namespace: &TlNamespace) -> Vec<String> {
    let mut names: Vec<String> = namespace.keys().cloned().collect();
    names.sort();
    names
}

fn optional_string(value: Option<&Value>, key: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(TlError::validation(format!(
            "pipeline field '{key}' must be a string"
        ))),
    }
}

fn parse_step(index: usize, item: &Value) -> Result<TlPipelineStep> {
    let object = item
        .as_object()
        .ok_or_else(|| TlError::validation(format!("step {} must be an object", index + 1)))?;
    let operator_type = object
        .get("operator_type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            TlError::validation(format!("step {} requires string 'operator_type'", index + 1))
        })?;
    let id = optional_string(object.get("id"), "id")?.unwrap_or_else(|| Uuid::new_v4().to_string());
    let params = match object.get("params") {
        None | Some(Value::Null) => json!({}),
        Some(params) => params.clone(),
    };
    Ok(TlPipelineStep {
        id,
        operator_type: operator_type.to_string(),
        params,
    })
}

/// ISO-8601 in UTC, as written into pipeline documents.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses RFC 3339 timestamps, and naive ISO-8601 timestamps as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|err| TlError::validation(format!("invalid timestamp '{text}': {err}")))
}
