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

//! # Touchlink Operator Module
//!
//! This module defines the operator trait and the descriptor types used to
//! introspect operators. Operators are the instruction set of the pipeline
//! interpreter: each one reads datasets from a namespace by name and returns a
//! delta of new or replaced datasets.
//!
//! ## Operator Design
//!
//! Validation happens in two phases:
//!
//! - **Shape** (`validate_params` / `check_params`): required keys, list and
//!   object shapes, enum membership. Pure, and run when a step is added.
//! - **Existence** (inside `execute`): datasets and columns can only be
//!   checked against a concrete namespace.
//!
//! `execute` re-parses the parameter bag on every call, because step params
//! may have been serialized and reloaded since they were first checked.
//!
//! ## Implementing Custom Operators
//!
//! ```rust
//! use serde_json::Value;
//! use touchlink::dataset::TlNamespace;
//! use touchlink::errors::Result;
//! use touchlink::operator::{TlOperator, TlOperatorInfo};
//!
//! #[derive(Debug)]
//! struct Passthrough {
//!     params: Value,
//! }
//!
//! impl TlOperator for Passthrough {
//!     fn name(&self) -> &'static str {
//!         "passthrough"
//!     }
//!
//!     fn check_params(&self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn execute(&self, _namespace: &TlNamespace) -> Result<TlNamespace> {
//!         Ok(TlNamespace::new())
//!     }
//!
//!     fn info(&self) -> TlOperatorInfo {
//!         TlOperatorInfo::new("passthrough", "Passthrough", "Produces nothing")
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::TlNamespace;
use crate::errors::{Result, TlError};

/// Contract every analytics operator fulfills.
pub trait TlOperator: std::fmt::Debug {
    /// Operator type key, as registered in the registry.
    fn name(&self) -> &'static str;

    /// Structural parameter check that reports why it failed.
    fn check_params(&self) -> Result<()>;

    /// Structural parameter check. Returns false rather than failing; the
    /// caller decides whether that is fatal.
    fn validate_params(&self) -> bool {
        match self.check_params() {
            Ok(()) => true,
            Err(err) => {
                log::debug!(
                    "operator.params.invalid: parameter check failed - operator={}, error={}",
                    self.name(),
                    err
                );
                false
            }
        }
    }

    /// Reads inputs from `namespace` and returns the datasets it produces.
    fn execute(&self, namespace: &TlNamespace) -> Result<TlNamespace>;

    /// Static metadata for UIs and API listings.
    fn info(&self) -> TlOperatorInfo;
}

/// Executes an operator and attaches the operator name to untyped failures.
///
/// Errors that already belong to the taxonomy (missing dataset, missing
/// column, invalid params, unsupported enum values) pass through unchanged.
pub fn execute_operator(operator: &dyn TlOperator, namespace: &TlNamespace) -> Result<TlNamespace> {
    operator.execute(namespace).map_err(|err| match err {
        TlError::Internal(message) | TlError::Io(message) | TlError::Serde(message) => {
            TlError::operator(operator.name(), message)
        }
        other => other,
    })
}

/// Parameter value kinds advertised in operator descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlParamType {
    String,
    Boolean,
    Array,
    Object,
    /// A single string or a list of strings.
    StringOrArray,
    Any,
}

/// Schema entry for one operator parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: TlParamType,
    pub description: String,
    pub required: bool,
    /// Allowed values for enum-constrained parameters.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Nested parameters of array items, for lists of objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TlParamSpec>,
}

impl TlParamSpec {
    #[allow(non_snake_case)]
    pub fn new(name: &str, param_type: TlParamType, description: &str, required: bool) -> Self {
        TlParamSpec {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required,
            enum_values: None,
            default: None,
            items: Vec::new(),
        }
    }

    pub fn required(name: &str, param_type: TlParamType, description: &str) -> Self {
        Self::new(name, param_type, description, true)
    }

    pub fn optional(name: &str, param_type: TlParamType, description: &str) -> Self {
        Self::new(name, param_type, description, false)
    }

    pub fn with_enum(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_items(mut self, items: Vec<TlParamSpec>) -> Self {
        self.items = items;
        self
    }
}

/// Static descriptor of an operator type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlOperatorInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub params: Vec<TlParamSpec>,
}

impl TlOperatorInfo {
    #[allow(non_snake_case)]
    pub fn new(name: &str, display_name: &str, description: &str) -> Self {
        TlOperatorInfo {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, spec: TlParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Appends the optional `output_name` parameter every built-in accepts.
    pub fn with_output_name(self) -> Self {
        self.param(TlParamSpec::optional(
            "output_name",
            TlParamType::String,
            "Output dataset name",
        ))
    }
}
