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

//! # Parameter Bag Adapter
//!
//! Step parameters arrive as untyped JSON objects (from API payloads or stored
//! pipeline documents). Each operator converts its bag into a typed parameter
//! struct through [`TlParamBag`], and every shape problem surfaces as
//! `TlError::ParamValidation` at this boundary.

use serde_json::{Map, Value};

use crate::errors::{Result, TlError};

/// Read-only view over a step's JSON parameter object.
#[derive(Debug, Clone, Copy)]
pub struct TlParamBag<'a> {
    operator: &'static str,
    object: &'a Map<String, Value>,
}

impl<'a> TlParamBag<'a> {
    /// Wraps `params`, which must be a JSON object.
    pub fn parse(operator: &'static str, params: &'a Value) -> Result<Self> {
        let object = params
            .as_object()
            .ok_or_else(|| TlError::params(operator, "params must be an object"))?;
        Ok(TlParamBag { operator, object })
    }

    pub fn operator(&self) -> &'static str {
        self.operator
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.object.contains_key(key)
    }

    /// Builds a validation error attributed to this operator.
    pub fn error(&self, message: impl Into<String>) -> TlError {
        TlError::params(self.operator, message)
    }

    pub fn required_str(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| self.error(format!("missing required param '{key}'")))?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.error(format!("param '{key}' must be a string")))
    }

    /// Returns the string at `key`, treating null the same as absent.
    pub fn optional_str(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(_) => Err(self.error(format!("param '{key}' must be a string"))),
        }
    }

    pub fn optional_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(self.error(format!("param '{key}' must be a boolean"))),
        }
    }

    pub fn required_array(&self, key: &str) -> Result<&'a Vec<Value>> {
        self.get(key)
            .ok_or_else(|| self.error(format!("missing required param '{key}'")))?
            .as_array()
            .ok_or_else(|| self.error(format!("param '{key}' must be a list")))
    }

    /// Required list of strings.
    pub fn string_list(&self, key: &str) -> Result<Vec<String>> {
        self.required_array(key)?
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.error(format!("param '{key}' must contain only strings")))
            })
            .collect()
    }

    /// Optional key holding a single string or a list of strings.
    pub fn string_or_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(vec![text.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|value| {
                    value.as_str().map(str::to_string).ok_or_else(|| {
                        self.error(format!("param '{key}' must contain only strings"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(_) => Err(self.error(format!(
                "param '{key}' must be a string or a list of strings"
            ))),
        }
    }

    /// Resolves `output_name`, falling back to the operator's derived name.
    pub fn output_name(&self, default: impl FnOnce() -> String) -> Result<String> {
        Ok(self.optional_str("output_name")?.unwrap_or_else(default))
    }

    /// Views one element of a list param as a nested bag.
    pub fn item(&self, key: &str, value: &'a Value) -> Result<TlParamBag<'a>> {
        let object = value
            .as_object()
            .ok_or_else(|| self.error(format!("items of '{key}' must be objects")))?;
        Ok(TlParamBag {
            operator: self.operator,
            object,
        })
    }
}
