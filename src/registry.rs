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

//! # Operator Registry Module
//!
//! This module maps operator type keys to factories and descriptors.
//!
//! ## Registry Operations
//!
//! - Register operator entries under a type key (last write wins)
//! - Create operator instances from a type key and parameter bag
//! - Enumerate registered types and their descriptors
//!
//! ## Process-wide Registry
//!
//! [`global_registry`] holds a registry populated once from
//! [`TlOperatorRegistry::with_defaults`], which is the single place where the
//! built-in operators are wired in. The free functions in this module operate
//! on it. Independent instances can be built with [`TlOperatorRegistry::new`]
//! for tests or embedding.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use serde_json::Value;

use crate::operator::{TlOperator, TlOperatorInfo};
use crate::operators::{
    aggregate_factory, aggregate_info, column_select_factory, column_select_info, filter_factory,
    filter_info, join_factory, join_info, sort_factory, sort_info, union_factory, union_info,
};

/// Builds an operator from its parameter bag. Construction never fails;
/// parameters are checked through [`TlOperator::check_params`].
pub type TlOperatorFactory = fn(Value) -> Box<dyn TlOperator + Send + Sync>;

/// Factory plus static descriptor of one operator type.
#[derive(Clone, Copy, Debug)]
pub struct TlOperatorEntry {
    pub factory: TlOperatorFactory,
    pub info: fn() -> TlOperatorInfo,
}

impl TlOperatorEntry {
    #[allow(non_snake_case)]
    pub fn new(factory: TlOperatorFactory, info: fn() -> TlOperatorInfo) -> Self {
        Self { factory, info }
    }
}

/// Registry mapping operator type keys to their entries.
#[derive(Debug, Default)]
pub struct TlOperatorRegistry {
    inner: HashMap<String, TlOperatorEntry>,
}

impl TlOperatorRegistry {
    /// Creates an empty registry.
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        TlOperatorRegistry {
            inner: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in operators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("column_select", TlOperatorEntry::new(column_select_factory, column_select_info));
        registry.register("filter", TlOperatorEntry::new(filter_factory, filter_info));
        registry.register("sort", TlOperatorEntry::new(sort_factory, sort_info));
        registry.register("aggregate", TlOperatorEntry::new(aggregate_factory, aggregate_info));
        registry.register("join", TlOperatorEntry::new(join_factory, join_info));
        registry.register("union", TlOperatorEntry::new(union_factory, union_info));
        registry
    }

    /// Registers `entry` under `name`. An existing entry with the same name
    /// is replaced.
    pub fn register(&mut self, name: &str, entry: TlOperatorEntry) {
        if self.inner.insert(name.to_string(), entry).is_some() {
            log::warn!("registry.operator.replaced: operator re-registered - name={}", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Instantiates the operator registered under `name`, or `None`.
    pub fn create(&self, name: &str, params: Value) -> Option<Box<dyn TlOperator + Send + Sync>> {
        self.inner.get(name).map(|entry| (entry.factory)(params))
    }

    /// Registered type keys, sorted.
    pub fn registered_operators(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn operator_info(&self, name: &str) -> Option<TlOperatorInfo> {
        self.inner.get(name).map(|entry| (entry.info)())
    }

    /// Descriptors of every registered type, sorted by type key.
    pub fn all_operator_info(&self) -> Vec<TlOperatorInfo> {
        self.registered_operators()
            .iter()
            .filter_map(|name| self.operator_info(name))
            .collect()
    }
}

static GLOBAL_REGISTRY: OnceLock<RwLock<TlOperatorRegistry>> = OnceLock::new();

/// Process-wide registry, populated with the built-ins on first access.
pub fn global_registry() -> &'static RwLock<TlOperatorRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| RwLock::new(TlOperatorRegistry::with_defaults()))
}

/// Registers an entry in the process-wide registry (last write wins).
pub fn register(name: &str, entry: TlOperatorEntry) {
    global_registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, entry);
}

pub fn create(name: &str, params: Value) -> Option<Box<dyn TlOperator + Send + Sync>> {
    global_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .create(name, params)
}

pub fn registered_operators() -> Vec<String> {
    global_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .registered_operators()
}

pub fn operator_info(name: &str) -> Option<TlOperatorInfo> {
    global_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .operator_info(name)
}

pub fn all_operator_info() -> Vec<TlOperatorInfo> {
    global_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .all_operator_info()
}
