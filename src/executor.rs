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

//! # Pipeline Executor
//!
//! Binds a pipeline to a data source: loads the source's tables into a
//! namespace, layers them over any caller-supplied datasets and runs the
//! pipeline. Every table the source lists is sampled, whether or not a step
//! reads it, so the result namespace carries the whole source.
//!
//! Every load failure surfaces as `TlError::DataSourceLoad`.

use crate::dataset::TlNamespace;
use crate::errors::{Result, TlError};
use crate::pipeline::TlPipeline;
use crate::registry::TlOperatorRegistry;
use crate::source::TlDataSource;

/// Rows fetched per table when loading from a data source.
pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// Executor settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlExecutorConfig {
    pub sample_limit: usize,
}

impl Default for TlExecutorConfig {
    fn default() -> Self {
        TlExecutorConfig {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

/// Runs pipelines over data loaded from a source.
#[derive(Debug, Default)]
pub struct TlPipelineExecutor<'r> {
    config: TlExecutorConfig,
    registry: Option<&'r TlOperatorRegistry>,
}

impl<'r> TlPipelineExecutor<'r> {
    #[allow(non_snake_case)]
    pub fn new(config: TlExecutorConfig) -> Self {
        TlPipelineExecutor {
            config,
            registry: None,
        }
    }

    /// Uses `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: &'r TlOperatorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(&self) -> &TlExecutorConfig {
        &self.config
    }

    /// Samples every table of the source into a fresh namespace.
    pub fn load_namespace(&self, source: &dyn TlDataSource) -> Result<TlNamespace> {
        let tables = source
            .get_tables()
            .map_err(|err| load_error(source, err))?;

        let mut namespace = TlNamespace::new();
        for table in tables {
            let dataset = source
                .get_sample_data(&table, self.config.sample_limit)
                .map_err(|err| load_error(source, err))?;
            namespace.insert(table, dataset);
        }

        log::info!(
            "executor.load.completed: tables loaded - source={}, tables={}, limit={}",
            source.name(),
            namespace.len(),
            self.config.sample_limit
        );
        Ok(namespace)
    }

    /// Loads tables from `source` (when given), merges them over `initial`
    /// and executes `pipeline`. Loaded tables replace initial datasets of the
    /// same name.
    pub fn run(
        &self,
        pipeline: &TlPipeline,
        source: Option<&dyn TlDataSource>,
        initial: TlNamespace,
    ) -> Result<TlNamespace> {
        let mut namespace = initial;
        if let Some(source) = source {
            namespace.extend(self.load_namespace(source)?);
        }

        match self.registry {
            Some(registry) => pipeline.execute_with(registry, &namespace),
            None => pipeline.execute(&namespace),
        }
    }
}

fn load_error(source: &dyn TlDataSource, err: TlError) -> TlError {
    log::error!(
        "executor.load.failed: data source failed - source={}, error={}",
        source.name(),
        err
    );
    TlError::data_source(source.name(), err.to_string())
}
