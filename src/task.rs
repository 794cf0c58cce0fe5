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

//! # Analysis Task Module
//!
//! An analysis task is a stored request to run a pipeline document against a
//! data source and persist the results. This module provides the task record,
//! its status machine, a narrow storage interface, the runner that executes
//! tasks and a small service facade used by API layers.
//!
//! ## Status Machine
//!
//! ```text
//! pending ──> running ──> completed
//!    │           ├──────> failed
//!    └───────────┴──────> canceled
//! ```
//!
//! `completed`, `failed` and `canceled` are terminal.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::TlEngineConfig;
use crate::dataset::TlNamespace;
use crate::errors::{Result, TlError};
use crate::executor::TlPipelineExecutor;
use crate::export::TlResultWriter;
use crate::operator::TlOperatorInfo;
use crate::pipeline::TlPipeline;
use crate::registry;
use crate::source::TlDataSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlTaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Canceled,
}

impl TlTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TlTaskStatus::Pending => "pending",
            TlTaskStatus::Running => "running",
            TlTaskStatus::Completed => "completed",
            TlTaskStatus::Failed => "failed",
            TlTaskStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TlTaskStatus::Completed | TlTaskStatus::Failed | TlTaskStatus::Canceled
        )
    }

    pub fn can_transition_to(&self, next: TlTaskStatus) -> bool {
        use TlTaskStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Canceled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Canceled)
        )
    }
}

impl fmt::Display for TlTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored analysis request and its outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlAnalysisTask {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Pipeline document, as produced by [`TlPipeline::to_dict`].
    pub pipeline: Value,
    pub status: TlTaskStatus,
    pub result_path: Option<String>,
    pub datasource_id: Option<String>,
    /// Failure message of the last run.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TlAnalysisTask {
    #[allow(non_snake_case)]
    pub fn new(user_id: &str, name: &str, pipeline: &TlPipeline, datasource_id: Option<&str>) -> Self {
        let now = Utc::now();
        TlAnalysisTask {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            pipeline: pipeline.to_dict(),
            status: TlTaskStatus::Pending,
            result_path: None,
            datasource_id: datasource_id.map(str::to_string),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves to `next`, rejecting transitions the status machine forbids.
    pub fn transition(&mut self, next: TlTaskStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(TlError::validation(format!(
                "task {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Narrow record store for analysis tasks.
pub trait TlTaskStore: Send + Sync {
    fn get(&self, task_id: &str) -> Result<Option<TlAnalysisTask>>;

    /// Inserts or replaces a task.
    fn put(&self, task: TlAnalysisTask) -> Result<()>;

    fn list_for_user(&self, user_id: &str) -> Result<Vec<TlAnalysisTask>>;

    /// Removes a task, reporting whether it existed.
    fn delete(&self, task_id: &str) -> Result<bool>;
}

#[derive(Debug, Default)]
pub struct TlMemoryTaskStore {
    tasks: RwLock<HashMap<String, TlAnalysisTask>>,
}

impl TlMemoryTaskStore {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TlTaskStore for TlMemoryTaskStore {
    fn get(&self, task_id: &str) -> Result<Option<TlAnalysisTask>> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks.get(task_id).cloned())
    }

    fn put(&self, task: TlAnalysisTask) -> Result<()> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        tasks.insert(task.id.clone(), task);
        Ok(())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<TlAnalysisTask>> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        let mut owned: Vec<TlAnalysisTask> = tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(owned)
    }

    fn delete(&self, task_id: &str) -> Result<bool> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks.remove(task_id).is_some())
    }
}

/// Maps a task's `datasource_id` to a connected data source.
pub trait TlDataSourceResolver: Send + Sync {
    fn resolve(&self, datasource_id: &str) -> Result<Arc<dyn TlDataSource>>;
}

/// Resolver over a fixed set of registered sources.
#[derive(Default)]
pub struct TlSourceCatalog {
    sources: HashMap<String, Arc<dyn TlDataSource>>,
}

impl TlSourceCatalog {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, datasource_id: &str, source: Arc<dyn TlDataSource>) -> Self {
        self.sources.insert(datasource_id.to_string(), source);
        self
    }
}

impl TlDataSourceResolver for TlSourceCatalog {
    fn resolve(&self, datasource_id: &str) -> Result<Arc<dyn TlDataSource>> {
        self.sources
            .get(datasource_id)
            .cloned()
            .ok_or_else(|| TlError::data_source(datasource_id, "data source is not registered"))
    }
}

/// Successful run of a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlTaskOutcome {
    pub task_id: String,
    pub result_path: PathBuf,
    /// Names of the persisted datasets, sorted.
    pub datasets: Vec<String>,
}

/// Executes stored tasks end to end.
pub struct TlTaskRunner {
    store: Arc<dyn TlTaskStore>,
    resolver: Arc<dyn TlDataSourceResolver>,
    config: TlEngineConfig,
}

impl TlTaskRunner {
    #[allow(non_snake_case)]
    pub fn new(
        store: Arc<dyn TlTaskStore>,
        resolver: Arc<dyn TlDataSourceResolver>,
        config: TlEngineConfig,
    ) -> Self {
        TlTaskRunner {
            store,
            resolver,
            config,
        }
    }

    fn load(&self, task_id: &str) -> Result<TlAnalysisTask> {
        self.store
            .get(task_id)?
            .ok_or_else(|| TlError::validation(format!("analysis task not found: {task_id}")))
    }

    /// Runs a pending task: marks it running, executes its pipeline, writes
    /// the results and marks it completed. On failure the task is marked
    /// failed with the error message, and the error is returned.
    ///
    /// A task canceled while its pipeline runs stays canceled: no results
    /// are written and a `Validation` error is returned.
    pub fn run(&self, task_id: &str) -> Result<TlTaskOutcome> {
        let mut task = self.load(task_id)?;
        task.transition(TlTaskStatus::Running)?;
        self.store.put(task.clone())?;
        log::info!(
            "task.run.start: task running - task_id={}, name={}, datasource={:?}",
            task.id,
            task.name,
            task.datasource_id
        );

        let computed = self.compute(&task);
        let mut task = self.load(task_id)?;
        if task.status.is_terminal() {
            log::warn!(
                "task.run.abandoned: task finished elsewhere while running - task_id={}, status={}",
                task_id,
                task.status
            );
            return Err(TlError::validation(format!(
                "analysis task {task_id} was {} while running",
                task.status
            )));
        }

        match computed.and_then(|namespace| self.persist(&task, namespace)) {
            Ok(outcome) => {
                task.result_path = Some(outcome.result_path.to_string_lossy().into_owned());
                task.error = None;
                task.transition(TlTaskStatus::Completed)?;
                self.store.put(task)?;
                log::info!(
                    "task.run.completed: task completed - task_id={}, datasets={}, result_path={}",
                    outcome.task_id,
                    outcome.datasets.len(),
                    outcome.result_path.display()
                );
                Ok(outcome)
            }
            Err(err) => {
                task.error = Some(err.to_string());
                task.transition(TlTaskStatus::Failed)?;
                self.store.put(task)?;
                log::error!(
                    "task.run.failed: task failed - task_id={}, error={}",
                    task_id,
                    err
                );
                Err(err)
            }
        }
    }

    fn compute(&self, task: &TlAnalysisTask) -> Result<TlNamespace> {
        let pipeline = TlPipeline::from_dict(&task.pipeline)?;
        pipeline.validate()?;

        let source = task
            .datasource_id
            .as_deref()
            .map(|id| self.resolver.resolve(id))
            .transpose()?;

        let executor = TlPipelineExecutor::new(self.config.executor_config());
        executor.run(&pipeline, source.as_deref(), TlNamespace::new())
    }

    fn persist(&self, task: &TlAnalysisTask, namespace: TlNamespace) -> Result<TlTaskOutcome> {
        let writer = TlResultWriter::new(&self.config.results_dir);
        let result_path = writer.save(&namespace, &task.id)?;

        let mut datasets: Vec<String> = namespace.into_keys().collect();
        datasets.sort();
        Ok(TlTaskOutcome {
            task_id: task.id.clone(),
            result_path,
            datasets,
        })
    }

    /// Cancels a task that has not finished.
    pub fn cancel(&self, task_id: &str) -> Result<TlAnalysisTask> {
        let mut task = self.load(task_id)?;
        if task.status.is_terminal() {
            log::warn!(
                "task.cancel.rejected: task already finished - task_id={}, status={}",
                task_id,
                task.status
            );
            return Err(TlError::validation(format!(
                "cannot cancel a {} task",
                task.status
            )));
        }
        task.transition(TlTaskStatus::Canceled)?;
        self.store.put(task.clone())?;
        log::info!("task.cancel.completed: task canceled - task_id={}", task_id);
        Ok(task)
    }
}

/// Entry points used by API layers.
pub struct TlAnalyticsService {
    store: Arc<dyn TlTaskStore>,
}

impl TlAnalyticsService {
    #[allow(non_snake_case)]
    pub fn new(store: Arc<dyn TlTaskStore>) -> Self {
        TlAnalyticsService { store }
    }

    /// Descriptors of every registered operator.
    pub fn available_operators(&self) -> Vec<TlOperatorInfo> {
        registry::all_operator_info()
    }

    pub fn create_pipeline(&self, name: &str, description: Option<&str>) -> TlPipeline {
        TlPipeline::new(Some(name), description)
    }

    /// Rebuilds a pipeline from its document and checks every step.
    pub fn load_pipeline(&self, document: &Value) -> Result<TlPipeline> {
        let pipeline = TlPipeline::from_dict(document)?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Stores a new pending task for `pipeline`.
    pub fn create_task(
        &self,
        user_id: &str,
        name: &str,
        pipeline: &TlPipeline,
        datasource_id: Option<&str>,
    ) -> Result<TlAnalysisTask> {
        let task = TlAnalysisTask::new(user_id, name, pipeline, datasource_id);
        self.store.put(task.clone())?;
        log::info!(
            "task.created: analysis task created - task_id={}, name={}, user_id={}",
            task.id,
            task.name,
            task.user_id
        );
        Ok(task)
    }

    pub fn get_task(&self, task_id: &str) -> Result<Option<TlAnalysisTask>> {
        self.store.get(task_id)
    }

    pub fn user_tasks(&self, user_id: &str) -> Result<Vec<TlAnalysisTask>> {
        self.store.list_for_user(user_id)
    }

    pub fn delete_task(&self, task_id: &str) -> Result<bool> {
        let removed = self.store.delete(task_id)?;
        if removed {
            log::info!("task.deleted: analysis task deleted - task_id={}", task_id);
        }
        Ok(removed)
    }
}
