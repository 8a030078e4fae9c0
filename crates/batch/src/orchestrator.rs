//! Multi-phase batch operations against a Vikunja project.
//!
//! Batch operations are best-effort: per-item failures are collected as
//! strings in the operation's report and the batch keeps going, so one
//! bad task never wastes the rest. Only failures that make the whole
//! operation meaningless (configuration unreadable, template missing)
//! surface as [`BatchError`].
//!
//! All remote calls are awaited one at a time, in input order. That
//! keeps local refs resolvable (a ref always points at an
//! already-created task) and lets position allocation track its own
//! insertions without refetching the view.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{info, instrument, warn};
use vikunja_client::{ApiClient, RelationKind, View};
use vikunja_config::{ConfigStore, ProjectConfig, SortStrategy};

use crate::error::{BatchError, BatchResult};
use crate::input::TaskInput;
use crate::position::PositionLadder;
use crate::sort::{input_key, task_key, SortKey};
use crate::template::expand;

/// Colors cycled through when auto-creating labels.
pub const LABEL_PALETTE: [&str; 6] = [
    "#3498db", "#e74c3c", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c",
];

/// Fallback color for labels created without an explicit one.
const DEFAULT_LABEL_COLOR: &str = "#3498db";

/// Knobs for [`Orchestrator::batch_create`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Create labels that tasks reference but the service lacks.
    pub create_missing_labels: bool,
    /// Create buckets that tasks reference but the kanban view lacks.
    pub create_missing_buckets: bool,
    /// Consult the project's stored configuration for defaults and sort
    /// strategies.
    pub use_project_config: bool,
    /// Auto-sort touched buckets after creation, per configured strategy.
    pub apply_sort: bool,
    /// Give label-less tasks the project's default labels.
    pub apply_default_labels: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            create_missing_labels: true,
            create_missing_buckets: false,
            use_project_config: true,
            apply_sort: true,
            apply_default_labels: false,
        }
    }
}

/// A task created by a batch, with the local ref it was known by.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRef {
    /// Local ref from the input, when it had one.
    #[serde(skip_serializing_if = "Option::is_none", rename = "ref")]
    pub task_ref: Option<String>,
    /// Service-assigned task id.
    pub id: i64,
    /// Task title.
    pub title: String,
}

/// Outcome of [`Orchestrator::batch_create`].
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Number of tasks created.
    pub created: usize,
    /// The created tasks, in input order.
    pub tasks: Vec<CreatedRef>,
    /// Labels auto-created along the way.
    pub labels_created: Vec<String>,
    /// Number of relations created.
    pub relations_created: usize,
    /// Per-item failures, in the order they occurred.
    pub errors: Vec<String>,
}

/// One task's target position, as applied by position operations.
#[derive(Debug, Clone, Serialize)]
pub struct TaskPosition {
    /// Task to move.
    pub task_id: i64,
    /// Fractional position within the view.
    pub position: f64,
}

/// Outcome of [`Orchestrator::sort_bucket`].
#[derive(Debug, Default, Serialize)]
pub struct SortReport {
    /// Number of tasks whose position was updated.
    pub sorted: usize,
    /// The applied positions, in final order.
    pub tasks: Vec<TaskPosition>,
    /// Strategy that was applied.
    pub strategy: String,
    /// Per-item failures.
    pub errors: Vec<String>,
}

/// Outcome of [`Orchestrator::set_positions`].
#[derive(Debug, Default, Serialize)]
pub struct PositionReport {
    /// Number of tasks whose position was updated.
    pub updated: usize,
    /// The positions that were applied.
    pub tasks: Vec<TaskPosition>,
    /// Per-item failures.
    pub errors: Vec<String>,
}

/// A label to ensure exists, for [`Orchestrator::setup_project`].
#[derive(Debug, Clone)]
pub struct LabelSpec {
    /// Label title.
    pub name: String,
    /// Hex color; a palette default is used when absent.
    pub color: Option<String>,
}

/// Outcome of [`Orchestrator::setup_project`].
#[derive(Debug, Default, Serialize)]
pub struct SetupReport {
    /// Buckets that had to be created.
    pub buckets_created: Vec<String>,
    /// Labels that had to be created.
    pub labels_created: Vec<String>,
    /// Report of the initial task batch, when tasks were supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<BatchReport>,
    /// Failures that did not abort the setup.
    pub errors: Vec<String>,
}

/// Drives multi-step workflows over the API client and the configuration
/// store.
#[derive(Debug)]
pub struct Orchestrator {
    client: ApiClient,
    store: ConfigStore,
}

impl Orchestrator {
    /// Creates an orchestrator over a client and a configuration store.
    #[must_use]
    pub fn new(client: ApiClient, store: ConfigStore) -> Self {
        Self { client, store }
    }

    /// The underlying API client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The underlying configuration store.
    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Creates a batch of tasks in a project, then attaches labels,
    /// wires relations between batch members, places tasks into kanban
    /// buckets, and auto-sorts the touched buckets.
    #[instrument(skip(self, tasks, options), fields(tasks = tasks.len()))]
    pub async fn batch_create(
        &self,
        project_id: i64,
        mut tasks: Vec<TaskInput>,
        options: &BatchOptions,
    ) -> BatchResult<BatchReport> {
        let mut report = BatchReport::default();

        let config = if options.use_project_config {
            self.store.get(project_id)?
        } else {
            None
        };

        if let Some(config) = &config {
            apply_config_defaults(&mut tasks, config, options);
        }

        let mut label_map: HashMap<String, i64> = self
            .client
            .list_labels()
            .await?
            .into_iter()
            .map(|label| (label.title, label.id))
            .collect();

        if options.create_missing_labels {
            let missing = missing_names(
                tasks.iter().flat_map(|t| t.labels.iter()),
                &label_map,
            );
            for (i, name) in missing.iter().enumerate() {
                let color = LABEL_PALETTE[i % LABEL_PALETTE.len()];
                match self.client.create_label(name, color).await {
                    Ok(label) => {
                        label_map.insert(name.clone(), label.id);
                        report.labels_created.push(name.clone());
                    }
                    Err(err) => {
                        report
                            .errors
                            .push(format!("Failed to create label '{name}': {err}"));
                    }
                }
            }
        }

        // The kanban view is only fetched when some task names a bucket;
        // a failure downgrades placement and sorting rather than
        // aborting the batch.
        let mut view: Option<View> = None;
        let mut bucket_map: HashMap<String, i64> = HashMap::new();
        if tasks.iter().any(|t| t.bucket.is_some()) {
            match self.resolve_buckets(project_id).await {
                Ok((kanban, buckets)) => {
                    if options.create_missing_buckets {
                        let missing = missing_names(
                            tasks.iter().filter_map(|t| t.bucket.as_ref()),
                            &buckets,
                        );
                        let mut next = buckets.len();
                        bucket_map = buckets;
                        for name in missing {
                            match self
                                .client
                                .create_bucket(project_id, kanban.id, &name, index_position(next))
                                .await
                            {
                                Ok(bucket) => {
                                    bucket_map.insert(name, bucket.id);
                                    next += 1;
                                }
                                Err(err) => {
                                    report.errors.push(format!(
                                        "Failed to create bucket '{name}': {err}"
                                    ));
                                }
                            }
                        }
                    } else {
                        bucket_map = buckets;
                    }
                    view = Some(kanban);
                }
                Err(err) => {
                    warn!(error = %err, "kanban view unavailable, skipping placement");
                    report
                        .errors
                        .push(format!("Failed to get kanban view: {err}"));
                }
            }
        }

        // Phase: create tasks, in input order.
        let mut refs: HashMap<String, i64> = HashMap::new();
        let mut created: Vec<(usize, i64)> = Vec::new();
        for (index, task) in tasks.iter().enumerate() {
            match self.client.create_task(project_id, &task.to_create_input()).await {
                Ok(remote) => {
                    if let Some(r) = &task.task_ref {
                        refs.insert(r.clone(), remote.id);
                    }
                    report.tasks.push(CreatedRef {
                        task_ref: task.task_ref.clone(),
                        id: remote.id,
                        title: remote.title,
                    });
                    created.push((index, remote.id));
                }
                Err(err) => {
                    report
                        .errors
                        .push(format!("Failed to create task '{}': {err}", task.title));
                }
            }
        }
        report.created = created.len();

        // Phase: attach labels.
        for &(index, task_id) in &created {
            for name in &tasks[index].labels {
                match label_map.get(name) {
                    Some(&label_id) => {
                        if let Err(err) = self.client.add_label(task_id, label_id).await {
                            report.errors.push(format!(
                                "Failed to add label '{name}' to task {task_id}: {err}"
                            ));
                        }
                    }
                    None => {
                        report
                            .errors
                            .push(format!("Label '{name}' not found for task {task_id}"));
                    }
                }
            }
        }

        // Phase: wire relations between batch members.
        for &(index, task_id) in &created {
            let task = &tasks[index];
            for other_ref in &task.blocked_by {
                self.relate(task_id, RelationKind::Blocked, other_ref, "blocked_by", &refs, &mut report)
                    .await;
            }
            for other_ref in &task.blocks {
                self.relate(task_id, RelationKind::Blocking, other_ref, "blocks", &refs, &mut report)
                    .await;
            }
            if let Some(other_ref) = &task.subtask_of {
                self.relate(task_id, RelationKind::ParentTask, other_ref, "subtask_of", &refs, &mut report)
                    .await;
            }
        }

        // Phase: place tasks into buckets.
        if let Some(view) = &view {
            for &(index, task_id) in &created {
                let Some(name) = &tasks[index].bucket else {
                    continue;
                };
                match bucket_map.get(name) {
                    Some(&bucket_id) => {
                        if let Err(err) = self
                            .client
                            .add_task_to_bucket(project_id, view.id, bucket_id, task_id)
                            .await
                        {
                            report.errors.push(format!(
                                "Failed to place task {task_id} in bucket '{name}': {err}"
                            ));
                        }
                    }
                    None => {
                        report
                            .errors
                            .push(format!("Bucket '{name}' not found for task {task_id}"));
                    }
                }
            }
        }

        // Phase: auto-sort the touched buckets.
        if options.apply_sort {
            if let (Some(config), Some(view)) = (&config, &view) {
                self.sort_created(project_id, view, config, &tasks, &created, &bucket_map, &mut report)
                    .await;
            }
        }

        info!(
            project_id,
            created = report.created,
            errors = report.errors.len(),
            "batch create finished"
        );
        Ok(report)
    }

    /// Expands a stored template against an anchor instant and creates
    /// the resulting tasks as a batch.
    #[instrument(skip(self, extra_labels))]
    pub async fn create_from_template(
        &self,
        project_id: i64,
        template_name: &str,
        anchor: &str,
        extra_labels: &[String],
        title_suffix: &str,
        bucket: Option<&str>,
    ) -> BatchResult<BatchReport> {
        let config = self
            .store
            .get(project_id)?
            .ok_or(BatchError::MissingProjectConfig(project_id))?;
        let template = config.templates.get(template_name).ok_or_else(|| {
            BatchError::TemplateNotFound {
                name: template_name.to_string(),
                available: config.templates.keys().cloned().collect(),
            }
        })?;

        let tasks = expand(template, anchor, extra_labels, title_suffix, bucket)?;
        self.batch_create(project_id, tasks, &BatchOptions::default())
            .await
    }

    /// Re-sorts every task in a bucket per the configured strategy,
    /// assigning evenly spaced positions.
    #[instrument(skip(self))]
    pub async fn sort_bucket(
        &self,
        project_id: i64,
        view_id: i64,
        bucket_id: i64,
    ) -> BatchResult<SortReport> {
        let mut report = SortReport::default();

        let Some(config) = self.store.get(project_id)? else {
            report
                .errors
                .push(format!("No configuration for project {project_id}"));
            return Ok(report);
        };

        // The bucket must resolve before sorting: guessing a strategy for
        // an unknown bucket could override a manual one.
        let buckets = match self.client.list_buckets(project_id, view_id).await {
            Ok(buckets) => buckets,
            Err(err) => {
                report
                    .errors
                    .push(format!("Failed to list buckets: {err}"));
                return Ok(report);
            }
        };
        let Some(bucket_name) = buckets
            .into_iter()
            .find(|b| b.id == bucket_id)
            .map(|b| b.title)
        else {
            report.errors.push(format!("Bucket {bucket_id} not found"));
            return Ok(report);
        };

        let strategy = config
            .sort_strategy
            .buckets
            .get(&bucket_name)
            .copied()
            .unwrap_or(config.sort_strategy.default);
        report.strategy = strategy.to_string();
        if matches!(strategy, SortStrategy::Manual | SortStrategy::Unknown) {
            report
                .errors
                .push(format!("Bucket {bucket_id} is not auto-sorted ({strategy})"));
            return Ok(report);
        }

        let mut bucket_tasks = self
            .client
            .bucket_tasks(project_id, view_id, bucket_id)
            .await?;
        // Stable sort, so equal keys keep their current relative order.
        bucket_tasks.sort_by_cached_key(|task| task_key(task, strategy));

        let positions: Vec<TaskPosition> = bucket_tasks
            .iter()
            .enumerate()
            .map(|(i, task)| TaskPosition {
                task_id: task.id,
                position: index_position(i + 1) * 1000.0,
            })
            .collect();
        let applied = self.set_positions(view_id, &positions).await;
        report.sorted = applied.updated;
        report.tasks = applied.tasks;
        report.errors.extend(applied.errors);
        Ok(report)
    }

    /// Applies explicit positions to tasks within a view, one at a time.
    #[instrument(skip(self, positions), fields(positions = positions.len()))]
    pub async fn set_positions(
        &self,
        view_id: i64,
        positions: &[TaskPosition],
    ) -> PositionReport {
        let mut report = PositionReport::default();
        for entry in positions {
            match self
                .client
                .set_task_position(entry.task_id, view_id, entry.position)
                .await
            {
                Ok(()) => {
                    report.updated += 1;
                    report.tasks.push(entry.clone());
                }
                Err(err) => {
                    report.errors.push(format!(
                        "Failed to set position for task {}: {err}",
                        entry.task_id
                    ));
                }
            }
        }
        report
    }

    /// Ensures a project has the given buckets and labels, then creates
    /// an optional initial batch of tasks.
    #[instrument(skip(self, buckets, labels, tasks))]
    pub async fn setup_project(
        &self,
        project_id: i64,
        buckets: &[String],
        labels: &[LabelSpec],
        tasks: Vec<TaskInput>,
    ) -> BatchResult<SetupReport> {
        let mut report = SetupReport::default();

        // The kanban view is only needed for bucket creation; a setup
        // that asks for none must not depend on one existing.
        if !buckets.is_empty() {
            match self.client.kanban_view(project_id).await {
                Ok(view) => {
                    let existing: HashSet<String> = self
                        .client
                        .list_buckets(project_id, view.id)
                        .await?
                        .into_iter()
                        .map(|b| b.title)
                        .collect();
                    for (i, name) in buckets.iter().enumerate() {
                        if existing.contains(name) {
                            continue;
                        }
                        match self
                            .client
                            .create_bucket(project_id, view.id, name, index_position(i))
                            .await
                        {
                            Ok(_) => report.buckets_created.push(name.clone()),
                            Err(err) => {
                                report
                                    .errors
                                    .push(format!("Failed to create bucket '{name}': {err}"));
                            }
                        }
                    }
                }
                Err(err) => {
                    report
                        .errors
                        .push(format!("Failed to get kanban view: {err}"));
                }
            }
        }

        let existing_labels: HashSet<String> = self
            .client
            .list_labels()
            .await?
            .into_iter()
            .map(|l| l.title)
            .collect();
        for label in labels {
            if existing_labels.contains(&label.name) {
                continue;
            }
            let color = label.color.as_deref().unwrap_or(DEFAULT_LABEL_COLOR);
            match self.client.create_label(&label.name, color).await {
                Ok(_) => report.labels_created.push(label.name.clone()),
                Err(err) => {
                    report.errors.push(format!(
                        "Failed to create label '{}': {err}",
                        label.name
                    ));
                }
            }
        }

        if !tasks.is_empty() {
            let options = BatchOptions {
                create_missing_labels: false,
                create_missing_buckets: false,
                ..BatchOptions::default()
            };
            report.tasks = Some(self.batch_create(project_id, tasks, &options).await?);
        }
        Ok(report)
    }

    async fn resolve_buckets(
        &self,
        project_id: i64,
    ) -> Result<(View, HashMap<String, i64>), vikunja_client::ApiError> {
        let view = self.client.kanban_view(project_id).await?;
        let buckets = self
            .client
            .list_buckets(project_id, view.id)
            .await?
            .into_iter()
            .map(|b| (b.title, b.id))
            .collect();
        Ok((view, buckets))
    }

    async fn relate(
        &self,
        task_id: i64,
        kind: RelationKind,
        other_ref: &str,
        field: &str,
        refs: &HashMap<String, i64>,
        report: &mut BatchReport,
    ) {
        let Some(&other_id) = refs.get(other_ref) else {
            report.errors.push(format!(
                "Unknown ref '{other_ref}' in {field} for task {task_id}"
            ));
            return;
        };
        match self.client.create_relation(task_id, kind, other_id).await {
            Ok(()) => report.relations_created += 1,
            Err(err) => {
                report.errors.push(format!(
                    "Failed to create relation for task {task_id}: {err}"
                ));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn sort_created(
        &self,
        project_id: i64,
        view: &View,
        config: &ProjectConfig,
        tasks: &[TaskInput],
        created: &[(usize, i64)],
        bucket_map: &HashMap<String, i64>,
        report: &mut BatchReport,
    ) {
        // Group created tasks by bucket, keeping first-reference order.
        let mut groups: Vec<(String, Vec<(usize, i64)>)> = Vec::new();
        for &(index, task_id) in created {
            let Some(name) = &tasks[index].bucket else {
                continue;
            };
            if !bucket_map.contains_key(name) {
                continue;
            }
            match groups.iter_mut().find(|(n, _)| n == name) {
                Some((_, members)) => members.push((index, task_id)),
                None => groups.push((name.clone(), vec![(index, task_id)])),
            }
        }

        for (name, members) in groups {
            let strategy = config
                .sort_strategy
                .buckets
                .get(&name)
                .copied()
                .unwrap_or(config.sort_strategy.default);
            if matches!(strategy, SortStrategy::Manual | SortStrategy::Unknown) {
                continue;
            }
            let bucket_id = bucket_map[&name];
            let existing = match self
                .client
                .bucket_tasks(project_id, view.id, bucket_id)
                .await
            {
                Ok(tasks) => tasks,
                Err(err) => {
                    report.errors.push(format!(
                        "Failed to fetch tasks of bucket '{name}': {err}"
                    ));
                    continue;
                }
            };

            let new_ids: HashSet<i64> = members.iter().map(|&(_, id)| id).collect();
            let entries: Vec<(SortKey, f64)> = existing
                .iter()
                .filter(|task| !new_ids.contains(&task.id))
                .map(|task| (task_key(task, strategy), task.position))
                .collect();
            let mut ladder = PositionLadder::new(entries);

            for (index, task_id) in members {
                let key = input_key(&tasks[index], task_id, strategy);
                let position = ladder.allocate(key);
                if let Err(err) = self
                    .client
                    .set_task_position(task_id, view.id, position)
                    .await
                {
                    report.errors.push(format!(
                        "Failed to set position for task {task_id}: {err}"
                    ));
                }
            }
        }
    }
}

fn apply_config_defaults(tasks: &mut [TaskInput], config: &ProjectConfig, options: &BatchOptions) {
    for task in tasks.iter_mut() {
        if options.apply_default_labels
            && task.labels.is_empty()
            && !config.default_labels.is_empty()
        {
            task.labels = config.default_labels.clone();
        }
        if task.bucket.is_none() {
            task.bucket.clone_from(&config.default_bucket);
        }
    }
}

/// Names referenced by the batch that the service does not know yet, in
/// first-reference order.
fn missing_names<'a>(
    referenced: impl Iterator<Item = &'a String>,
    known: &HashMap<String, i64>,
) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    referenced
        .filter(|name| !known.contains_key(name.as_str()) && seen.insert(name.as_str()))
        .cloned()
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn index_position(index: usize) -> f64 {
    index as f64
}
