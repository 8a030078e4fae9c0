//! Vikunja entity type definitions.
//!
//! Date fields are kept as ISO-8601 strings and passed through to the API
//! verbatim; the batch layer compares them lexicographically, which is
//! order-preserving for ISO timestamps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Vikunja project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: i64,
    /// Project title.
    pub title: String,
    /// Project description.
    #[serde(default)]
    pub description: String,
    /// Parent project ID (0 = top-level).
    #[serde(default)]
    pub parent_project_id: i64,
    /// Color in hex format.
    #[serde(default)]
    pub hex_color: String,
}

/// Vikunja task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: i64,
    /// Task title.
    pub title: String,
    /// Task description.
    #[serde(default)]
    pub description: String,
    /// Whether the task is completed.
    #[serde(default)]
    pub done: bool,
    /// Priority: 0 = none up to 5 = critical.
    #[serde(default)]
    pub priority: i64,
    /// View-specific fractional position.
    #[serde(default)]
    pub position: f64,
    /// Start timestamp (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// End timestamp (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Due timestamp (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Owning project.
    #[serde(default)]
    pub project_id: i64,
    /// Kanban bucket the task sits in (0 = none).
    #[serde(default)]
    pub bucket_id: i64,
    /// Labels attached to the task. The API sends `null` when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
    /// Related tasks keyed by relation kind. The API sends `null` when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_tasks: Option<BTreeMap<String, Option<Vec<Task>>>>,
}

impl Task {
    /// Labels attached to the task, empty when the API sent `null`.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        self.labels.as_deref().unwrap_or_default()
    }
}

/// Vikunja label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// Unique identifier.
    pub id: i64,
    /// Label title.
    pub title: String,
    /// Color in hex format.
    #[serde(default)]
    pub hex_color: String,
}

/// Kanban bucket (workflow column) within a view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    /// Unique identifier.
    pub id: i64,
    /// Bucket title.
    pub title: String,
    /// Sort position among buckets.
    #[serde(default)]
    pub position: f64,
    /// WIP limit (0 = none).
    #[serde(default)]
    pub limit: i64,
    /// Nested tasks, present when fetched through the view tasks endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

/// Project view (list, kanban, gantt, table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    /// Unique identifier.
    pub id: i64,
    /// View title.
    pub title: String,
    /// Owning project.
    #[serde(default)]
    pub project_id: i64,
    /// View kind: `list`, `kanban`, `gantt`, or `table`.
    #[serde(default)]
    pub view_kind: String,
}

/// Task relation kinds understood by Vikunja.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// The other task is this task's subtask.
    Subtask,
    /// The other task is this task's parent.
    #[serde(rename = "parenttask")]
    ParentTask,
    /// General association.
    Related,
    /// This task blocks the other task.
    Blocking,
    /// This task is blocked by the other task.
    Blocked,
    /// This task duplicates the other task.
    #[serde(rename = "duplicateof")]
    DuplicateOf,
    /// The other task duplicates this task.
    Duplicates,
    /// This task precedes the other task.
    Precedes,
    /// This task follows the other task.
    Follows,
    /// This task was copied from the other task.
    #[serde(rename = "copiedfrom")]
    CopiedFrom,
    /// This task was copied to the other task.
    #[serde(rename = "copiedto")]
    CopiedTo,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subtask => "subtask",
            Self::ParentTask => "parenttask",
            Self::Related => "related",
            Self::Blocking => "blocking",
            Self::Blocked => "blocked",
            Self::DuplicateOf => "duplicateof",
            Self::Duplicates => "duplicates",
            Self::Precedes => "precedes",
            Self::Follows => "follows",
            Self::CopiedFrom => "copiedfrom",
            Self::CopiedTo => "copiedto",
        };
        write!(f, "{name}")
    }
}

/// Flattened relation entry, as reported by [`crate::ApiClient::list_relations`].
#[derive(Debug, Clone, Serialize)]
pub struct RelationSummary {
    /// Source task.
    pub task_id: i64,
    /// Target task.
    pub other_task_id: i64,
    /// Target task title.
    pub other_task_title: String,
    /// Relation kind as reported by the service.
    pub relation_kind: String,
}

/// Input for creating a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectCreateInput {
    /// Project title.
    pub title: String,
    /// Project description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Color in hex format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_color: Option<String>,
    /// Parent project for nesting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_project_id: Option<i64>,
}

/// Input for creating a task. Absent fields are omitted from the payload
/// so the service applies its own defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskCreateInput {
    /// Task title.
    pub title: String,
    /// Task description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start timestamp (ISO-8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// End timestamp (ISO-8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Due timestamp (ISO-8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Priority 0-5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}
