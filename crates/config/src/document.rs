//! Typed shape of the configuration document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The whole configuration document: one entry per configured project,
/// keyed by decimal-string project id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Per-project configuration, keyed by decimal-string project id.
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
}

/// Automation settings for one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Human-readable project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordering strategy defaults for the project and per-bucket overrides.
    #[serde(default)]
    pub sort_strategy: SortStrategyConfig,
    /// Labels applied to new tasks when default-label application is opted in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_labels: Vec<String>,
    /// Bucket new tasks land in when they name none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,
    /// Reusable task templates, keyed by template name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub templates: BTreeMap<String, TemplateDef>,
}

/// Sort strategy selection: a project-wide default plus per-bucket-name
/// overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SortStrategyConfig {
    /// Strategy used when a bucket has no override.
    #[serde(default)]
    pub default: SortStrategy,
    /// Per-bucket strategy overrides, keyed by bucket display name
    /// (case-sensitive exact match).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub buckets: BTreeMap<String, SortStrategy>,
}

/// A named ordering rule for tasks within a bucket.
///
/// Unrecognized strategy names deserialize to [`SortStrategy::Unknown`]
/// rather than failing the whole document; unknown strategies behave as
/// unordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// No automatic ordering; positions are left to the user.
    #[default]
    Manual,
    /// Ascending by start timestamp, undated tasks last.
    StartDate,
    /// Ascending by due timestamp, undated tasks last.
    DueDate,
    /// Ascending by end timestamp, undated tasks last.
    EndDate,
    /// Descending by priority.
    Priority,
    /// Case-insensitive by title.
    Alphabetical,
    /// By service-assigned identifier (creation order).
    Created,
    /// Unrecognized strategy name; treated as unordered.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manual => "manual",
            Self::StartDate => "start_date",
            Self::DueDate => "due_date",
            Self::EndDate => "end_date",
            Self::Priority => "priority",
            Self::Alphabetical => "alphabetical",
            Self::Created => "created",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// A reusable task template: a sequence of task definitions with timing
/// relative to an anchor instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TemplateDef {
    /// What the template is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Labels applied to every expanded task, ahead of caller extras.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_labels: Vec<String>,
    /// The task definitions, expanded in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TemplateTask>,
}

/// One task definition inside a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TemplateTask {
    /// Task title (suffix may be appended at expansion time).
    pub title: String,
    /// Hours from the anchor instant to this task's start.
    #[serde(default)]
    pub offset_hours: i64,
    /// Hours from start to end. Defaults to one hour.
    #[serde(default = "default_duration_hours")]
    pub duration_hours: i64,
    /// Local reference for wiring relations within the expanded batch.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "ref")]
    pub task_ref: Option<String>,
    /// Refs of tasks that must complete before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,
}

const fn default_duration_hours() -> i64 {
    1
}

/// One row of [`crate::ConfigStore::list`]: a configured project and its
/// display name.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    /// Project identifier.
    pub project_id: i64,
    /// Configured display name, or a generated placeholder.
    pub name: String,
}
