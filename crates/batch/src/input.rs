//! Batch task input definitions.

use serde::{Deserialize, Serialize};
use vikunja_client::TaskCreateInput;

/// One task in a batch request, with optional local wiring to other
/// tasks in the same batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskInput {
    /// Task title.
    pub title: String,
    /// Task description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start timestamp (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// End timestamp (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Due timestamp (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Priority 0-5. Zero means unset and is not sent to the service.
    #[serde(default)]
    pub priority: i64,
    /// Label names to attach after creation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Kanban bucket name to place the task in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Local reference other tasks in the batch can point at.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "ref")]
    pub task_ref: Option<String>,
    /// Refs of batch tasks that block this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,
    /// Refs of batch tasks this one blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<String>,
    /// Ref of the batch task this one is a subtask of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtask_of: Option<String>,
}

impl TaskInput {
    /// The creation payload for this input. Labels, bucket, and relations
    /// are applied in separate calls after the task exists.
    #[must_use]
    pub fn to_create_input(&self) -> TaskCreateInput {
        TaskCreateInput {
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            due_date: self.due_date.clone(),
            priority: (self.priority != 0).then_some(self.priority),
        }
    }
}
