//! Sort key extraction for auto-sorting bucket tasks.

use vikunja_client::Task;
use vikunja_config::SortStrategy;

use crate::input::TaskInput;

/// Sentinel date that sorts after any real ISO timestamp, so undated
/// tasks land at the end under date strategies.
pub const UNDATED_SENTINEL: &str = "9999-12-31";

/// Comparable sort key derived from a task under a given strategy.
///
/// Keys only compare meaningfully within one strategy; the derived
/// ordering across variants is never exercised because a sorting pass
/// uses a single strategy throughout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// ISO timestamp (lexicographic order matches chronological order).
    Date(String),
    /// Negated priority, so higher priorities sort first.
    Priority(i64),
    /// Lowercased title.
    Text(String),
    /// Service-assigned id (creation order).
    Id(i64),
    /// No ordering under this strategy.
    Unordered,
}

fn date_key(value: Option<&str>) -> SortKey {
    match value.filter(|s| !s.is_empty()) {
        Some(date) => SortKey::Date(date.to_string()),
        None => SortKey::Date(UNDATED_SENTINEL.to_string()),
    }
}

/// Sort key for an existing task.
#[must_use]
pub fn task_key(task: &Task, strategy: SortStrategy) -> SortKey {
    match strategy {
        SortStrategy::StartDate => date_key(task.start_date.as_deref()),
        SortStrategy::DueDate => date_key(task.due_date.as_deref()),
        SortStrategy::EndDate => date_key(task.end_date.as_deref()),
        SortStrategy::Priority => SortKey::Priority(-task.priority),
        SortStrategy::Alphabetical => SortKey::Text(task.title.to_lowercase()),
        SortStrategy::Created => SortKey::Id(task.id),
        SortStrategy::Manual | SortStrategy::Unknown => SortKey::Unordered,
    }
}

/// Sort key for a just-created batch input, given the id the service
/// assigned to it.
#[must_use]
pub fn input_key(input: &TaskInput, created_id: i64, strategy: SortStrategy) -> SortKey {
    match strategy {
        SortStrategy::StartDate => date_key(input.start_date.as_deref()),
        SortStrategy::DueDate => date_key(input.due_date.as_deref()),
        SortStrategy::EndDate => date_key(input.end_date.as_deref()),
        SortStrategy::Priority => SortKey::Priority(-input.priority),
        SortStrategy::Alphabetical => SortKey::Text(input.title.to_lowercase()),
        SortStrategy::Created => SortKey::Id(created_id),
        SortStrategy::Manual | SortStrategy::Unknown => SortKey::Unordered,
    }
}
