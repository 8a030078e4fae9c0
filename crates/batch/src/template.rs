//! Template expansion into batch task inputs.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use vikunja_config::TemplateDef;

use crate::error::{BatchError, BatchResult};
use crate::input::TaskInput;

fn parse_anchor(value: &str) -> BatchResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    // A bare local timestamp is treated as UTC.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|err| BatchError::InvalidAnchor {
            value: value.to_string(),
            message: err.to_string(),
        })
}

/// Expands a template into concrete task inputs relative to an anchor
/// instant.
///
/// Each task starts `offset_hours` from the anchor, snapped back to that
/// day's midnight, and ends at 23:59 on the day the offset plus duration
/// lands on. Template default labels come first, then `extra_labels`, in
/// order and without deduplication. A non-empty `title_suffix` is
/// appended to every title, separated by a space.
pub fn expand(
    template: &TemplateDef,
    anchor: &str,
    extra_labels: &[String],
    title_suffix: &str,
    bucket: Option<&str>,
) -> BatchResult<Vec<TaskInput>> {
    let anchor = parse_anchor(anchor)?;

    let mut labels = template.default_labels.clone();
    labels.extend(extra_labels.iter().cloned());

    Ok(template
        .tasks
        .iter()
        .map(|task| {
            let start = anchor + Duration::hours(task.offset_hours);
            let end = start + Duration::hours(task.duration_hours);
            let title = if title_suffix.is_empty() {
                task.title.clone()
            } else {
                format!("{} {title_suffix}", task.title)
            };
            TaskInput {
                title,
                start_date: Some(start.format("%Y-%m-%dT00:00:00Z").to_string()),
                end_date: Some(end.format("%Y-%m-%dT23:59:00Z").to_string()),
                labels: labels.clone(),
                bucket: bucket.map(ToString::to_string),
                task_ref: task.task_ref.clone(),
                blocked_by: task.blocked_by.clone(),
                ..Default::default()
            }
        })
        .collect())
}
