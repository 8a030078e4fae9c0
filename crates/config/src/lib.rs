#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! # vikunja-config
//!
//! File-backed store for per-project automation settings: default sort
//! strategies, default labels and buckets, and reusable task templates.
//!
//! The whole configuration lives in one YAML document keyed by
//! decimal-string project id. The store is stateless: every operation
//! re-reads the document, transforms it, and atomically rewrites it
//! (temp file + rename). There is no locking; concurrent writers race
//! with last-writer-wins over the whole document.

pub mod document;
pub mod error;
pub mod store;

pub use document::{
    ConfigDocument, ProjectConfig, ProjectSummary, SortStrategy, SortStrategyConfig, TemplateDef,
    TemplateTask,
};
pub use error::{ConfigError, ConfigResult};
pub use store::{deep_merge, ConfigStore};
