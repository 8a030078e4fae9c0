#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! # vikunja-batch
//!
//! Batch automation over the Vikunja API: multi-task creation with local
//! cross-references, template expansion, and fractional-position
//! auto-sorting of kanban buckets.
//!
//! All remote work goes through [`vikunja_client::ApiClient`] and is
//! strictly sequential: operations within a batch happen one at a time,
//! in input order, so local refs always resolve to already-created tasks
//! and position allocation never races with itself.

pub mod error;
pub mod input;
pub mod orchestrator;
pub mod position;
pub mod sort;
pub mod template;

pub use error::{BatchError, BatchResult};
pub use input::TaskInput;
pub use orchestrator::{
    BatchOptions, BatchReport, CreatedRef, LabelSpec, Orchestrator, PositionReport, SetupReport,
    SortReport, TaskPosition, LABEL_PALETTE,
};
pub use position::{PositionLadder, FIRST_POSITION, HEAD_FLOOR, POSITION_GAP};
pub use sort::{input_key, task_key, SortKey, UNDATED_SENTINEL};
pub use template::expand;
