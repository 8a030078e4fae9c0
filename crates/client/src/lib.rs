#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! # vikunja-client
//!
//! Typed REST client for the Vikunja task-tracking API.
//!
//! Covers the entity surface the batch tooling needs: projects, tasks,
//! labels, relations, views, kanban buckets, bucket placement, and
//! view-relative positioning. Authentication is a static bearer token
//! installed as a default header.
//!
//! Error mapping is uniform across every call: HTTP 401 becomes
//! [`ApiError::Authentication`], 404 becomes [`ApiError::NotFound`], and
//! any other status >= 400 becomes [`ApiError::Api`] carrying the
//! response body as diagnostic context.

pub mod client;
pub mod error;
pub mod models;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use models::{
    Bucket, Label, Project, ProjectCreateInput, RelationKind, RelationSummary, Task,
    TaskCreateInput, View,
};
