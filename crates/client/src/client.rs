//! HTTP client for the Vikunja REST API.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Bucket, Label, Project, ProjectCreateInput, RelationKind, RelationSummary, Task,
    TaskCreateInput, View,
};

/// Authenticated client for a single Vikunja instance.
///
/// All methods map error statuses the same way: 401 to
/// [`ApiError::Authentication`], 404 to [`ApiError::NotFound`], anything
/// else >= 400 to [`ApiError::Api`]. No retries are performed.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` authenticating with a bearer token.
    ///
    /// # Errors
    /// Returns an error if the token is not a valid header value or the
    /// HTTP client cannot be constructed.
    pub fn new(base_url: &str, token: &str) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(ApiError::InvalidToken)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    /// Execute a request and decode the JSON body, applying the shared
    /// error-status mapping.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Execute a request and discard the body (DELETE and placement calls
    /// return nothing useful).
    async fn send_unit(&self, request: reqwest::RequestBuilder) -> ApiResult<()> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ApiError::Authentication(
                response.text().await.unwrap_or_default(),
            ));
        }
        if status.as_u16() == 404 {
            return Err(ApiError::NotFound(
                response.text().await.unwrap_or_default(),
            ));
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response)
    }

    // =========================================================================
    // Project Operations
    // =========================================================================

    /// List all projects visible to the token.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.send(self.http.get(self.url("/projects"))).await
    }

    /// Get a single project.
    #[instrument(skip(self))]
    pub async fn get_project(&self, project_id: i64) -> ApiResult<Project> {
        self.send(self.http.get(self.url(&format!("/projects/{project_id}"))))
            .await
    }

    /// Create a project.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_project(&self, input: &ProjectCreateInput) -> ApiResult<Project> {
        self.send(self.http.put(self.url("/projects")).json(input))
            .await
    }

    /// Replace a project. The service overwrites the whole record, so
    /// callers should fetch, modify, and send back the full entity.
    #[instrument(skip(self, project))]
    pub async fn replace_project(&self, project_id: i64, project: &Project) -> ApiResult<Project> {
        self.send(
            self.http
                .post(self.url(&format!("/projects/{project_id}")))
                .json(project),
        )
        .await
    }

    /// Delete a project and all of its tasks.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, project_id: i64) -> ApiResult<()> {
        self.send_unit(self.http.delete(self.url(&format!("/projects/{project_id}"))))
            .await
    }

    // =========================================================================
    // Task Operations
    // =========================================================================

    /// List tasks in a project.
    #[instrument(skip(self))]
    pub async fn list_tasks(&self, project_id: i64) -> ApiResult<Vec<Task>> {
        self.send(
            self.http
                .get(self.url(&format!("/projects/{project_id}/tasks"))),
        )
        .await
    }

    /// Get a single task.
    #[instrument(skip(self))]
    pub async fn get_task(&self, task_id: i64) -> ApiResult<Task> {
        self.send(self.http.get(self.url(&format!("/tasks/{task_id}"))))
            .await
    }

    /// Create a task in a project.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_task(&self, project_id: i64, input: &TaskCreateInput) -> ApiResult<Task> {
        let task: Task = self
            .send(
                self.http
                    .put(self.url(&format!("/projects/{project_id}/tasks")))
                    .json(input),
            )
            .await?;
        debug!(task_id = task.id, "created task");
        Ok(task)
    }

    /// Replace a task. As with projects, the service overwrites the whole
    /// record.
    #[instrument(skip(self, task))]
    pub async fn replace_task(&self, task_id: i64, task: &Task) -> ApiResult<Task> {
        self.send(
            self.http
                .post(self.url(&format!("/tasks/{task_id}")))
                .json(task),
        )
        .await
    }

    /// Delete a task permanently.
    #[instrument(skip(self))]
    pub async fn delete_task(&self, task_id: i64) -> ApiResult<()> {
        self.send_unit(self.http.delete(self.url(&format!("/tasks/{task_id}"))))
            .await
    }

    // =========================================================================
    // Label Operations
    // =========================================================================

    /// List all labels visible to the token.
    #[instrument(skip(self))]
    pub async fn list_labels(&self) -> ApiResult<Vec<Label>> {
        self.send(self.http.get(self.url("/labels"))).await
    }

    /// Create a label.
    #[instrument(skip(self))]
    pub async fn create_label(&self, title: &str, hex_color: &str) -> ApiResult<Label> {
        self.send(
            self.http
                .put(self.url("/labels"))
                .json(&json!({ "title": title, "hex_color": hex_color })),
        )
        .await
    }

    /// Delete a label.
    #[instrument(skip(self))]
    pub async fn delete_label(&self, label_id: i64) -> ApiResult<()> {
        self.send_unit(self.http.delete(self.url(&format!("/labels/{label_id}"))))
            .await
    }

    /// Attach a label to a task.
    #[instrument(skip(self))]
    pub async fn add_label(&self, task_id: i64, label_id: i64) -> ApiResult<()> {
        self.send_unit(
            self.http
                .put(self.url(&format!("/tasks/{task_id}/labels")))
                .json(&json!({ "label_id": label_id })),
        )
        .await
    }

    // =========================================================================
    // Relation Operations
    // =========================================================================

    /// Create a relation from `task_id` to `other_task_id`.
    #[instrument(skip(self))]
    pub async fn create_relation(
        &self,
        task_id: i64,
        kind: RelationKind,
        other_task_id: i64,
    ) -> ApiResult<()> {
        self.send_unit(
            self.http
                .put(self.url(&format!("/tasks/{task_id}/relations")))
                .json(&json!({ "other_task_id": other_task_id, "relation_kind": kind })),
        )
        .await
    }

    /// List all relations of a task, flattened across relation kinds.
    #[instrument(skip(self))]
    pub async fn list_relations(&self, task_id: i64) -> ApiResult<Vec<RelationSummary>> {
        let task = self.get_task(task_id).await?;
        let mut relations = Vec::new();
        for (kind, others) in task.related_tasks.unwrap_or_default() {
            for other in others.unwrap_or_default() {
                relations.push(RelationSummary {
                    task_id,
                    other_task_id: other.id,
                    other_task_title: other.title,
                    relation_kind: kind.clone(),
                });
            }
        }
        Ok(relations)
    }

    // =========================================================================
    // View Operations
    // =========================================================================

    /// List all views of a project.
    #[instrument(skip(self))]
    pub async fn list_views(&self, project_id: i64) -> ApiResult<Vec<View>> {
        self.send(
            self.http
                .get(self.url(&format!("/projects/{project_id}/views"))),
        )
        .await
    }

    /// Get the project's kanban view (every project gets one by default).
    #[instrument(skip(self))]
    pub async fn kanban_view(&self, project_id: i64) -> ApiResult<View> {
        let views = self.list_views(project_id).await?;
        views
            .into_iter()
            .find(|v| v.view_kind == "kanban")
            .ok_or(ApiError::NoKanbanView(project_id))
    }

    // =========================================================================
    // Bucket Operations
    // =========================================================================

    /// List the buckets of a view.
    #[instrument(skip(self))]
    pub async fn list_buckets(&self, project_id: i64, view_id: i64) -> ApiResult<Vec<Bucket>> {
        self.send(
            self.http
                .get(self.url(&format!("/projects/{project_id}/views/{view_id}/buckets"))),
        )
        .await
    }

    /// Create a bucket in a view.
    #[instrument(skip(self))]
    pub async fn create_bucket(
        &self,
        project_id: i64,
        view_id: i64,
        title: &str,
        position: f64,
    ) -> ApiResult<Bucket> {
        self.send(
            self.http
                .put(self.url(&format!("/projects/{project_id}/views/{view_id}/buckets")))
                .json(&json!({ "title": title, "position": position })),
        )
        .await
    }

    /// Delete a bucket from a view.
    #[instrument(skip(self))]
    pub async fn delete_bucket(
        &self,
        project_id: i64,
        view_id: i64,
        bucket_id: i64,
    ) -> ApiResult<()> {
        self.send_unit(self.http.delete(self.url(&format!(
            "/projects/{project_id}/views/{view_id}/buckets/{bucket_id}"
        ))))
        .await
    }

    /// Fetch the tasks of one bucket, with their view positions.
    ///
    /// The view tasks endpoint returns every bucket with its nested tasks;
    /// this extracts the requested bucket's list. An absent bucket yields
    /// an empty list.
    #[instrument(skip(self))]
    pub async fn bucket_tasks(
        &self,
        project_id: i64,
        view_id: i64,
        bucket_id: i64,
    ) -> ApiResult<Vec<Task>> {
        let buckets: Vec<Bucket> = self
            .send(
                self.http
                    .get(self.url(&format!("/projects/{project_id}/views/{view_id}/tasks"))),
            )
            .await?;
        Ok(buckets
            .into_iter()
            .find(|b| b.id == bucket_id)
            .and_then(|b| b.tasks)
            .unwrap_or_default())
    }

    // =========================================================================
    // Placement and Positioning
    // =========================================================================

    /// Place a task in a bucket (appended, no computed position).
    #[instrument(skip(self))]
    pub async fn add_task_to_bucket(
        &self,
        project_id: i64,
        view_id: i64,
        bucket_id: i64,
        task_id: i64,
    ) -> ApiResult<()> {
        self.send_unit(
            self.http
                .post(self.url(&format!(
                    "/projects/{project_id}/views/{view_id}/buckets/{bucket_id}/tasks"
                )))
                .json(&json!({
                    "task_id": task_id,
                    "bucket_id": bucket_id,
                    "project_view_id": view_id,
                    "project_id": project_id,
                })),
        )
        .await
    }

    /// Set a task's fractional position within a view.
    #[instrument(skip(self))]
    pub async fn set_task_position(
        &self,
        task_id: i64,
        view_id: i64,
        position: f64,
    ) -> ApiResult<()> {
        self.send_unit(
            self.http
                .post(self.url(&format!("/tasks/{task_id}/position")))
                .json(&json!({ "project_view_id": view_id, "position": position })),
        )
        .await
    }
}
