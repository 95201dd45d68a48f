//! HTTP endpoints for the university lookup service

use crate::app::context::AppContext;
use crate::core::{tasks, CountryRequest, CountryResult, TaskInfo, TaskState};
use crate::utils::error::ServiceError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

/// Build API router
pub fn router(context: AppContext) -> Router {
    Router::new()
        .route("/universities", post(get_universities))
        .route("/universities/", post(get_universities))
        .route("/universities/async", post(submit_universities))
        .route("/universities/task/{task_id}", get(get_task_status))
        .route("/universities/parallel", post(get_universities_parallel))
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

/// Async submission response
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub task_id: String,
}

/// Task status response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub task_id: String,
    pub task_status: TaskState,
    pub task_result: serde_json::Value,
    pub retries: u32,
}

impl From<TaskInfo> for TaskStatusResponse {
    fn from(info: TaskInfo) -> Self {
        let task_result = match info.state {
            TaskState::Success => info
                .result
                .and_then(|result| serde_json::to_value(result).ok())
                .unwrap_or(serde_json::Value::Null),
            TaskState::Retry | TaskState::Failure => info
                .error
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null),
            TaskState::Pending | TaskState::Started => serde_json::Value::Null,
        };

        Self {
            task_id: info.task_id,
            task_status: info.state,
            task_result,
            retries: info.retries,
        }
    }
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self);
        }
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn parse_request(
    payload: std::result::Result<Json<CountryRequest>, JsonRejection>,
) -> Result<CountryRequest, ServiceError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| ServiceError::ValidationError {
            message: rejection.body_text(),
        })
}

// API Handlers

/// Fetch every requested country inline
async fn get_universities(
    State(context): State<AppContext>,
    payload: std::result::Result<Json<CountryRequest>, JsonRejection>,
) -> Result<Json<CountryResult>, ServiceError> {
    let request = parse_request(payload)?;
    let data = tasks::fetch_many(context.directory.as_ref(), &request.countries).await?;
    Ok(Json(data))
}

/// Submit a fetch-many task and return its id immediately
async fn submit_universities(
    State(context): State<AppContext>,
    payload: std::result::Result<Json<CountryRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ServiceError> {
    let request = parse_request(payload)?;
    let task_id = context.dispatcher.submit_many(request.countries)?;
    Ok(Json(SubmitResponse { task_id }))
}

async fn get_task_status(
    State(context): State<AppContext>,
    Path(task_id): Path<String>,
) -> Json<TaskStatusResponse> {
    Json(context.dispatcher.status(&task_id).into())
}

/// Fan out one task per country and wait for the whole group
async fn get_universities_parallel(
    State(context): State<AppContext>,
    payload: std::result::Result<Json<CountryRequest>, JsonRejection>,
) -> Result<Json<CountryResult>, ServiceError> {
    let request = parse_request(payload)?;
    let data = context.dispatcher.submit_group(request.countries).await?;
    Ok(Json(data))
}
