//! JSON REST handlers for scheduled jobs.
//!
//! Job ids travel in the path as `device|action|value|run_at`, so clients
//! must percent-encode them.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use smarthub_app::ports::{DeviceRepository, JobRepository};
use smarthub_domain::error::SmartHubError;
use smarthub_domain::id::DeviceId;
use smarthub_domain::schedule::{Action, JobKey, ScheduledJob};
use smarthub_domain::time::{self, Timestamp};

use crate::error::ApiError;
use crate::state::AppState;

/// An action argument, given either as text or as a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum JobValue {
    Text(String),
    Number(i64),
}

impl From<JobValue> for String {
    fn from(value: JobValue) -> Self {
        match value {
            JobValue::Text(text) => text,
            JobValue::Number(number) => number.to_string(),
        }
    }
}

/// Request body for scheduling or re-scheduling a job.
#[derive(Deserialize)]
pub struct ScheduleJobRequest {
    pub device_id: DeviceId,
    pub action: Action,
    pub value: Option<JobValue>,
    pub run_at: Timestamp,
}

impl TryFrom<ScheduleJobRequest> for JobKey {
    type Error = SmartHubError;

    fn try_from(req: ScheduleJobRequest) -> Result<Self, Self::Error> {
        Ok(JobKey::new(
            req.device_id,
            req.action,
            req.value.map(String::from),
            req.run_at,
        )?)
    }
}

/// A pending job as rendered by the API.
#[derive(Serialize)]
pub struct JobBody {
    pub id: String,
    pub device_id: DeviceId,
    pub action: Action,
    pub value: Option<String>,
    pub run_at: String,
    pub created_at: Option<String>,
}

impl From<ScheduledJob> for JobBody {
    fn from(job: ScheduledJob) -> Self {
        Self {
            created_at: Some(time::format(job.created_at)),
            ..Self::from(job.key)
        }
    }
}

impl From<JobKey> for JobBody {
    fn from(key: JobKey) -> Self {
        Self {
            id: key.id(),
            device_id: key.device_id(),
            action: key.action(),
            value: key.value().map(str::to_string),
            run_at: time::format(key.run_at()),
            created_at: None,
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<JobBody>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the schedule and edit endpoints.
pub enum ScheduleResponse {
    Created(Json<JobBody>),
    Ok(Json<JobBody>),
}

impl IntoResponse for ScheduleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the cancel endpoint.
pub enum CancelResponse {
    NoContent,
}

impl IntoResponse for CancelResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/jobs`
pub async fn list<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
) -> Result<ListResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let jobs = state.scheduler.list().await?;
    Ok(ListResponse::Ok(Json(
        jobs.into_iter().map(JobBody::from).collect(),
    )))
}

/// `POST /api/jobs`
pub async fn schedule<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Json(req): Json<ScheduleJobRequest>,
) -> Result<ScheduleResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let key = state.scheduler.schedule(req.try_into()?).await?;
    Ok(ScheduleResponse::Created(Json(key.into())))
}

/// `PUT /api/jobs/{job_id}`
pub async fn edit<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Path(job_id): Path<String>,
    Json(req): Json<ScheduleJobRequest>,
) -> Result<ScheduleResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let key = state.scheduler.edit_str(&job_id, req.try_into()?).await?;
    Ok(ScheduleResponse::Ok(Json(key.into())))
}

/// `DELETE /api/jobs/{job_id}`
pub async fn cancel<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Path(job_id): Path<String>,
) -> Result<CancelResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    state.scheduler.cancel_str(&job_id).await?;
    Ok(CancelResponse::NoContent)
}
