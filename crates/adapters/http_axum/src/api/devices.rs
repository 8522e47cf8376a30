//! JSON REST handlers for devices.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use smarthub_app::ports::{DeviceRepository, JobRepository};
use smarthub_domain::device::{Attribute, Colour, DeviceChanges, DeviceKind, DeviceRecord, NewDevice};
use smarthub_domain::id::DeviceId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a device.
#[derive(Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    #[serde(default)]
    pub status: bool,
    pub temperature: Option<i64>,
    pub brightness: Option<i64>,
    pub colour: Option<Colour>,
}

impl From<CreateDeviceRequest> for NewDevice {
    fn from(req: CreateDeviceRequest) -> Self {
        Self {
            name: req.name,
            kind: req.kind,
            status: req.status,
            temperature: req.temperature,
            brightness: req.brightness,
            colour: req.colour,
        }
    }
}

#[derive(Serialize)]
pub struct CountBody {
    pub count: u64,
}

/// Possible responses from endpoints returning a single device.
pub enum DeviceResponse {
    Ok(Json<DeviceRecord>),
    Created(Json<DeviceRecord>),
}

impl IntoResponse for DeviceResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<DeviceRecord>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
) -> Result<ListResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let devices = state.device_service.list_all().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/count`
pub async fn count<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
) -> Result<Json<CountBody>, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let count = state.device_service.count().await?;
    Ok(Json(CountBody { count }))
}

/// `GET /api/devices/{id}`
pub async fn get<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Path(id): Path<DeviceId>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let device = state.device_service.get(id).await?;
    Ok(DeviceResponse::Ok(Json(device)))
}

/// `POST /api/devices`
pub async fn create<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let created = state.device_service.create(req.into()).await?;
    Ok(DeviceResponse::Created(Json(created)))
}

/// `PATCH /api/devices/{id}`
pub async fn update<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Path(id): Path<DeviceId>,
    Json(changes): Json<DeviceChanges>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let updated = state.device_service.update(id, changes).await?;
    Ok(DeviceResponse::Ok(Json(updated)))
}

/// `DELETE /api/devices/{id}`
pub async fn delete<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Path(id): Path<DeviceId>,
) -> Result<DeleteResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    state.device_service.delete(id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/devices/{id}/toggle`
pub async fn toggle<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Path(id): Path<DeviceId>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let toggled = state.device_service.toggle(id).await?;
    Ok(DeviceResponse::Ok(Json(toggled)))
}

/// `PUT /api/devices/{id}/attributes`
///
/// The body names exactly one attribute, e.g. `{"brightness": 40}`.
pub async fn set_attribute<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Path(id): Path<DeviceId>,
    Json(attribute): Json<Attribute>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let updated = state.device_service.set_attribute(id, attribute).await?;
    Ok(DeviceResponse::Ok(Json(updated)))
}
