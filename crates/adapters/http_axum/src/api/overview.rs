//! Energy overview handler.

use axum::Json;
use axum::extract::State;

use smarthub_app::ports::{DeviceRepository, JobRepository};
use smarthub_app::services::device_service::Overview;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/overview`
pub async fn get<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
) -> Result<Json<Overview>, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let overview = state.device_service.overview().await?;
    Ok(Json(overview))
}
