//! Bulk group actions.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use smarthub_app::ports::{DeviceRepository, JobRepository};
use smarthub_domain::group::DeviceGroup;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct GroupApplied {
    pub group: DeviceGroup,
    pub changed: usize,
}

/// `POST /api/groups/{group}`
///
/// Unknown group names answer 404.
pub async fn apply<DR, JR, XR>(
    State(state): State<AppState<DR, JR, XR>>,
    Path(group): Path<String>,
) -> Result<Json<GroupApplied>, ApiError>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    let group: DeviceGroup = group.parse()?;
    let changed = state.device_service.apply_group(group).await?;
    Ok(Json(GroupApplied { group, changed }))
}
