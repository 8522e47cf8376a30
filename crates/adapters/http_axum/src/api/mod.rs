//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod groups;
#[allow(clippy::missing_errors_doc)]
pub mod jobs;
#[allow(clippy::missing_errors_doc)]
pub mod overview;

use axum::Router;
use axum::routing::{get, post, put};

use smarthub_app::ports::{DeviceRepository, JobRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<DR, JR, XR>() -> Router<AppState<DR, JR, XR>>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    Router::new()
        // Devices
        .route(
            "/devices",
            get(devices::list::<DR, JR, XR>).post(devices::create::<DR, JR, XR>),
        )
        .route("/devices/count", get(devices::count::<DR, JR, XR>))
        .route(
            "/devices/{id}",
            get(devices::get::<DR, JR, XR>)
                .patch(devices::update::<DR, JR, XR>)
                .delete(devices::delete::<DR, JR, XR>),
        )
        .route("/devices/{id}/toggle", post(devices::toggle::<DR, JR, XR>))
        .route(
            "/devices/{id}/attributes",
            put(devices::set_attribute::<DR, JR, XR>),
        )
        // Overview
        .route("/overview", get(overview::get::<DR, JR, XR>))
        // Groups
        .route("/groups/{group}", post(groups::apply::<DR, JR, XR>))
        // Jobs
        .route(
            "/jobs",
            get(jobs::list::<DR, JR, XR>).post(jobs::schedule::<DR, JR, XR>),
        )
        .route(
            "/jobs/{job_id}",
            put(jobs::edit::<DR, JR, XR>).delete(jobs::cancel::<DR, JR, XR>),
        )
}
