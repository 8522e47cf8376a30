//! Shared application state for axum handlers.

use std::sync::Arc;

use smarthub_app::ports::{DeviceRepository, JobRepository};
use smarthub_app::scheduler::Scheduler;
use smarthub_app::services::device_service::DeviceService;

/// Application state shared across all axum handlers.
///
/// Generic over the device repository behind the service (`DR`), the job
/// queue (`JR`) and the device repository behind the scheduler's executor
/// (`XR`) to avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone`; only the `Arc`
/// wrappers are cloned.
pub struct AppState<DR, JR, XR> {
    /// Device CRUD and immediate edits.
    pub device_service: Arc<DeviceService<DR>>,
    /// Deferred actions.
    pub scheduler: Arc<Scheduler<JR, XR>>,
}

impl<DR, JR, XR> Clone for AppState<DR, JR, XR> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl<DR, JR, XR> AppState<DR, JR, XR>
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(device_service: DeviceService<DR>, scheduler: Scheduler<JR, XR>) -> Self {
        Self {
            device_service: Arc::new(device_service),
            scheduler: Arc::new(scheduler),
        }
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when the scheduler is shared with its background loop.
    pub fn from_arcs(
        device_service: Arc<DeviceService<DR>>,
        scheduler: Arc<Scheduler<JR, XR>>,
    ) -> Self {
        Self {
            device_service,
            scheduler,
        }
    }
}
