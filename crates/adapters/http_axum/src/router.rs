//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use smarthub_app::ports::{DeviceRepository, JobRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`. Includes a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<DR, JR, XR>(state: AppState<DR, JR, XR>) -> Router
where
    DR: DeviceRepository + 'static,
    JR: JobRepository + 'static,
    XR: DeviceRepository + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use smarthub_app::executor::ActionExecutor;
    use smarthub_app::scheduler::Scheduler;
    use smarthub_app::services::device_service::DeviceService;
    use smarthub_domain::device::{DeviceChanges, DeviceRecord, NewDevice};
    use smarthub_domain::error::SmartHubError;
    use smarthub_domain::id::DeviceId;
    use smarthub_domain::schedule::{JobKey, ScheduledJob};
    use smarthub_domain::time::Timestamp;
    use tower::ServiceExt;

    struct StubDeviceRepo;
    struct StubJobRepo;

    impl DeviceRepository for StubDeviceRepo {
        async fn create(&self, device: NewDevice) -> Result<DeviceRecord, SmartHubError> {
            Ok(device.into_record(DeviceId::new(1)))
        }
        async fn get_by_id(&self, _id: DeviceId) -> Result<Option<DeviceRecord>, SmartHubError> {
            Ok(None)
        }
        async fn get_all(&self) -> Result<Vec<DeviceRecord>, SmartHubError> {
            Ok(vec![])
        }
        async fn update(
            &self,
            _id: DeviceId,
            _changes: DeviceChanges,
        ) -> Result<Option<DeviceRecord>, SmartHubError> {
            Ok(None)
        }
        async fn delete(&self, _id: DeviceId) -> Result<bool, SmartHubError> {
            Ok(false)
        }
        async fn count(&self) -> Result<u64, SmartHubError> {
            Ok(0)
        }
    }

    impl JobRepository for StubJobRepo {
        async fn upsert(&self, _job: ScheduledJob) -> Result<(), SmartHubError> {
            Ok(())
        }
        async fn get_all(&self) -> Result<Vec<ScheduledJob>, SmartHubError> {
            Ok(vec![])
        }
        async fn due(&self, _now: Timestamp) -> Result<Vec<ScheduledJob>, SmartHubError> {
            Ok(vec![])
        }
        async fn delete(&self, _key: &JobKey) -> Result<bool, SmartHubError> {
            Ok(false)
        }
    }

    fn app() -> Router {
        build(AppState::new(
            DeviceService::new(StubDeviceRepo),
            Scheduler::new(StubJobRepo, ActionExecutor::new(StubDeviceRepo)),
        ))
    }

    async fn send(method: &str, uri: &str, body: Option<&str>) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let (status, body) = send("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn should_return_not_found_for_missing_device() {
        let (status, body) = send("GET", "/api/devices/7", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Device 7 not found"));
    }

    #[tokio::test]
    async fn should_return_bad_request_for_non_numeric_device_id() {
        let (status, _) = send("GET", "/api/devices/seven", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_bad_request_when_creating_device_with_empty_name() {
        let (status, body) = send(
            "POST",
            "/api/devices",
            Some(r#"{"name": "", "type": "Camera"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("name must not be empty"));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_group() {
        let (status, _) = send("POST", "/api/groups/party_mode", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_bad_request_for_malformed_job_id() {
        let (status, body) = send("DELETE", "/api/jobs/not-a-job", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("invalid job id"));
    }

    #[tokio::test]
    async fn should_return_not_found_when_cancelling_unknown_job() {
        let (status, _) = send(
            "DELETE",
            "/api/jobs/1%7Con%7C%7C2026-06-01T07%3A00%3A00Z",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_bad_request_for_job_value_with_delimiter() {
        let (status, _) = send(
            "POST",
            "/api/jobs",
            Some(r#"{"device_id": 1, "action": "set_colour", "value": "red|blue", "run_at": "2026-06-01T07:00:00Z"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
