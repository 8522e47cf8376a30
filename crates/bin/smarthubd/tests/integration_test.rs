//! End-to-end smoke tests for the full smarthubd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot` — no TCP port is bound. The scheduler's
//! firing loop is not started; tests drive it with `run_due`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use smarthub_adapter_http_axum::router;
use smarthub_adapter_http_axum::state::AppState;
use smarthub_adapter_storage_sqlite_sqlx::{Config, SqliteDeviceRepository, SqliteJobRepository};
use smarthub_app::executor::ActionExecutor;
use smarthub_app::scheduler::Scheduler;
use smarthub_app::services::device_service::DeviceService;
use smarthub_domain::time;
use tower::ServiceExt;

type TestScheduler = Scheduler<SqliteJobRepository, SqliteDeviceRepository>;

struct TestApp {
    router: axum::Router,
    scheduler: Arc<TestScheduler>,
}

impl TestApp {
    /// Build a fully-wired router backed by an in-memory `SQLite` database.
    async fn new() -> Self {
        let db = Config::new("sqlite::memory:")
            .build()
            .await
            .expect("in-memory database should initialise");

        let pool = db.pool().clone();

        let device_service = Arc::new(DeviceService::new(SqliteDeviceRepository::new(
            pool.clone(),
        )));
        let scheduler = Arc::new(Scheduler::new(
            SqliteJobRepository::new(pool.clone()),
            ActionExecutor::new(SqliteDeviceRepository::new(pool)),
        ));

        let state = AppState::from_arcs(device_service, Arc::clone(&scheduler));
        Self {
            router: router::build(state),
            scheduler,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    async fn create_device(&self, body: Value) -> i64 {
        let (status, json) = self.send("POST", "/api/devices", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_i64().unwrap()
    }

    async fn device(&self, id: i64) -> Value {
        let (status, json) = self.send("GET", &format!("/api/devices/{id}"), None).await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json
    }
}

fn encode(job_id: &str) -> String {
    job_id.replace('|', "%7C")
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_create_and_list_devices_in_creation_order() {
    let app = TestApp::new().await;
    app.create_device(json!({"name": "Hall", "type": "BasicLight"}))
        .await;
    app.create_device(json!({"name": "Front door", "type": "DoorLock", "status": true}))
        .await;

    let (status, json) = app.send("GET", "/api/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Hall", "Front door"]);
    assert_eq!(json[1]["type"], "DoorLock");
    assert_eq!(json[1]["status"], true);

    let (_, count) = app.send("GET", "/api/devices/count", None).await;
    assert_eq!(count["count"], 2);
}

#[tokio::test]
async fn should_reject_device_with_out_of_range_attribute() {
    let app = TestApp::new().await;
    let (status, json) = app
        .send(
            "POST",
            "/api/devices",
            Some(json!({"name": "Tea", "type": "Kettle", "temperature": 30})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");

    let (_, count) = app.send("GET", "/api/devices/count", None).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn should_return_unprocessable_for_unknown_device_type() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send(
            "POST",
            "/api/devices",
            Some(json!({"name": "Toaster", "type": "Toaster"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn should_patch_only_the_supplied_fields() {
    let app = TestApp::new().await;
    let id = app
        .create_device(json!({"name": "Lounge", "type": "ColourLight", "brightness": 20, "colour": "blue"}))
        .await;

    let (status, json) = app
        .send(
            "PATCH",
            &format!("/api/devices/{id}"),
            Some(json!({"name": "Living room", "brightness": 80})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["name"], "Living room");
    assert_eq!(json["brightness"], 80);
    assert_eq!(json["colour"], "blue");

    let stored = app.device(id).await;
    assert_eq!(stored, json);
}

#[tokio::test]
async fn should_reject_patch_out_of_range_and_keep_record() {
    let app = TestApp::new().await;
    let id = app
        .create_device(json!({"name": "Heating", "type": "Thermostat", "temperature": 21}))
        .await;

    let (status, _) = app
        .send(
            "PATCH",
            &format!("/api/devices/{id}"),
            Some(json!({"name": "Heat", "temperature": 45})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stored = app.device(id).await;
    assert_eq!(stored["name"], "Heating");
    assert_eq!(stored["temperature"], 21);
}

#[tokio::test]
async fn should_delete_device_then_answer_not_found() {
    let app = TestApp::new().await;
    let id = app
        .create_device(json!({"name": "Porch", "type": "Camera"}))
        .await;

    let (status, _) = app
        .send("DELETE", &format!("/api/devices/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send("DELETE", &format!("/api/devices/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send("GET", &format!("/api/devices/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_restore_status_after_two_toggles() {
    let app = TestApp::new().await;
    let id = app
        .create_device(json!({"name": "Fridge", "type": "Appliance"}))
        .await;

    let uri = format!("/api/devices/{id}/toggle");
    let (_, first) = app.send("POST", &uri, None).await;
    assert_eq!(first["status"], true);
    let (_, second) = app.send("POST", &uri, None).await;
    assert_eq!(second["status"], false);
}

#[tokio::test]
async fn should_set_attribute_without_touching_status() {
    let app = TestApp::new().await;
    let id = app
        .create_device(json!({"name": "Desk", "type": "BasicLight"}))
        .await;

    let (status, json) = app
        .send(
            "PUT",
            &format!("/api/devices/{id}/attributes"),
            Some(json!({"brightness": 40})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["brightness"], 40);
    assert_eq!(json["status"], false);
}

#[tokio::test]
async fn should_reject_colour_choice_on_basic_light() {
    let app = TestApp::new().await;
    let id = app
        .create_device(json!({"name": "Desk", "type": "BasicLight"}))
        .await;

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/devices/{id}/attributes"),
            Some(json!({"colour": "red"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Groups and overview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_switch_on_security_devices_only() {
    let app = TestApp::new().await;
    let lock = app
        .create_device(json!({"name": "Front door", "type": "DoorLock"}))
        .await;
    let camera = app
        .create_device(json!({"name": "Garden", "type": "Camera"}))
        .await;
    let lamp = app
        .create_device(json!({"name": "Hall", "type": "BasicLight"}))
        .await;

    let (status, json) = app
        .send("POST", "/api/groups/maximum_security", None)
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["changed"], 2);

    assert_eq!(app.device(lock).await["status"], true);
    assert_eq!(app.device(camera).await["status"], true);
    assert_eq!(app.device(lamp).await["status"], false);
}

#[tokio::test]
async fn should_report_energy_of_devices_that_are_on() {
    let app = TestApp::new().await;
    app.create_device(json!({"name": "Heating", "type": "Thermostat", "status": true}))
        .await;
    app.create_device(json!({"name": "Hall", "type": "BasicLight", "status": true}))
        .await;
    app.create_device(json!({"name": "Tea", "type": "Kettle"}))
        .await;

    let (status, json) = app.send("GET", "/api/overview", None).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["total_energy"], 55);
    assert_eq!(json["devices"].as_array().unwrap().len(), 3);
    assert_eq!(json["devices"][2]["energy_usage"], 0);
    assert_eq!(json["by_type"]["Kettle"], json!([3]));
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_schedule_kettle_and_fire_at_run_time() {
    let app = TestApp::new().await;
    let kettle = app
        .create_device(json!({"name": "Tea", "type": "Kettle"}))
        .await;

    let (status, job) = app
        .send(
            "POST",
            "/api/jobs",
            Some(json!({
                "device_id": kettle,
                "action": "set_temperature",
                "value": 70,
                "run_at": "2026-10-15T08:30:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{job}");
    assert_eq!(
        job["id"],
        format!("{kettle}|set_temperature|70|2026-10-15T08:30:00Z")
    );

    let before = time::parse("2026-10-15T08:29:59Z").unwrap();
    assert_eq!(app.scheduler.run_due(before).await.unwrap(), 0);
    assert_eq!(app.device(kettle).await["temperature"], json!(null));

    let at = time::parse("2026-10-15T08:30:00Z").unwrap();
    assert_eq!(app.scheduler.run_due(at).await.unwrap(), 1);

    let stored = app.device(kettle).await;
    assert_eq!(stored["temperature"], 70);
    assert_eq!(stored["status"], false);

    let (_, jobs) = app.send("GET", "/api/jobs", None).await;
    assert_eq!(jobs, json!([]));
}

#[tokio::test]
async fn should_leave_boiler_unchanged_when_scheduled_value_out_of_range() {
    let app = TestApp::new().await;
    let boiler = app
        .create_device(json!({"name": "Water", "type": "Boiler", "temperature": 45}))
        .await;

    let (status, _) = app
        .send(
            "POST",
            "/api/jobs",
            Some(json!({
                "device_id": boiler,
                "action": "set_temperature",
                "value": "75",
                "run_at": "2026-01-01T00:00:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    app.scheduler.run_due(time::now()).await.unwrap();

    assert_eq!(app.device(boiler).await["temperature"], 45);
    let (_, jobs) = app.send("GET", "/api/jobs", None).await;
    assert_eq!(jobs, json!([]));
}

#[tokio::test]
async fn should_turn_colour_light_on_when_colour_job_fires() {
    let app = TestApp::new().await;
    let light = app
        .create_device(json!({"name": "Lounge", "type": "ColourLight"}))
        .await;

    app.send(
        "POST",
        "/api/jobs",
        Some(json!({
            "device_id": light,
            "action": "set_colour",
            "value": "purple",
            "run_at": "2026-01-01T00:00:00Z",
        })),
    )
    .await;
    app.scheduler.run_due(time::now()).await.unwrap();

    let stored = app.device(light).await;
    assert_eq!(stored["colour"], "purple");
    assert_eq!(stored["status"], true);
}

#[tokio::test]
async fn should_edit_job_under_a_new_id() {
    let app = TestApp::new().await;
    let lamp = app
        .create_device(json!({"name": "Hall", "type": "BasicLight"}))
        .await;

    let (_, job) = app
        .send(
            "POST",
            "/api/jobs",
            Some(json!({"device_id": lamp, "action": "on", "run_at": "2026-11-01T07:00:00Z"})),
        )
        .await;
    let old_id = job["id"].as_str().unwrap().to_string();
    assert_eq!(old_id, format!("{lamp}|on||2026-11-01T07:00:00Z"));

    let (status, edited) = app
        .send(
            "PUT",
            &format!("/api/jobs/{}", encode(&old_id)),
            Some(json!({
                "device_id": lamp,
                "action": "set_brightness",
                "value": 30,
                "run_at": "2026-11-01T07:15:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{edited}");
    assert_ne!(edited["id"], old_id.as_str());

    let (_, jobs) = app.send("GET", "/api/jobs", None).await;
    let ids: Vec<&str> = jobs
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, [edited["id"].as_str().unwrap()]);
}

#[tokio::test]
async fn should_cancel_job_then_answer_not_found() {
    let app = TestApp::new().await;
    let lamp = app
        .create_device(json!({"name": "Hall", "type": "BasicLight"}))
        .await;

    let (_, job) = app
        .send(
            "POST",
            "/api/jobs",
            Some(json!({"device_id": lamp, "action": "off", "run_at": "2026-11-01T23:00:00Z"})),
        )
        .await;
    let uri = format!("/api/jobs/{}", encode(job["id"].as_str().unwrap()));

    let (status, _) = app.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_answer_not_found_when_cancelling_fired_job() {
    let app = TestApp::new().await;
    let lamp = app
        .create_device(json!({"name": "Hall", "type": "BasicLight"}))
        .await;
    let (_, job) = app
        .send(
            "POST",
            "/api/jobs",
            Some(json!({"device_id": lamp, "action": "on", "run_at": "2026-01-01T06:00:00Z"})),
        )
        .await;

    assert_eq!(app.scheduler.run_due(time::now()).await.unwrap(), 1);
    assert_eq!(app.device(lamp).await["status"], true);

    let uri = format!("/api/jobs/{}", encode(job["id"].as_str().unwrap()));
    let (status, _) = app.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_reject_run_time_past_year_9999_and_keep_queue_working() {
    let app = TestApp::new().await;
    let lamp = app
        .create_device(json!({"name": "Hall", "type": "BasicLight"}))
        .await;

    let (status, body) = app
        .send(
            "POST",
            "/api/jobs",
            Some(json!({"device_id": lamp, "action": "off", "run_at": "+10000-01-01T00:00:00Z"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app
        .send(
            "POST",
            "/api/jobs",
            Some(json!({"device_id": lamp, "action": "on", "run_at": "2026-01-01T06:00:00Z"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, jobs) = app.send("GET", "/api/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 1);

    assert_eq!(app.scheduler.run_due(time::now()).await.unwrap(), 1);
    assert_eq!(app.device(lamp).await["status"], true);
}

#[tokio::test]
async fn should_reject_cancel_with_malformed_job_id() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send("DELETE", "/api/jobs/7%7Cdance%7C%7C2026-11-01T23%3A00%3A00Z", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_replace_job_scheduled_twice_with_same_parameters() {
    let app = TestApp::new().await;
    let lamp = app
        .create_device(json!({"name": "Hall", "type": "BasicLight"}))
        .await;
    let body = json!({"device_id": lamp, "action": "on", "run_at": "2026-11-01T07:00:00Z"});

    app.send("POST", "/api/jobs", Some(body.clone())).await;
    app.send("POST", "/api/jobs", Some(body)).await;

    let (_, jobs) = app.send("GET", "/api/jobs", None).await;
    assert_eq!(jobs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn should_discard_job_for_deleted_device_when_fired() {
    let app = TestApp::new().await;
    let lamp = app
        .create_device(json!({"name": "Hall", "type": "BasicLight"}))
        .await;
    app.send(
        "POST",
        "/api/jobs",
        Some(json!({"device_id": lamp, "action": "on", "run_at": "2026-01-01T00:00:00Z"})),
    )
    .await;
    app.send("DELETE", &format!("/api/devices/{lamp}"), None)
        .await;

    assert_eq!(app.scheduler.run_due(time::now()).await.unwrap(), 1);

    let (_, jobs) = app.send("GET", "/api/jobs", None).await;
    assert_eq!(jobs, json!([]));
}
