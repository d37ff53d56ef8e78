//! End-to-end tests for the full trygrd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real
//! stores, real cache services, the trigger engine listening on the event
//! bus, the virtual vendor and mailbox, real axum router) and exercises it
//! through the HTTP layer via `tower::ServiceExt::oneshot`. No TCP port is
//! bound.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::watch;
use tower::ServiceExt;

use trygr_adapter_http_axum::router;
use trygr_adapter_http_axum::state::AppState;
use trygr_adapter_storage_sqlite_sqlx::{Config, SqliteDeviceStore, SqliteLocationStore};
use trygr_adapter_virtual::{VirtualCapability, VirtualMailbox};
use trygr_app::action_dispatcher::ActionDispatcher;
use trygr_app::capability_registry::CapabilityRegistry;
use trygr_app::event_bus::InProcessEventBus;
use trygr_app::notification::NotificationFanout;
use trygr_app::services::device_cache_service::DeviceCacheService;
use trygr_app::services::location_cache_service::LocationCacheService;
use trygr_app::trigger_engine::{EngineConfig, TriggerEngine, TriggerSet};

struct Harness {
    app: axum::Router,
    mailbox: Arc<VirtualMailbox>,
    capability: Arc<VirtualCapability>,
    _stop: watch::Sender<bool>,
}

/// Build a fully-wired router backed by an in-memory `SQLite` database, with
/// the engine already listening on the bus.
async fn harness() -> Harness {
    let db = Config::new("sqlite::memory:")
        .build()
        .await
        .expect("in-memory database should initialise");

    let event_bus = InProcessEventBus::new(256);
    let device_service = Arc::new(DeviceCacheService::new(
        SqliteDeviceStore::new(db.pool().clone()),
        event_bus.clone(),
    ));
    let location_service = Arc::new(LocationCacheService::new(
        SqliteLocationStore::new(db.pool().clone()),
        event_bus.clone(),
    ));

    let mailbox = Arc::new(VirtualMailbox::default());
    let capability = Arc::new(VirtualCapability::default());
    let triggers = Arc::new(TriggerSet::new(Vec::new()));
    let engine = Arc::new(TriggerEngine::new(
        Arc::clone(&triggers),
        ActionDispatcher::new(
            Arc::clone(&device_service),
            CapabilityRegistry::new().with(Arc::clone(&capability)),
        ),
        NotificationFanout::new(Arc::clone(&mailbox)),
        EngineConfig::default(),
    ));

    let (stop, shutdown) = watch::channel(false);
    tokio::spawn(engine.listen(event_bus.subscribe(), shutdown));

    let state = AppState::new(device_service, location_service, triggers);
    Harness {
        app: router::build(state),
        mailbox,
        capability,
        _stop: stop,
    }
}

fn put(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Poll until the mailbox holds `count` deliveries, or give up.
async fn wait_for_deliveries(mailbox: &VirtualMailbox, count: usize) {
    for _ in 0..100 {
        if mailbox.deliveries().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Give background evaluation a chance to run.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let h = harness().await;

    let resp = h.app.clone().oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Device trigger: edge firing and notification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_fire_device_trigger_once_when_status_becomes_on() {
    let h = harness().await;
    let (status, _) = send(
        &h.app,
        put(
            "/api/triggers",
            serde_json::json!([{
                "affectedDeviceId": "d1",
                "triggerType": "device",
                "triggerValue": "on",
                "action": "report",
                "actionValue": "",
                "notify": ["a@x.com"]
            }]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let porch = |status: &str| {
        serde_json::json!({"id": "d1", "name": "Porch", "vendor": "virtual", "status": status})
    };
    send(&h.app, put("/api/devices", porch("off"))).await;
    send(&h.app, put("/api/devices", porch("on"))).await;
    wait_for_deliveries(&h.mailbox, 1).await;
    send(&h.app, put("/api/devices", porch("on"))).await;
    settle().await;

    let deliveries = h.mailbox.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].recipients, vec!["a@x.com".to_string()]);
    assert_eq!(deliveries[0].body, "Porch is on");
}

// ---------------------------------------------------------------------------
// Weather trigger with a chained device
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_turn_on_heater_and_chained_fan_when_temperature_drops() {
    let h = harness().await;
    for id in ["heater", "fan"] {
        let (status, _) = send(
            &h.app,
            put(
                "/api/devices",
                serde_json::json!({"id": id, "name": id, "vendor": "virtual", "status": "off"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    send(
        &h.app,
        put(
            "/api/triggers",
            serde_json::json!([{
                "affectedDeviceId": "heater",
                "triggerType": "minTemp",
                "triggerValue": 5,
                "action": "turnOn",
                "actionValue": "",
                "chainDeviceId": "fan",
                "notify": ["a@x.com"]
            }]),
        ),
    )
    .await;

    let weather = |temperature: f64| {
        serde_json::json!({
            "postalCode": "07001",
            "currentWeather": {"temperature": temperature, "windspeed": 0.0}
        })
    };
    send(&h.app, put("/api/locations", weather(10.0))).await;
    send(&h.app, put("/api/locations", weather(2.0))).await;
    wait_for_deliveries(&h.mailbox, 1).await;
    send(&h.app, put("/api/locations", weather(2.0))).await;
    settle().await;

    let (_, heater) = send(&h.app, get("/api/devices/heater")).await;
    let (_, fan) = send(&h.app, get("/api/devices/fan")).await;
    assert_eq!(heater["status"], "on");
    assert_eq!(fan["status"], "on");
    let deliveries = h.mailbox.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].body, "heater turned on");
}

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_notify_failure_and_keep_serving_when_vendor_is_unreachable() {
    let h = harness().await;
    h.capability.set_offline("d1", true);
    send(
        &h.app,
        put(
            "/api/triggers",
            serde_json::json!([
                {
                    "affectedDeviceId": "d1",
                    "triggerType": "device",
                    "triggerValue": "fault",
                    "action": "turnOff",
                    "actionValue": "",
                    "notify": ["ops@x.com"]
                },
                {
                    "triggerType": "maxTemp",
                    "triggerValue": 30,
                    "action": "alert",
                    "actionValue": "",
                    "notify": ["b@x.com"]
                }
            ]),
        ),
    )
    .await;

    send(
        &h.app,
        put(
            "/api/devices",
            serde_json::json!({"id": "d1", "name": "Pump", "vendor": "virtual", "status": "fault"}),
        ),
    )
    .await;
    send(
        &h.app,
        put(
            "/api/locations",
            serde_json::json!({
                "postalCode": "07001",
                "currentWeather": {"temperature": 35.0, "windspeed": 0.0}
            }),
        ),
    )
    .await;
    wait_for_deliveries(&h.mailbox, 2).await;

    let mut bodies: Vec<String> = h.mailbox.deliveries().into_iter().map(|d| d.body).collect();
    bodies.sort();
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].starts_with("Action failed"), "{bodies:?}");
    assert!(bodies[1].starts_with("Trigger fired"), "{bodies:?}");
    let (_, pump) = send(&h.app, get("/api/devices/d1")).await;
    assert_eq!(pump["status"], "fault");
}

// ---------------------------------------------------------------------------
// API validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_reject_invalid_trigger_collection() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        put(
            "/api/triggers",
            serde_json::json!([{
                "triggerType": "relativeTime",
                "triggerValue": "noon",
                "action": "report",
                "actionValue": ""
            }]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    let (_, listed) = send(&h.app, get("/api/triggers")).await;
    assert_eq!(listed, serde_json::json!([]));
}

#[tokio::test]
async fn should_return_404_for_unknown_device() {
    let h = harness().await;

    let (status, _) = send(&h.app, get("/api/devices/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
