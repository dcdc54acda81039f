use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{App, HttpServer, test, web};
use omega_gpio::{AppConfig, AppError, AppState, DeviceManager, MockGpioBackend, PinRegistry};
use serde_json::Value;

fn sample_config() -> AppConfig {
    AppConfig::from_json(
        r#"
        {
            "http": {
                "host": "localhost:8080",
                "path": "/api/v1",
                "timeout": 30
            },
            "devices": {
                "status": { "kind": "led", "pin": 26, "active_low": true },
                "pump": { "kind": "relay", "pin": 19, "initial_state": "on" },
                "alarm": { "kind": "buzzer", "pin": 14 },
                "door": { "kind": "button", "pin": 23 },
                "mode": { "kind": "switch", "pin": 0, "pullup": false }
            }
        }
        "#,
    )
    .expect("valid sample config")
}

fn sample_manager() -> (Arc<MockGpioBackend>, Arc<DeviceManager>) {
    let backend = Arc::new(MockGpioBackend::default());
    let registry = Arc::new(PinRegistry::new(backend.clone()));
    let manager = DeviceManager::new(&sample_config(), registry).expect("devices build");
    (backend, Arc::new(manager))
}

macro_rules! init_app {
    ($manager:expr) => {{
        let state = AppState {
            manager: $manager.clone(),
        };
        test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(state.api_scope("/api/v1")),
        )
        .await
    }};
}

#[actix_rt::test]
async fn list_devices_returns_all() {
    let (_, manager) = sample_manager();
    let app = init_app!(manager);

    let req = test::TestRequest::get().uri("/api/v1/devices").to_request();
    let response: HashMap<String, Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(response.len(), 5);

    let led = &response["status"];
    assert_eq!(led["kind"], "led");
    assert_eq!(led["pin"], 26);
    assert_eq!(led["state"]["on"], false);
    assert_eq!(led["state"]["raw"], 1);

    let pump = &response["pump"];
    assert_eq!(pump["state"]["on"], true);
    assert_eq!(pump["state"]["raw"], 1);
}

#[actix_rt::test]
async fn list_pins_marks_claimed() {
    let (_, manager) = sample_manager();
    let app = init_app!(manager);

    let req = test::TestRequest::get().uri("/api/v1/pins").to_request();
    let pins: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(pins.len(), 13);

    let led = pins.iter().find(|p| p["pin"] == 26).unwrap();
    assert_eq!(led["claimed"], true);
    assert_eq!(led["exported"], true);
    let free = pins.iter().find(|p| p["pin"] == 7).unwrap();
    assert_eq!(free["claimed"], false);
}

#[actix_rt::test]
async fn device_not_found_returns_404() {
    let (_, manager) = sample_manager();
    let app = init_app!(manager);

    let req = test::TestRequest::get()
        .uri("/api/v1/device/garage")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn wrong_method_returns_405() {
    let (_, manager) = sample_manager();
    let app = init_app!(manager);

    let req = test::TestRequest::get()
        .uri("/api/v1/device/status/on")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);
}

#[actix_rt::test]
async fn switch_led_on_and_off() {
    let (backend, manager) = sample_manager();
    let app = init_app!(manager);

    let req = test::TestRequest::post()
        .uri("/api/v1/device/status/on")
        .to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state["on"], true);
    assert_eq!(state["raw"], 0);
    assert_eq!(backend.value(26).as_deref(), Some("0"));

    let req = test::TestRequest::post()
        .uri("/api/v1/device/status/toggle")
        .to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state["on"], false);
    assert_eq!(backend.value(26).as_deref(), Some("1"));

    let req = test::TestRequest::post()
        .uri("/api/v1/device/pump/off")
        .to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state["on"], false);
    assert_eq!(backend.value(19).as_deref(), Some("0"));
}

#[actix_rt::test]
async fn reject_output_command_on_input() {
    let (_, manager) = sample_manager();
    let app = init_app!(manager);

    let req = test::TestRequest::post()
        .uri("/api/v1/device/door/on")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn read_button_state() {
    let (backend, manager) = sample_manager();
    let app = init_app!(manager);

    backend.set_input(23, 0);
    let req = test::TestRequest::get()
        .uri("/api/v1/device/door/state")
        .to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state["on"], true);

    backend.set_input(0, 0);
    let req = test::TestRequest::get()
        .uri("/api/v1/device/mode/state")
        .to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state["on"], false);
}

#[actix_rt::test]
async fn beep_is_not_implemented() {
    let (_, manager) = sample_manager();
    let app = init_app!(manager);

    let req = test::TestRequest::post()
        .uri("/api/v1/device/alarm/beep")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 501);

    let req = test::TestRequest::post()
        .uri("/api/v1/device/status/beep")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn shutdown_releases_every_pin() {
    let (backend, manager) = sample_manager();

    manager.shutdown();

    for pin in [26, 19, 14, 23, 0] {
        assert!(!backend.is_exported(pin), "pin {pin} still exported");
    }
    assert!(manager.list_pins().await.iter().all(|p| !p.claimed));
}

#[::core::prelude::v1::test]
fn duplicate_pin_in_config_releases_built_devices() {
    let config = AppConfig::from_json(
        r#"
        {
            "http": { "host": "localhost:8080", "path": "/api/v1", "timeout": 30 },
            "devices": {
                "a": { "kind": "led", "pin": 13 },
                "b": { "kind": "relay", "pin": 13 }
            }
        }
        "#,
    )
    .unwrap();
    let backend = Arc::new(MockGpioBackend::default());
    let registry = Arc::new(PinRegistry::new(backend.clone()));

    let err = DeviceManager::new(&config, registry).err().unwrap();
    assert!(matches!(err, AppError::PinInUse(13)), "{err}");
    assert!(!backend.is_exported(13));
}

#[::core::prelude::v1::test]
fn invalid_pin_in_config_keeps_its_error_kind() {
    let config = AppConfig::from_json(
        r#"
        {
            "http": { "host": "localhost:8080", "path": "/api/v1", "timeout": 30 },
            "devices": { "lamp": { "kind": "led", "pin": 5 } }
        }
        "#,
    )
    .unwrap();
    let registry = Arc::new(PinRegistry::new(Arc::new(MockGpioBackend::default())));

    let err = DeviceManager::new(&config, registry).err().unwrap();
    assert!(matches!(err, AppError::InvalidPin(_)), "{err}");
}

#[actix_rt::test]
async fn failed_bind_releases_every_pin() {
    let (backend, manager) = sample_manager();

    let result = manager.release_on_error(|| {
        HttpServer::new(App::new).bind_auto_h2c("256.256.256.256:8080")
    });

    assert!(result.is_err());
    for pin in [26, 19, 14, 23, 0] {
        assert!(!backend.is_exported(pin), "pin {pin} still exported");
    }
    assert!(manager.list_pins().await.iter().all(|p| !p.claimed));
}

#[actix_rt::test]
async fn successful_bind_keeps_pins_claimed() {
    let (backend, manager) = sample_manager();

    let result = manager.release_on_error(|| Ok::<_, std::io::Error>("127.0.0.1:0"));

    assert_eq!(result.unwrap(), "127.0.0.1:0");
    assert!(backend.is_exported(26));
}
