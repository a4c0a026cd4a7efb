use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::broadcast;
use uuid::Uuid;

use squat_tracker::config::{Config, DetectorConfig, LimitsConfig, StoreBackend, StoreConfig};
use squat_tracker::routes::build_router;
use squat_tracker::squat::SquatEngine;
use squat_tracker::state::AppState;
use squat_tracker::store::MemoryJudgementStore;

use super::fixtures::ScriptedDetector;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryJudgementStore>,
    pub detector: Arc<ScriptedDetector>,
    pub shutdown_tx: broadcast::Sender<()>,
}

pub fn test_config() -> Config {
    // Built directly so tests never race on process environment variables.
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        store: StoreConfig {
            backend: StoreBackend::Memory,
            sled_path: String::new(),
        },
        detector: DetectorConfig {
            host: "127.0.0.1".to_string(),
            port: 8765,
            timeout_secs: 1,
            health_retries: 1,
            health_interval_ms: 10,
        },
        limits: LimitsConfig {
            max_frame_bytes: 64 * 1024,
            frame_timeout_ms: 500,
            max_sse_connections: 2,
        },
    }
}

pub fn spawn_test_app_with(detector: ScriptedDetector, config: Config) -> TestApp {
    let store = Arc::new(MemoryJudgementStore::new());
    let detector = Arc::new(detector);
    let engine = SquatEngine::new(
        Uuid::new_v4(),
        detector.clone(),
        store.clone(),
        Duration::from_millis(config.limits.frame_timeout_ms),
    )
    .expect("engine");
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(Arc::new(engine), &config, shutdown_tx.clone());
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        store,
        detector,
        shutdown_tx,
    }
}

pub fn spawn_test_app(detector: ScriptedDetector) -> TestApp {
    spawn_test_app_with(detector, test_config())
}
