use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue};
use squat_tracker::config::Config;
use squat_tracker::detect::MediaPipeDetector;
use squat_tracker::logging::{init_tracing, LogConfig};
use squat_tracker::routes::build_router;
use squat_tracker::squat::SquatEngine;
use squat_tracker::state::AppState;
use squat_tracker::store::open_session_store;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    let _log_guard = init_tracing(&LogConfig::from(&config));
    tracing::info!(?config, "Starting squat-tracker");

    let detector = Arc::new(
        MediaPipeDetector::new(&config.detector).expect("Failed to build face detector client"),
    );
    if let Err(e) = detector
        .wait_until_healthy(
            config.detector.health_retries,
            Duration::from_millis(config.detector.health_interval_ms),
        )
        .await
    {
        // Frames fail per-request until the helper comes up.
        tracing::warn!(error = %e, url = %detector.base_url(), "Face detector not reachable at startup");
    }

    let session_id = Uuid::new_v4();
    let store = open_session_store(&config.store, &session_id.to_string())
        .expect("Failed to open judgement store");
    let engine = Arc::new(
        SquatEngine::new(
            session_id,
            detector,
            store.clone(),
            Duration::from_millis(config.limits.frame_timeout_ms),
        )
        .expect("Failed to initialise squat engine"),
    );
    tracing::info!(%session_id, backend = ?config.store.backend, "Tracking session opened");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(engine, &config, shutdown_tx.clone());

    let app = build_router(state)
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
    {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    tracing::info!("Flushing judgement store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush judgement store before exit");
    }
    tracing::info!("Shutdown complete");
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origin.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any);
    }

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any),
        Err(e) => {
            panic!(
                "FATAL: Invalid CORS_ORIGIN '{}': {}. \
                 Fix the CORS_ORIGIN environment variable.",
                config.cors_origin, e
            );
        }
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
