//! `clearsky-api` -- forwards the visualization front-end's calls to the
//! Harmony API, adding the bearer token and the `{success, message, error}`
//! failure envelopes.
//!
//! Configuration comes from the environment; see [`ServerConfig::from_env`]
//! and [`clearsky_harmony::HarmonyConfig::from_env`].

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clearsky_api::config::ServerConfig;
use clearsky_api::router::{build_app_router, gateway_timeout};
use clearsky_api::state::AppState;
use clearsky_harmony::HarmonyApi;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "clearsky_api=debug,clearsky_harmony=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        harmony_url = %config.harmony.base_url(),
        harmony_timeout_secs = config.harmony.timeout().as_secs(),
        gateway_timeout_secs = gateway_timeout(&config).as_secs(),
        cors_origins = ?config.cors_origins,
        "Loaded gateway configuration",
    );

    let harmony = HarmonyApi::new(config.harmony.clone()).expect("Failed to build HTTP client");

    // The gateway starts even when Harmony is down; /health reports it.
    match harmony.health().await {
        Ok(health) => tracing::info!(status = %health.status, "Harmony API reachable"),
        Err(e) => tracing::warn!(error = %e, "Harmony API not reachable at startup"),
    }

    let state = AppState {
        config: Arc::new(config.clone()),
        harmony: Arc::new(harmony),
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Visualization gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Gateway stopped");
}

/// Resolves on SIGINT, or SIGTERM on Unix. In-flight forwards finish
/// before the server exits.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("SIGINT received, draining"),
                    _ = terminate.recv() => tracing::info!("SIGTERM received, draining"),
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "SIGTERM handler unavailable, Ctrl-C only"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("SIGINT received, draining"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
