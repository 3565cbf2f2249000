use std::sync::Arc;

use clearsky_harmony::HarmonyApi;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Client for the Harmony API, shared by every forwarder.
    pub harmony: Arc<HarmonyApi>,
}
