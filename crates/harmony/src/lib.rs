//! Client library for the Harmony visualization API.
//!
//! Provides explicit connection configuration, a typed REST wrapper and
//! the [`backend::VisualizationBackend`] trait the explorer is written
//! against.

pub mod api;
pub mod backend;
pub mod config;

pub use api::{HarmonyApi, HarmonyApiError};
pub use backend::VisualizationBackend;
pub use config::{ConfigError, HarmonyConfig};
