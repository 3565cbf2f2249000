//! Headless front-end for the Harmony visualization API.
//!
//! Drives the same flows as the browser view (sample preload, form
//! submission, job polling, connection test and retry) against any
//! [`clearsky_harmony::VisualizationBackend`].

pub mod config;
pub mod output;
pub mod poller;
pub mod session;

pub use session::{ExplorerSession, SessionError};
