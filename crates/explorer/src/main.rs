//! `clearsky-explorer` -- headless ClearSkyIQ visualization client.
//!
//! Preloads the sample visualizations, generates the visualization
//! described by the `EXPLORER_*` variables, or checks the connection,
//! then writes any returned plots as PNG files.
//!
//! # Environment variables
//!
//! See [`ExplorerConfig::from_env`] for the full table. Point
//! `HARMONY_API_URL` at the Harmony API itself or at a `clearsky-api`
//! forwarder (`http://host:3000/api`); both expose the same paths.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clearsky_core::request::VARIABLES;
use clearsky_core::view::ViewState;
use clearsky_explorer::config::{ExplorerConfig, Mode};
use clearsky_explorer::{output, ExplorerSession};
use clearsky_harmony::HarmonyApi;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clearsky_explorer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExplorerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let api = HarmonyApi::new(config.harmony.clone()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });

    tracing::info!(
        harmony_url = %config.harmony.base_url(),
        mode = ?config.mode,
        plot_type = %config.form.plot_type,
        "Starting clearsky-explorer",
    );

    match VARIABLES
        .iter()
        .find(|(name, _)| *name == config.form.variable)
    {
        Some((_, description)) => tracing::info!(variable = %config.form.variable, "{description}"),
        None => tracing::warn!(
            variable = %config.form.variable,
            known = ?VARIABLES.map(|(name, _)| name),
            "Unknown variable, sending it to the backend as-is",
        ),
    }

    let mut session =
        ExplorerSession::new(Arc::new(api), config.poll).with_form(config.form.clone());

    let shutdown = session.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT (Ctrl-C), cancelling");
            shutdown.cancel();
        }
    });

    let mut progress = session.subscribe_progress();
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let latest = progress.borrow_and_update().clone();
            if let Some(status) = latest {
                tracing::info!(
                    status = ?status.status,
                    progress = status.progress_percent(),
                    completed = ?status.completed_plots,
                    "Job progress",
                );
            }
        }
    });

    let view = match config.mode {
        Mode::Preload => session.preload().await,
        Mode::Submit => session.submit().await,
        Mode::Health => session.test_connection().await,
    };

    match view {
        busy if busy.is_busy() => {
            tracing::warn!("Session still busy after the request returned");
        }
        ViewState::Ready(result) => {
            tracing::info!("{}", result.message());
            if let Err(e) = output::write_images(&config.output_dir, result).await {
                tracing::error!(error = %e, "Failed to save images");
                std::process::exit(1);
            }
        }
        ViewState::Error { message, .. } => {
            tracing::error!("{message}");
            std::process::exit(1);
        }
        _ => tracing::info!("Nothing to show"),
    }
}
