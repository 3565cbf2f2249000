//! Writing decoded plot images to disk.

use std::path::{Path, PathBuf};

use clearsky_core::error::CoreError;
use clearsky_core::job::PlotResult;
use clearsky_core::plot::display_name_for;
use clearsky_core::view::VisualizationResult;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error(transparent)]
    Decode(#[from] CoreError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write every image carried by `result` into `dir` as `<job>_<plot>.png`.
///
/// Plots without an image are skipped. Returns the written paths.
pub async fn write_images(
    dir: &Path,
    result: &VisualizationResult,
) -> Result<Vec<PathBuf>, OutputError> {
    let images: Vec<(&str, &str, &PlotResult)> = match result {
        VisualizationResult::AllThree(summary) => summary
            .visualizations
            .iter()
            .map(|(plot, r)| (summary.job_id.as_str(), plot.as_str(), r))
            .collect(),
        VisualizationResult::Single(single) => {
            vec![(single.job_id.as_str(), single.plot.as_str(), &single.result)]
        }
        VisualizationResult::Health { .. } => Vec::new(),
    };

    let mut written = Vec::new();
    for (job_id, key, plot) in images {
        let label = display_name_for(key);
        let Some(bytes) = plot.decode_image()? else {
            tracing::debug!(plot = label, error = ?plot.error, "No image for plot");
            continue;
        };
        let path = dir.join(file_name(job_id, key));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::info!(
            plot = label,
            path = %path.display(),
            bytes = bytes.len(),
            "Wrote plot image",
        );
        written.push(path);
    }
    Ok(written)
}

/// `<job>_<plot>.png`. Both parts come from the backend and are reduced
/// to `[A-Za-z0-9_-]` so the file always lands directly inside the output
/// directory.
fn file_name(job_id: &str, plot: &str) -> String {
    format!("{}_{}.png", sanitize(job_id), sanitize(plot))
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
