//! Run command implementation: load one model and run one input.

use anyhow::Result;
use lumen_core::{LumenConfig, Workbench};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::terminal::TerminalSurface;

pub async fn execute(
    config: &LumenConfig,
    model: &str,
    input: Option<String>,
    file: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut workbench = Workbench::from_config(config);
    let mut surface = TerminalSurface::new(config.output.image_dir.clone());

    // A file is handed over as its path text.
    let raw_input = input
        .or_else(|| file.map(|path| path.display().to_string()))
        .unwrap_or_default();

    if workbench.dispatcher().registry().contains(model) {
        workbench.select(model, &mut surface);
        workbench.load_selected(&mut surface).await;
    } else {
        debug!(model = %model, "Model not registered");
    }

    let cached_before = cached_entries(&workbench, model);
    let result = workbench.run(model, &raw_input, &mut surface).await;

    // Backends render inference failures as text, and failures are never
    // cached: a run that added no cache entry did not succeed.
    let inference_failed = !result.is_error() && cached_entries(&workbench, model) == cached_before;
    if inference_failed {
        debug!(model = %model, "Inference reported a failure");
    }

    Ok(if result.is_error() || inference_failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn cached_entries(workbench: &Workbench, model: &str) -> usize {
    workbench
        .dispatcher()
        .registry()
        .resolve(model)
        .map_or(0, |backend| backend.cached_entries())
}
