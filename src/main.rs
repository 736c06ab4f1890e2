mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use eframe::egui;
use rusty_lightcurves::data::config::PipelineConfig;

use crate::app::LightCurveApp;
use crate::state::AppState;

/// Optional positional arguments: `[identifiers] [measurements] [config.json]`.
fn initial_state() -> anyhow::Result<AppState> {
    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let mut state = AppState::default();

    if let Some(config_path) = args.get(2) {
        state.config = PipelineConfig::from_file(config_path)
            .with_context(|| format!("loading configuration {}", config_path.display()))?;
    }
    state.identifiers_path = args.first().cloned();
    state.measurements_path = args.get(1).cloned();
    state.reload();
    Ok(state)
}

fn main() -> eframe::Result {
    env_logger::init();

    let state = match initial_state() {
        Ok(state) => state,
        Err(e) => {
            log::error!("{e:#}");
            AppState {
                status_message: Some(format!("Error: {e:#}")),
                ..AppState::default()
            }
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Lightcurves – Differential Photometry",
        options,
        Box::new(|_cc| Ok(Box::new(LightCurveApp::new(state)))),
    )
}
