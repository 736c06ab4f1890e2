use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_lightcurves::data::config::PipelineConfig;

use crate::state::{AppState, CurveView};

// ---------------------------------------------------------------------------
// Left side panel – band, view and star selection
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Light curves");
    ui.separator();

    let Some(curves) = &state.curves else {
        ui.label("No measurements loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the closures.
    let bands: Vec<String> = curves.filters.iter().map(|f| f.band.clone()).collect();
    let legend = state
        .colors
        .as_ref()
        .map(|c| c.legend_entries())
        .unwrap_or_default();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Filter band ----
            ui.strong("Filter band");
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for band in &bands {
                    let selected = state.selected_band.as_deref() == Some(band.as_str());
                    if ui.selectable_label(selected, band).clicked() {
                        state.select_band(band);
                    }
                }
            });
            ui.separator();

            // ---- View ----
            ui.strong("View");
            for view in CurveView::ALL {
                ui.radio_value(&mut state.view, view, view.label());
            }
            ui.separator();

            // ---- Options ----
            let mut aggregate = state.config.aggregate_days;
            if ui.checkbox(&mut aggregate, "Average per night").changed() {
                state.set_aggregate_days(aggregate);
            }
            ui.checkbox(&mut state.show_error_bars, "Error bars");
            ui.separator();

            // ---- Stars ----
            egui::CollapsingHeader::new(RichText::new(format!("Stars ({})", legend.len())).strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for (star, (label, color)) in legend.iter().enumerate() {
                        let text = if star == 0 {
                            format!("{label}  (object)")
                        } else {
                            label.clone()
                        };
                        let mut visible = state.is_star_visible(star);
                        if ui
                            .checkbox(&mut visible, RichText::new(text).color(*color))
                            .changed()
                        {
                            state.toggle_star(star);
                        }
                    }
                });
            ui.separator();

            // ---- Table series ----
            ui.strong("Table");
            let current = legend
                .get(state.table_star)
                .map(|(l, _)| l.clone())
                .unwrap_or_default();
            egui::ComboBox::from_id_salt("table_star")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    for (star, (label, _)) in legend.iter().enumerate() {
                        ui.selectable_value(&mut state.table_star, star, label);
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open identifiers…").clicked() {
                open_identifiers_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open measurements…").clicked() {
                open_measurements_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open configuration…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!("{table} loaded"));
        }
        if let Some(fc) = state.selected_curves() {
            ui.label(format!("{}: {} rows", fc.band, fc.table.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_identifiers_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open star identifiers")
        .add_filter("Coordinates / identifiers", &["csv", "coo", "txt"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Identifier file: {}", path.display());
        state.set_identifiers_path(path);
    }
}

pub fn open_measurements_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open magnitude measurements")
        .add_filter("Delimited text", &["tsv", "csv", "txt"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Measurement file: {}", path.display());
        state.set_measurements_path(path);
    }
}

pub fn open_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open configuration")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match PipelineConfig::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                state.set_config(config);
            }
            Err(e) => {
                log::error!("Failed to load configuration: {e}");
                state.status_message = Some(format!("Error: {}: {e}", path.display()));
            }
        }
    }
}
