use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};
use rusty_lightcurves::data::differential::DifferentialSeries;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Differential table (bottom panel)
// ---------------------------------------------------------------------------

/// Differential series the table lists: the object, or one reference.
pub fn table_series(state: &AppState) -> Option<&DifferentialSeries> {
    let fc = state.selected_curves()?;
    if state.table_star == 0 {
        Some(&fc.object)
    } else {
        fc.references.iter().find(|r| r.subject == state.table_star)
    }
}

fn cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "—".to_string(),
    }
}

/// Row-by-row listing of one differential series.
pub fn differential_table(ui: &mut Ui, state: &AppState) {
    let Some(series) = table_series(state) else {
        ui.label("No differential series selected.");
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Star {}", series.label));
        ui.label(format!(
            "{} of {} rows defined",
            series.defined_len(),
            series.points.len()
        ));
    });

    let points = &series.points;
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(90.0))
        .columns(Column::remainder().at_least(70.0), 4)
        .header(20.0, |mut header| {
            for title in ["MJD", "Star mag.", "Comparison mean", "Difference", "Error"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, points.len(), |mut row| {
                let p = points[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", p.epoch));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(cell(p.subject, 3));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(cell(p.comparison_mean, 3));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(cell(p.difference, 3));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(cell(p.error, 3));
                });
            });
        });
}
