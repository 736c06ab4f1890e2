use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct LightCurveApp {
    pub state: AppState,
}

impl LightCurveApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for LightCurveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: band, view, stars ----
        egui::SidePanel::left("control_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: differential table ----
        if self.state.curves.is_some() {
            egui::TopBottomPanel::bottom("table_panel")
                .resizable(true)
                .default_height(200.0)
                .show(ctx, |ui| {
                    table::differential_table(ui, &self.state);
                });
        }

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::light_curve_plot(ui, &self.state);
        });
    }
}
