use std::collections::BTreeSet;
use std::path::PathBuf;

use rusty_lightcurves::data::config::PipelineConfig;
use rusty_lightcurves::data::model::MeasurementTable;
use rusty_lightcurves::data::pipeline::{build_light_curves, load_table, FilterCurves, LightCurves};

use crate::color::StarColors;

// ---------------------------------------------------------------------------
// Curve views
// ---------------------------------------------------------------------------

/// Which series the central plot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveView {
    /// Raw magnitude of every star.
    Magnitudes,
    /// Object minus mean of the references.
    #[default]
    Object,
    /// Each reference minus mean of the other references.
    References,
}

impl CurveView {
    pub const ALL: [CurveView; 3] = [CurveView::Magnitudes, CurveView::Object, CurveView::References];

    pub fn label(self) -> &'static str {
        match self {
            CurveView::Magnitudes => "Magnitudes",
            CurveView::Object => "Object differential",
            CurveView::References => "Reference differentials",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub config: PipelineConfig,

    pub identifiers_path: Option<PathBuf>,
    pub measurements_path: Option<PathBuf>,

    /// Loaded, epoch-sorted measurements (None until both files are loaded).
    pub table: Option<MeasurementTable>,

    /// Light curves derived from `table` with the current `config`.
    pub curves: Option<LightCurves>,

    pub selected_band: Option<String>,
    pub view: CurveView,
    pub show_error_bars: bool,

    /// Star indices hidden from the plot.
    pub hidden_stars: BTreeSet<usize>,

    /// Star whose differential series the bottom table lists (0 = object).
    pub table_star: usize,

    pub colors: Option<StarColors>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn set_identifiers_path(&mut self, path: PathBuf) {
        self.identifiers_path = Some(path);
        self.reload();
    }

    pub fn set_measurements_path(&mut self, path: PathBuf) {
        self.measurements_path = Some(path);
        self.reload();
    }

    /// Replace the configuration and re-read the inputs with it.
    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
        self.reload();
    }

    /// Read both input files again, if known. A failed load clears the
    /// previous table so nothing stale is shown under the new paths.
    pub fn reload(&mut self) {
        let (Some(ids), Some(meas)) = (&self.identifiers_path, &self.measurements_path) else {
            return;
        };
        match load_table(ids, meas, &self.config) {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load measurements: {e:#}");
                self.table = None;
                self.curves = None;
                self.colors = None;
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table, reset colours and rebuild the curves.
    pub fn set_table(&mut self, table: MeasurementTable) {
        self.colors = Some(StarColors::new(&table.schema));
        self.hidden_stars.clear();
        self.table_star = 0;
        self.table = Some(table);
        self.status_message = None;
        self.rebuild();
    }

    /// Recompute the light curves after a table or option change.
    pub fn rebuild(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match build_light_curves(table, &self.config) {
            Ok(curves) => {
                let keep = self
                    .selected_band
                    .as_deref()
                    .is_some_and(|b| curves.band(b).is_some());
                if !keep {
                    self.selected_band = curves.filters.first().map(|f| f.band.clone());
                }
                if curves.dropped_rows > 0 {
                    self.status_message = Some(format!(
                        "{} rows with unrecognized filter bands ignored",
                        curves.dropped_rows
                    ));
                }
                self.curves = Some(curves);
            }
            Err(e) => {
                log::error!("Failed to build light curves: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.curves = None;
            }
        }
    }

    pub fn set_aggregate_days(&mut self, on: bool) {
        if self.config.aggregate_days != on {
            self.config.aggregate_days = on;
            self.rebuild();
        }
    }

    pub fn select_band(&mut self, band: &str) {
        self.selected_band = Some(band.to_string());
    }

    /// Curves of the selected band.
    pub fn selected_curves(&self) -> Option<&FilterCurves> {
        let band = self.selected_band.as_deref()?;
        self.curves.as_ref()?.band(band)
    }

    pub fn toggle_star(&mut self, star: usize) {
        if !self.hidden_stars.remove(&star) {
            self.hidden_stars.insert(star);
        }
    }

    pub fn is_star_visible(&self, star: usize) -> bool {
        !self.hidden_stars.contains(&star)
    }
}
