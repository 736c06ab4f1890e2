use std::collections::BTreeSet;

use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};
use rusty_lightcurves::data::model::SeriesPoint;
use rusty_lightcurves::data::pipeline::FilterCurves;

use crate::color::StarColors;
use crate::state::{AppState, CurveView};

/// Extra room around the data, as a fraction of the data span.
pub const MJD_MARGIN: f64 = 0.05;
pub const MAG_MARGIN: f64 = 0.5;

// ---------------------------------------------------------------------------
// Plot-ready curves
// ---------------------------------------------------------------------------

/// One labelled series as the renderer draws it.
#[derive(Debug, Clone)]
pub struct Curve {
    pub star: usize,
    pub label: String,
    pub color: Color32,
    pub points: Vec<SeriesPoint>,
}

/// Collect the visible series of one band for the chosen view.
pub fn curves_for_view(
    fc: &FilterCurves,
    view: CurveView,
    hidden: &BTreeSet<usize>,
    colors: &StarColors,
) -> Vec<Curve> {
    let curve = |star: usize, label: &str, points: Vec<SeriesPoint>| Curve {
        star,
        label: label.to_string(),
        color: colors.color_for(star),
        points,
    };

    let all: Vec<Curve> = match view {
        CurveView::Magnitudes => (0..fc.table.star_count())
            .map(|s| curve(s, fc.table.schema.label(s), fc.table.star_series(s)))
            .collect(),
        CurveView::Object => vec![curve(fc.object.subject, &fc.object.label, fc.object.plot_points())],
        CurveView::References => fc
            .references
            .iter()
            .map(|r| curve(r.subject, &r.label, r.plot_points()))
            .collect(),
    };

    all.into_iter()
        .filter(|c| !hidden.contains(&c.star) && !c.points.is_empty())
        .collect()
}

/// Min/max of `values` widened by `margin` × span. `None` for no values.
pub fn axis_extent<I>(values: I, margin: f64) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    let pad = margin * (max - min);
    Some((min - pad, max + pad))
}

fn y_axis_label(view: CurveView, object: &str) -> String {
    match view {
        CurveView::Magnitudes => "Magnitude".to_string(),
        CurveView::Object => format!("mean(ref. stars mag.) − {object} mag."),
        CurveView::References => "mean(other ref. mag.) − ref. mag.".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Light-curve plot (central panel)
// ---------------------------------------------------------------------------

/// Render the selected band and view. Values are drawn negated so that the
/// magnitude axis reads brighter-upward; tick labels undo the negation.
pub fn light_curve_plot(ui: &mut Ui, state: &AppState) {
    let (Some(fc), Some(colors)) = (state.selected_curves(), state.colors.as_ref()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an identifier file and a measurement file  (File → Open…)");
        });
        return;
    };

    let object = fc.table.schema.label(0).to_string();
    ui.heading(format!("{object} – {} filter – {}", fc.band, state.view.label()));

    let curves = curves_for_view(fc, state.view, &state.hidden_stars, colors);
    let epochs: Vec<f64> = curves.iter().flat_map(|c| c.points.iter().map(|p| p.epoch)).collect();
    let heights: Vec<f64> = curves.iter().flat_map(|c| c.points.iter().map(|p| -p.value)).collect();

    let mut plot = Plot::new(("light_curve", fc.band.as_str(), state.view.label()))
        .legend(Legend::default())
        .x_axis_label("MJD")
        .y_axis_label(y_axis_label(state.view, &object))
        .y_axis_formatter(|mark, _range| format!("{:.2}", -mark.value))
        .label_formatter(|name, value| {
            format!("{name}\nMJD {:.4}\n{:.3}", value.x, -value.y)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if let Some((lo, hi)) = axis_extent(epochs, MJD_MARGIN) {
        plot = plot.include_x(lo).include_x(hi);
    }
    if let Some((lo, hi)) = axis_extent(heights, MAG_MARGIN) {
        plot = plot.include_y(lo).include_y(hi);
    }

    let show_errors = state.show_error_bars;
    plot.show(ui, |plot_ui| {
        for c in &curves {
            let xy: Vec<[f64; 2]> = c.points.iter().map(|p| [p.epoch, -p.value]).collect();

            plot_ui.line(
                Line::new(PlotPoints::from(xy.clone()))
                    .name(&c.label)
                    .color(c.color)
                    .width(1.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(xy))
                    .name(&c.label)
                    .color(c.color)
                    .radius(2.5),
            );

            if show_errors {
                for p in &c.points {
                    let Some(err) = p.error else { continue };
                    let bar = vec![[p.epoch, -(p.value - err)], [p.epoch, -(p.value + err)]];
                    plot_ui.line(Line::new(PlotPoints::from(bar)).color(c.color).width(1.0));
                }
            }
        }
    });
}
