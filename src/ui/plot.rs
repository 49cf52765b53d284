use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{generate_palette, CategoryColors};
use crate::data::charts::{GroupKey, Measure};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Chart row (central panel)
// ---------------------------------------------------------------------------

/// Render the group-mean and term-mean charts side by side.
pub fn chart_row(ui: &mut Ui, state: &mut AppState) {
    ui.columns(2, |cols| {
        group_chart(&mut cols[0], state);
        term_chart(&mut cols[1], state);
    });
}

fn group_chart(ui: &mut Ui, state: &mut AppState) {
    let mut selection = state.charts;
    ui.horizontal(|ui: &mut Ui| {
        measure_combo(ui, "group_measure", &mut selection.group_measure);
        ui.label("by");
        egui::ComboBox::from_id_salt("group_key")
            .selected_text(selection.group_key.label())
            .show_ui(ui, |ui: &mut Ui| {
                for key in GroupKey::ALL {
                    ui.selectable_value(&mut selection.group_key, key, key.label());
                }
            });
    });
    if selection != state.charts {
        state.charts = selection;
        state.refilter();
    }

    let groups = &state.view.group_chart;
    if groups.is_empty() {
        empty_chart(ui);
        return;
    }

    let colors = CategoryColors::new(groups.iter().map(|g| g.label.as_str()));
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.mean)
                .name(format!("{} (n={})", g.label, g.count))
                .fill(colors.color_for(&g.label))
                .width(0.6)
        })
        .collect();
    let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
    let measure = selection.group_measure;

    Plot::new("group_chart")
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .y_axis_label(measure.label())
        .x_axis_formatter(move |mark, _range| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() > 1e-6 || slot < 0.0 {
                return String::new();
            }
            labels.get(slot as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(measure.label()));
        });
}

fn term_chart(ui: &mut Ui, state: &mut AppState) {
    let mut selection = state.charts;
    ui.horizontal(|ui: &mut Ui| {
        measure_combo(ui, "term_measure", &mut selection.term_measure);
        ui.label("by term");
    });
    if selection != state.charts {
        state.charts = selection;
        state.refilter();
    }

    let terms = &state.view.term_chart;
    if terms.is_empty() {
        empty_chart(ui);
        return;
    }

    let measure = selection.term_measure;
    let color = generate_palette(1)[0];
    let points: Vec<[f64; 2]> = terms
        .iter()
        .map(|t| [date_to_x(t.term), t.mean])
        .collect();

    Plot::new("term_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(measure.label())
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(|name, value| match x_to_date(value.x) {
            Some(d) if !name.is_empty() => format!("{name}\n{d}: {:.2}", value.y),
            Some(d) => format!("{d}: {:.2}", value.y),
            None => String::new(),
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name(measure.label())
                    .color(color)
                    .width(2.0),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).color(color).radius(3.0));
        });
}

fn measure_combo(ui: &mut Ui, id: &str, measure: &mut Measure) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(measure.label())
        .show_ui(ui, |ui: &mut Ui| {
            for m in Measure::ALL {
                ui.selectable_value(measure, m, m.label());
            }
        });
}

fn empty_chart(ui: &mut Ui) {
    ui.allocate_ui(egui::vec2(ui.available_width(), CHART_HEIGHT), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No data for the current filters.");
        });
    });
}

/// Dates are plotted as day numbers so the axis stays linear in time.
fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}
