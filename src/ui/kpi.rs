use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::RISK_COLOR;
use crate::data::metrics::{format_optional, Kpis};
use crate::state::AppState;

/// KPI cards above the charts, plus the download button.
pub fn kpi_row(ui: &mut Ui, state: &mut AppState) {
    let kpis: &Kpis = &state.view.kpis;
    let cards = [
        ("Students", kpis.students.to_string(), None),
        ("Avg GPA", format_optional(kpis.avg_gpa, 2, ""), None),
        ("Retention", format_optional(kpis.retention_rate, 1, "%"), None),
        ("Avg engagement", format_optional(kpis.avg_engagement, 1, ""), None),
        (
            "Needs advising",
            format!("{} / {}", kpis.at_risk, kpis.records),
            (kpis.at_risk > 0).then_some(RISK_COLOR),
        ),
    ];

    ui.columns(cards.len(), |cols| {
        for (col, (title, value, color)) in cols.iter_mut().zip(cards) {
            card(col, title, &value, color);
        }
    });

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("⬇ Download filtered CSV").clicked() {
            crate::ui::panels::save_file_dialog(state);
        }
        ui.label(RichText::new(state.export_name()).weak());
    });
}

fn card(ui: &mut Ui, title: &str, value: &str, color: Option<Color32>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(title).small().weak());
        let mut text = RichText::new(value).size(22.0).strong();
        if let Some(c) = color {
            text = text.color(c);
        }
        ui.label(text);
    });
}
