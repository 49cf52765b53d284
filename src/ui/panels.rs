use std::collections::BTreeSet;

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::color::RISK_COLOR;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let programs = dataset.programs.clone();
    let campuses = dataset.campuses.clone();
    let bounds = dataset.term_bounds;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Program multi-select ----
            if let Some(change) = multi_select(ui, "Program", &programs, &state.filters.programs) {
                match change {
                    Change::All(on) => state.set_all_programs(on),
                    Change::Toggle(value) => state.toggle_program(&value),
                }
            }
            ui.separator();

            // ---- Campus multi-select ----
            if let Some(change) = multi_select(ui, "Campus", &campuses, &state.filters.campuses) {
                match change {
                    Change::All(on) => state.set_all_campuses(on),
                    Change::Toggle(value) => state.toggle_campus(&value),
                }
            }
            ui.separator();

            // ---- Term window ----
            ui.strong("Term");
            match (bounds, state.filters.term_range) {
                (Some(_), Some((mut from, mut to))) => {
                    let mut changed = false;
                    egui::Grid::new("term_range").num_columns(2).show(ui, |ui: &mut Ui| {
                        ui.label("From");
                        changed |= ui
                            .add(DatePickerButton::new(&mut from).id_salt("term_from"))
                            .changed();
                        ui.end_row();
                        ui.label("To");
                        changed |= ui
                            .add(DatePickerButton::new(&mut to).id_salt("term_to"))
                            .changed();
                        ui.end_row();
                    });
                    if changed {
                        state.filters.term_range = Some((from, to));
                        state.refilter();
                    }
                    if ui.small_button("Full range").clicked() {
                        state.reset_term_range();
                    }
                    if from > to {
                        ui.label(RichText::new("Start is after end.").color(RISK_COLOR));
                    }
                }
                _ => {
                    ui.label("No term dates in this dataset.");
                }
            }
        });
}

enum Change {
    All(bool),
    Toggle(String),
}

/// A collapsible checkbox list with All/None buttons. Returns the user's
/// change, if any, so the caller can apply it and refilter.
fn multi_select(
    ui: &mut Ui,
    title: &str,
    options: &BTreeSet<String>,
    selected: &BTreeSet<String>,
) -> Option<Change> {
    let mut change = None;
    let header = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    change = Some(Change::All(true));
                }
                if ui.small_button("None").clicked() {
                    change = Some(Change::All(false));
                }
            });

            for value in options {
                let mut checked = selected.contains(value);
                let label = if value.is_empty() { "<blank>" } else { value.as_str() };
                if ui.checkbox(&mut checked, label).changed() {
                    change = Some(Change::Toggle(value.clone()));
                }
            }
        });

    change
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Download filtered CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.selectable_value(&mut state.tab, Tab::Dashboard, "Dashboard");
        ui.selectable_value(&mut state.tab, Tab::Quality, "Data quality");
        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {} records loaded, {} visible",
                ds.report.source,
                ds.len(),
                state.view.indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(RISK_COLOR));
        } else if let Some(msg) = &state.notice {
            ui.label(RichText::new(msg).weak());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open enrollment data")
        .add_filter("Supported files", &["csv", "xlsx", "xlsm", "xls", "ods", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered CSV")
        .add_filter("CSV", &["csv"])
        .set_file_name(state.export_name())
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
