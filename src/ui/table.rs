use eframe::egui::{Color32, Grid, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{correlation_color, RISK_COLOR};
use crate::data::model::Field;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Preview table – filtered rows with the risk column
// ---------------------------------------------------------------------------

pub fn preview_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let view = &state.view;
    let shown = view.indices.len().min(state.config.preview_rows);

    ui.label(
        RichText::new(format!(
            "Showing {shown} of {} filtered rows (full set: {})",
            view.indices.len(),
            ds.len()
        ))
        .weak(),
    );

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .columns(Column::auto().at_least(60.0), Field::ALL.len())
        .column(Column::remainder().at_least(80.0))
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for field in Field::ALL {
                header.col(|ui| {
                    ui.strong(field.label());
                });
            }
            header.col(|ui| {
                ui.strong("Needs advising");
            });
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, shown, |mut row| {
                let n = row.index();
                let rec = &ds.records[view.indices[n]];
                let flagged = view.flags[n];
                for field in Field::ALL {
                    row.col(|ui| {
                        ui.label(rec.cell_text(field));
                    });
                }
                row.col(|ui| {
                    if flagged {
                        ui.label(RichText::new("Yes").color(RISK_COLOR).strong());
                    } else {
                        ui.label("No");
                    }
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Data-quality tab
// ---------------------------------------------------------------------------

pub fn quality_page(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let report = &ds.report;

    ui.heading("Load report");
    ui.label(format!(
        "{}: {} rows read, {} duplicates dropped, {} records kept",
        report.source,
        report.rows_read,
        report.duplicates_dropped,
        ds.len()
    ));
    if !report.ignored_columns.is_empty() {
        ui.label(format!("Ignored columns: {}", report.ignored_columns.join(", ")));
    }
    ui.separator();

    ui.heading("Missingness");
    if state.view.missing.is_empty() {
        ui.label("No missing values in the filtered rows.");
    } else {
        ui.push_id("missing_table", |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::auto().at_least(140.0))
                .columns(Column::auto().at_least(80.0), 2)
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for title in ["Column", "Missing", "Missing %"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for m in &state.view.missing {
                        body.row(ROW_HEIGHT, |mut row| {
                            row.col(|ui| {
                                ui.label(m.field.name());
                            });
                            row.col(|ui| {
                                ui.label(m.count.to_string());
                            });
                            row.col(|ui| {
                                ui.label(format!("{:.2}", m.percent));
                            });
                        });
                    }
                });
        });
    }
    ui.separator();

    ui.heading("Descriptive statistics");
    if state.view.summary.is_empty() {
        ui.label("No numeric values in the filtered rows.");
    } else {
        summary_table(ui, state);
    }
    ui.separator();

    ui.heading("Correlation (numeric)");
    correlation_grid(ui, state);
}

fn summary_table(ui: &mut Ui, state: &AppState) {
    ui.push_id("summary_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(140.0))
            .columns(Column::auto().at_least(70.0), 9)
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for title in [
                    "Column", "Count", "Missing", "Mean", "Std", "Min", "25%", "Median", "75%", "Max",
                ] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for s in &state.view.summary {
                    body.row(ROW_HEIGHT, |mut row| {
                        let cells = [
                            s.field.name().to_string(),
                            s.count.to_string(),
                            s.missing.to_string(),
                            format!("{:.3}", s.mean),
                            s.std.map(|v| format!("{v:.3}")).unwrap_or_else(|| "n/a".into()),
                            format!("{:.3}", s.min),
                            format!("{:.3}", s.q1),
                            format!("{:.3}", s.median),
                            format!("{:.3}", s.q3),
                            format!("{:.3}", s.max),
                        ];
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}

fn correlation_grid(ui: &mut Ui, state: &AppState) {
    let corr = &state.view.correlation;
    if corr.fields.len() < 2 || corr.values.iter().flatten().all(|v| v.is_none()) {
        ui.label("Not enough numeric values for a correlation matrix.");
        return;
    }
    Grid::new("correlation_grid")
        .spacing([4.0, 4.0])
        .min_col_width(90.0)
        .show(ui, |ui| {
            ui.label("");
            for field in &corr.fields {
                ui.strong(field.label());
            }
            ui.end_row();

            for (field, row) in corr.fields.iter().zip(&corr.values) {
                ui.strong(field.label());
                for value in row {
                    match value {
                        Some(r) => {
                            ui.label(
                                RichText::new(format!("{r:+.2}"))
                                    .color(Color32::BLACK)
                                    .background_color(correlation_color(*r)),
                            );
                        }
                        None => {
                            ui.label(RichText::new("n/a").weak());
                        }
                    }
                }
                ui.end_row();
            }
        });
}
