use eframe::egui::{self, Ui};

use crate::state::{AppState, Tab};
use crate::ui::{kpi, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open an enrollment file to begin  (File → Open…)");
                });
                return;
            }
            match self.state.tab {
                Tab::Dashboard => {
                    kpi::kpi_row(ui, &mut self.state);
                    ui.separator();
                    plot::chart_row(ui, &mut self.state);
                    ui.separator();
                    table::preview_table(ui, &self.state);
                }
                Tab::Quality => {
                    egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                        table::quality_page(ui, &self.state);
                    });
                }
            }
        });
    }
}
