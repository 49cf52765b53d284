use std::path::Path;

use crate::config::DashboardConfig;
use crate::data::charts::ChartSelection;
use crate::data::export::{export_file_name, save_csv};
use crate::data::filter::{init_filter_state, FilterState};
use crate::data::loader::load_file;
use crate::data::model::StudentDataset;
use crate::data::view::DashboardView;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which page of the central panel is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Quality,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<StudentDataset>,

    /// Sidebar filter selections.
    pub filters: FilterState,

    /// Chart group/measure selectors.
    pub charts: ChartSelection,

    /// Everything derived for the current filters (cached).
    pub view: DashboardView,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Informational message (e.g. last export) shown in the UI.
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            filters: FilterState::default(),
            charts: ChartSelection::default(),
            view: DashboardView::default(),
            tab: Tab::default(),
            status_message: None,
            notice: None,
        }
    }

    /// Ingest a newly loaded dataset, initialise filters and the view.
    pub fn set_dataset(&mut self, dataset: StudentDataset) {
        self.filters = init_filter_state(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.notice = None;
        self.refilter();
    }

    /// Load a file; on failure the dataset is cleared and the error shown.
    pub fn open_path(&mut self, path: &Path) {
        match load_file(path, &self.config.load_options()) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.dataset = None;
                self.filters = FilterState::default();
                self.view = DashboardView::default();
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute the derived view after a filter or selector change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.view = DashboardView::compute(ds, &self.filters, &self.config.risk, self.charts);
        }
    }

    /// Default download name for the current dataset.
    pub fn export_name(&self) -> String {
        let source = self
            .dataset
            .as_ref()
            .map(|ds| ds.report.source.as_str())
            .unwrap_or_default();
        export_file_name(source)
    }

    /// Write the filtered rows to `path`; the dataset survives a failure.
    pub fn export_to(&mut self, path: &Path) {
        let Some(ds) = &self.dataset else {
            return;
        };
        match save_csv(path, ds, &self.view.indices, &self.view.flags) {
            Ok(()) => {
                self.status_message = None;
                self.notice = Some(format!(
                    "Saved {} rows to {}",
                    self.view.indices.len(),
                    path.display()
                ));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }

    /// Toggle one program in the program filter.
    pub fn toggle_program(&mut self, program: &str) {
        if !self.filters.programs.remove(program) {
            self.filters.programs.insert(program.to_string());
        }
        self.refilter();
    }

    /// Toggle one campus in the campus filter.
    pub fn toggle_campus(&mut self, campus: &str) {
        if !self.filters.campuses.remove(campus) {
            self.filters.campuses.insert(campus.to_string());
        }
        self.refilter();
    }

    /// Select all programs, or none.
    pub fn set_all_programs(&mut self, selected: bool) {
        if let Some(ds) = &self.dataset {
            self.filters.programs = if selected { ds.programs.clone() } else { Default::default() };
            self.refilter();
        }
    }

    /// Select all campuses, or none.
    pub fn set_all_campuses(&mut self, selected: bool) {
        if let Some(ds) = &self.dataset {
            self.filters.campuses = if selected { ds.campuses.clone() } else { Default::default() };
            self.refilter();
        }
    }

    /// Restore the full term window.
    pub fn reset_term_range(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filters.term_range = ds.term_bounds;
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{dataset, date};

    const HEADER: &str = "student_id,term,program,campus,course,credit_hours,grade_points,engagement_score,retained,advising_flag";

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(dataset());
        state
    }

    #[test]
    fn new_dataset_shows_every_row() {
        let state = loaded();
        assert_eq!(state.view.indices.len(), 6);
        assert_eq!(state.view.kpis.at_risk, 3);
    }

    #[test]
    fn toggles_refilter_immediately() {
        let mut state = loaded();
        state.toggle_program("Nursing");
        assert_eq!(state.view.indices, vec![2, 4, 5]);
        state.toggle_campus("South");
        assert_eq!(state.view.indices, vec![2, 5]);
        state.toggle_program("Nursing");
        assert_eq!(state.view.indices, vec![0, 2, 3, 5]);

        state.set_all_campuses(false);
        assert!(state.view.indices.is_empty());
        state.set_all_campuses(true);
        state.set_all_programs(true);
        assert_eq!(state.view.indices.len(), 6);
    }

    #[test]
    fn term_window_and_reset() {
        let mut state = loaded();
        state.filters.term_range = Some((date(2024, 9, 1), date(2024, 12, 31)));
        state.refilter();
        assert_eq!(state.view.indices, vec![4, 5]);
        state.reset_term_range();
        assert_eq!(state.view.indices.len(), 6);
    }

    #[test]
    fn failed_load_clears_dataset_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, "student_id,program\nS1,Nursing\n").unwrap();

        let mut state = loaded();
        state.open_path(&path);
        assert!(state.dataset.is_none());
        assert!(state.view.indices.is_empty());
        let msg = state.status_message.unwrap();
        assert!(msg.contains("missing required column"), "{msg}");
    }

    #[test]
    fn open_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fall.csv");
        std::fs::write(
            &path,
            format!(
                "{HEADER}\n\
                 S1,2024-09-02,Nursing,North,BIO101,4,3.7,82.5,true,No\n\
                 S2,2024-09-02,Business,South,ACC200,3,2.1,41,true,No\n"
            ),
        )
        .unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.open_path(&path);
        assert_eq!(state.view.kpis.records, 2);
        assert_eq!(state.export_name(), "filtered_fall.csv");

        state.toggle_program("Business");
        let out = dir.path().join(state.export_name());
        state.export_to(&out);
        assert!(state.notice.as_deref().unwrap().starts_with("Saved 1 rows"));

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("S1,2024-09-02,Nursing"));
    }
}
