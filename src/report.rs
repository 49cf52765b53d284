use std::fmt;

use chrono::NaiveDate;

use crate::data::charts::ChartSelection;
use crate::data::filter::{init_filter_state, FilterState};
use crate::data::metrics::format_optional;
use crate::data::model::StudentDataset;
use crate::data::view::DashboardView;

// ---------------------------------------------------------------------------
// Headless summary: the dashboard as plain text
// ---------------------------------------------------------------------------

/// Filters for a non-interactive run. Empty lists keep every value; missing
/// dates keep the dataset's own bounds.
pub fn narrow_filters(
    dataset: &StudentDataset,
    programs: &[String],
    campuses: &[String],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> FilterState {
    let mut filters = init_filter_state(dataset);
    if !programs.is_empty() {
        for p in programs.iter().filter(|p| !dataset.programs.contains(*p)) {
            log::warn!("Program '{p}' does not occur in the dataset");
        }
        filters.programs = programs.iter().cloned().collect();
    }
    if !campuses.is_empty() {
        for c in campuses.iter().filter(|c| !dataset.campuses.contains(*c)) {
            log::warn!("Campus '{c}' does not occur in the dataset");
        }
        filters.campuses = campuses.iter().cloned().collect();
    }
    if from.is_some() || to.is_some() {
        let (lo, hi) = dataset
            .term_bounds
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        filters.term_range = Some((from.unwrap_or(lo), to.unwrap_or(hi)));
    }
    filters
}

/// KPIs and both chart tables, rendered as plain text through `Display`.
pub struct Summary<'a> {
    pub dataset: &'a StudentDataset,
    pub view: &'a DashboardView,
    pub charts: ChartSelection,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = &self.view.kpis;
        writeln!(
            f,
            "{}: {} of {} records selected",
            self.dataset.report.source,
            k.records,
            self.dataset.len()
        )?;
        writeln!(f)?;
        writeln!(f, "  Students         {}", k.students)?;
        writeln!(f, "  Avg GPA          {}", format_optional(k.avg_gpa, 2, ""))?;
        writeln!(f, "  Retention        {}", format_optional(k.retention_rate, 1, "%"))?;
        writeln!(f, "  Avg engagement   {}", format_optional(k.avg_engagement, 1, ""))?;
        writeln!(f, "  Needs advising   {}", k.at_risk)?;

        writeln!(f)?;
        writeln!(
            f,
            "{} by {}",
            self.charts.group_measure.label(),
            self.charts.group_key.label()
        )?;
        for g in &self.view.group_chart {
            writeln!(f, "  {:<24} {:>8.2}  (n={})", g.label, g.mean, g.count)?;
        }

        writeln!(f)?;
        writeln!(f, "{} by term", self.charts.term_measure.label())?;
        for t in &self.view.term_chart {
            writeln!(f, "  {:<24} {:>8.2}  (n={})", t.term.to_string(), t.mean, t.count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::filtered_indices;
    use crate::data::model::fixtures::{dataset, date};
    use crate::data::risk::RiskRule;

    #[test]
    fn empty_arguments_keep_everything() {
        let ds = dataset();
        let filters = narrow_filters(&ds, &[], &[], None, None);
        assert_eq!(filters, init_filter_state(&ds));
    }

    #[test]
    fn arguments_narrow_the_selection() {
        let ds = dataset();
        let filters = narrow_filters(
            &ds,
            &["Business".to_string()],
            &[],
            Some(date(2024, 6, 1)),
            None,
        );
        assert_eq!(filters.term_range, Some((date(2024, 6, 1), date(2024, 9, 2))));
        assert_eq!(filtered_indices(&ds, &filters), vec![4, 5]);

        let unknown = narrow_filters(&ds, &["Law".to_string()], &[], None, None);
        assert!(filtered_indices(&ds, &unknown).is_empty());
    }

    #[test]
    fn summary_lists_kpis_and_chart_rows() {
        let ds = dataset();
        let filters = init_filter_state(&ds);
        let charts = ChartSelection::default();
        let view = DashboardView::compute(&ds, &filters, &RiskRule::default(), charts);
        let text = Summary { dataset: &ds, view: &view, charts }.to_string();

        assert!(text.contains("6 of 6 records selected"));
        assert!(text.contains("Students         5"));
        assert!(text.contains("Avg GPA          2.90"));
        assert!(text.contains("Needs advising   3"));
        assert!(text.contains("Avg GPA by Program"));
        assert!(text.contains("Business"));
        assert!(text.contains("Avg engagement by term"));
        assert!(text.contains("2024-09-02"));
    }

    #[test]
    fn empty_selection_prints_not_available() {
        let ds = dataset();
        let filters = narrow_filters(&ds, &[], &["Nowhere".to_string()], None, None);
        let view = DashboardView::compute(&ds, &filters, &RiskRule::default(), ChartSelection::default());
        let text = Summary {
            dataset: &ds,
            view: &view,
            charts: ChartSelection::default(),
        }
        .to_string();
        assert!(text.contains("Avg GPA          n/a"));
        assert!(text.contains("0 of 6 records selected"));
    }
}
