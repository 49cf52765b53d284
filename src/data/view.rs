use super::charts::{group_means, term_means, ChartSelection, GroupMean, TermMean};
use super::filter::{filtered_indices, FilterState};
use super::metrics::{compute_kpis, Kpis};
use super::model::StudentDataset;
use super::risk::{risk_flags, RiskRule};
use super::stats::{correlation, describe, missing_table, ColumnSummary, CorrelationMatrix, MissingColumn};

/// Everything derived from the dataset for the current filters.
///
/// Recomputed in full whenever the dataset, a filter or a chart selector
/// changes; nothing here is carried between recomputations.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    /// Indices of records passing the filters.
    pub indices: Vec<usize>,
    /// Risk column aligned with `indices`.
    pub flags: Vec<bool>,
    pub kpis: Kpis,
    pub group_chart: Vec<GroupMean>,
    pub term_chart: Vec<TermMean>,
    pub summary: Vec<ColumnSummary>,
    pub missing: Vec<MissingColumn>,
    pub correlation: CorrelationMatrix,
}

impl DashboardView {
    pub fn compute(
        dataset: &StudentDataset,
        filters: &FilterState,
        rule: &RiskRule,
        charts: ChartSelection,
    ) -> Self {
        let indices = filtered_indices(dataset, filters);
        let flags = risk_flags(dataset, &indices, rule);
        let kpis = compute_kpis(dataset, &indices, &flags);
        let group_chart = group_means(dataset, &indices, charts.group_key, charts.group_measure);
        let term_chart = term_means(dataset, &indices, charts.term_measure);
        let summary = describe(dataset, &indices);
        let missing = missing_table(dataset, &indices);
        let correlation = correlation(dataset, &indices);

        log::debug!(
            "{} of {} records pass the filters, {} need advising",
            indices.len(),
            dataset.len(),
            kpis.at_risk
        );

        DashboardView {
            indices,
            flags,
            kpis,
            group_chart,
            term_chart,
            summary,
            missing,
            correlation,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::charts::{GroupKey, Measure};
    use crate::data::filter::init_filter_state;
    use crate::data::model::fixtures::dataset;

    #[test]
    fn view_is_consistent_with_its_rows() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters.programs = BTreeSet::from(["Business".to_string()]);
        let view = DashboardView::compute(&ds, &filters, &RiskRule::default(), ChartSelection::default());

        assert_eq!(view.indices, vec![2, 4, 5]);
        assert_eq!(view.flags.len(), view.indices.len());
        assert_eq!(view.kpis.records, 3);
        assert_eq!(view.kpis.at_risk, 2);
        assert_eq!(view.group_chart.len(), 1);
        assert_eq!(view.group_chart[0].label, "Business");
        assert_eq!(view.term_chart.len(), 2);
        assert_eq!(view.correlation.fields.len(), 3);
    }

    #[test]
    fn chart_selection_changes_aggregates() {
        let ds = dataset();
        let filters = init_filter_state(&ds);
        let charts = ChartSelection {
            group_key: GroupKey::Campus,
            group_measure: Measure::EngagementScore,
            term_measure: Measure::Retention,
        };
        let view = DashboardView::compute(&ds, &filters, &RiskRule::default(), charts);
        let labels: Vec<&str> = view.group_chart.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["North", "South"]);
        // May: one retained, one not.
        assert_eq!(view.term_chart[1].mean, 50.0);
    }

    #[test]
    fn empty_filter_yields_empty_view() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters.programs.clear();
        let view = DashboardView::compute(&ds, &filters, &RiskRule::default(), ChartSelection::default());
        assert!(view.indices.is_empty());
        assert_eq!(view.kpis.avg_gpa, None);
        assert!(view.group_chart.is_empty());
        assert!(view.summary.is_empty());
        assert!(view.missing.is_empty());
    }
}
