use std::collections::HashSet;

use super::model::StudentDataset;

/// Headline figures over the filtered rows.
///
/// Averages and rates are `None` when no row carries the value, which the UI
/// shows as "n/a".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kpis {
    /// Filtered row count.
    pub records: usize,
    /// Distinct non-blank student identifiers.
    pub students: usize,
    /// Mean grade points.
    pub avg_gpa: Option<f64>,
    /// Percentage of rows with a known retention flag that were retained.
    pub retention_rate: Option<f64>,
    /// Mean engagement score.
    pub avg_engagement: Option<f64>,
    /// Rows flagged as needing advising.
    pub at_risk: usize,
}

/// Arithmetic mean of the values, `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Compute the KPIs for `indices`; `flags` is the aligned risk column.
pub fn compute_kpis(dataset: &StudentDataset, indices: &[usize], flags: &[bool]) -> Kpis {
    let rows = || indices.iter().map(|&i| &dataset.records[i]);

    let students: HashSet<&str> = rows()
        .map(|r| r.student_id.as_str())
        .filter(|id| !id.is_empty())
        .collect();
    let retention_rate = mean(
        rows()
            .filter_map(|r| r.retained)
            .map(|kept| if kept { 100.0 } else { 0.0 }),
    );

    Kpis {
        records: indices.len(),
        students: students.len(),
        avg_gpa: mean(rows().filter_map(|r| r.grade_points)),
        retention_rate,
        avg_engagement: mean(rows().filter_map(|r| r.engagement_score)),
        at_risk: flags.iter().filter(|&&f| f).count(),
    }
}

/// Format an optional figure with the given precision, `n/a` when undefined.
pub fn format_optional(value: Option<f64>, decimals: usize, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}{suffix}"),
        None => "n/a".to_string(),
    }
}
