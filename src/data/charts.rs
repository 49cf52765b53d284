use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{StudentDataset, StudentRecord};

// ---------------------------------------------------------------------------
// Chart axes
// ---------------------------------------------------------------------------

/// Categorical column used as the x axis of the group chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupKey {
    #[default]
    Program,
    Campus,
    Course,
}

impl GroupKey {
    pub const ALL: [GroupKey; 3] = [GroupKey::Program, GroupKey::Campus, GroupKey::Course];

    pub fn label(self) -> &'static str {
        match self {
            GroupKey::Program => "Program",
            GroupKey::Campus => "Campus",
            GroupKey::Course => "Course",
        }
    }

    fn value(self, record: &StudentRecord) -> &str {
        match self {
            GroupKey::Program => &record.program,
            GroupKey::Campus => &record.campus,
            GroupKey::Course => &record.course,
        }
    }
}

/// Quantity averaged on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    GradePoints,
    EngagementScore,
    CreditHours,
    /// Retained share in percent.
    Retention,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::GradePoints,
        Measure::EngagementScore,
        Measure::CreditHours,
        Measure::Retention,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Measure::GradePoints => "Avg GPA",
            Measure::EngagementScore => "Avg engagement",
            Measure::CreditHours => "Avg credit hours",
            Measure::Retention => "Retention %",
        }
    }

    pub fn value(self, record: &StudentRecord) -> Option<f64> {
        match self {
            Measure::GradePoints => record.grade_points,
            Measure::EngagementScore => record.engagement_score,
            Measure::CreditHours => record.credit_hours,
            Measure::Retention => record.retained.map(|kept| if kept { 100.0 } else { 0.0 }),
        }
    }
}

/// Which aggregates the two charts show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSelection {
    pub group_key: GroupKey,
    pub group_measure: Measure,
    pub term_measure: Measure,
}

impl Default for ChartSelection {
    fn default() -> Self {
        Self {
            group_key: GroupKey::Program,
            group_measure: Measure::GradePoints,
            term_measure: Measure::EngagementScore,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// One bar of the group chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub label: String,
    pub mean: f64,
    /// Rows contributing a value.
    pub count: usize,
}

/// One point of the term chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMean {
    pub term: NaiveDate,
    pub mean: f64,
    pub count: usize,
}

#[derive(Default)]
struct Acc {
    sum: f64,
    count: usize,
}

impl Acc {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Mean of `measure` per group over the given rows, sorted by group label.
/// Rows missing the measure or the group key are skipped; groups left with
/// no value vanish.
pub fn group_means(
    dataset: &StudentDataset,
    indices: &[usize],
    key: GroupKey,
    measure: Measure,
) -> Vec<GroupMean> {
    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for rec in indices.iter().map(|&i| &dataset.records[i]) {
        let label = key.value(rec);
        if label.is_empty() {
            continue;
        }
        if let Some(v) = measure.value(rec) {
            groups.entry(label).or_default().push(v);
        }
    }
    groups
        .into_iter()
        .map(|(label, acc)| GroupMean {
            label: label.to_string(),
            mean: acc.mean(),
            count: acc.count,
        })
        .collect()
}

/// Mean of `measure` per term date, in date order. Undated rows are skipped.
pub fn term_means(dataset: &StudentDataset, indices: &[usize], measure: Measure) -> Vec<TermMean> {
    let mut terms: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for rec in indices.iter().map(|&i| &dataset.records[i]) {
        if let (Some(term), Some(v)) = (rec.term, measure.value(rec)) {
            terms.entry(term).or_default().push(v);
        }
    }
    terms
        .into_iter()
        .map(|(term, acc)| TermMean {
            term,
            mean: acc.mean(),
            count: acc.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{dataset, date};

    fn all(ds: &StudentDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn gpa_by_program() {
        let ds = dataset();
        let bars = group_means(&ds, &all(&ds), GroupKey::Program, Measure::GradePoints);
        assert_eq!(
            bars,
            vec![
                // 3.5 and 3.0; the fifth row has no grade.
                GroupMean { label: "Business".into(), mean: 3.25, count: 2 },
                GroupMean { label: "Nursing".into(), mean: 8.0 / 3.0, count: 3 },
            ]
        );
    }

    #[test]
    fn retention_by_campus_is_a_percentage() {
        let ds = dataset();
        let bars = group_means(&ds, &all(&ds), GroupKey::Campus, Measure::Retention);
        let north = bars.iter().find(|b| b.label == "North").unwrap();
        assert_eq!(north.count, 4);
        assert!((north.mean - 75.0).abs() < 1e-9);
    }

    #[test]
    fn engagement_by_term_in_date_order() {
        let ds = dataset();
        let points = term_means(&ds, &all(&ds), Measure::EngagementScore);
        let terms: Vec<NaiveDate> = points.iter().map(|p| p.term).collect();
        assert_eq!(terms, vec![date(2024, 1, 15), date(2024, 5, 20), date(2024, 9, 2)]);
        assert!((points[0].mean - 60.0).abs() < 1e-9);
        assert!((points[2].mean - 67.5).abs() < 1e-9);
    }

    #[test]
    fn blank_group_keys_are_skipped() {
        let mut ds = dataset();
        ds.records[0].course = String::new();
        ds.records[1].course = String::new();
        let bars = group_means(&ds, &all(&ds), GroupKey::Course, Measure::GradePoints);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].label, "MATH101");
        assert_eq!(bars[0].count, 3);
    }

    #[test]
    fn aggregates_follow_the_filter() {
        let ds = dataset();
        let bars = group_means(&ds, &[1], GroupKey::Program, Measure::GradePoints);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].mean, 2.0);
        assert!(term_means(&ds, &[], Measure::GradePoints).is_empty());
    }
}
