use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Field – the ten columns of an enrollment table
// ---------------------------------------------------------------------------

/// A column of the enrollment table, in canonical file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    StudentId,
    Term,
    Program,
    Campus,
    Course,
    CreditHours,
    GradePoints,
    EngagementScore,
    Retained,
    AdvisingFlag,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::StudentId,
        Field::Term,
        Field::Program,
        Field::Campus,
        Field::Course,
        Field::CreditHours,
        Field::GradePoints,
        Field::EngagementScore,
        Field::Retained,
        Field::AdvisingFlag,
    ];

    /// Numeric columns, the ones covered by descriptive statistics.
    pub const NUMERIC: [Field; 3] = [Field::CreditHours, Field::GradePoints, Field::EngagementScore];

    /// Header name as it appears in files (after normalization).
    pub fn name(self) -> &'static str {
        match self {
            Field::StudentId => "student_id",
            Field::Term => "term",
            Field::Program => "program",
            Field::Campus => "campus",
            Field::Course => "course",
            Field::CreditHours => "credit_hours",
            Field::GradePoints => "grade_points",
            Field::EngagementScore => "engagement_score",
            Field::Retained => "retained",
            Field::AdvisingFlag => "advising_flag",
        }
    }

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Field::StudentId => "Student ID",
            Field::Term => "Term",
            Field::Program => "Program",
            Field::Campus => "Campus",
            Field::Course => "Course",
            Field::CreditHours => "Credit hours",
            Field::GradePoints => "Grade points",
            Field::EngagementScore => "Engagement",
            Field::Retained => "Retained",
            Field::AdvisingFlag => "Advising flag",
        }
    }

    /// Look up a field by a raw header, tolerating case, padding and
    /// space/hyphen separators (`"Engagement Score"` → `engagement_score`).
    pub fn from_header(header: &str) -> Option<Field> {
        let normalized = normalize_header(header);
        Field::ALL.into_iter().find(|f| f.name() == normalized)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

// ---------------------------------------------------------------------------
// StudentRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single enrollment row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub student_id: String,
    /// Start date of the term; `None` when the cell was empty.
    pub term: Option<NaiveDate>,
    pub program: String,
    pub campus: String,
    pub course: String,
    pub credit_hours: Option<f64>,
    /// GPA-scale grade points, within [0, 4].
    pub grade_points: Option<f64>,
    /// Engagement score, within [0, 100].
    pub engagement_score: Option<f64>,
    pub retained: Option<bool>,
    /// Advising requested; read from boolean-like text, written as `Yes`/`No`.
    pub advising_flag: Option<bool>,
}

impl StudentRecord {
    /// Whether the given field holds no value.
    pub fn is_missing(&self, field: Field) -> bool {
        match field {
            Field::StudentId => self.student_id.is_empty(),
            Field::Term => self.term.is_none(),
            Field::Program => self.program.is_empty(),
            Field::Campus => self.campus.is_empty(),
            Field::Course => self.course.is_empty(),
            Field::CreditHours => self.credit_hours.is_none(),
            Field::GradePoints => self.grade_points.is_none(),
            Field::EngagementScore => self.engagement_score.is_none(),
            Field::Retained => self.retained.is_none(),
            Field::AdvisingFlag => self.advising_flag.is_none(),
        }
    }

    /// Numeric value of a numeric field.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        match field {
            Field::CreditHours => self.credit_hours,
            Field::GradePoints => self.grade_points,
            Field::EngagementScore => self.engagement_score,
            _ => None,
        }
    }

    /// Render a field the way it is written to CSV. Reading the text back
    /// through the loader yields the same value.
    pub fn cell_text(&self, field: Field) -> String {
        fn number(v: Option<f64>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }
        match field {
            Field::StudentId => self.student_id.clone(),
            Field::Term => self
                .term
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Field::Program => self.program.clone(),
            Field::Campus => self.campus.clone(),
            Field::Course => self.course.clone(),
            Field::CreditHours => number(self.credit_hours),
            Field::GradePoints => number(self.grade_points),
            Field::EngagementScore => number(self.engagement_score),
            Field::Retained => self.retained.map(|b| b.to_string()).unwrap_or_default(),
            Field::AdvisingFlag => match self.advising_flag {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => String::new(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// LoadReport – what happened while building the dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Display name of the source (file name).
    pub source: String,
    /// Rows read from the file, before de-duplication.
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    /// Headers present in the file that are not enrollment columns.
    pub ignored_columns: Vec<String>,
}

// ---------------------------------------------------------------------------
// StudentDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter domains.
#[derive(Debug, Clone)]
pub struct StudentDataset {
    pub records: Vec<StudentRecord>,
    /// Sorted distinct programs (the program multi-select domain).
    pub programs: BTreeSet<String>,
    /// Sorted distinct campuses (the campus multi-select domain).
    pub campuses: BTreeSet<String>,
    /// Earliest and latest term date, `None` when no row has a date.
    pub term_bounds: Option<(NaiveDate, NaiveDate)>,
    pub report: LoadReport,
}

impl StudentDataset {
    /// Build filter domains from the loaded records.
    pub fn from_records(records: Vec<StudentRecord>, report: LoadReport) -> Self {
        let programs = records.iter().map(|r| r.program.clone()).collect();
        let campuses = records.iter().map(|r| r.campus.clone()).collect();
        let term_bounds = records.iter().filter_map(|r| r.term).fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        });
        StudentDataset {
            records,
            programs,
            campuses,
            term_bounds,
            report,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn header_lookup_normalizes_case_and_separators() {
        assert_eq!(Field::from_header("Engagement Score"), Some(Field::EngagementScore));
        assert_eq!(Field::from_header("  student-ID "), Some(Field::StudentId));
        assert_eq!(Field::from_header("\u{feff}term"), Some(Field::Term));
        assert_eq!(Field::from_header("needs_advising"), None);
    }

    #[test]
    fn dataset_collects_filter_domains() {
        let ds = dataset();
        assert_eq!(ds.len(), 6);
        assert_eq!(
            ds.programs.iter().cloned().collect::<Vec<_>>(),
            vec!["Business", "Nursing"]
        );
        assert_eq!(ds.campuses.len(), 2);
        assert_eq!(ds.term_bounds, Some((date(2024, 1, 15), date(2024, 9, 2))));
    }

    #[test]
    fn term_bounds_absent_without_dates() {
        let mut rec = record("S1", (2024, 1, 1), "A", "B");
        rec.term = None;
        let ds = StudentDataset::from_records(vec![rec], LoadReport::default());
        assert_eq!(ds.term_bounds, None);
    }

    #[test]
    fn missing_checks_follow_the_column_type() {
        let ds = dataset();
        let no_grade = &ds.records[4];
        assert!(no_grade.is_missing(Field::GradePoints));
        assert!(!no_grade.is_missing(Field::Term));
        assert_eq!(no_grade.numeric(Field::GradePoints), None);
        assert_eq!(no_grade.numeric(Field::EngagementScore), Some(80.0));
        assert_eq!(no_grade.numeric(Field::Program), None);
    }

    #[test]
    fn cell_text_formats_values_for_export() {
        let mut rec = record("S9", (2023, 8, 28), "Nursing", "North");
        rec.grade_points = Some(3.25);
        rec.retained = None;
        assert_eq!(rec.cell_text(Field::Term), "2023-08-28");
        assert_eq!(rec.cell_text(Field::GradePoints), "3.25");
        assert_eq!(rec.cell_text(Field::CreditHours), "3");
        assert_eq!(rec.cell_text(Field::Retained), "");
        assert_eq!(rec.cell_text(Field::AdvisingFlag), "No");
        rec.advising_flag = Some(true);
        assert_eq!(rec.cell_text(Field::AdvisingFlag), "Yes");
        rec.advising_flag = None;
        assert!(rec.is_missing(Field::AdvisingFlag));
    }
}
