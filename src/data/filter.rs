use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{StudentDataset, StudentRecord};

// ---------------------------------------------------------------------------
// Filter predicate: programs, campuses and a term window
// ---------------------------------------------------------------------------

/// The three sidebar filters, combined with logical AND.
///
/// An empty program or campus selection matches nothing. `term_range` is
/// inclusive on both ends; `None` means the dataset has no dates to filter on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub programs: BTreeSet<String>,
    pub campuses: BTreeSet<String>,
    pub term_range: Option<(NaiveDate, NaiveDate)>,
}

/// Initialise a [`FilterState`] with everything selected (i.e., show all rows).
pub fn init_filter_state(dataset: &StudentDataset) -> FilterState {
    FilterState {
        programs: dataset.programs.clone(),
        campuses: dataset.campuses.clone(),
        term_range: dataset.term_bounds,
    }
}

impl FilterState {
    /// Whether a single record passes every filter.
    ///
    /// A record without a term date is never inside a term window.
    pub fn matches(&self, record: &StudentRecord) -> bool {
        if !self.programs.contains(&record.program) || !self.campuses.contains(&record.campus) {
            return false;
        }
        match (self.term_range, record.term) {
            (None, _) => true,
            (Some((from, to)), Some(term)) => from <= term && term <= to,
            (Some(_), None) => false,
        }
    }
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(dataset: &StudentDataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{dataset, date, record};
    use crate::data::model::LoadReport;

    #[test]
    fn initial_state_keeps_every_row() {
        let ds = dataset();
        let filters = init_filter_state(&ds);
        assert_eq!(filtered_indices(&ds, &filters), (0..ds.len()).collect::<Vec<_>>());
    }

    #[test]
    fn membership_is_the_conjunction_of_all_three_filters() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters.programs = BTreeSet::from(["Nursing".to_string()]);
        filters.campuses = BTreeSet::from(["North".to_string()]);
        filters.term_range = Some((date(2024, 1, 1), date(2024, 6, 30)));

        let kept = filtered_indices(&ds, &filters);
        assert_eq!(kept, vec![0, 3]);

        for (i, rec) in ds.records.iter().enumerate() {
            let expected = filters.programs.contains(&rec.program)
                && filters.campuses.contains(&rec.campus)
                && rec
                    .term
                    .is_some_and(|t| t >= date(2024, 1, 1) && t <= date(2024, 6, 30));
            assert_eq!(kept.contains(&i), expected, "row {i}");
        }
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters.campuses.clear();
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn term_window_is_inclusive() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters.term_range = Some((date(2024, 5, 20), date(2024, 5, 20)));
        assert_eq!(filtered_indices(&ds, &filters), vec![2, 3]);

        // An inverted window holds no dates at all.
        filters.term_range = Some((date(2024, 9, 2), date(2024, 1, 15)));
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn undated_rows_fall_outside_any_window() {
        let mut undated = record("S7", (2024, 1, 15), "Nursing", "North");
        undated.term = None;
        let dated = record("S8", (2024, 1, 15), "Nursing", "North");
        let ds = StudentDataset::from_records(vec![undated, dated], LoadReport::default());

        let filters = init_filter_state(&ds);
        assert_eq!(filtered_indices(&ds, &filters), vec![1]);

        let no_window = FilterState {
            term_range: None,
            ..filters
        };
        assert_eq!(filtered_indices(&ds, &no_window), vec![0, 1]);
    }
}
