use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Field, StudentDataset};

/// Header of the derived risk column appended to exports.
pub const RISK_COLUMN: &str = "needs_advising";

/// Write the filtered rows as CSV: the ten enrollment columns in canonical
/// order followed by the risk column. `flags` is aligned with `indices`.
pub fn write_csv<W: Write>(
    writer: W,
    dataset: &StudentDataset,
    indices: &[usize],
    flags: &[bool],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
    header.push(RISK_COLUMN);
    wtr.write_record(&header).context("writing CSV header")?;

    for (&i, &flag) in indices.iter().zip(flags) {
        let rec = &dataset.records[i];
        let mut row: Vec<String> = Field::ALL.iter().map(|&f| rec.cell_text(f)).collect();
        row.push(flag.to_string());
        wtr.write_record(&row)
            .with_context(|| format!("writing row for student {}", rec.student_id))?;
    }

    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// Write the filtered table to `path`.
pub fn save_csv(path: &Path, dataset: &StudentDataset, indices: &[usize], flags: &[bool]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, dataset, indices, flags)?;
    log::info!("Exported {} rows to {}", indices.len(), path.display());
    Ok(())
}

/// Suggested download name: `filtered_<source stem>.csv`.
pub fn export_file_name(source: &str) -> String {
    let stem = Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("students");
    format!("filtered_{stem}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, init_filter_state};
    use crate::data::loader::{build_dataset, load_file, read_csv_from, LoadOptions};
    use crate::data::model::fixtures::{dataset, date};
    use crate::data::model::LoadReport;
    use crate::data::risk::{risk_flags, RiskRule};

    fn to_csv_bytes(dataset: &StudentDataset, indices: &[usize], flags: &[bool]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_csv(&mut buf, dataset, indices, flags).unwrap();
        buf
    }

    #[test]
    fn round_trip_reproduces_the_filtered_rows() {
        let mut ds = dataset();
        ds.records[0].grade_points = Some(3.1415926535);
        ds.records[1].retained = None;
        ds.records[2].program = "Business, Evening".into();
        let ds = StudentDataset::from_records(ds.records, LoadReport::default());

        let mut filters = init_filter_state(&ds);
        filters.term_range = Some((date(2024, 1, 1), date(2024, 6, 30)));
        let indices = filtered_indices(&ds, &filters);
        let flags = risk_flags(&ds, &indices, &RiskRule::default());

        let bytes = to_csv_bytes(&ds, &indices, &flags);
        let reloaded = build_dataset(
            read_csv_from(bytes.as_slice()).unwrap(),
            "filtered.csv",
            &LoadOptions {
                drop_duplicates: false,
                ..LoadOptions::default()
            },
        )
        .unwrap();

        let expected: Vec<_> = indices.iter().map(|&i| ds.records[i].clone()).collect();
        assert_eq!(reloaded.records, expected);
        assert_eq!(reloaded.report.ignored_columns, vec![RISK_COLUMN.to_string()]);
    }

    #[test]
    fn header_and_risk_column() {
        let ds = dataset();
        let bytes = to_csv_bytes(&ds, &[1], &[true]);
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "student_id,term,program,campus,course,credit_hours,grade_points,engagement_score,retained,advising_flag,needs_advising"
        );
        assert_eq!(lines.next().unwrap(), "S2,2024-01-15,Nursing,South,MATH101,3,2,40,true,No,true");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_selection_exports_header_only() {
        let ds = dataset();
        let text = String::from_utf8(to_csv_bytes(&ds, &[], &[])).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn saved_file_reloads() {
        let ds = dataset();
        let indices: Vec<usize> = (0..ds.len()).collect();
        let flags = risk_flags(&ds, &indices, &RiskRule::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name("students.xlsx"));
        save_csv(&path, &ds, &indices, &flags).unwrap();

        let reloaded = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded.records, ds.records);
        assert_eq!(reloaded.report.source, "filtered_students.csv");
    }

    #[test]
    fn file_name_from_source() {
        assert_eq!(export_file_name("spring_2024.xlsx"), "filtered_spring_2024.csv");
        assert_eq!(export_file_name(""), "filtered_students.csv");
    }
}
