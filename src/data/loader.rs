use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::DataError;
use super::model::{Field, LoadReport, StudentDataset, StudentRecord};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Knobs that change how a file becomes a dataset.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Excel sheet to read; first sheet when `None`.
    pub sheet: Option<String>,
    /// Drop rows that repeat an earlier row exactly.
    pub drop_duplicates: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            drop_duplicates: true,
        }
    }
}

/// Load an enrollment dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`                          – header row + one record per line
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first (or named) worksheet
/// * `.parquet`                      – one column per field
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<StudentDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_excel(path, options.sheet.as_deref())?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string()).into()),
    };

    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dataset = build_dataset(table, &source, options)
        .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} records from {} ({} duplicates dropped)",
        dataset.len(),
        dataset.report.source,
        dataset.report.duplicates_dropped
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// RawTable – every reader produces text cells, coercion happens once
// ---------------------------------------------------------------------------

/// A header row plus rows of untyped cell text.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Turn a raw table into typed records, failing on the first bad cell.
pub fn build_dataset(
    table: RawTable,
    source: &str,
    options: &LoadOptions,
) -> Result<StudentDataset, DataError> {
    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DataError::Empty);
    }

    let mut index: BTreeMap<Field, usize> = BTreeMap::new();
    let mut ignored_columns = Vec::new();
    for (i, header) in table.headers.iter().enumerate() {
        match Field::from_header(header) {
            Some(field) if index.contains_key(&field) => {
                ignored_columns.push(header.trim().to_string());
            }
            Some(field) => {
                index.insert(field, i);
            }
            None if header.trim().is_empty() => {}
            None => ignored_columns.push(header.trim().to_string()),
        }
    }

    let missing: Vec<String> = Field::ALL
        .into_iter()
        .filter(|f| !index.contains_key(f))
        .map(|f| f.name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }
    if !ignored_columns.is_empty() {
        log::warn!("Ignoring unused columns: {ignored_columns:?}");
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut rows_read = 0;
    for (i, cells) in table.rows.iter().enumerate() {
        // Spreadsheets often carry trailing blank rows.
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows_read += 1;
        records.push(parse_row(cells, &index, i + 1)?);
    }
    if records.is_empty() {
        return Err(DataError::Empty);
    }

    let mut duplicates_dropped = 0;
    if options.drop_duplicates {
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(records.len());
        records.retain(|rec| {
            let key: Vec<String> = Field::ALL.into_iter().map(|f| rec.cell_text(f)).collect();
            let fresh = seen.insert(key);
            if !fresh {
                duplicates_dropped += 1;
            }
            fresh
        });
    }

    let report = LoadReport {
        source: source.to_string(),
        rows_read,
        duplicates_dropped,
        ignored_columns,
    };
    Ok(StudentDataset::from_records(records, report))
}

fn parse_row(
    cells: &[String],
    index: &BTreeMap<Field, usize>,
    row: usize,
) -> Result<StudentRecord, DataError> {
    let cell = |field| cell_at(cells, index, field);

    Ok(StudentRecord {
        student_id: cell(Field::StudentId).to_string(),
        term: parse_optional(cell(Field::Term), row, Field::Term, "a date", parse_date)?,
        program: cell(Field::Program).to_string(),
        campus: cell(Field::Campus).to_string(),
        course: cell(Field::Course).to_string(),
        credit_hours: parse_number(cell(Field::CreditHours), row, Field::CreditHours, None)?,
        grade_points: parse_number(
            cell(Field::GradePoints),
            row,
            Field::GradePoints,
            Some((0.0, 4.0)),
        )?,
        engagement_score: parse_number(
            cell(Field::EngagementScore),
            row,
            Field::EngagementScore,
            Some((0.0, 100.0)),
        )?,
        retained: parse_optional(cell(Field::Retained), row, Field::Retained, "a boolean", parse_bool)?,
        advising_flag: parse_optional(
            cell(Field::AdvisingFlag),
            row,
            Field::AdvisingFlag,
            "a boolean",
            parse_bool,
        )?,
    })
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

fn cell_at<'a>(cells: &'a [String], index: &BTreeMap<Field, usize>, field: Field) -> &'a str {
    index
        .get(&field)
        .and_then(|&i| cells.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn parse_optional<T>(
    text: &str,
    row: usize,
    field: Field,
    expected: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, DataError> {
    if text.is_empty() {
        return Ok(None);
    }
    parse(text).map(Some).ok_or_else(|| DataError::InvalidValue {
        row,
        field,
        value: text.to_string(),
        expected,
    })
}

fn parse_number(
    text: &str,
    row: usize,
    field: Field,
    bounds: Option<(f64, f64)>,
) -> Result<Option<f64>, DataError> {
    let Some(value) = parse_optional(text, row, field, "a number", |s| {
        s.parse::<f64>().ok().filter(|v| v.is_finite())
    })?
    else {
        return Ok(None);
    };
    if let Some((min, max)) = bounds {
        if value < min || value > max {
            return Err(DataError::OutOfRange {
                row,
                field,
                value,
                min,
                max,
            });
        }
    }
    Ok(Some(value))
}

/// Accepts ISO, slash-separated and US dates; a trailing time part is dropped.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.split(['T', ' ']).next().unwrap_or(text);
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_csv_from(file)
}

/// Read CSV text from any reader; the first record is the header row.
pub fn read_csv_from<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Excel reader
// ---------------------------------------------------------------------------

fn read_excel(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .context("workbook has no sheets")?,
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet '{sheet_name}'"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let headers = header_row.iter().map(excel_cell_text).collect();
    let rows = rows
        .map(|row| row.iter().map(excel_cell_text).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn excel_cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per enrollment field.
///
/// Column types are free: every value is rendered to text with Arrow's
/// display formatter (dates as `YYYY-MM-DD`, nulls as empty) and then
/// coerced like CSV cells.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let format = FormatOptions::default();
    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &format))
            .collect::<Result<Vec<_>, _>>()
            .context("formatting parquet columns")?;
        for row in 0..batch.num_rows() {
            rows.push(formatters.iter().map(|f| f.value(row).to_string()).collect());
        }
    }

    Ok(RawTable { headers, rows })
}
