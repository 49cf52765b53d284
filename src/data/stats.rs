use super::model::{Field, StudentDataset};

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub field: Field,
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    /// 25th percentile.
    pub q1: f64,
    pub median: f64,
    /// 75th percentile.
    pub q3: f64,
    pub max: f64,
}

/// Missing-value count of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingColumn {
    pub field: Field,
    pub count: usize,
    pub percent: f64,
}

/// Pearson correlations between the numeric columns, row-major over `fields`.
///
/// Each pair uses the rows where both values are present; a cell is `None`
/// with fewer than two such rows or when either side is constant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    pub fields: Vec<Field>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Field, b: Field) -> Option<f64> {
        let i = self.fields.iter().position(|&f| f == a)?;
        let j = self.fields.iter().position(|&f| f == b)?;
        self.values[i][j]
    }
}

/// Linearly interpolated quantile of sorted, non-empty values.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Summaries of the numeric columns over the given rows. Columns without any
/// value are left out.
pub fn describe(dataset: &StudentDataset, indices: &[usize]) -> Vec<ColumnSummary> {
    Field::NUMERIC
        .into_iter()
        .filter_map(|field| {
            let mut values: Vec<f64> = indices
                .iter()
                .filter_map(|&i| dataset.records[i].numeric(field))
                .collect();
            if values.is_empty() {
                return None;
            }
            values.sort_by(f64::total_cmp);

            let n = values.len();
            let mean = values.iter().sum::<f64>() / n as f64;
            let std = (n > 1).then(|| {
                let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
                (ss / (n - 1) as f64).sqrt()
            });
            Some(ColumnSummary {
                field,
                count: n,
                missing: indices.len() - n,
                mean,
                std,
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[n - 1],
            })
        })
        .collect()
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Correlation matrix of [`Field::NUMERIC`] over the given rows.
pub fn correlation(dataset: &StudentDataset, indices: &[usize]) -> CorrelationMatrix {
    let fields = Field::NUMERIC.to_vec();
    let values = fields
        .iter()
        .map(|&a| {
            fields
                .iter()
                .map(|&b| {
                    let pairs: Vec<(f64, f64)> = indices
                        .iter()
                        .map(|&i| &dataset.records[i])
                        .filter_map(|r| Some((r.numeric(a)?, r.numeric(b)?)))
                        .collect();
                    pearson(&pairs)
                })
                .collect()
        })
        .collect();
    CorrelationMatrix { fields, values }
}

/// Columns with missing values over the given rows, most incomplete first.
pub fn missing_table(dataset: &StudentDataset, indices: &[usize]) -> Vec<MissingColumn> {
    if indices.is_empty() {
        return Vec::new();
    }
    let total = indices.len() as f64;
    let mut table: Vec<MissingColumn> = Field::ALL
        .into_iter()
        .map(|field| {
            let count = indices
                .iter()
                .filter(|&&i| dataset.records[i].is_missing(field))
                .count();
            MissingColumn {
                field,
                count,
                percent: (count as f64 / total * 10_000.0).round() / 100.0,
            }
        })
        .filter(|m| m.count > 0)
        .collect();
    table.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    table
}
