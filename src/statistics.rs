//! Distribution and relationship statistics over a filtered view: histograms, scatter
//! points and a Pearson correlation matrix.

use crate::aggregate::{numeric_value, AggregateError};
use crate::filter::FilteredView;
use crate::record::NumericColumn;
use serde::Serialize;

/// Fewest rows for which a correlation coefficient is reported.
pub const MIN_CORRELATION_SAMPLE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: NumericColumn,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

// Correlation matrix structures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    /// Square, symmetric. None where the coefficient is undefined (too few rows or a
    /// constant column).
    pub correlations: Vec<Vec<Option<f64>>>,
    pub sample_size: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        self.correlations[i][j]
    }
}

fn column_values(
    view: &FilteredView<'_>,
    column: NumericColumn,
) -> Result<Vec<f64>, AggregateError> {
    view.iter()
        .map(|record| numeric_value(record, column, None))
        .collect()
}

/// Equal-width histogram of `column` with `bins` bins spanning the observed min..=max.
///
/// The maximum lands in the last bin. A constant column produces a single bin holding
/// every value; an empty view produces no bins. `bins == 0` is treated as 1.
pub fn histogram(
    view: &FilteredView<'_>,
    column: NumericColumn,
    bins: usize,
) -> Result<Histogram, AggregateError> {
    let values = column_values(view, column)?;
    let bins = bins.max(1);

    let (min, max) = match min_max(&values) {
        Some(range) => range,
        None => {
            return Ok(Histogram {
                column,
                bins: Vec::new(),
            })
        }
    };

    if min == max {
        return Ok(Histogram {
            column,
            bins: vec![HistogramBin {
                lower: min,
                upper: max,
                count: values.len(),
            }],
        });
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect();

    Ok(Histogram { column, bins })
}

/// (x, y) pairs for a scatter plot, in view order.
pub fn scatter_points(
    view: &FilteredView<'_>,
    x: NumericColumn,
    y: NumericColumn,
) -> Result<Vec<(f64, f64)>, AggregateError> {
    view.iter()
        .map(|record| -> Result<(f64, f64), AggregateError> {
            Ok((
                numeric_value(record, x, None)?,
                numeric_value(record, y, None)?,
            ))
        })
        .collect()
}

/// Pairwise Pearson correlation between `columns` over the rows of `view`.
pub fn correlation_matrix(
    view: &FilteredView<'_>,
    columns: &[NumericColumn],
) -> Result<CorrelationMatrix, AggregateError> {
    let values = columns
        .iter()
        .map(|c| column_values(view, *c))
        .collect::<Result<Vec<_>, _>>()?;

    let n = columns.len();
    let mut correlations = vec![vec![None; n]; n];

    // Compute pairwise correlations; the diagonal is 1 wherever the column has variance
    for i in 0..n {
        correlations[i][i] = pearson(&values[i], &values[i]);
        for j in (i + 1)..n {
            let r = pearson(&values[i], &values[j]);
            correlations[i][j] = r;
            correlations[j][i] = r; // Symmetric
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        correlations,
        sample_size: view.len(),
    })
}

fn pearson(values1: &[f64], values2: &[f64]) -> Option<f64> {
    if values1.len() != values2.len() || values1.len() < MIN_CORRELATION_SAMPLE {
        return None;
    }

    let mean1 = values1.iter().sum::<f64>() / values1.len() as f64;
    let mean2 = values2.iter().sum::<f64>() / values2.len() as f64;

    let numerator: f64 = values1
        .iter()
        .zip(values2.iter())
        .map(|(v1, v2)| (v1 - mean1) * (v2 - mean2))
        .sum();

    let var1: f64 = values1.iter().map(|v| (v - mean1).powi(2)).sum();
    let var2: f64 = values2.iter().map(|v| (v - mean2).powi(2)).sum();

    if var1 == 0.0 || var2 == 0.0 {
        return None;
    }

    Some((numerator / (var1.sqrt() * var2.sqrt())).clamp(-1.0, 1.0))
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
