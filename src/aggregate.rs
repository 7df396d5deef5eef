//! Aggregates over a filtered view: top-N value counts and grouped means.

use crate::filter::FilteredView;
use crate::record::{CategoryColumn, NumericColumn, Record};
use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use thiserror::Error;

/// Distinct values with their occurrence counts, most frequent first.
pub type ValueCounts = Vec<(String, usize)>;

/// Mean of a numeric column per group, keyed by group value in ascending order.
pub type GroupedMean = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum AggregateError {
    #[error("column '{column}' has non-numeric value '{value}' (title '{title}')")]
    TypeConversion {
        column: NumericColumn,
        /// Group the offending row belongs to, for grouped aggregates.
        group: Option<String>,
        title: String,
        value: String,
    },
}

/// Read a numeric cell or fail with the row's context.
pub(crate) fn numeric_value(
    record: &Record,
    column: NumericColumn,
    group: Option<&str>,
) -> Result<f64, AggregateError> {
    column
        .read(record)
        .map_err(|raw| AggregateError::TypeConversion {
            column,
            group: group.map(String::from),
            title: record.title.clone(),
            value: raw.to_string(),
        })
}

/// The `n` most frequent values of `column` in `view`, descending by count.
///
/// Ties keep the order in which the values first appear in the view (which is dataset
/// order). An empty view or `n == 0` yields an empty list.
pub fn top_n_counts(view: &FilteredView<'_>, column: CategoryColumn, n: usize) -> ValueCounts {
    if view.is_empty() || n == 0 {
        return Vec::new();
    }

    let mut counts: IndexMap<Cow<'_, str>, usize> = IndexMap::new();
    for record in view.iter() {
        *counts.entry(column.key(record)).or_insert(0) += 1;
    }

    let mut ranked: ValueCounts = counts
        .into_iter()
        .map(|(value, count)| (value.into_owned(), count))
        .collect();
    // sort_by is stable, so equal counts stay in first-appearance order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Arithmetic mean of `value_column` for each distinct `group_column` value present in `view`.
///
/// Groups without rows are absent; an empty view yields an empty map. A malformed cell in any
/// row fails the whole aggregate with [`AggregateError::TypeConversion`].
pub fn grouped_mean(
    view: &FilteredView<'_>,
    group_column: CategoryColumn,
    value_column: NumericColumn,
) -> Result<GroupedMean, AggregateError> {
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in view.iter() {
        let group = group_column.key(record);
        let value = numeric_value(record, value_column, Some(group.as_ref()))?;
        let (sum, count) = totals.entry(group.into_owned()).or_insert((0.0, 0));
        *sum += value;
        *count += 1;
    }

    Ok(totals
        .into_iter()
        .map(|(group, (sum, count))| (group, sum / count as f64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Dataset, Numeric};

    fn priced(genre: &str, price: f64) -> Record {
        Record::new("T", "A", genre, 2010, 4.0, 1.0, price)
    }

    #[test]
    fn grouped_mean_per_genre() {
        let data = Dataset::from_records(vec![
            priced("Fiction", 10.0),
            priced("Fiction", 20.0),
            priced("NonFiction", 5.0),
        ]);
        let means = grouped_mean(
            &FilteredView::all(&data),
            CategoryColumn::Genre,
            NumericColumn::Price,
        )
        .unwrap();
        assert_eq!(
            means,
            GroupedMean::from([("Fiction".to_string(), 15.0), ("NonFiction".to_string(), 5.0)])
        );
    }

    #[test]
    fn grouped_mean_reports_bad_cell() {
        let mut bad = priced("Fiction", 0.0);
        bad.title = "Oops".to_string();
        bad.price = Numeric::Malformed("free".to_string());
        let data = Dataset::from_records(vec![priced("Fiction", 10.0), bad]);

        let err = grouped_mean(
            &FilteredView::all(&data),
            CategoryColumn::Genre,
            NumericColumn::Price,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AggregateError::TypeConversion {
                column: NumericColumn::Price,
                group: Some("Fiction".to_string()),
                title: "Oops".to_string(),
                value: "free".to_string(),
            }
        );
    }

    #[test]
    fn bad_cell_outside_view_is_ignored() {
        let mut bad = priced("Fiction", 0.0);
        bad.year = 2001;
        bad.rating = Numeric::Malformed("?".to_string());
        let data = Dataset::from_records(vec![priced("Fiction", 10.0), bad]);
        let view = FilteredView::from_rows(data.iter().filter(|r| r.year == 2010).collect());
        let means = grouped_mean(&view, CategoryColumn::Genre, NumericColumn::Rating).unwrap();
        assert_eq!(means.get("Fiction"), Some(&4.0));
    }

    #[test]
    fn top_n_breaks_ties_by_first_appearance() {
        let authors = ["A", "B", "A", "C", "B", "A", "B"];
        let data: Dataset = authors
            .iter()
            .map(|a| Record::new("T", *a, "Fiction", 2010, 4.0, 1.0, 1.0))
            .collect();
        let view = FilteredView::all(&data);
        assert_eq!(
            top_n_counts(&view, CategoryColumn::Author, 2),
            vec![("A".to_string(), 3), ("B".to_string(), 3)]
        );
        assert_eq!(top_n_counts(&view, CategoryColumn::Author, 10).len(), 3);
        assert!(top_n_counts(&view, CategoryColumn::Author, 0).is_empty());
    }

    #[test]
    fn top_n_tie_follows_view_order_not_value() {
        let authors = ["Zed", "Amy", "Zed", "Amy"];
        let data: Dataset = authors
            .iter()
            .map(|a| Record::new("T", *a, "Fiction", 2010, 4.0, 1.0, 1.0))
            .collect();
        let counts = top_n_counts(&FilteredView::all(&data), CategoryColumn::Author, 2);
        assert_eq!(counts[0].0, "Zed");
        assert_eq!(counts[1].0, "Amy");
    }

    #[test]
    fn empty_view_yields_empty_aggregates() {
        let view = FilteredView::default();
        assert!(top_n_counts(&view, CategoryColumn::Author, 10).is_empty());
        assert!(grouped_mean(&view, CategoryColumn::Genre, NumericColumn::Rating)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn counts_by_year() {
        let data = Dataset::from_records(vec![
            Record::new("T", "A", "Fiction", 2011, 4.0, 1.0, 1.0),
            Record::new("T", "A", "Fiction", 2010, 4.0, 1.0, 1.0),
            Record::new("T", "A", "Fiction", 2010, 4.0, 1.0, 1.0),
        ]);
        assert_eq!(
            top_n_counts(&FilteredView::all(&data), CategoryColumn::Year, 5),
            vec![("2010".to_string(), 2), ("2011".to_string(), 1)]
        );
    }
}
