mod common;

use common::{sample_csv, write_bestsellers_csv};
use shelfscope::statistics::{correlation_matrix, histogram, scatter_points};
use shelfscope::{filter, FilterState, FilteredView, LoadOptions, NumericColumn};
use tempfile::TempDir;

fn dataset(dir: &TempDir, rows: Option<&[[&str; 7]]>) -> shelfscope::Dataset {
    let path = match rows {
        Some(rows) => write_bestsellers_csv(dir, "stats.csv", rows),
        None => sample_csv(dir),
    };
    let raw = shelfscope::load(path.to_str().unwrap(), &LoadOptions::default()).unwrap();
    shelfscope::normalize(&raw).unwrap()
}

#[test]
fn test_rating_histogram_counts_every_row() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, None);
    let hist = histogram(&FilteredView::all(&data), NumericColumn::Rating, 3).unwrap();
    assert_eq!(hist.bins.len(), 3);
    assert_eq!(hist.total(), 5);
    assert_eq!(hist.bins[0].lower, 4.0);
    assert_eq!(hist.bins[2].upper, 4.7);
    assert_eq!(hist.bins[0].count, 1);
    assert_eq!(hist.bins[2].count, 4);
}

#[test]
fn test_scatter_follows_filter() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, None);
    let state = FilterState::full_range(&data)
        .unwrap()
        .with_year_range(2012, 2013)
        .unwrap();
    let view = filter::apply(&data, &state);
    let points = scatter_points(&view, NumericColumn::Price, NumericColumn::Rating).unwrap();
    assert_eq!(points, vec![(11.0, 4.6), (8.0, 4.6)]);
}

#[test]
fn test_correlation_matrix_over_loaded_rows() {
    let dir = TempDir::new().unwrap();
    let rows = [
        ["A", "X", "4.1", "100", "10", "2010", "Fiction"],
        ["B", "X", "4.3", "200", "8", "2011", "Fiction"],
        ["C", "Y", "4.5", "300", "6", "2012", "Fiction"],
        ["D", "Y", "4.7", "400", "4", "2013", "Non Fiction"],
    ];
    let data = dataset(&dir, Some(&rows[..]));
    let matrix = correlation_matrix(&FilteredView::all(&data), &NumericColumn::ALL).unwrap();

    assert_eq!(matrix.sample_size, 4);
    let r = |a, b| matrix.get(a, b).unwrap();
    assert!((r(NumericColumn::Rating, NumericColumn::Reviews) - 1.0).abs() < 1e-9);
    assert!((r(NumericColumn::Rating, NumericColumn::Price) + 1.0).abs() < 1e-9);
    assert!((r(NumericColumn::Year, NumericColumn::Reviews) - 1.0).abs() < 1e-9);
}

#[test]
fn test_correlation_undefined_for_two_rows() {
    let dir = TempDir::new().unwrap();
    let rows = [
        ["A", "X", "4.1", "100", "10", "2010", "Fiction"],
        ["B", "X", "4.3", "200", "8", "2011", "Fiction"],
    ];
    let data = dataset(&dir, Some(&rows[..]));
    let matrix = correlation_matrix(&FilteredView::all(&data), &NumericColumn::ALL).unwrap();
    assert!(matrix.correlations.iter().flatten().all(Option::is_none));
}
