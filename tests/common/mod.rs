#![allow(dead_code)]

use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tempfile::TempDir;

/// Header row of the published bestsellers file.
pub const BESTSELLER_HEADERS: [&str; 7] = [
    "Name",
    "Author",
    "User Rating",
    "Reviews",
    "Price",
    "Year",
    "Genre",
];

/// Write a bestsellers CSV (with the published header names) into `dir`.
///
/// Rows are (title, author, rating, reviews, price, year, genre), all as text so tests can
/// plant malformed cells.
pub fn write_bestsellers_csv(dir: &TempDir, name: &str, rows: &[[&str; 7]]) -> PathBuf {
    let columns: Vec<Column> = BESTSELLER_HEADERS
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let values: Vec<&str> = rows.iter().map(|row| row[i]).collect();
            Column::new((*header).into(), values)
        })
        .collect();
    let mut df = DataFrame::new(columns).unwrap();

    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

/// Five books over 2010..=2014 in genres Fiction, Fiction, Non Fiction, Fiction, Non Fiction.
pub fn sample_rows() -> Vec<[&'static str; 7]> {
    vec![
        ["The Hunger Games", "Suzanne Collins", "4.7", "32122", "14", "2010", "Fiction"],
        ["Gone Girl", "Gillian Flynn", "4.0", "57271", "10", "2011", "Fiction"],
        ["Quiet", "Susan Cain", "4.6", "10009", "11", "2012", "Non Fiction"],
        ["Mockingjay", "Suzanne Collins", "4.6", "26741", "8", "2013", "Fiction"],
        ["Outliers", "Malcolm Gladwell", "4.6", "11013", "14", "2014", "Non Fiction"],
    ]
}

pub fn sample_csv(dir: &TempDir) -> PathBuf {
    write_bestsellers_csv(dir, "bestsellers.csv", &sample_rows())
}
