//! Schema normalization: header cleanup, the fixed rename table, row deduplication and
//! construction of typed [`Record`]s.

use crate::loader::RawTable;
use crate::record::{Dataset, Numeric, Record};
use polars::prelude::{Column, DataFrame, PolarsError, PolarsResult};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Source header → canonical column name. Canonical names are not keys, so renaming an
/// already-normalized table leaves it unchanged.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("Name", "title"),
    ("Author", "author"),
    ("Genre", "genre"),
    ("Year", "year"),
    ("User Rating", "rating"),
    ("Reviews", "reviews"),
    ("Price", "price"),
];

/// Canonical columns in the order [`RawTable::from_dataset`] writes them.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    "title", "author", "genre", "year", "rating", "reviews", "price",
];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("missing column '{column}' (found: {})", .found.join(", "))]
    MissingColumn {
        column: &'static str,
        found: Vec<String>,
    },
    #[error("more than one column is named '{column}' after normalization")]
    DuplicateColumn { column: String },
    #[error("row {row}: year '{value}' is not an integer")]
    InvalidYear { row: usize, value: String },
    #[error("could not read column '{column}' as text")]
    Table {
        column: String,
        #[source]
        source: PolarsError,
    },
}

/// Canonical name for a trimmed header; headers outside the rename table pass through.
pub fn canonical_name(header: &str) -> &str {
    COLUMN_RENAMES
        .iter()
        .find(|(from, _)| *from == header)
        .map(|(_, to)| *to)
        .unwrap_or(header)
}

/// Identity of a record for deduplication. Numbers compare by parsed value, so `8` and
/// `8.0` are the same price; malformed cells compare by their raw text.
#[derive(PartialEq, Eq, Hash)]
struct RecordKey {
    text: [String; 3],
    year: i32,
    numbers: [NumericKey; 3],
}

#[derive(PartialEq, Eq, Hash)]
enum NumericKey {
    Value(u64),
    Malformed(String),
}

impl NumericKey {
    fn of(value: &Numeric) -> Self {
        match value {
            // -0.0 and 0.0 are the same number
            Numeric::Value(v) if *v == 0.0 => NumericKey::Value(0.0f64.to_bits()),
            Numeric::Value(v) => NumericKey::Value(v.to_bits()),
            Numeric::Malformed(raw) => NumericKey::Malformed(raw.clone()),
        }
    }
}

impl RecordKey {
    fn of(record: &Record) -> Self {
        Self {
            text: [
                record.title.clone(),
                record.author.clone(),
                record.genre.clone(),
            ],
            year: record.year,
            numbers: [
                NumericKey::of(&record.rating),
                NumericKey::of(&record.reviews),
                NumericKey::of(&record.price),
            ],
        }
    }
}

/// Turn a raw table into the session's dataset.
///
/// Single pass: headers are trimmed and renamed, each row becomes a record, and records
/// equal to an earlier one are dropped keeping the first occurrence. Equality is on the
/// typed record, so columns the record does not keep are ignored and numbers compare by
/// value. Survivors keep their original relative order. Missing text cells
/// become empty strings; numeric cells that do not parse are kept as
/// [`Numeric::Malformed`]. `year` must parse because it is the filter key.
pub fn normalize(raw: &RawTable) -> Result<Dataset, NormalizeError> {
    let headers: Vec<String> = raw
        .headers()
        .iter()
        .map(|h| canonical_name(h.trim()).to_string())
        .collect();

    let mut names = HashSet::with_capacity(headers.len());
    for header in &headers {
        if !names.insert(header.as_str()) {
            return Err(NormalizeError::DuplicateColumn {
                column: header.clone(),
            });
        }
    }

    let position = |column: &'static str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| NormalizeError::MissingColumn {
                column,
                found: headers.clone(),
            })
    };
    let title = position("title")?;
    let author = position("author")?;
    let genre = position("genre")?;
    let year = position("year")?;
    let rating = position("rating")?;
    let reviews = position("reviews")?;
    let price = position("price")?;

    let columns = (0..raw.width())
        .map(|i| {
            raw.text_column(i).map_err(|source| NormalizeError::Table {
                column: headers[i].clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen_rows: HashSet<RecordKey> = HashSet::with_capacity(raw.height());
    let mut records = Vec::with_capacity(raw.height());
    let mut duplicates = 0usize;
    for row in 0..raw.height() {
        let cell = |index: usize| columns[index][row].as_deref().unwrap_or_default();
        let year_text = cell(year);
        let year_value =
            year_text
                .trim()
                .parse::<i32>()
                .map_err(|_| NormalizeError::InvalidYear {
                    row: row + 1,
                    value: year_text.to_string(),
                })?;

        let record = Record {
            title: cell(title).to_string(),
            author: cell(author).to_string(),
            genre: cell(genre).to_string(),
            year: year_value,
            rating: Numeric::parse(cell(rating)),
            reviews: Numeric::parse(cell(reviews)),
            price: Numeric::parse(cell(price)),
        };
        if !seen_rows.insert(RecordKey::of(&record)) {
            duplicates += 1;
            continue;
        }
        records.push(record);
    }

    debug!(duplicates, "dropped duplicate rows");
    info!(records = records.len(), "normalized dataset");
    Ok(Dataset::from_records(records))
}

impl RawTable {
    /// Re-emit a dataset as a raw table with canonical headers.
    pub fn from_dataset(dataset: &Dataset) -> PolarsResult<Self> {
        let text = |cell: fn(&Record) -> String| dataset.iter().map(cell).collect::<Vec<_>>();
        let columns = vec![
            Column::new(CANONICAL_COLUMNS[0].into(), text(|r| r.title.clone())),
            Column::new(CANONICAL_COLUMNS[1].into(), text(|r| r.author.clone())),
            Column::new(CANONICAL_COLUMNS[2].into(), text(|r| r.genre.clone())),
            Column::new(CANONICAL_COLUMNS[3].into(), text(|r| r.year.to_string())),
            Column::new(CANONICAL_COLUMNS[4].into(), text(|r| r.rating.to_string())),
            Column::new(CANONICAL_COLUMNS[5].into(), text(|r| r.reviews.to_string())),
            Column::new(CANONICAL_COLUMNS[6].into(), text(|r| r.price.to_string())),
        ];
        Self::from_frame(DataFrame::new(columns)?)
    }
}
