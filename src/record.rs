//! Typed book records and the immutable dataset built from them.
//!
//! Records are constructed once by [`crate::normalize::normalize`]. Nothing in the crate
//! hands out a mutable reference to a [`Dataset`] after that, so views can borrow it freely.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// A numeric cell. Keeps the source text when it does not parse, so the failure is reported
/// by the aggregate that first needs the value instead of at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Numeric {
    Value(f64),
    Malformed(String),
}

impl Numeric {
    /// Parse a raw cell. Surrounding whitespace is ignored; NaN and infinities are malformed.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Numeric::Value(v),
            _ => Numeric::Malformed(raw.to_string()),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Numeric::Value(v) => Some(*v),
            Numeric::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Numeric::Malformed(_))
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Value(v)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Value(v) => write!(f, "{}", v),
            Numeric::Malformed(raw) => f.write_str(raw),
        }
    }
}

/// One bestseller entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: i32,
    pub rating: Numeric,
    pub reviews: Numeric,
    pub price: Numeric,
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        year: i32,
        rating: impl Into<Numeric>,
        reviews: impl Into<Numeric>,
        price: impl Into<Numeric>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            year,
            rating: rating.into(),
            reviews: reviews.into(),
            price: price.into(),
        }
    }
}

/// Columns that can be used as a grouping or counting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryColumn {
    Title,
    Author,
    Genre,
    Year,
}

impl CategoryColumn {
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Genre => "genre",
            Self::Year => "year",
        }
    }

    /// The key this record contributes to a grouping over this column.
    pub fn key(self, record: &Record) -> Cow<'_, str> {
        match self {
            Self::Title => Cow::Borrowed(record.title.as_str()),
            Self::Author => Cow::Borrowed(record.author.as_str()),
            Self::Genre => Cow::Borrowed(record.genre.as_str()),
            Self::Year => Cow::Owned(record.year.to_string()),
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns that can be averaged, binned or correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Rating,
    Reviews,
    Price,
    Year,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 4] = [Self::Rating, Self::Reviews, Self::Price, Self::Year];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Reviews => "reviews",
            Self::Price => "price",
            Self::Year => "year",
        }
    }

    /// Read the value for this column, or the raw text when the cell is malformed.
    pub fn read(self, record: &Record) -> Result<f64, &str> {
        let cell = match self {
            Self::Rating => &record.rating,
            Self::Reviews => &record.reviews,
            Self::Price => &record.price,
            Self::Year => return Ok(f64::from(record.year)),
        };
        match cell {
            Numeric::Value(v) => Ok(*v),
            Numeric::Malformed(raw) => Err(raw.as_str()),
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The ordered, normalized records of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_parse_trims_and_rejects_non_finite() {
        assert_eq!(Numeric::parse(" 4.7 "), Numeric::Value(4.7));
        assert_eq!(Numeric::parse("12"), Numeric::Value(12.0));
        assert_eq!(Numeric::parse("n/a"), Numeric::Malformed("n/a".to_string()));
        assert!(Numeric::parse("NaN").is_malformed());
        assert!(Numeric::parse("inf").is_malformed());
        assert!(Numeric::parse("").is_malformed());
    }

    #[test]
    fn numeric_display_round_trips_through_parse() {
        for v in [4.7_f64, 20.0, 0.0, 1234.5] {
            let shown = Numeric::Value(v).to_string();
            assert_eq!(Numeric::parse(&shown), Numeric::Value(v));
        }
        assert_eq!(Numeric::Malformed("abc".into()).to_string(), "abc");
    }

    #[test]
    fn numeric_column_read_reports_raw_text() {
        let mut record = Record::new("T", "A", "Fiction", 2012, 4.5, 100.0, 9.0);
        assert_eq!(NumericColumn::Price.read(&record), Ok(9.0));
        assert_eq!(NumericColumn::Year.read(&record), Ok(2012.0));
        record.price = Numeric::Malformed("free".into());
        assert_eq!(NumericColumn::Price.read(&record), Err("free"));
    }

    #[test]
    fn category_key_for_year_is_text() {
        let record = Record::new("T", "A", "Fiction", 2012, 4.5, 100.0, 9.0);
        assert_eq!(CategoryColumn::Year.key(&record), "2012");
        assert_eq!(CategoryColumn::Author.key(&record), "A");
    }
}
