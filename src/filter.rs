//! Filter state, the filter engine and the selector option lists that depend on it.

use crate::record::{Dataset, Record};
use indexmap::IndexSet;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Label shown for [`Selection::All`]. Only used for display; never compared against data.
pub const ALL_LABEL: &str = "All";

/// One selector's choice. `All` is out of band: a category literally named "All" in the data
/// is only matched by `Only("All")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(value.into())
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => selected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        value.map_or(Selection::All, Selection::Only)
    }
}

impl Selection {
    /// Interpret a selector label typed by a user: [`ALL_LABEL`] means every value.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            None | Some(ALL_LABEL) | Some("") => Selection::All,
            Some(value) => Selection::only(value),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL_LABEL),
            Selection::Only(selected) => f.write_str(selected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("year range is inverted: {year_min} > {year_max}")]
    InvertedYearRange { year_min: i32, year_max: i32 },
    #[error("year range {year_min}-{year_max} is outside the dataset's years {span_min}-{span_max}")]
    YearOutOfRange {
        year_min: i32,
        year_max: i32,
        span_min: i32,
        span_max: i32,
    },
    #[error("genre '{genre}' does not appear in the dataset")]
    UnknownGenre { genre: String },
    #[error("author '{author}' has no books in genre '{genre}'")]
    UnknownAuthor { author: String, genre: Selection },
    #[error("the dataset is empty")]
    EmptyDataset,
}

/// The user's current selection. Replaced on every interaction, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    genre: Selection,
    author: Selection,
    year_min: i32,
    year_max: i32,
}

impl FilterState {
    pub fn new(
        genre: Selection,
        author: Selection,
        year_min: i32,
        year_max: i32,
    ) -> Result<Self, FilterError> {
        if year_min > year_max {
            return Err(FilterError::InvertedYearRange { year_min, year_max });
        }
        Ok(Self {
            genre,
            author,
            year_min,
            year_max,
        })
    }

    /// The initial selection: every genre, every author, the dataset's whole year span.
    pub fn full_range(dataset: &Dataset) -> Result<Self, FilterError> {
        let (year_min, year_max) = year_span(dataset).ok_or(FilterError::EmptyDataset)?;
        Ok(Self {
            genre: Selection::All,
            author: Selection::All,
            year_min,
            year_max,
        })
    }

    pub fn genre(&self) -> &Selection {
        &self.genre
    }

    pub fn author(&self) -> &Selection {
        &self.author
    }

    pub fn year_min(&self) -> i32 {
        self.year_min
    }

    pub fn year_max(&self) -> i32 {
        self.year_max
    }

    /// Select a genre. The author resets to All when it has no books in the new genre,
    /// which keeps the author selector consistent with [`available_authors`].
    pub fn with_genre(&self, dataset: &Dataset, genre: Selection) -> Self {
        let author = match &self.author {
            Selection::Only(author)
                if !available_authors(dataset, &genre)
                    .iter()
                    .any(|a| a == author) =>
            {
                warn!(%author, %genre, "author not available for genre; resetting to All");
                Selection::All
            }
            other => other.clone(),
        };
        Self {
            genre,
            author,
            ..self.clone()
        }
    }

    pub fn with_author(&self, author: Selection) -> Self {
        Self {
            author,
            ..self.clone()
        }
    }

    pub fn with_year_range(&self, year_min: i32, year_max: i32) -> Result<Self, FilterError> {
        Self::new(self.genre.clone(), self.author.clone(), year_min, year_max)
    }

    /// Check a state assembled from raw input against the dataset it will filter.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), FilterError> {
        let (span_min, span_max) = year_span(dataset).ok_or(FilterError::EmptyDataset)?;
        if self.year_min < span_min || self.year_max > span_max {
            return Err(FilterError::YearOutOfRange {
                year_min: self.year_min,
                year_max: self.year_max,
                span_min,
                span_max,
            });
        }
        if let Selection::Only(genre) = &self.genre {
            if !dataset.iter().any(|r| &r.genre == genre) {
                return Err(FilterError::UnknownGenre {
                    genre: genre.clone(),
                });
            }
        }
        if let Selection::Only(author) = &self.author {
            if !available_authors(dataset, &self.genre)
                .iter()
                .any(|a| a == author)
            {
                return Err(FilterError::UnknownAuthor {
                    author: author.clone(),
                    genre: self.genre.clone(),
                });
            }
        }
        Ok(())
    }

    /// The conjunction of the three predicates. The year bound is checked first as the cheapest.
    pub fn matches(&self, record: &Record) -> bool {
        (self.year_min..=self.year_max).contains(&record.year)
            && self.genre.matches(&record.genre)
            && self.author.matches(&record.author)
    }
}

/// Records of a dataset that satisfy a filter, in dataset order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    /// Every record of the dataset, unfiltered.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            rows: dataset.iter().collect(),
        }
    }

    pub fn from_rows(rows: Vec<&'a Record>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.rows.iter().copied()
    }

    /// The first `n` rows (fewer when the view is shorter).
    pub fn head(&self, n: usize) -> &[&'a Record] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Apply a filter to a dataset.
pub fn apply<'a>(dataset: &'a Dataset, filter: &FilterState) -> FilteredView<'a> {
    let rows: Vec<&Record> = dataset.iter().filter(|r| filter.matches(r)).collect();
    debug!(
        genre = %filter.genre,
        author = %filter.author,
        year_min = filter.year_min,
        year_max = filter.year_max,
        matched = rows.len(),
        total = dataset.len(),
        "applied filter"
    );
    FilteredView { rows }
}

/// Distinct authors with at least one book in `genre` (any genre when All), sorted ascending.
pub fn available_authors(dataset: &Dataset, genre: &Selection) -> Vec<String> {
    dataset
        .iter()
        .filter(|r| genre.matches(&r.genre))
        .map(|r| r.author.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Distinct genres in order of first appearance.
pub fn available_genres(dataset: &Dataset) -> Vec<String> {
    dataset
        .iter()
        .map(|r| r.genre.as_str())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Smallest and largest year in the dataset, or None when it is empty.
pub fn year_span(dataset: &Dataset) -> Option<(i32, i32)> {
    dataset.iter().fold(None, |span, r| match span {
        None => Some((r.year, r.year)),
        Some((lo, hi)) => Some((lo.min(r.year), hi.max(r.year))),
    })
}
