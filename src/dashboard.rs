//! The session: owns the immutable dataset and recomputes every view for a filter state.

use crate::aggregate::{grouped_mean, top_n_counts, AggregateError, GroupedMean, ValueCounts};
use crate::config::AppConfig;
use crate::filter::{self, FilterError, FilterState, Selection};
use crate::loader::{self, LoadError, LoadOptions};
use crate::normalize::{self, NormalizeError};
use crate::record::{CategoryColumn, Dataset, NumericColumn, Record};
use crate::statistics::{self, CorrelationMatrix, Histogram};
use crate::Args;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_PREVIEW_ROWS: usize = 10;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Errors that end a session before anything can be shown.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("could not normalize dataset: {0}")]
    Normalize(#[from] NormalizeError),
}

/// One aggregate's outcome. A failure is local to that view.
pub type AggregateView<T> = Result<T, AggregateError>;

/// Sizes of the derived views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSettings {
    pub preview_rows: usize,
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            top_n: DEFAULT_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl ViewSettings {
    /// CLI args override config values.
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        Self {
            preview_rows: args.preview_rows.unwrap_or(config.views.preview_rows),
            top_n: args.top_n.unwrap_or(config.views.top_n),
            histogram_bins: args.bins.unwrap_or(config.views.histogram_bins),
        }
    }
}

/// The aggregate views shown when the filter matches at least one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartViews {
    pub top_authors: ValueCounts,
    pub avg_rating_by_genre: AggregateView<GroupedMean>,
    pub avg_price_by_genre: AggregateView<GroupedMean>,
    pub rating_histogram: AggregateView<Histogram>,
    pub price_vs_rating: AggregateView<Vec<(f64, f64)>>,
    pub correlations: AggregateView<CorrelationMatrix>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewContent {
    /// The filter matched nothing; no aggregate was computed.
    NoResults,
    Charts(Box<ChartViews>),
}

/// Everything derived from one filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews<'a> {
    pub filter: FilterState,
    pub overview: String,
    pub matched: usize,
    pub preview: Vec<&'a Record>,
    pub content: ViewContent,
}

impl DashboardViews<'_> {
    pub fn charts(&self) -> Option<&ChartViews> {
        match &self.content {
            ViewContent::Charts(charts) => Some(charts),
            ViewContent::NoResults => None,
        }
    }
}

pub struct Dashboard {
    dataset: Dataset,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Load and normalize the source. Either failure ends the session.
    pub fn load(location: &str, options: &LoadOptions) -> Result<Self, DashboardError> {
        let raw = loader::load(location, options)?;
        let dataset = normalize::normalize(&raw)?;
        info!(records = dataset.len(), "session ready");
        Ok(Self::new(dataset))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// All genres, all authors, the whole year span.
    pub fn initial_filter(&self) -> Result<FilterState, FilterError> {
        FilterState::full_range(&self.dataset)
    }

    /// Choices for the genre selector, after the "All" entry.
    pub fn genre_options(&self) -> Vec<String> {
        filter::available_genres(&self.dataset)
    }

    /// Choices for the author selector given the selected genre, after the "All" entry.
    pub fn author_options(&self, genre: &Selection) -> Vec<String> {
        filter::available_authors(&self.dataset, genre)
    }

    pub fn year_span(&self) -> Option<(i32, i32)> {
        filter::year_span(&self.dataset)
    }

    /// Build a validated filter from raw selector input. An author with no books in the
    /// selected genre is reset to All, as the genre selector would. Unset years default to
    /// the dataset's span.
    pub fn select(
        &self,
        genre: Selection,
        author: Selection,
        year_min: Option<i32>,
        year_max: Option<i32>,
    ) -> Result<FilterState, FilterError> {
        let initial = self.initial_filter()?;
        let state = initial
            .with_author(author)
            .with_genre(&self.dataset, genre)
            .with_year_range(
                year_min.unwrap_or(initial.year_min()),
                year_max.unwrap_or(initial.year_max()),
            )?;
        state.validate(&self.dataset)?;
        debug!(?state, "filter selected");
        Ok(state)
    }

    /// Recompute every view for `filter`. An empty selection short-circuits to
    /// [`ViewContent::NoResults`] without running any aggregate.
    pub fn views(&self, filter: &FilterState, settings: &ViewSettings) -> DashboardViews<'_> {
        let view = filter::apply(&self.dataset, filter);
        let overview = overview_caption(filter);
        let preview = view.head(settings.preview_rows).to_vec();

        let content = if view.is_empty() {
            debug!("filter matched no records");
            ViewContent::NoResults
        } else {
            ViewContent::Charts(Box::new(ChartViews {
                top_authors: top_n_counts(&view, CategoryColumn::Author, settings.top_n),
                avg_rating_by_genre: grouped_mean(
                    &view,
                    CategoryColumn::Genre,
                    NumericColumn::Rating,
                ),
                avg_price_by_genre: grouped_mean(
                    &view,
                    CategoryColumn::Genre,
                    NumericColumn::Price,
                ),
                rating_histogram: statistics::histogram(
                    &view,
                    NumericColumn::Rating,
                    settings.histogram_bins,
                ),
                price_vs_rating: statistics::scatter_points(
                    &view,
                    NumericColumn::Price,
                    NumericColumn::Rating,
                ),
                correlations: statistics::correlation_matrix(&view, &NumericColumn::ALL),
            }))
        };

        DashboardViews {
            filter: filter.clone(),
            overview,
            matched: view.len(),
            preview,
            content,
        }
    }
}

/// One-line description of the current selection.
pub fn overview_caption(filter: &FilterState) -> String {
    format!(
        "Showing best sellers for {} genre by {} from {} to {}.",
        filter.genre(),
        filter.author(),
        filter.year_min(),
        filter.year_max()
    )
}
