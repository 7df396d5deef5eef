//! Load a best-selling books CSV, normalize it into typed records, filter it by genre, author
//! and year, and derive the dashboard's aggregate views.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error_display;
pub mod filter;
pub mod loader;
pub mod normalize;
pub mod record;
pub mod report;
mod source;
pub mod statistics;

pub use aggregate::{grouped_mean, top_n_counts, AggregateError, GroupedMean, ValueCounts};
pub use config::{AppConfig, ConfigManager, DEFAULT_SOURCE};
pub use dashboard::{
    ChartViews, Dashboard, DashboardError, DashboardViews, ViewContent, ViewSettings,
};
pub use filter::{FilterError, FilterState, FilteredView, Selection, ALL_LABEL};
pub use loader::{load, source_location, LoadError, LoadFailure, LoadOptions, RawTable};
pub use normalize::{normalize, NormalizeError};
pub use record::{CategoryColumn, Dataset, Numeric, NumericColumn, Record};
pub use report::{render_report, ReportStyle};
pub use shelfscope_cli::Args;

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "shelfscope";
