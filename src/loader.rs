//! Dataset loading: reads a CSV from a local path or an HTTP(S) URL into a [`RawTable`].
//!
//! Every cell is read as text. Typing happens in [`crate::normalize`], and numeric parse
//! failures are deferred further still, to the aggregate that needs the value.

use crate::config::AppConfig;
use crate::source::{self, InputSource};
use crate::Args;
use polars::prelude::{
    Column, CsvReadOptions, DataFrame, DataType, PolarsError, PolarsResult, SerReader,
};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Coarse classification of a [`LoadError`], for callers that only need to know
/// whether the source could not be reached or could not be understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailure {
    Unreachable,
    Malformed,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open {location}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
    #[error("could not download {url}: {message}")]
    Download { url: String, message: String },
    #[error("{url} returned HTTP {status} {status_text}")]
    HttpStatus {
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("HTTP sources are not supported in this build: {url}")]
    HttpUnsupported { url: String },
    #[error("could not parse {location} as delimited text")]
    Parse {
        location: String,
        #[source]
        source: PolarsError,
    },
    #[error("{location} has no columns")]
    NoColumns { location: String },
}

impl LoadError {
    pub fn reason(&self) -> LoadFailure {
        match self {
            LoadError::Io { .. }
            | LoadError::Download { .. }
            | LoadError::HttpStatus { .. }
            | LoadError::HttpUnsupported { .. } => LoadFailure::Unreachable,
            LoadError::Parse { .. } | LoadError::NoColumns { .. } => LoadFailure::Malformed,
        }
    }

    /// The path or URL that failed.
    pub fn location(&self) -> &str {
        match self {
            LoadError::Io { location, .. }
            | LoadError::Parse { location, .. }
            | LoadError::NoColumns { location } => location,
            LoadError::Download { url, .. }
            | LoadError::HttpStatus { url, .. }
            | LoadError::HttpUnsupported { url } => url,
        }
    }
}

/// Options for reading the source.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub download_timeout: Duration,
    /// Directory for downloaded temp files. None = system default (e.g. TMPDIR).
    pub temp_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            temp_dir: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = Some(temp_dir);
        self
    }

    /// Create LoadOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let mut opts = LoadOptions::new()
            .with_download_timeout(Duration::from_secs(config.source.download_timeout_secs));
        if let Some(delimiter) = args.delimiter.or(config.source.delimiter) {
            opts = opts.with_delimiter(delimiter);
        }
        if let Some(temp_dir) = &config.source.temp_dir {
            opts = opts.with_temp_dir(PathBuf::from(temp_dir));
        }
        opts
    }
}

/// Source location: the SOURCE argument, else the configured location.
pub fn source_location<'a>(args: &'a Args, config: &'a AppConfig) -> &'a str {
    args.source.as_deref().unwrap_or(&config.source.location)
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A freshly read table: source headers as-is, every cell as (nullable) text.
#[derive(Debug, Clone)]
pub struct RawTable {
    frame: DataFrame,
}

impl RawTable {
    /// Wrap a DataFrame, casting every column to text.
    pub fn from_frame(frame: DataFrame) -> PolarsResult<Self> {
        let columns = frame
            .get_columns()
            .iter()
            .map(|c| c.cast(&DataType::String))
            .collect::<PolarsResult<Vec<Column>>>()?;
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Build a table from in-memory rows. Every row must have one cell per header.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> PolarsResult<Self> {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values: Vec<String> = rows
                    .iter()
                    .map(|row| row.get(i).copied().unwrap_or_default().to_string())
                    .collect();
                Column::new((*name).into(), values)
            })
            .collect();
        Self::from_frame(DataFrame::new(columns)?)
    }

    pub fn headers(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Cells of the column at `index`, top to bottom.
    pub(crate) fn text_column(&self, index: usize) -> PolarsResult<Vec<Option<String>>> {
        let column = &self.frame.get_columns()[index];
        let values = column.as_materialized_series().str()?;
        Ok(values.iter().map(|v| v.map(str::to_string)).collect())
    }
}

/// Load the source at `location` (local path or http/https URL).
pub fn load(location: &str, options: &LoadOptions) -> Result<RawTable, LoadError> {
    info!(source = location, "loading dataset");
    let table = match source::input_source(location) {
        InputSource::Local(path) => read_csv(&path, location, options)?,
        InputSource::Http(url) => {
            let temp = download_to_temp(&url, options)?;
            read_csv(temp.path(), location, options)?
        }
    };
    info!(
        rows = table.height(),
        columns = table.width(),
        "dataset loaded"
    );
    Ok(table)
}

fn read_csv(path: &Path, location: &str, options: &LoadOptions) -> Result<RawTable, LoadError> {
    // Open first so a missing or unreadable file is reported as unreachable, not as bad content.
    if path.is_dir() {
        return Err(LoadError::Io {
            location: location.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path is a directory"),
        });
    }
    File::open(path).map_err(|source| LoadError::Io {
        location: location.to_string(),
        source,
    })?;

    let delimiter = options.delimiter;
    let parse_error = |source: PolarsError| LoadError::Parse {
        location: location.to_string(),
        source,
    };
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(delimiter))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;
    debug!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "parsed csv"
    );

    if frame.width() == 0 {
        return Err(LoadError::NoColumns {
            location: location.to_string(),
        });
    }
    RawTable::from_frame(frame).map_err(parse_error)
}

#[cfg(feature = "http")]
fn download_to_temp(url: &str, options: &LoadOptions) -> Result<tempfile::NamedTempFile, LoadError> {
    let dir = options
        .temp_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let suffix = source::url_extension(url)
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| ".tmp".to_string());
    let mut temp = tempfile::Builder::new()
        .suffix(&suffix)
        .tempfile_in(&dir)
        .map_err(|source| LoadError::Io {
            location: dir.display().to_string(),
            source,
        })?;
    let response = ureq::get(url)
        .timeout(options.download_timeout)
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(status, response) => LoadError::HttpStatus {
                url: url.to_string(),
                status,
                status_text: response.status_text().to_string(),
            },
            other => LoadError::Download {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;
    let bytes = io::copy(&mut response.into_reader(), &mut temp).map_err(|e| {
        LoadError::Download {
            url: url.to_string(),
            message: format!("interrupted while saving: {}", e),
        }
    })?;
    debug!(url, bytes, path = %temp.path().display(), "downloaded source");
    Ok(temp)
}

#[cfg(not(feature = "http"))]
fn download_to_temp(url: &str, _options: &LoadOptions) -> Result<tempfile::NamedTempFile, LoadError> {
    Err(LoadError::HttpUnsupported {
        url: url.to_string(),
    })
}
