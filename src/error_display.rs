//! User-facing error message formatting.
//!
//! Uses typed error matching (LoadError, NormalizeError, PolarsError variants, io::ErrorKind)
//! rather than string parsing to produce actionable messages.

use crate::dashboard::DashboardError;
use crate::loader::LoadError;
use crate::normalize::NormalizeError;
use polars::prelude::PolarsError;
use std::io;

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!(
            "Column not found: {}. Check the header row of the file.",
            msg
        ),
        PE::Duplicate(msg) => format!("Duplicate column in header: {}", msg),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!(
            "Rows have different numbers of fields: {}. Check the delimiter.",
            msg
        ),
        PE::ComputeError(msg) => format!("Could not parse the file: {}", msg),
        PE::OutOfBounds(msg) => format!("Index or row out of bounds: {}", msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::ConnectionRefused => "Connection refused.".to_string(),
        ErrorKind::ConnectionReset => "Connection reset.".to_string(),
        ErrorKind::TimedOut => "Timed out.".to_string(),
        ErrorKind::InvalidData => "Invalid or corrupted data.".to_string(),
        ErrorKind::InvalidInput => {
            let msg = err.to_string();
            if msg.contains("directory") {
                "Path is a directory, not a file.".to_string()
            } else {
                "Invalid input.".to_string()
            }
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return if context.is_some() {
                format!("I/O error: {}", msg)
            } else {
                msg
            };
        }
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a LoadError as "Failed to load <location>: <reason>".
pub fn user_message_from_load_error(err: &LoadError) -> String {
    let detail = match err {
        LoadError::Io { source, .. } => user_message_from_io(source, None),
        LoadError::Parse { source, .. } => user_message_from_polars(source),
        LoadError::Download { message, .. } => format!("Download failed: {}", message),
        LoadError::HttpStatus {
            status,
            status_text,
            ..
        } => format!("Server responded with HTTP {} {}.", status, status_text),
        LoadError::HttpUnsupported { .. } => {
            "This build has no HTTP support. Download the file and pass its path.".to_string()
        }
        LoadError::NoColumns { .. } => "The file has no header row.".to_string(),
    };
    format!("Failed to load {}: {}", err.location(), detail)
}

pub fn user_message_from_normalize_error(err: &NormalizeError) -> String {
    match err {
        NormalizeError::MissingColumn { column, found } => format!(
            "The dataset has no '{}' column. Columns found: {}.",
            column,
            found.join(", ")
        ),
        NormalizeError::Table { column, source } => format!(
            "Could not read column '{}': {}",
            column,
            user_message_from_polars(source)
        ),
        other => format!("The dataset is not usable: {}.", other),
    }
}

pub fn user_message_from_dashboard_error(err: &DashboardError) -> String {
    match err {
        DashboardError::Load(e) => user_message_from_load_error(e),
        DashboardError::Normalize(e) => user_message_from_normalize_error(e),
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find the first typed error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report) -> String {
    for cause in report.chain() {
        if let Some(e) = cause.downcast_ref::<DashboardError>() {
            return user_message_from_dashboard_error(e);
        }
        if let Some(e) = cause.downcast_ref::<LoadError>() {
            return user_message_from_load_error(e);
        }
        if let Some(e) = cause.downcast_ref::<NormalizeError>() {
            return user_message_from_normalize_error(e);
        }
        if let Some(e) = cause.downcast_ref::<PolarsError>() {
            return user_message_from_polars(e);
        }
        if let Some(e) = cause.downcast_ref::<io::Error>() {
            return user_message_from_io(e, None);
        }
    }

    // Fallback: use first line of display to avoid long tracebacks
    let display = report.to_string();
    display
        .lines()
        .next()
        .map(str::trim)
        .unwrap_or("An error occurred")
        .to_string()
}
