//! Input source detection for local paths vs HTTP/HTTPS URLs.

use std::path::PathBuf;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum InputSource {
    Local(PathBuf),
    Http(String),
}

/// Classifies the location as local or HTTP/HTTPS using string parsing only (no filesystem calls).
pub(crate) fn input_source(location: &str) -> InputSource {
    if let Some(after_scheme) = location.find("://") {
        let prefix = location[..after_scheme].to_lowercase();
        if prefix == "http" || prefix == "https" {
            return InputSource::Http(location.to_string());
        }
    }
    InputSource::Local(PathBuf::from(location))
}

/// File extension of the last URL path segment, ignoring any query string.
/// Used to give downloaded temp files a recognizable suffix.
pub(crate) fn url_extension(url: &str) -> Option<String> {
    let after_scheme = url.find("://").map(|i| &url[i + 3..]).unwrap_or(url);
    let path_part = after_scheme
        .find('/')
        .map(|j| &after_scheme[j + 1..])
        .unwrap_or_default();
    let path_part = path_part.split(['?', '#']).next().unwrap_or_default();
    let last_segment = path_part.rsplit('/').next().unwrap_or(path_part);
    std::path::Path::new(last_segment)
        .extension()
        .and_then(|e| e.to_str())
        .map(String::from)
}
