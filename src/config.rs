use crate::dashboard::{DEFAULT_HISTOGRAM_BINS, DEFAULT_PREVIEW_ROWS, DEFAULT_TOP_N};
use crate::loader::DEFAULT_DOWNLOAD_TIMEOUT_SECS;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Published bestsellers CSV used when neither the command line nor the config names a source.
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/garemagaba/Analyze-Best-Selling-Amazon-Books-GaremaGaba/refs/heads/main/bestsellers.csv";

const CONFIG_FILE: &str = "config.toml";
const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string with comments
    /// All fields are commented out so defaults are used, but users can uncomment to override
    pub fn generate_default_config(&self) -> String {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config)
            .unwrap_or_else(|e| panic!("Failed to serialize default config: {}", e));

        Self::comment_all_fields(toml_str, Self::collect_all_comments())
    }

    fn collect_all_comments() -> HashMap<String, String> {
        let mut comments = HashMap::new();
        for (field, comment) in APP_COMMENTS {
            comments.insert(field.to_string(), comment.to_string());
        }
        for (field, comment) in SOURCE_COMMENTS {
            comments.insert(format!("source.{}", field), comment.to_string());
        }
        for (field, comment) in VIEWS_COMMENTS {
            comments.insert(format!("views.{}", field), comment.to_string());
        }
        for (field, comment) in LOGGING_COMMENTS {
            comments.insert(format!("logging.{}", field), comment.to_string());
        }
        comments
    }

    /// Comment out every field and section header, adding each field's comment above it.
    /// Option fields that are unset by default are added as `# field = null` so they are discoverable.
    fn comment_all_fields(toml: String, comments: HashMap<String, String>) -> String {
        let mut result = String::new();
        result.push_str("# shelfscope configuration file\n");
        result
            .push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
        result.push('\n');

        let mut current_section = String::new();

        for line in toml.lines() {
            if let Some(section) = Self::extract_section_name(line) {
                if let Some((_, header)) = SECTION_HEADERS.iter().find(|(s, _)| *s == section) {
                    result.push_str(header);
                    result.push('\n');
                }
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
                for field in UNSET_OPTION_FIELDS
                    .iter()
                    .filter(|f| f.starts_with(&format!("{}.", section)))
                {
                    Self::push_comment(&mut result, comments.get(*field));
                    let name = field.rsplit('.').next().unwrap_or(*field);
                    result.push_str(&format!("# {} = null\n", name));
                }
                current_section = section;
                continue;
            }

            if let Some(field_path) = Self::extract_field_path(line, &current_section) {
                Self::push_comment(&mut result, comments.get(&field_path));
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }

        result
    }

    fn push_comment(result: &mut String, comment: Option<&String>) {
        if let Some(comment) = comment {
            for comment_line in comment.lines() {
                result.push_str("# ");
                result.push_str(comment_line);
                result.push('\n');
            }
        }
    }

    /// Extract section name from TOML line like "[views]"
    fn extract_section_name(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            Some(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            None
        }
    }

    fn extract_field_path(line: &str, current_section: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }
        let eq_pos = trimmed.find('=')?;
        let field_name = trimmed[..eq_pos].trim();
        if current_section.is_empty() {
            Some(field_name.to_string())
        } else {
            Some(format!("{}.{}", current_section, field_name))
        }
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path(CONFIG_FILE);

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, self.generate_default_config())?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub source: SourceConfig,
    pub views: ViewsConfig,
    pub logging: LoggingConfig,
}

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "source",
        "# ============================================================================\n# Data Source\n# ============================================================================",
    ),
    (
        "views",
        "# ============================================================================\n# Dashboard Views\n# ============================================================================",
    ),
    (
        "logging",
        "# ============================================================================\n# Logging\n# ============================================================================",
    ),
];

/// Option fields with no default value; serialized TOML omits them.
const UNSET_OPTION_FIELDS: &[&str] = &["source.delimiter", "source.temp_dir"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Path or http(s) URL of the bestsellers CSV
    pub location: String,
    /// Field delimiter as a byte (44 = ','). None = comma.
    pub delimiter: Option<u8>,
    pub download_timeout_secs: u64,
    /// Directory for downloaded temp files. None = system default (e.g. TMPDIR).
    pub temp_dir: Option<String>,
}

const SOURCE_COMMENTS: &[(&str, &str)] = &[
    (
        "location",
        "Path or http(s) URL of the bestsellers CSV. Overridden by the SOURCE argument.",
    ),
    (
        "delimiter",
        "Field delimiter as a byte value, e.g. 59 for ';'. Leave unset for ','.",
    ),
    (
        "download_timeout_secs",
        "Seconds to wait for an http(s) source before giving up.",
    ),
    (
        "temp_dir",
        "Directory for downloaded files. Leave unset for the system temp directory.",
    ),
];

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_SOURCE.to_string(),
            delimiter: None,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            temp_dir: None,
        }
    }
}

impl SourceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = SourceConfig::default();
        if other.location != default.location {
            self.location = other.location;
        }
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.download_timeout_secs != default.download_timeout_secs {
            self.download_timeout_secs = other.download_timeout_secs;
        }
        if other.temp_dir.is_some() {
            self.temp_dir = other.temp_dir;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub preview_rows: usize,
    pub top_n: usize,
    pub histogram_bins: usize,
}

const VIEWS_COMMENTS: &[(&str, &str)] = &[
    (
        "preview_rows",
        "Rows shown in the preview table of the filtered books.",
    ),
    ("top_n", "Authors listed in the book count ranking."),
    ("histogram_bins", "Bins in the rating distribution."),
];

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            top_n: DEFAULT_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl ViewsConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ViewsConfig::default();
        if other.preview_rows != default.preview_rows {
            self.preview_rows = other.preview_rows;
        }
        if other.top_n != default.top_n {
            self.top_n = other.top_n;
        }
        if other.histogram_bins != default.histogram_bins {
            self.histogram_bins = other.histogram_bins;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set
    pub level: String,
}

const LOGGING_COMMENTS: &[(&str, &str)] = &[(
    "level",
    "Log level written to stderr: off, error, warn, info, debug or trace.\nRUST_LOG takes precedence; --debug forces debug.",
)];

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.level != LoggingConfig::default().level {
            self.level = other.level;
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            source: SourceConfig::default(),
            views: ViewsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the user config file if present, then validate.
    pub fn load(app_name: &str) -> Result<Self> {
        let manager = ConfigManager::new(app_name)?;
        Self::load_from(&manager)
    }

    /// Load using an explicit config directory.
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        let config_path = manager.config_path(CONFIG_FILE);
        config.merge(Self::load_user_config(&config_path)?);

        config.validate().map_err(|e| {
            eyre!(
                "Invalid configuration in {}: {}",
                config_path.display(),
                e
            )
        })?;

        Ok(config)
    }

    fn load_user_config(config_path: &Path) -> Result<AppConfig> {
        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }
        self.source.merge(other.source);
        self.views.merge(other.views);
        self.logging.merge(other.logging);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.source.location.trim().is_empty() {
            return Err(eyre!("source.location must not be empty"));
        }
        if self.source.download_timeout_secs == 0 {
            return Err(eyre!("source.download_timeout_secs must be greater than 0"));
        }

        if self.views.preview_rows == 0 {
            return Err(eyre!("views.preview_rows must be greater than 0"));
        }
        if self.views.top_n == 0 {
            return Err(eyre!("views.top_n must be greater than 0"));
        }
        if self.views.histogram_bins == 0 {
            return Err(eyre!("views.histogram_bins must be greater than 0"));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(eyre!(
                "logging.level must be one of {}, got {}",
                LOG_LEVELS.join(", "),
                self.logging.level
            ));
        }

        Ok(())
    }
}
