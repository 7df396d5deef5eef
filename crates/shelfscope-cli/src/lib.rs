//! Shared CLI definitions for shelfscope.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::builder::RangedU64ValueParser;
use clap::{CommandFactory, Parser};

/// Counts that size a view must be at least 1.
fn positive_count() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..)
}

/// Parse a delimiter given as a single ASCII character. `\t` and `tab` mean a tab.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    if matches!(s, "\\t" | "tab") {
        return Ok(b'\t');
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '\n' && c != '\r' && c != '"' => Ok(c as u8),
        (Some(_), None) => Err(format!("'{s}' cannot be used as a delimiter")),
        _ => Err(format!(
            "delimiter must be a single character, got '{s}'"
        )),
    }
}

/// Command-line arguments for shelfscope
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "shelfscope",
    version,
    about = "Explore a best-selling books dataset from the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path or http(s) URL of the bestsellers CSV.
    /// Defaults to source.location from the config file, then to the published dataset.
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Only include books of this genre ("All" for every genre)
    #[arg(long = "genre", value_name = "GENRE")]
    pub genre: Option<String>,

    /// Only include books by this author ("All" for every author). Must have books in the selected genre.
    #[arg(long = "author", value_name = "AUTHOR")]
    pub author: Option<String>,

    /// First publication year to include (default: earliest year in the dataset)
    #[arg(long = "year-min", value_name = "YEAR")]
    pub year_min: Option<i32>,

    /// Last publication year to include (default: latest year in the dataset)
    #[arg(long = "year-max", value_name = "YEAR")]
    pub year_max: Option<i32>,

    /// Number of authors in the book count ranking (default: 10)
    #[arg(long = "top-n", value_name = "N", value_parser = positive_count())]
    pub top_n: Option<usize>,

    /// Number of matching books shown in the preview table (default: 10)
    #[arg(long = "preview-rows", value_name = "N", value_parser = positive_count())]
    pub preview_rows: Option<usize>,

    /// Number of bins in the rating distribution (default: 20)
    #[arg(long = "bins", value_name = "N", value_parser = positive_count())]
    pub bins: Option<usize>,

    /// Field delimiter of the source file, a single character (default: ',')
    #[arg(long = "delimiter", value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Print the views as JSON instead of tables
    #[arg(long = "json", action)]
    pub json: bool,

    /// Print the genres in the dataset and exit
    #[arg(long = "list-genres", action, conflicts_with = "list_authors")]
    pub list_genres: bool,

    /// Print the authors available for the selected genre and exit
    #[arg(long = "list-authors", action)]
    pub list_authors: bool,

    /// Enable debug logging on stderr (overrides logging.level from config)
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/shelfscope/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
