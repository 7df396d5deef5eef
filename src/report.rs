//! Plain-terminal rendering of [`DashboardViews`]: caption, preview table and one table per
//! aggregate. A failed aggregate renders as an error line in its own section only.

use crate::aggregate::{AggregateError, GroupedMean};
use crate::dashboard::{AggregateView, ChartViews, DashboardViews};
use crate::record::{NumericColumn, Record};
use crate::statistics::{CorrelationMatrix, Histogram};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::fmt::Write;
use supports_color::Stream;

pub const NO_RESULTS_MESSAGE: &str = "No data available for the selected filters.";

/// Widest scatter listing before it is summarized.
const MAX_SCATTER_ROWS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    pub color: bool,
    pub width: u16,
}

impl ReportStyle {
    pub fn plain() -> Self {
        Self {
            color: false,
            width: 120,
        }
    }

    /// Color when stdout supports it and NO_COLOR is unset.
    pub fn detect() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        Self {
            color: !no_color && supports_color::on(Stream::Stdout).is_some(),
            width: 120,
        }
    }
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self::plain()
    }
}

pub fn render_report(views: &DashboardViews<'_>, style: ReportStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", views.overview);
    let _ = writeln!(out, "{} matching records", views.matched);
    out.push('\n');

    match views.charts() {
        None => {
            let _ = writeln!(out, "{}", NO_RESULTS_MESSAGE);
        }
        Some(charts) => {
            section(&mut out, "Books", &preview_table(&views.preview, style));
            render_charts(&mut out, charts, style);
        }
    }
    out
}

fn render_charts(out: &mut String, charts: &ChartViews, style: ReportStyle) {
    let mut authors = new_table(style, &["Author", "Books"]);
    align_column(&mut authors, 1, CellAlignment::Right);
    for (author, count) in &charts.top_authors {
        authors.add_row(vec![Cell::new(author), Cell::new(count)]);
    }
    section(out, "Top authors", &authors.to_string());

    section(
        out,
        "Average rating by genre",
        &view_or_error(&charts.avg_rating_by_genre, style, |m| {
            mean_table(m, "Average rating", style)
        }),
    );
    section(
        out,
        "Average price by genre",
        &view_or_error(&charts.avg_price_by_genre, style, |m| {
            mean_table(m, "Average price", style)
        }),
    );
    section(
        out,
        "Rating distribution",
        &view_or_error(&charts.rating_histogram, style, |h| {
            histogram_table(h, style)
        }),
    );
    section(
        out,
        "Price vs rating",
        &view_or_error(&charts.price_vs_rating, style, |p| scatter_table(p, style)),
    );
    section(
        out,
        "Correlation",
        &view_or_error(&charts.correlations, style, |m| {
            correlation_table(m, style)
        }),
    );
}

fn section(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", body);
    out.push('\n');
}

fn view_or_error<T>(
    view: &AggregateView<T>,
    style: ReportStyle,
    render: impl FnOnce(&T) -> String,
) -> String {
    match view {
        Ok(value) => render(value),
        Err(err) => error_line(err, style),
    }
}

fn error_line(err: &AggregateError, style: ReportStyle) -> String {
    let mut table = new_table(style, &["Unavailable"]);
    table.add_row(vec![paint(Cell::new(err), Color::Red, style)]);
    table.to_string()
}

fn preview_table(rows: &[&Record], style: ReportStyle) -> String {
    let mut table = new_table(
        style,
        &["Title", "Author", "Genre", "Year", "Rating", "Reviews", "Price"],
    );
    for index in 3..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for record in rows {
        table.add_row(vec![
            Cell::new(&record.title),
            Cell::new(&record.author),
            Cell::new(&record.genre),
            Cell::new(record.year),
            Cell::new(&record.rating),
            Cell::new(&record.reviews),
            Cell::new(&record.price),
        ]);
    }
    table.to_string()
}

fn mean_table(means: &GroupedMean, label: &str, style: ReportStyle) -> String {
    let mut table = new_table(style, &["Genre", label]);
    align_column(&mut table, 1, CellAlignment::Right);
    for (group, mean) in means {
        table.add_row(vec![Cell::new(group), Cell::new(format!("{:.2}", mean))]);
    }
    table.to_string()
}

fn histogram_table(histogram: &Histogram, style: ReportStyle) -> String {
    let mut table = new_table(style, &["Range", "Count", ""]);
    align_column(&mut table, 1, CellAlignment::Right);
    let peak = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0);
    for bin in &histogram.bins {
        let bar_len = if peak == 0 { 0 } else { bin.count * 30 / peak };
        table.add_row(vec![
            Cell::new(format!("{:.2} - {:.2}", bin.lower, bin.upper)),
            Cell::new(bin.count),
            paint(Cell::new("#".repeat(bar_len)), Color::Cyan, style),
        ]);
    }
    table.to_string()
}

fn scatter_table(points: &[(f64, f64)], style: ReportStyle) -> String {
    let mut table = new_table(
        style,
        &[NumericColumn::Price.name(), NumericColumn::Rating.name()],
    );
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for (x, y) in points.iter().take(MAX_SCATTER_ROWS) {
        table.add_row(vec![Cell::new(x), Cell::new(y)]);
    }
    if points.len() > MAX_SCATTER_ROWS {
        table.add_row(vec![
            dim_cell(format!("... {} more", points.len() - MAX_SCATTER_ROWS), style),
            dim_cell("", style),
        ]);
    }
    table.to_string()
}

fn correlation_table(matrix: &CorrelationMatrix, style: ReportStyle) -> String {
    let mut header: Vec<&str> = vec![""];
    header.extend(matrix.columns.iter().map(|c| c.name()));
    let mut table = new_table(style, &header);
    for index in 1..header.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (row, column) in matrix.columns.iter().enumerate() {
        let mut cells = vec![Cell::new(column.name())];
        cells.extend(matrix.correlations[row].iter().map(|r| match r {
            Some(r) => Cell::new(format!("{:.2}", r)),
            None => dim_cell("n/a", style),
        }));
        table.add_row(cells);
    }
    let mut out = table.to_string();
    let _ = write!(out, "\nn = {}", matrix.sample_size);
    out
}

fn new_table(style: ReportStyle, header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(style.width);
    if !style.color {
        table.force_no_tty();
    }
    table.set_header(
        header
            .iter()
            .map(|label| header_cell(label, style))
            .collect::<Vec<_>>(),
    );
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str, style: ReportStyle) -> Cell {
    let cell = Cell::new(label);
    if style.color {
        cell.fg(Color::Cyan).add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

fn dim_cell<T: ToString>(value: T, style: ReportStyle) -> Cell {
    paint(Cell::new(value), Color::DarkGrey, style)
}

fn paint(cell: Cell, color: Color, style: ReportStyle) -> Cell {
    if style.color {
        cell.fg(color)
    } else {
        cell
    }
}
