use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use lazydevops::ReportRow;

const TABLE_HEADERS: &[&str] = &[
    "PR",
    "Title",
    "Author",
    "Repo",
    "Source->Target",
    "Votes",
    "Checks",
    "Created",
    "URL",
];
const COLUMN_SEPARATOR: &str = "  ";
const TITLE_TRUNCATION_SUFFIX: &str = "...";

/// Formats how long ago `created_at` was, relative to `now`.
///
/// Under a minute (or in the future) is "just now"; then minutes, hours
/// and days up to 30 days; older than that is an absolute date.
pub fn format_relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created_at);

    if elapsed < Duration::minutes(1) {
        "just now".to_string()
    } else if elapsed < Duration::hours(1) {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed < Duration::days(1) {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed < Duration::days(30) {
        format!("{}d ago", elapsed.num_days())
    } else {
        created_at.format("%Y-%m-%d").to_string()
    }
}

/// Cuts `title` to at most `max_width` characters, marking the cut with
/// `...` when there is room for it.
pub fn truncate_title(title: &str, max_width: usize) -> String {
    if title.chars().count() <= max_width {
        return title.to_string();
    }

    let suffix_width = TITLE_TRUNCATION_SUFFIX.chars().count();
    if max_width <= suffix_width {
        return title.chars().take(max_width).collect();
    }

    let mut truncated: String = title.chars().take(max_width - suffix_width).collect();
    truncated.push_str(TITLE_TRUNCATION_SUFFIX);
    truncated
}

fn row_to_cells(row: &ReportRow, max_title_width: Option<usize>, now: DateTime<Utc>) -> Vec<String> {
    let pr = &row.pull_request;
    let title = match max_title_width {
        Some(width) => truncate_title(&pr.title, width),
        None => pr.title.clone(),
    };

    vec![
        pr.id.to_string(),
        title,
        pr.author.display_name.clone(),
        pr.repository.name.clone(),
        pr.branches(),
        row.votes.to_string(),
        row.checks.to_string(),
        format_relative_time(pr.created_at, now),
        pr.web_url.clone(),
    ]
}

fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    widths
}

/// Writes one line of cells, padding all but the last to its column width.
fn render_line<W: Write, S: AsRef<str>>(cells: &[S], widths: &[usize], writer: &mut W) -> Result<()> {
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        if i < last {
            write!(writer, "{:<width$}{COLUMN_SEPARATOR}", cell.as_ref(), width = widths[i])?;
        } else {
            write!(writer, "{}", cell.as_ref())?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

fn render_table_separator<W: Write>(widths: &[usize], writer: &mut W) -> Result<()> {
    let dashes: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
    writeln!(writer, "{}", dashes.join(COLUMN_SEPARATOR))?;
    Ok(())
}

/// Renders the report as a fixed-column table.
pub fn display_report<W: Write>(
    rows: &[ReportRow],
    max_title_width: Option<usize>,
    now: DateTime<Utc>,
    writer: &mut W,
) -> Result<()> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row_to_cells(row, max_title_width, now))
        .collect();
    let widths = calculate_column_widths(TABLE_HEADERS, &cells);

    render_line(TABLE_HEADERS, &widths, writer)?;
    render_table_separator(&widths, writer)?;
    for row in &cells {
        render_line(row, &widths, writer)?;
    }

    Ok(())
}
