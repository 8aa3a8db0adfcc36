//! Terminal output utilities: table rendering and ANSI formatting.

use chrono::{DateTime, Utc};
use statusgate_core::{DatabaseState, StatusReport};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn paint(s: &str, style: &str, color: bool) -> String {
    if color {
        format!("{style}{s}{RESET}")
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Column alignment.
pub enum Align {
    Left,
    Right,
}

/// A table column definition.
pub struct Column {
    pub header: String,
    pub align: Align,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            align: Align::Left,
        }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            align: Align::Right,
        }
    }
}

/// Render a table with given columns and rows.
pub fn render_table(columns: &[Column], rows: &[Vec<String>], color: bool) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| strip_ansi(&c.header).chars().count())
        .collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            widths[i] = widths[i].max(strip_ansi(cell).chars().count());
        }
    }

    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    out.push_str(&paint(&format!("  {}  ", header_cells.join("  ")), BOLD, color));
    out.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(cell, widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let visible_len = strip_ansi(s).chars().count();
    let pad = width.saturating_sub(visible_len);
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

// ---------------------------------------------------------------------------
// Dashboard view
// ---------------------------------------------------------------------------

fn database_cell(report: &StatusReport, color: bool) -> String {
    match report.database {
        Some(DatabaseState::Connected) => paint("connected", GREEN, color),
        Some(DatabaseState::Disconnected) => paint("disconnected", RED, color),
        None => paint("n/a", DIM, color),
    }
}

/// One row per server plus a footer with the refresh time.
pub fn render_dashboard(reports: &[StatusReport], updated_at: DateTime<Utc>, color: bool) -> String {
    let columns = [
        Column::left("Server"),
        Column::right("Uptime"),
        Column::left("Database"),
        Column::left("Reported"),
    ];
    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            vec![
                r.server.clone(),
                r.uptime.clone(),
                database_cell(r, color),
                r.timestamp.format("%H:%M:%S").to_string(),
            ]
        })
        .collect();

    let mut out = if rows.is_empty() {
        paint("  no servers reported yet\n", DIM, color)
    } else {
        render_table(&columns, &rows, color)
    };
    out.push_str(&format!(
        "\n  {} server(s), last update {}\n",
        reports.len(),
        updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(server: &str, database: Option<DatabaseState>) -> StatusReport {
        StatusReport {
            message: "ok".into(),
            server: server.into(),
            uptime: "42s".into(),
            database,
            database_error: None,
            security: None,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 15).unwrap(),
        }
    }

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn colored_cells_keep_columns_aligned() {
        let cols = vec![Column::left("Name"), Column::right("Count")];
        let rows = vec![
            vec![format!("{GREEN}Alice{RESET}"), "42".to_string()],
            vec!["Bob".to_string(), "7".to_string()],
        ];
        let table = strip_ansi(&render_table(&cols, &rows, true));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[2], "  Alice     42  ");
        assert_eq!(lines[3], "  Bob        7  ");
    }

    #[test]
    fn renders_one_row_per_server() {
        let reports = [
            report("pi-01", Some(DatabaseState::Connected)),
            report("pi-02", Some(DatabaseState::Disconnected)),
            report("pi-03", None),
        ];
        let out = render_dashboard(&reports, reports[0].timestamp, false);
        assert!(out.contains("pi-01"));
        assert!(out.contains("disconnected"));
        assert!(out.contains("n/a"));
        assert!(out.contains("08:30:15"));
        assert!(out.contains("3 server(s)"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn empty_registry_has_placeholder() {
        let out = render_dashboard(&[], Utc::now(), false);
        assert!(out.contains("no servers reported yet"));
    }
}
