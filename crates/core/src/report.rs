//! Plain-text rendering of an [`AttributionReport`].

use std::fmt::Write;

use crate::aggregate::{percent, AttributionReport};
use crate::model::SizeReportRow;

/// Render the function table, the data table and the summary lines.
pub fn render_report(report: &AttributionReport) -> String {
    let mut out = String::new();

    out.push_str("Function size by unit\n");
    let function_rows = report
        .units
        .iter()
        .chain(std::iter::once(&report.aggregate))
        .map(|row| function_cells(row, report.function_total))
        .collect();
    let headers = ["Unit", "Strong", "Strong %", "+Weak", "+Weak %"];
    out.push_str(&render_table(&headers, function_rows));

    out.push_str("\nData size by unit\n");
    let data_rows = report
        .units_by_data()
        .into_iter()
        .chain(std::iter::once(&report.aggregate))
        .map(|row| {
            vec![
                row.name.clone(),
                format_bytes(row.data_size),
                format_percent(row.data_size, report.data_total),
            ]
        })
        .collect();
    out.push_str(&render_table(&["Unit", "Data", "Data %"], data_rows));

    let aggregate = &report.aggregate;
    out.push('\n');
    summary_line(
        &mut out,
        "Total strong function size",
        aggregate.strong_size,
        report.function_total,
    );
    summary_line(
        &mut out,
        "Total function size (including weak)",
        aggregate.combined_size(),
        report.function_total,
    );
    summary_line(&mut out, "Total public data size", aggregate.data_size, report.data_total);
    summary_line(
        &mut out,
        "Unattributable local data size",
        aggregate.local_data_size,
        report.data_total,
    );
    out
}

/// Format a byte count with thousands separators.
pub fn format_bytes(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format `size / total` as a percentage with one decimal.
pub fn format_percent(size: u64, total: u64) -> String {
    format!("{:.1}%", percent(size, total))
}

fn function_cells(row: &SizeReportRow, total: u64) -> Vec<String> {
    vec![
        row.name.clone(),
        format_bytes(row.strong_size),
        format_percent(row.strong_size, total),
        format_bytes(row.combined_size()),
        format_percent(row.combined_size(), total),
    ]
}

fn summary_line(out: &mut String, label: &str, size: u64, total: u64) {
    let _ = writeln!(
        out,
        "{label}: {} of {} bytes ({})",
        format_bytes(size),
        format_bytes(total),
        format_percent(size, total)
    );
}

/// First column left-aligned, the rest right-aligned, two spaces between columns.
fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = String::new();
    for row in std::iter::once(&header_cells).chain(rows.iter()) {
        let mut line = String::new();
        for (i, (cell, &width)) in row.iter().zip(&widths).enumerate() {
            if i == 0 {
                let _ = write!(line, "{cell:<width$}");
            } else {
                let _ = write!(line, "  {cell:>width$}");
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
