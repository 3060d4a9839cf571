use std::fmt::Write;

use crate::export::ExportSummary;

use super::styling::bright;
use super::tables::{count_cell, create_table, cyan_header};

/// Prints the rows written per CSV file to stderr.
pub fn print_summary(summary: &ExportSummary) {
    eprintln!("{}", render_summary(summary));
}

fn render_summary(summary: &ExportSummary) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{} {}", bright("📄"), bright("Output").underlined());

    let mut table = create_table();
    table.set_header(cyan_header(&["Kind", "Rows", "File"]));
    for (kind, rows, path) in [
        ("runs", summary.runs, &summary.runs_path),
        ("jobs", summary.jobs, &summary.jobs_path),
        ("steps", summary.steps, &summary.steps_path),
    ] {
        table.add_row(vec![
            comfy_table::Cell::new(kind),
            count_cell(rows),
            comfy_table::Cell::new(path.display()),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}
