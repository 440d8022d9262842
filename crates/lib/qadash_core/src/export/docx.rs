//! Word export through `docx-rs`: a heading and one table.

use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Run, Table, TableCell, TableRow};

use super::{ExportError, HEADERS, row_cells};
use crate::models::test_case::TestCaseRow;

pub(super) fn render(project_name: &str, cases: &[TestCaseRow]) -> Result<Vec<u8>, ExportError> {
    let heading = Paragraph::new().add_run(
        Run::new()
            .add_text(format!("{project_name} - Test Cases"))
            .bold()
            .size(32),
    );

    let mut rows = Vec::with_capacity(cases.len() + 1);
    rows.push(table_row(&HEADERS, true));
    rows.extend(cases.iter().map(|tc| table_row(&row_cells(tc), false)));

    let mut buf = Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(heading)
        .add_table(Table::new(rows))
        .build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}

fn table_row(cells: &[&str], bold: bool) -> TableRow {
    TableRow::new(
        cells
            .iter()
            .map(|text| TableCell::new().add_paragraph(Paragraph::new().add_run(run(text, bold))))
            .collect(),
    )
}

/// One run per cell; embedded newlines become line breaks.
fn run(text: &str, bold: bool) -> Run {
    let mut run = Run::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line.trim_end_matches('\r'));
    }
    if bold { run.bold() } else { run }
}
