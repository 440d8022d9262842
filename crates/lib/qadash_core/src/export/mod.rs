//! Project export to Word, Excel and CSV.
//!
//! Documents are rendered fully in memory by `docx-rs`, `rust_xlsxwriter`
//! and `csv`. Every format has a bold (where supported) header row followed
//! by one row per test case.

mod csv;
mod docx;
mod xlsx;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::test_case::TestCaseRow;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}. Must be one of: word, excel, csv")]
    UnsupportedFormat(String),

    #[error("Word export failed: {0}")]
    Docx(String),

    #[error("Excel export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Word,
    Excel,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Word => "docx",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Word => "word",
            ExportFormat::Excel => "excel",
            ExportFormat::Csv => "csv",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" | "docx" => Ok(ExportFormat::Word),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A rendered export ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Column headings shared by every format.
pub(crate) const HEADERS: [&str; 9] = [
    "Tab",
    "Title",
    "Description",
    "Priority",
    "Type",
    "Steps",
    "Expected Result",
    "Actual Result",
    "Status",
];

pub(crate) fn row_cells(tc: &TestCaseRow) -> [&str; 9] {
    [
        tc.tab_name.as_str(),
        tc.title.as_str(),
        tc.description.as_str(),
        tc.priority.as_str(),
        tc.test_type.as_str(),
        tc.steps.as_str(),
        tc.expected_result.as_str(),
        tc.actual_result.as_str(),
        tc.status.as_str(),
    ]
}

/// Render `cases` of the project named `project_name` as `format`.
pub fn render(
    format: ExportFormat,
    project_name: &str,
    cases: &[TestCaseRow],
) -> Result<ExportedDocument, ExportError> {
    let bytes = match format {
        ExportFormat::Word => docx::render(project_name, cases)?,
        ExportFormat::Excel => xlsx::render(cases)?,
        ExportFormat::Csv => csv::render(cases)?,
    };
    Ok(ExportedDocument {
        bytes,
        content_type: format.content_type(),
        filename: format!(
            "{}_test_cases.{}",
            filename_stem(project_name),
            format.extension()
        ),
    })
}

/// Reduce a project name to characters safe inside a
/// `Content-Disposition` filename.
fn filename_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "project".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::test_case::{Priority, TestCaseRow, TestStatus, TestType};

    pub fn case(title: &str, tab: &str) -> TestCaseRow {
        let now = Utc::now();
        TestCaseRow {
            id: Uuid::now_v7(),
            project_id: Uuid::nil(),
            tab_name: tab.to_string(),
            title: title.to_string(),
            description: "desc, with comma".to_string(),
            priority: Priority::High,
            test_type: TestType::UiUx,
            steps: "1. open\n2. click \"Go\"".to_string(),
            expected_result: "works <fine> & fast".to_string(),
            actual_result: String::new(),
            status: TestStatus::Draft,
            assigned_to: None,
            executed_at: None,
            is_template: false,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_by_name_or_extension() {
        assert_eq!("word".parse::<ExportFormat>().unwrap(), ExportFormat::Word);
        assert_eq!("DOCX".parse::<ExportFormat>().unwrap(), ExportFormat::Word);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn filename_is_header_safe() {
        let doc = render(ExportFormat::Csv, "Web App \"v2\"", &[]).unwrap();
        assert_eq!(doc.filename, "Web_App__v2__test_cases.csv");
        let doc = render(ExportFormat::Excel, "  ", &[]).unwrap();
        assert_eq!(doc.filename, "project_test_cases.xlsx");
    }
}
