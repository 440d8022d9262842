//! CSV export through the `csv` crate: header record plus one record per
//! test case, CRLF-terminated.

use ::csv::{Terminator, WriterBuilder};

use super::{ExportError, HEADERS, row_cells};
use crate::models::test_case::TestCaseRow;

pub(super) fn render(cases: &[TestCaseRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for tc in cases {
        writer.write_record(row_cells(tc))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
