//! Excel export through `rust_xlsxwriter`.

use rust_xlsxwriter::{Format, Workbook};

use super::{ExportError, HEADERS, row_cells};
use crate::models::test_case::TestCaseRow;

pub(super) const SHEET_NAME: &str = "Test Cases";

pub(super) fn render(cases: &[TestCaseRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.set_freeze_panes(1, 0)?;

    for (col, title) in (0u16..).zip(HEADERS) {
        worksheet.write_string_with_format(0, col, title, &header)?;
        worksheet.set_column_width(col, 20)?;
    }
    for (row, tc) in (1u32..).zip(cases) {
        for (col, value) in (0u16..).zip(row_cells(tc)) {
            if !value.is_empty() {
                worksheet.write_string(row, col, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Range, Reader, Xlsx, open_workbook_from_rs};

    use super::*;
    use crate::export::test_support::case;

    fn read_sheet(bytes: Vec<u8>) -> Range<Data> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        workbook.worksheet_range(SHEET_NAME).unwrap()
    }

    fn text(range: &Range<Data>, row: u32, col: u32) -> String {
        match range.get_value((row, col)) {
            Some(Data::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    #[test]
    fn one_sheet_row_per_case_plus_header() {
        let cases: Vec<_> = (0..3).map(|i| case(&format!("Case {i}"), "Login")).collect();
        let sheet = read_sheet(render(&cases).unwrap());
        assert_eq!(sheet.height(), cases.len() + 1);
        assert_eq!(sheet.width(), HEADERS.len());
        assert_eq!(text(&sheet, 3, 1), "Case 2");
        assert_eq!(text(&sheet, 3, 0), "Login");
    }

    #[test]
    fn header_row_and_cell_text_survive() {
        let sheet = read_sheet(render(&[case("Login", "General")]).unwrap());
        let header: Vec<String> = (0..HEADERS.len() as u32).map(|c| text(&sheet, 0, c)).collect();
        assert_eq!(header, HEADERS);
        assert_eq!(text(&sheet, 1, 6), "works <fine> & fast");
        assert_eq!(text(&sheet, 1, 5), "1. open\n2. click \"Go\"");
        assert_eq!(text(&sheet, 1, 3), "high");
    }
}
