//! Single-sheet spreadsheet export

use rust_xlsxwriter::{DocProperties, Format, Workbook};

use super::LISTING_COLUMN;
use crate::error::ExportError;

const SHEET_NAME: &str = "Sheet1";
const LINK_COLUMN_WIDTH: f64 = 80.0;

/// Write a workbook with the header in A1 and one link per row below it
pub(super) fn write_workbook(links: &[String]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    workbook.set_properties(&DocProperties::new().set_title("Listing URLs"));

    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_column_width(0, LINK_COLUMN_WIDTH)?;
    sheet.write_string_with_format(0, 0, LISTING_COLUMN, &header)?;

    for (row, link) in (1u32..).zip(links) {
        sheet.write_string(row, 0, link)?;
    }

    Ok(workbook.save_to_buffer()?)
}
