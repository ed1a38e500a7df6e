use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::path::Path;

use super::{Cell, Workbook};
use crate::error::Result;

fn to_xlsx(workbook: &Workbook) -> Result<XlsxWorkbook> {
    let mut xlsx = XlsxWorkbook::new();

    for sheet in workbook.sheets() {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(sheet.name())?;

        for (r, row) in sheet.rows().iter().enumerate() {
            let r = r as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(s) if s.is_empty() => {}
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Cell::Blank => {}
                }
            }
        }

        for (c, width) in sheet.widths().iter().enumerate() {
            worksheet.set_column_width(c as u16, *width)?;
        }
    }
    Ok(xlsx)
}

/// Serialise to `.xlsx` bytes.
pub fn write_workbook(workbook: &Workbook) -> Result<Vec<u8>> {
    Ok(to_xlsx(workbook)?.save_to_buffer()?)
}

pub fn save_workbook(workbook: &Workbook, path: &Path) -> Result<()> {
    to_xlsx(workbook)?.save(path)?;
    tracing::info!(path = %path.display(), sheets = workbook.sheets().len(), "workbook written");
    Ok(())
}
