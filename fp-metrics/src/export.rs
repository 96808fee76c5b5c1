//! Spreadsheet serialization
//!
//! Writes a [`Table`] to an `.xlsx` workbook with one worksheet: the
//! declared columns as the header row, one row per data row, no index
//! column.

use std::path::Path;

use rust_xlsxwriter::Workbook;
use serde_json::Value;
use tracing::debug;

use crate::table::Table;
use crate::Result;

/// Write a table to a spreadsheet file at `path`
///
/// Numbers and booleans are written as native cell types; everything else
/// is written as its string representation. Null cells are left blank. An
/// empty table still writes the header row.
pub fn write_xlsx(table: &Table, path: &Path, sheet_name: Option<&str>) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    if let Some(name) = sheet_name {
        worksheet.set_name(name)?;
    }

    for (column_index, column) in table.columns().iter().enumerate() {
        worksheet.write_string(0, column_index as u16, column.as_str())?;
    }

    for (row_index, row) in table.rows().iter().enumerate() {
        let sheet_row = (row_index + 1) as u32;
        for (column_index, cell) in row.iter().enumerate() {
            let sheet_column = column_index as u16;
            match cell {
                Value::Null => {}
                Value::Bool(flag) => {
                    worksheet.write_boolean(sheet_row, sheet_column, *flag)?;
                }
                Value::Number(number) => {
                    if let Some(float) = number.as_f64() {
                        worksheet.write_number(sheet_row, sheet_column, float)?;
                    } else {
                        worksheet.write_string(sheet_row, sheet_column, &number.to_string())?;
                    }
                }
                Value::String(text) => {
                    worksheet.write_string(sheet_row, sheet_column, text.as_str())?;
                }
                other => {
                    worksheet.write_string(sheet_row, sheet_column, &other.to_string())?;
                }
            }
        }
    }

    workbook.save(path)?;
    debug!(path = %path.display(), rows = table.len(), "workbook written");
    Ok(())
}
