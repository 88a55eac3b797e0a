// Spreadsheet import (xlsx, xlsm, xls, xlsb, ods) and report export (xlsx only)
//
// Import reads one worksheet as text cells. Export writes one worksheet per
// report sheet with a bold header row; it is a presentation snapshot, not a
// round-trip format.

use std::path::Path;

use berth_recon::report::{Cell, Sheet};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use crate::error::IoError;
use crate::Table;

/// Import a worksheet as a table. `sheet` selects by name; the first sheet
/// is used when it is `None`.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    let read_err = |message: String| IoError::Read {
        path: path.display().to_string(),
        message,
    };

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| read_err(format!("failed to open workbook: {}", e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound {
                path: path.display().to_string(),
                sheet: wanted.to_string(),
                available: sheet_names.join(", "),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| read_err("workbook contains no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| read_err(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

    // Range start offset (data may not begin at A1)
    let (start_row, _) = range.start().unwrap_or((0, 0));

    let mut rows = range.rows().enumerate();
    let headers: Vec<String> = match rows.next() {
        Some((_, row)) => row.iter().map(cell_text).collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table { headers, rows: Vec::new() };
    for (idx, row) in rows {
        let values: Vec<String> = row.iter().map(cell_text).collect();
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        table.rows.push((start_row as usize + idx + 1, values));
    }

    log::debug!(
        "{}: sheet '{}' imported, {} data rows",
        path.display(),
        sheet_name,
        table.rows.len()
    );
    Ok(table)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => {
            // Format nicely: integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    }
}

/// Export report sheets to an xlsx workbook at `path`.
pub fn export_sheets(path: &Path, sheets: &[Sheet]) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| write_err(format!("failed to create sheet '{}': {}", sheet.name, e)))?;

        // rust_xlsxwriter uses 0-based row/col as u32/u16
        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, header, &header_format)
                .map_err(|e| write_err(e.to_string()))?;
        }

        for (idx, row) in sheet.rows.iter().enumerate() {
            let row32 = idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col16 = col as u16;
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(row32, col16, s).map_err(|e| write_err(e.to_string()))?;
                    }
                    Cell::Int(n) => {
                        worksheet
                            .write_number(row32, col16, *n as f64)
                            .map_err(|e| write_err(e.to_string()))?;
                    }
                    Cell::Float(f) => {
                        worksheet.write_number(row32, col16, *f).map_err(|e| write_err(e.to_string()))?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        log::debug!("xlsx sheet '{}': {} rows", sheet.name, sheet.rows.len());
    }

    workbook
        .save(path)
        .map_err(|e| write_err(format!("failed to save XLSX file: {}", e)))?;
    Ok(())
}
