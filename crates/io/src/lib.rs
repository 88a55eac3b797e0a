// File I/O operations

pub mod csv;
pub mod error;
pub mod records;
pub mod xlsx;

use std::path::{Path, PathBuf};

use berth_recon::config::{ExportFormat, MdmsColumns, PrsColumns, SourceConfig};
use berth_recon::{MdmsRecord, PrsRecord, ReconReport};

pub use error::IoError;
pub use records::{mdms_from_table, prs_from_table};

/// A header row plus data rows, all cells as text.
///
/// Each data row carries its 1-based line/row number in the source file so
/// loader errors can point at it. Fully blank rows are already dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<(usize, Vec<String>)>,
}

/// Read a CSV/TSV file or one worksheet of a spreadsheet.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let table = match ext.as_str() {
        "csv" | "tsv" | "txt" => {
            if let Some(sheet) = sheet {
                log::warn!("{}: sheet '{}' ignored for delimited text", path.display(), sheet);
            }
            csv::import(path)?
        }
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => xlsx::import(path, sheet)?,
        _ => return Err(IoError::UnsupportedFormat(path.display().to_string())),
    };

    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IoError::Empty(path.display().to_string()));
    }
    log::debug!("{}: {} columns, {} rows", path.display(), table.headers.len(), table.rows.len());
    Ok(table)
}

pub fn load_prs(path: &Path, source: &SourceConfig<PrsColumns>) -> Result<Vec<PrsRecord>, IoError> {
    let table = read_table(path, source.sheet.as_deref())?;
    let records = prs_from_table(&table, &source.columns)?;
    log::info!("{}: {} PRS records", path.display(), records.len());
    Ok(records)
}

pub fn load_mdms(path: &Path, source: &SourceConfig<MdmsColumns>) -> Result<Vec<MdmsRecord>, IoError> {
    let table = read_table(path, source.sheet.as_deref())?;
    let records = mdms_from_table(&table, &source.columns)?;
    log::info!("{}: {} MDMS records", path.display(), records.len());
    Ok(records)
}

/// Export the report's tabular sheets.
///
/// CSV writes one file per sheet into the directory `dest`; xlsx writes a
/// single workbook at `dest/berth_reconciliation.xlsx`. Returns the written paths.
pub fn write_report(report: &ReconReport, dest: &Path, format: ExportFormat) -> Result<Vec<PathBuf>, IoError> {
    let sheets = report.sheets();
    match format {
        ExportFormat::Csv => csv::export_sheets(dest, &sheets),
        ExportFormat::Xlsx => {
            std::fs::create_dir_all(dest).map_err(|e| IoError::Write {
                path: dest.display().to_string(),
                message: e.to_string(),
            })?;
            let path = dest.join("berth_reconciliation.xlsx");
            xlsx::export_sheets(&path, &sheets)?;
            Ok(vec![path])
        }
    }
}
