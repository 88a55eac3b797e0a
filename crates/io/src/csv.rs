// CSV/TSV table import and report export

use std::io::Read;
use std::path::Path;

use berth_recon::report::Sheet;

use crate::error::IoError;
use crate::Table;

pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    parse_table(&content, delimiter).map_err(|message| IoError::Read {
        path: path.display().to_string(),
        message,
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Header line must split into >1 field for the delimiter to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(e) => {
            log::warn!("{}: not valid UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text: first record is the header row, fully blank records are dropped.
pub fn parse_table(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record.map_err(|e| e.to_string())?.iter().map(str::to_string).collect(),
        None => return Ok(Table::default()),
    };

    let mut rows = Vec::new();
    for (idx, result) in records.enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        // A record's position can sit before the empty lines the reader skipped,
        // so the line is recounted from the byte offset.
        // Header is line 1; fall back to counting records when there is no position.
        let line = record.position().map_or(idx + 2, |p| line_at(content, p.byte()));
        rows.push((line, record.iter().map(str::to_string).collect()));
    }

    Ok(Table { headers, rows })
}

/// 1-based line of the first non-line-break byte at or after offset `byte`.
fn line_at(content: &str, byte: u64) -> usize {
    let bytes = content.as_bytes();
    let mut end = usize::try_from(byte).map_or(bytes.len(), |b| b.min(bytes.len()));
    while end < bytes.len() && matches!(bytes[end], b'\r' | b'\n') {
        end += 1;
    }
    bytes[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Write each sheet to `<dir>/<sheet_name>.csv`. Returns the written paths.
pub fn export_sheets(dir: &Path, sheets: &[Sheet]) -> Result<Vec<std::path::PathBuf>, IoError> {
    std::fs::create_dir_all(dir).map_err(|e| IoError::Write {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut written = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let path = dir.join(format!("{}.csv", file_stem(&sheet.name)));
        let write_err = |message: String| IoError::Write {
            path: path.display().to_string(),
            message,
        };

        let mut writer = csv::WriterBuilder::new()
            .from_path(&path)
            .map_err(|e| write_err(e.to_string()))?;
        writer.write_record(&sheet.headers).map_err(|e| write_err(e.to_string()))?;
        for row in &sheet.rows {
            let record: Vec<String> = row.iter().map(|c| c.render()).collect();
            writer.write_record(&record).map_err(|e| write_err(e.to_string()))?;
        }
        writer.flush().map_err(|e| write_err(e.to_string()))?;

        log::debug!("wrote {} rows to {}", sheet.rows.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

/// "Missing In MDMS" -> "missing_in_mdms"
fn file_stem(sheet_name: &str) -> String {
    sheet_name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
