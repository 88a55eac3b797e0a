// Table -> record mapping for the PRS and MDMS relations

use std::collections::HashMap;

use berth_recon::config::{MdmsColumns, PrsColumns};
use berth_recon::normalize::normalize;
use berth_recon::{BerthNumber, MdmsRecord, PrsRecord, ReconError};

use crate::error::IoError;
use crate::Table;

const PRS: &str = "PRS";
const MDMS: &str = "MDMS";

pub fn prs_from_table(table: &Table, columns: &PrsColumns) -> Result<Vec<PrsRecord>, IoError> {
    let header = HeaderIndex::new(PRS, &table.headers);
    let serial = header.required("serial_no", &columns.serial_no)?;
    let coach = header.required("coach_code", &columns.coach_code)?;
    let class = header.required("class_code", &columns.class_code)?;
    let berth = header.required("berth_number", &columns.berth_number)?;
    let berth_type = header.required("berth_type", &columns.berth_type)?;
    let composite = header.optional("composite_flag", &columns.composite_flag);

    table
        .rows
        .iter()
        .map(|(row, values)| -> Result<PrsRecord, IoError> {
            let cells = RowCells { table: PRS, row: *row, values };
            Ok(PrsRecord {
                serial_no: cells.serial(serial)?,
                coach_code: cells.text(Some(coach)),
                composite_flag: cells.flag(composite),
                class_code: cells.text(Some(class)),
                berth_number: cells.berth(berth),
                berth_type: cells.text(Some(berth_type)),
            })
        })
        .collect()
}

pub fn mdms_from_table(table: &Table, columns: &MdmsColumns) -> Result<Vec<MdmsRecord>, IoError> {
    let header = HeaderIndex::new(MDMS, &table.headers);
    let serial = header.required("serial_no", &columns.serial_no)?;
    let coach = header.required("coach_id", &columns.coach_id)?;
    let class = header.required("class_code", &columns.class_code)?;
    let berth = header.required("berth_number", &columns.berth_number)?;
    let qualifier = header.required("berth_qualifier", &columns.berth_qualifier)?;
    let layout = header.optional("layout_variant_no", &columns.layout_variant_no);
    let composite = header.optional("composite_flag", &columns.composite_flag);
    let class_first = header.optional("coach_class_first", &columns.coach_class_first);
    let class_second = header.optional("coach_class_second", &columns.coach_class_second);

    table
        .rows
        .iter()
        .map(|(row, values)| -> Result<MdmsRecord, IoError> {
            let cells = RowCells { table: MDMS, row: *row, values };
            Ok(MdmsRecord {
                serial_no: cells.serial(serial)?,
                layout_variant_no: cells.text(layout),
                composite_flag: cells.flag(composite),
                coach_class_first: cells.text(class_first),
                coach_class_second: cells.text(class_second),
                coach_id: cells.text(Some(coach)),
                class_code: cells.text(Some(class)),
                berth_number: cells.berth(berth),
                berth_qualifier: cells.text(Some(qualifier)),
            })
        })
        .collect()
}

/// Normalized header name -> column position. First occurrence wins.
struct HeaderIndex<'a> {
    table: &'a str,
    positions: HashMap<String, usize>,
}

impl<'a> HeaderIndex<'a> {
    fn new(table: &'a str, headers: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            positions.entry(normalize(header)).or_insert(idx);
        }
        Self { table, positions }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(&normalize(column)).copied()
    }

    fn required(&self, field: &str, column: &str) -> Result<usize, IoError> {
        self.position(column).ok_or_else(|| IoError::MissingColumn {
            table: self.table.to_string(),
            field: field.to_string(),
            column: column.to_string(),
        })
    }

    fn optional(&self, field: &str, column: &str) -> Option<usize> {
        let position = self.position(column);
        if position.is_none() {
            log::warn!("{}: no '{}' column, {} left empty", self.table, column, field);
        }
        position
    }
}

struct RowCells<'a> {
    table: &'a str,
    row: usize,
    values: &'a [String],
}

impl RowCells<'_> {
    /// Cell text, or `None` for a missing column, a short row or a blank cell.
    fn get(&self, column: Option<usize>) -> Option<&str> {
        column
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Non-blank cells keep their raw text; normalization happens at join time.
    fn text(&self, column: Option<usize>) -> Option<String> {
        self.get(column).map(str::to_string)
    }

    fn berth(&self, column: usize) -> Option<BerthNumber> {
        self.get(Some(column)).and_then(BerthNumber::parse_raw)
    }

    fn serial(&self, column: usize) -> Result<i64, IoError> {
        let raw = self.get(Some(column)).ok_or_else(|| ReconError::InputShape {
            side: self.table.to_string(),
            record: format!("row {}", self.row),
            field: "serial_no".into(),
        })?;
        raw.trim().parse().map_err(|_| IoError::Parse {
            table: self.table.to_string(),
            row: self.row,
            field: "serial_no".into(),
            value: raw.to_string(),
        })
    }

    fn flag(&self, column: Option<usize>) -> bool {
        let Some(raw) = self.get(column) else {
            return false;
        };
        match parse_flag(raw) {
            Some(flag) => flag,
            None => {
                log::warn!(
                    "{} row {}: composite flag '{}' not recognized, treating as false",
                    self.table,
                    self.row,
                    raw
                );
                false
            }
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match normalize(raw).as_str() {
        "TRUE" | "YES" | "Y" | "1" => Some(true),
        "FALSE" | "NO" | "N" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, r)| (i + 2, r.iter().map(|v| v.to_string()).collect()))
                .collect(),
        }
    }

    #[test]
    fn prs_headers_match_case_and_whitespace_insensitively() {
        let t = table(
            &[" SERIALNO", "coachcode", "ClassCode ", "berthNumber", "BERTHTYPE", "compositeFlag"],
            &[&["1", " B1 ", "3A", "4", "LB", "yes"], &["2", "", "3A", "12A", "UB", ""]],
        );
        let records = prs_from_table(&t, &PrsColumns::default()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].serial_no, 1);
        assert_eq!(records[0].coach_code.as_deref(), Some(" B1 "));
        assert!(records[0].composite_flag);
        assert_eq!(records[0].berth_number, Some(BerthNumber::Number(4)));

        assert_eq!(records[1].coach_code, None);
        assert!(!records[1].composite_flag);
        assert_eq!(records[1].berth_number, Some(BerthNumber::Text("12A".into())));
    }

    #[test]
    fn missing_required_column() {
        let t = table(&["serialNo", "coachCode", "classCode", "berthNumber"], &[]);
        match prs_from_table(&t, &PrsColumns::default()) {
            Err(IoError::MissingColumn { table, field, column }) => {
                assert_eq!(table, "PRS");
                assert_eq!(field, "berth_type");
                assert_eq!(column, "berthType");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn bad_serial_reports_row() {
        let t = table(
            &["serialNo", "coachCode", "classCode", "berthNumber", "berthType"],
            &[&["1", "B1", "SL", "1", "LB"], &["x7", "B1", "SL", "2", "MB"]],
        );
        match prs_from_table(&t, &PrsColumns::default()) {
            Err(IoError::Parse { row, value, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "x7");
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn blank_serial_is_a_shape_error() {
        let t = table(
            &["serialNo", "coachCode", "classCode", "berthNumber", "berthType"],
            &[&[" ", "B1", "SL", "1", "LB"]],
        );
        let err = prs_from_table(&t, &PrsColumns::default()).unwrap_err();
        assert!(matches!(err, IoError::Record(ReconError::InputShape { .. })));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn mdms_optional_columns_and_short_rows() {
        let columns = MdmsColumns {
            coach_id: "Coach".into(),
            berth_qualifier: "Qualifier".into(),
            ..MdmsColumns::default()
        };
        let t = table(
            &["serialNo", "coach", "classCode", "berthNumber", "qualifier", "coachClassSecond"],
            &[&["101", "b1", "3A", "1", "LB", "2A"], &["102", "B1", "3A", "2"]],
        );
        let records = mdms_from_table(&t, &columns).unwrap();
        assert_eq!(records[0].coach_id.as_deref(), Some("b1"));
        assert_eq!(records[0].coach_class_second.as_deref(), Some("2A"));
        assert_eq!(records[0].layout_variant_no, None);
        assert!(!records[0].composite_flag);
        // Row shorter than the header: trailing fields are absent
        assert_eq!(records[1].berth_qualifier, None);
        assert_eq!(records[1].coach_class_second, None);
    }

    #[test]
    fn flag_values() {
        for raw in ["true", "Yes", "y", "1", " TRUE "] {
            assert_eq!(parse_flag(raw), Some(true), "{raw}");
        }
        for raw in ["false", "no", "N", "0"] {
            assert_eq!(parse_flag(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_flag("maybe"), None);
    }
}
