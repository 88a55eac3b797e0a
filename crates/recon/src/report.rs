//! Shapes engine output for serializers and tabular writers.
//!
//! Nothing here computes; every value comes from the matcher, classifier,
//! grouper or aggregator.

use serde::Serialize;

use crate::model::{
    Discrepancy, DiscrepancyKind, DuplicateGroup, DuplicateOrigin, DuplicateReport, DuplicateSummary,
    RecordSide, SummaryStatistics,
};

// ---------------------------------------------------------------------------
// Structured document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub name: String,
    pub engine_version: String,
    pub generated_at: String,
    #[serde(skip_serializing_if = "AppliedFilters::is_empty")]
    pub filters: AppliedFilters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiscrepancyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<DuplicateOrigin>,
}

impl AppliedFilters {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.coach_id.is_none() && self.origin.is_none()
    }
}

/// Discrepancies keyed by kind, in matcher order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscrepancySections {
    pub type_mismatch: Vec<Discrepancy>,
    pub missing_in_target: Vec<Discrepancy>,
    pub missing_in_source: Vec<Discrepancy>,
}

impl DiscrepancySections {
    pub fn from_list(discrepancies: &[Discrepancy]) -> Self {
        let mut sections = Self::default();
        for d in discrepancies {
            sections.section_mut(d.kind).push(d.clone());
        }
        sections
    }

    pub fn section(&self, kind: DiscrepancyKind) -> &[Discrepancy] {
        match kind {
            DiscrepancyKind::TypeMismatch => &self.type_mismatch,
            DiscrepancyKind::MissingInTarget => &self.missing_in_target,
            DiscrepancyKind::MissingInSource => &self.missing_in_source,
        }
    }

    fn section_mut(&mut self, kind: DiscrepancyKind) -> &mut Vec<Discrepancy> {
        match kind {
            DiscrepancyKind::TypeMismatch => &mut self.type_mismatch,
            DiscrepancyKind::MissingInTarget => &mut self.missing_in_target,
            DiscrepancyKind::MissingInSource => &mut self.missing_in_source,
        }
    }

    pub fn len(&self) -> usize {
        self.type_mismatch.len() + self.missing_in_target.len() + self.missing_in_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconReport {
    pub meta: ReportMeta,
    pub summary: SummaryStatistics,
    pub discrepancies: DiscrepancySections,
    pub duplicates: DuplicateReport,
    pub duplicate_summary: DuplicateSummary,
}

/// Assemble the report document. `discrepancies` and `duplicates` are taken
/// as given (already filtered, if the caller filters).
pub fn assemble(
    meta: ReportMeta,
    summary: SummaryStatistics,
    discrepancies: &[Discrepancy],
    duplicates: DuplicateReport,
    duplicate_summary: DuplicateSummary,
) -> ReconReport {
    ReconReport {
        meta,
        summary,
        discrepancies: DiscrepancySections::from_list(discrepancies),
        duplicates,
        duplicate_summary,
    }
}

impl ReconReport {
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// True when nothing needs attention: no discrepancies and no duplicate groups.
    pub fn is_clean(&self) -> bool {
        self.summary.total_discrepancies == 0 && self.duplicates.total_groups() == 0
    }

    /// Tabular rendition, one sheet per section.
    pub fn sheets(&self) -> Vec<Sheet> {
        let mut sheets = vec![summary_sheet(&self.summary, &self.duplicate_summary)];
        for (kind, name) in [
            (DiscrepancyKind::TypeMismatch, "Type Mismatch"),
            (DiscrepancyKind::MissingInTarget, "Missing In MDMS"),
            (DiscrepancyKind::MissingInSource, "Missing In PRS"),
        ] {
            sheets.push(discrepancy_sheet(name, self.discrepancies.section(kind)));
        }
        for (origin, name) in [
            (DuplicateOrigin::SourceOnly, "PRS Duplicates"),
            (DuplicateOrigin::TargetOnly, "MDMS Duplicates"),
            (DuplicateOrigin::CrossSource, "Cross Duplicates"),
        ] {
            sheets.push(duplicate_sheet(name, self.duplicates.groups(origin)));
        }
        sheets
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// `{success, data, message}` wrapper for JSON consumers.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self { success: true, data: Some(data), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: message.into() }
    }
}

// ---------------------------------------------------------------------------
// Tabular
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Plain-text rendition for writers without typed cells (CSV).
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => format!("{f:.2}"),
            Self::Empty => String::new(),
        }
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Empty, Self::Int)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

fn summary_sheet(summary: &SummaryStatistics, dups: &DuplicateSummary) -> Sheet {
    let mut sheet = Sheet::new("Summary", &["Metric", "Value"]);
    let mut push = |metric: String, value: Cell| sheet.rows.push(vec![Cell::Text(metric), value]);

    push("PRS records".into(), Cell::Int(summary.total_source_records as i64));
    push("MDMS records".into(), Cell::Int(summary.total_target_records as i64));
    push("Total discrepancies".into(), Cell::Int(summary.total_discrepancies as i64));
    for kind in DiscrepancyKind::ALL {
        push(format!("{kind} count"), Cell::Int(summary.count(kind) as i64));
        push(format!("{kind} %"), Cell::Float(summary.percentage(kind)));
    }
    push("Data quality score".into(), Cell::Float(summary.data_quality_score));
    for origin in DuplicateOrigin::ALL {
        let groups = dups.group_counts.get(&origin).copied().unwrap_or(0);
        let records = dups.record_counts.get(&origin).copied().unwrap_or(0);
        push(format!("{origin} duplicate groups"), Cell::Int(groups as i64));
        push(format!("{origin} duplicate records"), Cell::Int(records as i64));
    }
    push("Integrity score".into(), Cell::Float(dups.integrity_score));

    sheet
}

fn discrepancy_sheet(name: &str, rows: &[Discrepancy]) -> Sheet {
    let mut sheet = Sheet::new(
        name,
        &[
            "Coach ID",
            "Class",
            "Berth Number",
            "PRS Serial No",
            "MDMS Serial No",
            "PRS Value",
            "MDMS Value",
            "Details",
        ],
    );
    for d in rows {
        sheet.rows.push(vec![
            Cell::text(&d.coach_id),
            Cell::text(&d.class_code),
            Cell::text(&d.berth_number),
            Cell::from(d.source_serial_no),
            Cell::from(d.target_serial_no),
            Cell::text(&d.source_value),
            Cell::text(&d.target_value),
            Cell::text(&d.details),
        ]);
    }
    sheet
}

fn duplicate_sheet(name: &str, groups: &[DuplicateGroup]) -> Sheet {
    let mut sheet = Sheet::new(
        name,
        &["Group Key", "Count", "PRS Count", "MDMS Count", "PRS Serial Nos", "MDMS Serial Nos"],
    );
    let join = |serials: Vec<i64>| serials.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
    for g in groups {
        sheet.rows.push(vec![
            Cell::Text(g.key_label()),
            Cell::Int(g.count as i64),
            Cell::Int(g.source_count as i64),
            Cell::Int(g.target_count as i64),
            Cell::Text(join(g.serials(RecordSide::Prs))),
            Cell::Text(join(g.serials(RecordSide::Mdms))),
        ]);
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{summarize, summarize_duplicates};

    fn discrepancy(kind: DiscrepancyKind) -> Discrepancy {
        Discrepancy {
            kind,
            coach_id: "B1".into(),
            class_code: "SL".into(),
            berth_number: "1".into(),
            source_serial_no: Some(1),
            target_serial_no: None,
            source_value: "LB".into(),
            target_value: "N/A".into(),
            details: "PRS value 'LB' has no matching MDMS record".into(),
        }
    }

    fn report(discrepancies: &[Discrepancy]) -> ReconReport {
        let dups = DuplicateReport::default();
        assemble(
            ReportMeta {
                name: "test".into(),
                engine_version: "0.0.0".into(),
                generated_at: "2026-01-01T00:00:00+00:00".into(),
                filters: AppliedFilters::default(),
            },
            summarize(discrepancies, 4, 4),
            discrepancies,
            dups.clone(),
            summarize_duplicates(&dups, 4, 4),
        )
    }

    #[test]
    fn sections_split_by_kind() {
        let r = report(&[
            discrepancy(DiscrepancyKind::MissingInTarget),
            discrepancy(DiscrepancyKind::TypeMismatch),
        ]);
        assert_eq!(r.discrepancies.type_mismatch.len(), 1);
        assert_eq!(r.discrepancies.missing_in_target.len(), 1);
        assert!(r.discrepancies.missing_in_source.is_empty());
        assert!(!r.is_clean());
    }

    #[test]
    fn json_uses_contract_field_names() {
        let r = report(&[discrepancy(DiscrepancyKind::MissingInTarget)]);
        let v = r.to_value().unwrap();
        let first = &v["discrepancies"]["missingInTarget"][0];
        assert_eq!(first["kind"], "MISSING_IN_TARGET");
        assert_eq!(first["coachId"], "B1");
        assert_eq!(first["sourceSerialNo"], 1);
        assert!(first.get("targetSerialNo").is_none());
        assert_eq!(v["summary"]["perKindCounts"]["MISSING_IN_TARGET"], 1);
        assert_eq!(v["summary"]["dataQualityScore"], 75.0);
        assert!(v["meta"].get("filters").is_none());
    }

    #[test]
    fn sheets_cover_every_section() {
        let r = report(&[discrepancy(DiscrepancyKind::MissingInTarget)]);
        let sheets = r.sheets();
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Summary",
                "Type Mismatch",
                "Missing In MDMS",
                "Missing In PRS",
                "PRS Duplicates",
                "MDMS Duplicates",
                "Cross Duplicates",
            ]
        );
        assert_eq!(sheets[2].rows.len(), 1);
        assert_eq!(sheets[2].rows[0][4], Cell::Empty);
    }

    #[test]
    fn envelope_shape() {
        let v = serde_json::to_value(Envelope::ok(3, "done")).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"], 3);
        let v = serde_json::to_value(Envelope::<()>::error("boom")).unwrap();
        assert_eq!(v["success"], false);
        assert!(v.get("data").is_none());
    }
}
