use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::normalize::normalize;

/// Placeholder for fields of the side a record is missing from.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Berth number as it arrived from the source spreadsheet.
///
/// Numeric-looking text joins as its integer value; anything else is kept
/// verbatim for reporting and never joins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BerthNumber {
    Number(i64),
    Text(String),
}

impl BerthNumber {
    /// Classify raw cell text. Empty text is not a berth number at all.
    pub fn parse_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(raw.to_string()),
        })
    }

    /// Integer value used by the join predicate.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for BerthNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A PRS (source) berth row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrsRecord {
    pub serial_no: i64,
    pub coach_code: Option<String>,
    #[serde(default)]
    pub composite_flag: bool,
    pub class_code: Option<String>,
    pub berth_number: Option<BerthNumber>,
    pub berth_type: Option<String>,
}

/// An MDMS (target) coach-layout row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MdmsRecord {
    pub serial_no: i64,
    pub layout_variant_no: Option<String>,
    #[serde(default)]
    pub composite_flag: bool,
    pub coach_class_first: Option<String>,
    pub coach_class_second: Option<String>,
    /// Cross-references `PrsRecord::coach_code`.
    pub coach_id: Option<String>,
    pub class_code: Option<String>,
    pub berth_number: Option<BerthNumber>,
    pub berth_qualifier: Option<String>,
}

/// Which relation a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordSide {
    Prs,
    Mdms,
}

impl fmt::Display for RecordSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prs => write!(f, "PRS"),
            Self::Mdms => write!(f, "MDMS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Join key
// ---------------------------------------------------------------------------

/// Normalized (coach, class, berth) triple. Two records describe the same
/// logical berth iff their join keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinKey {
    pub coach_id: String,
    pub class_code: String,
    pub berth_number: i64,
}

impl JoinKey {
    /// Build a key from raw parts. Any absent, blank or non-numeric
    /// component yields `None` and the row joins nothing.
    pub fn from_parts(
        coach: Option<&str>,
        class_code: Option<&str>,
        berth: Option<&BerthNumber>,
    ) -> Option<Self> {
        let coach_id = normalize(coach?);
        let class_code = normalize(class_code?);
        if coach_id.is_empty() || class_code.is_empty() {
            return None;
        }
        Some(Self {
            coach_id,
            class_code,
            berth_number: berth?.as_number()?,
        })
    }

    pub fn of_prs(record: &PrsRecord) -> Option<Self> {
        Self::from_parts(
            record.coach_code.as_deref(),
            record.class_code.as_deref(),
            record.berth_number.as_ref(),
        )
    }

    pub fn of_mdms(record: &MdmsRecord) -> Option<Self> {
        Self::from_parts(
            record.coach_id.as_deref(),
            record.class_code.as_deref(),
            record.berth_number.as_ref(),
        )
    }

    pub fn label(&self) -> String {
        format!("{}|{}|{}", self.coach_id, self.class_code, self.berth_number)
    }
}

/// Report ordering: (coach, berth, serial) ascending, absent values first.
pub(crate) type ReportOrder = (Option<String>, Option<i64>, i64);

impl PrsRecord {
    pub(crate) fn report_order(&self) -> ReportOrder {
        (
            self.coach_code.as_deref().map(normalize),
            self.berth_number.as_ref().and_then(BerthNumber::as_number),
            self.serial_no,
        )
    }
}

impl MdmsRecord {
    pub(crate) fn report_order(&self) -> ReportOrder {
        (
            self.coach_id.as_deref().map(normalize),
            self.berth_number.as_ref().and_then(BerthNumber::as_number),
            self.serial_no,
        )
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// A source row whose join key found a target row with a different berth type.
#[derive(Debug, Clone, PartialEq)]
pub struct MismatchedPair {
    pub source: PrsRecord,
    pub target: MdmsRecord,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchOutput {
    pub type_mismatch: Vec<MismatchedPair>,
    pub missing_in_target: Vec<PrsRecord>,
    pub missing_in_source: Vec<MdmsRecord>,
    /// Source rows that joined and agreed on berth type.
    pub matched: usize,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyKind {
    TypeMismatch,
    MissingInTarget,
    MissingInSource,
}

impl DiscrepancyKind {
    pub const ALL: [Self; 3] = [Self::TypeMismatch, Self::MissingInTarget, Self::MissingInSource];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::MissingInTarget => "MISSING_IN_TARGET",
            Self::MissingInSource => "MISSING_IN_SOURCE",
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscrepancyKind {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s).replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ReconError::InvalidFilter {
                field: "kind",
                value: s.to_string(),
                expected: Self::ALL.map(|k| k.as_str()).join(", "),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub coach_id: String,
    pub class_code: String,
    pub berth_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_serial_no: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_serial_no: Option<i64>,
    pub source_value: String,
    pub target_value: String,
    pub details: String,
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicateOrigin {
    SourceOnly,
    TargetOnly,
    CrossSource,
}

impl DuplicateOrigin {
    pub const ALL: [Self; 3] = [Self::SourceOnly, Self::TargetOnly, Self::CrossSource];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceOnly => "SOURCE_ONLY",
            Self::TargetOnly => "TARGET_ONLY",
            Self::CrossSource => "CROSS_SOURCE",
        }
    }
}

impl fmt::Display for DuplicateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicateOrigin {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s).replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == wanted)
            .ok_or_else(|| ReconError::InvalidFilter {
                field: "origin",
                value: s.to_string(),
                expected: Self::ALL.map(|o| o.as_str()).join(", "),
            })
    }
}

/// One row participating in a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub serial_no: i64,
    pub side: RecordSide,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub origin: DuplicateOrigin,
    /// Rendered grouping key, one entry per key field.
    pub key: Vec<String>,
    /// Ordered by serial number ascending.
    pub members: Vec<GroupMember>,
    pub source_count: usize,
    pub target_count: usize,
    pub count: usize,
}

impl DuplicateGroup {
    pub fn key_label(&self) -> String {
        self.key.join("|")
    }

    pub fn serials(&self, side: RecordSide) -> Vec<i64> {
        self.members
            .iter()
            .filter(|m| m.side == side)
            .map(|m| m.serial_no)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub within_source: Vec<DuplicateGroup>,
    pub within_target: Vec<DuplicateGroup>,
    pub cross_source: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    pub fn groups(&self, origin: DuplicateOrigin) -> &[DuplicateGroup] {
        match origin {
            DuplicateOrigin::SourceOnly => &self.within_source,
            DuplicateOrigin::TargetOnly => &self.within_target,
            DuplicateOrigin::CrossSource => &self.cross_source,
        }
    }

    pub fn total_groups(&self) -> usize {
        self.within_source.len() + self.within_target.len() + self.cross_source.len()
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    pub total_discrepancies: usize,
    pub per_kind_counts: BTreeMap<DiscrepancyKind, usize>,
    pub per_kind_percentages: BTreeMap<DiscrepancyKind, f64>,
    pub total_source_records: usize,
    pub total_target_records: usize,
    pub data_quality_score: f64,
}

impl SummaryStatistics {
    pub fn count(&self, kind: DiscrepancyKind) -> usize {
        self.per_kind_counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn percentage(&self, kind: DiscrepancyKind) -> f64 {
        self.per_kind_percentages.get(&kind).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSummary {
    pub group_counts: BTreeMap<DuplicateOrigin, usize>,
    pub record_counts: BTreeMap<DuplicateOrigin, usize>,
    pub integrity_score: f64,
}
