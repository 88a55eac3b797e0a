//! Post-hoc narrowing of already-computed results.

use crate::error::ReconError;
use crate::model::{Discrepancy, DiscrepancyKind, DuplicateGroup, DuplicateOrigin, DuplicateReport};
use crate::normalize::{eq_normalized, normalize};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscrepancyFilter {
    pub kind: Option<DiscrepancyKind>,
    /// Matched case- and whitespace-insensitively.
    pub coach_id: Option<String>,
}

impl DiscrepancyFilter {
    /// Validate raw filter parameters. Blank values mean "no filter".
    pub fn parse(kind: Option<&str>, coach_id: Option<&str>) -> Result<Self, ReconError> {
        let kind = match kind.map(str::trim).filter(|k| !k.is_empty()) {
            Some(k) => Some(k.parse::<DiscrepancyKind>()?),
            None => None,
        };
        let coach_id = coach_id.map(normalize).filter(|c| !c.is_empty());
        Ok(Self { kind, coach_id })
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.coach_id.is_none()
    }

    pub fn matches(&self, d: &Discrepancy) -> bool {
        self.kind.map_or(true, |k| d.kind == k)
            && self.coach_id.as_deref().map_or(true, |c| eq_normalized(&d.coach_id, c))
    }

    pub fn apply(&self, discrepancies: &[Discrepancy]) -> Vec<Discrepancy> {
        discrepancies.iter().filter(|d| self.matches(d)).cloned().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateFilter {
    pub origin: Option<DuplicateOrigin>,
}

impl DuplicateFilter {
    pub fn parse(origin: Option<&str>) -> Result<Self, ReconError> {
        let origin = match origin.map(str::trim).filter(|o| !o.is_empty()) {
            Some(o) => Some(o.parse::<DuplicateOrigin>()?),
            None => None,
        };
        Ok(Self { origin })
    }

    pub fn matches(&self, group: &DuplicateGroup) -> bool {
        self.origin.map_or(true, |o| group.origin == o)
    }

    /// Keep the report shape; groups of other origins are dropped.
    pub fn apply(&self, report: &DuplicateReport) -> DuplicateReport {
        let keep = |groups: &[DuplicateGroup]| -> Vec<DuplicateGroup> {
            groups.iter().filter(|g| self.matches(g)).cloned().collect()
        };
        DuplicateReport {
            within_source: keep(&report.within_source),
            within_target: keep(&report.within_target),
            cross_source: keep(&report.cross_source),
        }
    }
}
