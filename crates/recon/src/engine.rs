use crate::aggregate::{summarize, summarize_duplicates};
use crate::classify::classify;
use crate::config::ReconConfig;
use crate::duplicates::find_duplicates;
use crate::error::ReconError;
use crate::filter::{DiscrepancyFilter, DuplicateFilter};
use crate::matcher::match_records;
use crate::model::{Discrepancy, DuplicateReport, MdmsRecord, PrsRecord};
use crate::report::{assemble, AppliedFilters, ReconReport, ReportMeta};

/// Fully materialized snapshot of both relations.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub prs: Vec<PrsRecord>,
    pub mdms: Vec<MdmsRecord>,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub name: String,
    pub discrepancy_filter: DiscrepancyFilter,
    pub duplicate_filter: DuplicateFilter,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            name: "berth reconciliation".into(),
            discrepancy_filter: DiscrepancyFilter::default(),
            duplicate_filter: DuplicateFilter::default(),
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &ReconConfig) -> Result<Self, ReconError> {
        Ok(Self {
            name: config.name.clone(),
            discrepancy_filter: config.filter.discrepancy_filter()?,
            duplicate_filter: config.filter.duplicate_filter()?,
        })
    }
}

/// Match + classify, then narrow with `filter`.
pub fn discrepancies(input: &ReconInput, filter: &DiscrepancyFilter) -> Vec<Discrepancy> {
    let all = classify(&match_records(&input.prs, &input.mdms));
    if filter.is_empty() {
        all
    } else {
        filter.apply(&all)
    }
}

/// Duplicate groups of every origin, narrowed with `filter`.
pub fn duplicates(input: &ReconInput, filter: &DuplicateFilter) -> DuplicateReport {
    filter.apply(&find_duplicates(&input.prs, &input.mdms))
}

/// Run both reconciliation paths and assemble the report.
///
/// Summary statistics always describe the whole snapshot; filters only
/// narrow the listed discrepancies and duplicate groups.
pub fn run(input: &ReconInput, options: &RunOptions) -> ReconReport {
    let source_count = input.prs.len();
    let target_count = input.mdms.len();

    let all = classify(&match_records(&input.prs, &input.mdms));
    let summary = summarize(&all, source_count, target_count);

    let all_dups = find_duplicates(&input.prs, &input.mdms);
    let duplicate_summary = summarize_duplicates(&all_dups, source_count, target_count);

    log::info!(
        "{}: {} PRS / {} MDMS rows, {} discrepancies, {} duplicate groups, quality {:.2}, integrity {:.2}",
        options.name,
        source_count,
        target_count,
        summary.total_discrepancies,
        all_dups.total_groups(),
        summary.data_quality_score,
        duplicate_summary.integrity_score,
    );

    let listed = options.discrepancy_filter.apply(&all);
    let listed_dups = options.duplicate_filter.apply(&all_dups);

    let meta = ReportMeta {
        name: options.name.clone(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        filters: AppliedFilters {
            kind: options.discrepancy_filter.kind,
            coach_id: options.discrepancy_filter.coach_id.clone(),
            origin: options.duplicate_filter.origin,
        },
    };

    assemble(meta, summary, &listed, listed_dups, duplicate_summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BerthNumber, DiscrepancyKind, DuplicateOrigin};

    fn prs(serial: i64, coach: &str, berth: i64, ty: &str) -> PrsRecord {
        PrsRecord {
            serial_no: serial,
            coach_code: Some(coach.into()),
            composite_flag: false,
            class_code: Some("SL".into()),
            berth_number: Some(BerthNumber::Number(berth)),
            berth_type: Some(ty.into()),
        }
    }

    fn mdms(serial: i64, coach: &str, berth: i64, qual: &str) -> MdmsRecord {
        MdmsRecord {
            serial_no: serial,
            layout_variant_no: Some("LV1".into()),
            composite_flag: false,
            coach_class_first: Some("SL".into()),
            coach_class_second: None,
            coach_id: Some(coach.into()),
            class_code: Some("SL".into()),
            berth_number: Some(BerthNumber::Number(berth)),
            berth_qualifier: Some(qual.into()),
        }
    }

    fn input() -> ReconInput {
        ReconInput {
            prs: vec![
                prs(1, "B1", 1, "LB"),
                prs(2, "B1", 2, "MB"),
                prs(3, "B2", 1, "LB"),
                prs(4, "B2", 1, "LB"),
            ],
            mdms: vec![mdms(10, "B1", 1, "LB"), mdms(11, "B1", 2, "UB"), mdms(12, "A1", 7, "SU")],
        }
    }

    #[test]
    fn run_summarizes_whole_snapshot() {
        let report = run(&input(), &RunOptions::default());
        assert_eq!(report.summary.total_source_records, 4);
        assert_eq!(report.summary.total_target_records, 3);
        assert_eq!(report.summary.count(DiscrepancyKind::TypeMismatch), 1);
        assert_eq!(report.summary.count(DiscrepancyKind::MissingInTarget), 2);
        assert_eq!(report.summary.count(DiscrepancyKind::MissingInSource), 1);
        // (4 - 4) / 4
        assert_eq!(report.summary.data_quality_score, 0.0);
        assert_eq!(report.duplicates.within_source.len(), 1);
        assert!(report.duplicates.cross_source.is_empty());
        assert!(!report.is_clean());
    }

    #[test]
    fn filters_narrow_lists_not_summary() {
        let options = RunOptions {
            discrepancy_filter: DiscrepancyFilter::parse(Some("MISSING_IN_TARGET"), Some("b2")).unwrap(),
            duplicate_filter: DuplicateFilter::parse(Some("TARGET_ONLY")).unwrap(),
            ..RunOptions::default()
        };
        let report = run(&input(), &options);
        assert_eq!(report.discrepancies.len(), 2);
        assert!(report.discrepancies.type_mismatch.is_empty());
        assert_eq!(report.summary.total_discrepancies, 4);
        assert!(report.duplicates.within_source.is_empty());
        assert_eq!(report.duplicate_summary.group_counts[&DuplicateOrigin::SourceOnly], 1);
        assert_eq!(report.meta.filters.kind, Some(DiscrepancyKind::MissingInTarget));
    }

    #[test]
    fn filter_values_are_checked_before_run() {
        let bad = "[prs]\nfile = \"p.csv\"\n[mdms]\nfile = \"m.csv\"\n[filter]\nkind = \"MISMATCH\"\n";
        assert!(matches!(ReconConfig::from_toml(bad), Err(ReconError::InvalidFilter { .. })));

        let good = bad.replace("MISMATCH", "type-mismatch");
        let options = RunOptions::from_config(&ReconConfig::from_toml(&good).unwrap()).unwrap();
        let report = run(&input(), &options);
        assert_eq!(report.meta.filters.kind, Some(DiscrepancyKind::TypeMismatch));
        assert_eq!(report.discrepancies.len(), 1);
    }

    #[test]
    fn standalone_entry_points() {
        let f = DiscrepancyFilter::parse(Some("TYPE_MISMATCH"), None).unwrap();
        let d = discrepancies(&input(), &f);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].source_value, "MB");

        let dups = duplicates(&input(), &DuplicateFilter::default());
        assert_eq!(dups.within_source[0].count, 2);
    }
}
