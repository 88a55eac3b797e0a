use std::collections::BTreeMap;

use crate::model::{
    Discrepancy, DiscrepancyKind, DuplicateOrigin, DuplicateReport, DuplicateSummary,
    SummaryStatistics,
};

/// Two-decimal rounding by scale, round, divide.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `count / total` as a two-decimal percentage; zero when `total` is zero.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10000.0).round() / 100.0
}

/// Share of the larger relation not affected by `flagged` records, in [0, 100].
fn clean_share(flagged: usize, source_count: usize, target_count: usize) -> f64 {
    let denominator = source_count.max(target_count);
    if denominator == 0 || flagged == 0 {
        return 100.0;
    }
    let clean = denominator.saturating_sub(flagged);
    round2(clean as f64 / denominator as f64 * 100.0)
}

/// Reduce classified discrepancies to counts, percentages and a quality score.
pub fn summarize(
    discrepancies: &[Discrepancy],
    source_count: usize,
    target_count: usize,
) -> SummaryStatistics {
    let mut per_kind_counts: BTreeMap<DiscrepancyKind, usize> =
        DiscrepancyKind::ALL.into_iter().map(|k| (k, 0)).collect();
    for d in discrepancies {
        *per_kind_counts.entry(d.kind).or_insert(0) += 1;
    }

    let total = discrepancies.len();
    let per_kind_percentages = per_kind_counts
        .iter()
        .map(|(&kind, &count)| (kind, percentage(count, total)))
        .collect();

    SummaryStatistics {
        total_discrepancies: total,
        per_kind_counts,
        per_kind_percentages,
        total_source_records: source_count,
        total_target_records: target_count,
        data_quality_score: clean_share(total, source_count, target_count),
    }
}

/// Group and record counts per origin plus an integrity score.
///
/// The score only charges within-relation duplicates: cross-source groups
/// overlap them and would count the same rows twice.
pub fn summarize_duplicates(
    report: &DuplicateReport,
    source_count: usize,
    target_count: usize,
) -> DuplicateSummary {
    let mut group_counts = BTreeMap::new();
    let mut record_counts = BTreeMap::new();
    for origin in DuplicateOrigin::ALL {
        let groups = report.groups(origin);
        group_counts.insert(origin, groups.len());
        record_counts.insert(origin, groups.iter().map(|g| g.count).sum::<usize>());
    }

    let duplicated = record_counts[&DuplicateOrigin::SourceOnly] + record_counts[&DuplicateOrigin::TargetOnly];

    DuplicateSummary {
        group_counts,
        record_counts,
        integrity_score: clean_share(duplicated, source_count, target_count),
    }
}
