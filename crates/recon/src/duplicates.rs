use std::collections::BTreeMap;

use crate::model::{
    BerthNumber, DuplicateGroup, DuplicateOrigin, DuplicateReport, GroupMember, JoinKey, MdmsRecord,
    PrsRecord, RecordSide, NOT_AVAILABLE,
};

/// Raw, un-normalized grouping key. Absent values only equal other absent values.
/// The berth stays typed so equal-sized groups order numerically.
type RawKey = (Option<String>, Option<String>, Option<BerthNumber>, Option<String>);

/// Find duplicate groups within each relation and across both.
///
/// Within a relation rows are grouped on raw field values. The cross-source
/// pass groups on the normalized join key and only reports keys present on
/// both sides where at least one side holds more than one row.
pub fn find_duplicates(source: &[PrsRecord], target: &[MdmsRecord]) -> DuplicateReport {
    let report = DuplicateReport {
        within_source: within_source(source),
        within_target: within_target(target),
        cross_source: cross_source(source, target),
    };

    log::debug!(
        "duplicate groups: {} within PRS, {} within MDMS, {} cross-source",
        report.within_source.len(),
        report.within_target.len(),
        report.cross_source.len(),
    );

    report
}

/// PRS rows sharing (coach_code, class_code, berth_number, berth_type).
pub fn within_source(rows: &[PrsRecord]) -> Vec<DuplicateGroup> {
    let mut buckets: BTreeMap<RawKey, Vec<i64>> = BTreeMap::new();
    for row in rows {
        let key = (
            row.coach_code.clone(),
            row.class_code.clone(),
            row.berth_number.clone(),
            row.berth_type.clone(),
        );
        buckets.entry(key).or_default().push(row.serial_no);
    }
    single_side_groups(buckets, RecordSide::Prs, DuplicateOrigin::SourceOnly)
}

/// MDMS rows sharing (coach_id, layout_variant_no, berth_number, berth_qualifier).
pub fn within_target(rows: &[MdmsRecord]) -> Vec<DuplicateGroup> {
    let mut buckets: BTreeMap<RawKey, Vec<i64>> = BTreeMap::new();
    for row in rows {
        let key = (
            row.coach_id.clone(),
            row.layout_variant_no.clone(),
            row.berth_number.clone(),
            row.berth_qualifier.clone(),
        );
        buckets.entry(key).or_default().push(row.serial_no);
    }
    single_side_groups(buckets, RecordSide::Mdms, DuplicateOrigin::TargetOnly)
}

/// Join keys present in both relations where either side is internally duplicated.
pub fn cross_source(source: &[PrsRecord], target: &[MdmsRecord]) -> Vec<DuplicateGroup> {
    let mut buckets: BTreeMap<JoinKey, (Vec<i64>, Vec<i64>)> = BTreeMap::new();
    for row in source {
        if let Some(key) = JoinKey::of_prs(row) {
            buckets.entry(key).or_default().0.push(row.serial_no);
        }
    }
    for row in target {
        if let Some(key) = JoinKey::of_mdms(row) {
            buckets.entry(key).or_default().1.push(row.serial_no);
        }
    }

    let groups: Vec<(JoinKey, DuplicateGroup)> = buckets
        .into_iter()
        .filter(|(_, (s, t))| !s.is_empty() && !t.is_empty() && (s.len() > 1 || t.len() > 1))
        .map(|(key, (s, t))| {
            let rendered = vec![key.coach_id.clone(), key.class_code.clone(), key.berth_number.to_string()];
            let group = build_group(DuplicateOrigin::CrossSource, rendered, &s, &t);
            (key, group)
        })
        .collect();

    order_groups(groups)
}

fn single_side_groups(
    buckets: BTreeMap<RawKey, Vec<i64>>,
    side: RecordSide,
    origin: DuplicateOrigin,
) -> Vec<DuplicateGroup> {
    let groups: Vec<(RawKey, DuplicateGroup)> = buckets
        .into_iter()
        .filter(|(_, serials)| serials.len() > 1)
        .map(|(key, serials)| {
            let rendered = render_raw_key(&key);
            let group = match side {
                RecordSide::Prs => build_group(origin, rendered, &serials, &[]),
                RecordSide::Mdms => build_group(origin, rendered, &[], &serials),
            };
            (key, group)
        })
        .collect();

    order_groups(groups)
}

fn render_raw_key((first, second, berth, kind): &RawKey) -> Vec<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    vec![
        text(first),
        text(second),
        berth.as_ref().map_or_else(|| NOT_AVAILABLE.to_string(), BerthNumber::to_string),
        text(kind),
    ]
}

fn build_group(
    origin: DuplicateOrigin,
    key: Vec<String>,
    source_serials: &[i64],
    target_serials: &[i64],
) -> DuplicateGroup {
    let mut members: Vec<GroupMember> = source_serials
        .iter()
        .map(|&serial_no| GroupMember { serial_no, side: RecordSide::Prs })
        .chain(
            target_serials
                .iter()
                .map(|&serial_no| GroupMember { serial_no, side: RecordSide::Mdms }),
        )
        .collect();
    members.sort();

    DuplicateGroup {
        origin,
        key,
        count: members.len(),
        members,
        source_count: source_serials.len(),
        target_count: target_serials.len(),
    }
}

/// Largest groups first; equal sizes fall back to the grouping key.
fn order_groups<K: Ord>(mut groups: Vec<(K, DuplicateGroup)>) -> Vec<DuplicateGroup> {
    groups.sort_by(|(ka, a), (kb, b)| b.count.cmp(&a.count).then_with(|| ka.cmp(kb)));
    groups.into_iter().map(|(_, g)| g).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BerthNumber;

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
            coach_class_first: None,
            coach_class_second: None,
            coach_id: Some(coach.into()),
            class_code: Some("SL".into()),
            berth_number: Some(BerthNumber::Number(berth)),
            berth_qualifier: Some(qual.into()),
        }
    }

    #[test]
    fn three_identical_source_rows_form_one_group() {
        let rows = vec![prs(9, "B1", 1, "LB"), prs(3, "B1", 1, "LB"), prs(5, "B1", 1, "LB")];
        let groups = within_source(&rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].origin, DuplicateOrigin::SourceOnly);
        assert_eq!(groups[0].serials(RecordSide::Prs), vec![3, 5, 9]);
        assert_eq!(groups[0].key, vec!["B1", "SL", "1", "LB"]);
    }

    #[test]
    fn within_source_uses_raw_values() {
        // Differ only by case: not duplicates under raw grouping.
        let rows = vec![prs(1, "B1", 1, "LB"), prs(2, "b1", 1, "LB")];
        assert!(within_source(&rows).is_empty());
    }

    #[test]
    fn within_target_groups_on_layout_variant() {
        let mut other_variant = mdms(3, "B1", 1, "LB");
        other_variant.layout_variant_no = Some("LV2".into());
        let rows = vec![mdms(1, "B1", 1, "LB"), mdms(2, "B1", 1, "LB"), other_variant];
        let groups = within_target(&rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].serials(RecordSide::Mdms), vec![1, 2]);
        assert_eq!(groups[0].target_count, 2);
        assert_eq!(groups[0].source_count, 0);
    }

    #[test]
    fn cross_source_needs_duplication_on_one_side() {
        let source = vec![prs(1, "B1", 1, "LB"), prs(2, " b1", 1, "UB"), prs(3, "C1", 1, "LB")];
        let target = vec![mdms(10, "B1", 1, "LB"), mdms(11, "C1", 1, "LB")];
        let groups = cross_source(&source, &target);
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.key, vec!["B1", "SL", "1"]);
        assert_eq!(g.source_count, 2);
        assert_eq!(g.target_count, 1);
        assert_eq!(g.count, 3);
    }

    #[test]
    fn cross_source_ignores_one_sided_keys() {
        let source = vec![prs(1, "B1", 1, "LB"), prs(2, "B1", 1, "LB")];
        assert!(cross_source(&source, &[]).is_empty());
    }

    #[test]
    fn groups_ordered_by_size_then_key() {
        let rows = vec![
            prs(1, "B2", 1, "LB"),
            prs(2, "B2", 1, "LB"),
            prs(3, "A1", 1, "LB"),
            prs(4, "A1", 1, "LB"),
            prs(5, "Z9", 1, "LB"),
            prs(6, "Z9", 1, "LB"),
            prs(7, "Z9", 1, "LB"),
        ];
        let groups = within_source(&rows);
        let coaches: Vec<&str> = groups.iter().map(|g| g.key[0].as_str()).collect();
        assert_eq!(coaches, vec!["Z9", "A1", "B2"]);
    }

    #[test]
    fn equal_sized_groups_order_berths_numerically() {
        let rows = vec![
            prs(1, "B1", 10, "LB"),
            prs(2, "B1", 10, "LB"),
            prs(3, "B1", 9, "LB"),
            prs(4, "B1", 9, "LB"),
        ];
        let groups = within_source(&rows);
        let berths: Vec<&str> = groups.iter().map(|g| g.key[2].as_str()).collect();
        assert_eq!(berths, vec!["9", "10"]);

        let target = vec![mdms(1, "B1", 10, "LB"), mdms(2, "B1", 10, "LB"), mdms(3, "B1", 9, "LB"), mdms(4, "B1", 9, "LB")];
        let serials: Vec<Vec<i64>> = within_target(&target).iter().map(|g| g.serials(RecordSide::Mdms)).collect();
        assert_eq!(serials, vec![vec![3, 4], vec![1, 2]]);
    }

    #[test]
    fn absent_values_group_together() {
        let mut a = prs(1, "B1", 1, "LB");
        let mut b = prs(2, "B1", 1, "LB");
        a.berth_type = None;
        b.berth_type = None;
        let groups = within_source(&[a, b]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key[3], NOT_AVAILABLE);
    }
}
