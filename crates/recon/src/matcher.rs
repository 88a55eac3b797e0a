use std::collections::{BTreeSet, HashMap};

use crate::model::{JoinKey, MatchOutput, MdmsRecord, MismatchedPair, PrsRecord};

/// Join PRS rows against MDMS rows on the normalized (coach, class, berth) key.
///
/// When several MDMS rows share a key, every PRS row at that key is compared
/// against the first one in input order. Rows without a usable key join
/// nothing and land in the corresponding `missing_in_*` partition.
pub fn match_records(source: &[PrsRecord], target: &[MdmsRecord]) -> MatchOutput {
    let mut target_index: HashMap<JoinKey, &MdmsRecord> = HashMap::with_capacity(target.len());
    for row in target {
        if let Some(key) = JoinKey::of_mdms(row) {
            target_index.entry(key).or_insert(row);
        }
    }

    let source_keys: BTreeSet<JoinKey> = source.iter().filter_map(JoinKey::of_prs).collect();

    let mut output = MatchOutput::default();

    for row in source {
        let found = JoinKey::of_prs(row).and_then(|key| target_index.get(&key).copied());
        match found {
            Some(target_row) if row.berth_type != target_row.berth_qualifier => {
                output.type_mismatch.push(MismatchedPair {
                    source: row.clone(),
                    target: target_row.clone(),
                });
            }
            Some(_) => output.matched += 1,
            None => output.missing_in_target.push(row.clone()),
        }
    }

    for row in target {
        let joined = JoinKey::of_mdms(row).is_some_and(|key| source_keys.contains(&key));
        if !joined {
            output.missing_in_source.push(row.clone());
        }
    }

    output.type_mismatch.sort_by_key(|p| p.source.report_order());
    output.missing_in_target.sort_by_key(PrsRecord::report_order);
    output.missing_in_source.sort_by_key(MdmsRecord::report_order);

    log::debug!(
        "matched {} PRS rows against {} MDMS rows: {} agree, {} type mismatches, {} missing in MDMS, {} missing in PRS",
        source.len(),
        target.len(),
        output.matched,
        output.type_mismatch.len(),
        output.missing_in_target.len(),
        output.missing_in_source.len(),
    );

    output
}
