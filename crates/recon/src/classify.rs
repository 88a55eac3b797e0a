use crate::model::{
    BerthNumber, Discrepancy, DiscrepancyKind, MatchOutput, MdmsRecord, MismatchedPair, PrsRecord,
    RecordSide, NOT_AVAILABLE,
};

/// Label every row of the three match partitions.
///
/// Output order: type mismatches, then missing-in-MDMS, then missing-in-PRS,
/// each partition keeping the matcher's ordering.
pub fn classify(output: &MatchOutput) -> Vec<Discrepancy> {
    let mut results = Vec::with_capacity(
        output.type_mismatch.len() + output.missing_in_target.len() + output.missing_in_source.len(),
    );

    results.extend(output.type_mismatch.iter().map(type_mismatch));
    results.extend(output.missing_in_target.iter().map(missing_in_target));
    results.extend(output.missing_in_source.iter().map(missing_in_source));

    results
}

fn type_mismatch(pair: &MismatchedPair) -> Discrepancy {
    let source_value = or_na(pair.source.berth_type.as_deref());
    let target_value = or_na(pair.target.berth_qualifier.as_deref());
    let details = format!(
        "{} value '{source_value}' doesn't match {} value '{target_value}'",
        RecordSide::Prs,
        RecordSide::Mdms,
    );

    Discrepancy {
        kind: DiscrepancyKind::TypeMismatch,
        coach_id: or_na(pair.source.coach_code.as_deref()),
        class_code: or_na(pair.source.class_code.as_deref()),
        berth_number: berth_or_na(pair.source.berth_number.as_ref()),
        source_serial_no: Some(pair.source.serial_no),
        target_serial_no: Some(pair.target.serial_no),
        source_value,
        target_value,
        details,
    }
}

fn missing_in_target(row: &PrsRecord) -> Discrepancy {
    let source_value = or_na(row.berth_type.as_deref());
    let details = format!(
        "{} value '{source_value}' has no matching {} record",
        RecordSide::Prs,
        RecordSide::Mdms,
    );

    Discrepancy {
        kind: DiscrepancyKind::MissingInTarget,
        coach_id: or_na(row.coach_code.as_deref()),
        class_code: or_na(row.class_code.as_deref()),
        berth_number: berth_or_na(row.berth_number.as_ref()),
        source_serial_no: Some(row.serial_no),
        target_serial_no: None,
        source_value,
        target_value: NOT_AVAILABLE.to_string(),
        details,
    }
}

fn missing_in_source(row: &MdmsRecord) -> Discrepancy {
    let target_value = or_na(row.berth_qualifier.as_deref());
    let details = format!(
        "{} value '{target_value}' has no matching {} record",
        RecordSide::Mdms,
        RecordSide::Prs,
    );

    Discrepancy {
        kind: DiscrepancyKind::MissingInSource,
        coach_id: or_na(row.coach_id.as_deref()),
        class_code: or_na(row.class_code.as_deref()),
        berth_number: berth_or_na(row.berth_number.as_ref()),
        source_serial_no: None,
        target_serial_no: Some(row.serial_no),
        source_value: NOT_AVAILABLE.to_string(),
        target_value,
        details,
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn berth_or_na(value: Option<&BerthNumber>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |b| b.to_string())
}
