use std::path::PathBuf;

use berth_io::{load_mdms, load_prs, read_table, write_report, IoError};
use berth_recon::config::ExportFormat;
use berth_recon::model::{BerthNumber, DiscrepancyKind, RecordSide};
use berth_recon::{run, ReconConfig, ReconInput, RunOptions};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

const CONFIG: &str = r#"
name = "fixture audit"

[prs]
file = "prs.csv"

[prs.columns]
serial_no = "Serial No"
coach_code = "Coach Code"
composite_flag = "Composite Flag"
class_code = "Class Code"
berth_number = "Berth Number"
berth_type = "Berth Type"

[mdms]
file = "mdms.csv"
"#;

fn load_input() -> (ReconConfig, ReconInput) {
    let config = ReconConfig::from_toml(CONFIG).unwrap();
    let dir = fixtures_dir();
    let prs = load_prs(&dir.join(&config.prs.file), &config.prs).unwrap();
    let mdms = load_mdms(&dir.join(&config.mdms.file), &config.mdms).unwrap();
    (config, ReconInput { prs, mdms })
}

#[test]
fn loads_both_relations() {
    let (_, input) = load_input();
    assert_eq!(input.prs.len(), 10);
    assert_eq!(input.mdms.len(), 9);

    let ha1 = &input.prs[7];
    assert_eq!(ha1.serial_no, 8);
    assert!(ha1.composite_flag);
    assert_eq!(ha1.berth_number, Some(BerthNumber::Text("12A".into())));
    assert_eq!(input.prs[9].coach_code, None);

    let m = &input.mdms[7];
    assert_eq!(m.coach_class_second.as_deref(), Some("2A"));
    assert_eq!(input.mdms[0].coach_class_second, None);
}

#[test]
fn csv_fixtures_reconcile_like_the_json_snapshot() {
    let (config, input) = load_input();
    let report = run(&input, &RunOptions::from_config(&config).unwrap());

    assert_eq!(report.meta.name, "fixture audit");
    assert_eq!(report.summary.total_discrepancies, 6);
    assert_eq!(report.summary.count(DiscrepancyKind::TypeMismatch), 1);
    assert_eq!(report.summary.data_quality_score, 40.0);
    assert_eq!(report.duplicates.within_source[0].serials(RecordSide::Prs), vec![5, 6]);
    assert_eq!(report.duplicate_summary.integrity_score, 60.0);
}

#[test]
fn blank_line_does_not_shift_row_numbers() {
    let table = read_table(&fixtures_dir().join("prs.csv"), None).unwrap();
    let (row, values) = &table.rows[6];
    assert_eq!(values[0], "7");
    assert_eq!(*row, 9);
}

#[test]
fn parse_error_names_file_line_after_empty_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prs.csv");
    std::fs::write(
        &path,
        "serialNo,coachCode,compositeFlag,classCode,berthNumber,berthType\n\
         1,B1,N,SL,1,LB\n\
         \n\
         \n\
         x5,B1,N,SL,2,MB\n",
    )
    .unwrap();
    let config = ReconConfig::from_toml("[prs]\nfile = \"prs.csv\"\n[mdms]\nfile = \"mdms.csv\"\n").unwrap();
    match load_prs(&path, &config.prs) {
        Err(IoError::Parse { row, value, .. }) => {
            assert_eq!(row, 5);
            assert_eq!(value, "x5");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn default_columns_do_not_fit_custom_headers() {
    let config = ReconConfig::from_toml("[prs]\nfile = \"prs.csv\"\n[mdms]\nfile = \"mdms.csv\"\n").unwrap();
    let err = load_prs(&fixtures_dir().join("prs.csv"), &config.prs).unwrap_err();
    assert!(matches!(err, IoError::MissingColumn { .. }));
}

#[test]
fn unsupported_extension() {
    let err = read_table(&fixtures_dir().join("prs.json"), None).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat(_)));
}

#[test]
fn export_csv_and_xlsx() {
    let (config, input) = load_input();
    let report = run(&input, &RunOptions::from_config(&config).unwrap());
    let dir = tempfile::tempdir().unwrap();

    let csv_files = write_report(&report, &dir.path().join("csv"), ExportFormat::Csv).unwrap();
    assert_eq!(csv_files.len(), 7);
    let mismatch = std::fs::read_to_string(dir.path().join("csv/type_mismatch.csv")).unwrap();
    assert_eq!(mismatch.lines().count(), 2);

    let xlsx_files = write_report(&report, &dir.path().join("xlsx"), ExportFormat::Xlsx).unwrap();
    assert_eq!(xlsx_files.len(), 1);
    let summary = read_table(&xlsx_files[0], Some("Summary")).unwrap();
    assert_eq!(summary.headers, vec!["Metric", "Value"]);
    assert!(summary.rows.iter().any(|(_, r)| r[0] == "Integrity score" && r[1] == "60"));
}
