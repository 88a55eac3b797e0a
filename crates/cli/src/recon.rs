//! `berthrecon run | discrepancies | duplicates | validate`

use std::path::{Path, PathBuf};

use serde::Serialize;

use berth_recon::config::{ExportFormat, SourceConfig};
use berth_recon::engine;
use berth_recon::model::{Discrepancy, DiscrepancyKind, DuplicateGroup, DuplicateOrigin, RecordSide};
use berth_recon::{DiscrepancyFilter, DuplicateFilter, Envelope, ReconConfig, ReconInput, ReconReport, RunOptions};

use crate::exit_codes::{EXIT_FINDINGS, EXIT_INPUT};
use crate::{CliError, SourceArgs};

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    format: Option<ExportFormat>,
) -> Result<(), CliError> {
    json_failure(json_output, run(config_path, json_output, output_file, export_dir, format))
}

fn run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    format: Option<ExportFormat>,
) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    log::debug!("{}: data paths resolved against '{}'", config_path.display(), base_dir.display());

    let input = ReconInput {
        prs: berth_io::load_prs(&base_dir.join(&config.prs.file), &config.prs).map_err(CliError::input)?,
        mdms: berth_io::load_mdms(&base_dir.join(&config.mdms.file), &config.mdms).map_err(CliError::input)?,
    };

    let options = RunOptions::from_config(&config).map_err(CliError::config)?;
    let report = berth_recon::run(&input, &options);

    let output_file = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = output_file {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::export(format!("JSON serialization error: {e}")))?;
        std::fs::write(path, json_str)
            .map_err(|e| CliError::export(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    let export_dir = export_dir.or_else(|| config.output.export_dir.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref dir) = export_dir {
        let format = format.unwrap_or(config.output.format);
        for path in berth_io::write_report(&report, dir, format).map_err(CliError::input)? {
            eprintln!("wrote {}", path.display());
        }
    }

    if json_output {
        print_json(&Envelope::ok(&report, run_message(&report)))?;
    }

    print_run_summary(&report);

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::new(EXIT_FINDINGS, "discrepancies or duplicates found"))
    }
}

fn run_message(report: &ReconReport) -> String {
    format!(
        "{} discrepancies, {} duplicate groups",
        report.summary.total_discrepancies,
        report.duplicate_summary.group_counts.values().sum::<usize>(),
    )
}

/// Human summary to stderr. Counts cover the whole snapshot.
fn print_run_summary(report: &ReconReport) {
    let s = &report.summary;
    let d = &report.duplicate_summary;
    let groups = |origin: DuplicateOrigin| d.group_counts.get(&origin).copied().unwrap_or(0);

    eprintln!(
        "{}: {} PRS / {} MDMS records",
        report.meta.name, s.total_source_records, s.total_target_records,
    );
    eprintln!(
        "discrepancies: {} ({} type mismatch, {} missing in MDMS, {} missing in PRS), quality score {:.2}",
        s.total_discrepancies,
        s.count(DiscrepancyKind::TypeMismatch),
        s.count(DiscrepancyKind::MissingInTarget),
        s.count(DiscrepancyKind::MissingInSource),
        s.data_quality_score,
    );
    eprintln!(
        "duplicates: {} PRS, {} MDMS, {} cross-source groups, integrity score {:.2}",
        groups(DuplicateOrigin::SourceOnly),
        groups(DuplicateOrigin::TargetOnly),
        groups(DuplicateOrigin::CrossSource),
        d.integrity_score,
    );
    if !report.meta.filters.is_empty() {
        eprintln!(
            "listed after filters: {} discrepancies, {} duplicate groups",
            report.discrepancies.len(),
            report.duplicates.total_groups(),
        );
    }
}

// ============================================================================
// discrepancies / duplicates
// ============================================================================

pub fn cmd_discrepancies(
    sources: SourceArgs,
    kind: Option<String>,
    coach: Option<String>,
    json_output: bool,
) -> Result<(), CliError> {
    json_failure(json_output, discrepancies(sources, kind, coach, json_output))
}

fn discrepancies(
    sources: SourceArgs,
    kind: Option<String>,
    coach: Option<String>,
    json_output: bool,
) -> Result<(), CliError> {
    // Filter values are checked before any file is read
    let filter = DiscrepancyFilter::parse(kind.as_deref(), coach.as_deref())
        .map_err(|e| CliError::usage(e.to_string()))?;
    let input = load_sources(&sources)?;
    let list = engine::discrepancies(&input, &filter);

    if json_output {
        print_json(&Envelope::ok(&list, format!("{} discrepancies", list.len())))?;
    } else {
        for d in &list {
            println!("{}", discrepancy_line(d));
        }
    }
    eprintln!("{} discrepancies", list.len());

    if list.is_empty() {
        Ok(())
    } else {
        Err(CliError::new(EXIT_FINDINGS, ""))
    }
}

fn discrepancy_line(d: &Discrepancy) -> String {
    format!(
        "{:<18} {:<6} {:<4} {:>4}  {}",
        d.kind.as_str(),
        d.coach_id,
        d.class_code,
        d.berth_number,
        d.details,
    )
}

pub fn cmd_duplicates(sources: SourceArgs, origin: Option<String>, json_output: bool) -> Result<(), CliError> {
    json_failure(json_output, duplicates(sources, origin, json_output))
}

fn duplicates(sources: SourceArgs, origin: Option<String>, json_output: bool) -> Result<(), CliError> {
    let filter = DuplicateFilter::parse(origin.as_deref()).map_err(|e| CliError::usage(e.to_string()))?;
    let input = load_sources(&sources)?;
    let report = engine::duplicates(&input, &filter);
    let total = report.total_groups();

    if json_output {
        print_json(&Envelope::ok(&report, format!("{total} duplicate groups")))?;
    } else {
        for origin in DuplicateOrigin::ALL {
            for group in report.groups(origin) {
                println!("{}", group_line(group));
            }
        }
    }
    eprintln!("{total} duplicate groups");

    if total == 0 {
        Ok(())
    } else {
        Err(CliError::new(EXIT_FINDINGS, ""))
    }
}

fn group_line(group: &DuplicateGroup) -> String {
    format!(
        "{:<12} {:<16} x{}  PRS {:?}  MDMS {:?}",
        group.origin.as_str(),
        group.key_label(),
        group.count,
        group.serials(RecordSide::Prs),
        group.serials(RecordSide::Mdms),
    )
}

fn load_sources(sources: &SourceArgs) -> Result<ReconInput, CliError> {
    let prs = SourceConfig {
        file: sources.prs.display().to_string(),
        sheet: sources.prs_sheet.clone(),
        columns: Default::default(),
    };
    let mdms = SourceConfig {
        file: sources.mdms.display().to_string(),
        sheet: sources.mdms_sheet.clone(),
        columns: Default::default(),
    };
    Ok(ReconInput {
        prs: berth_io::load_prs(&sources.prs, &prs).map_err(CliError::input)?,
        mdms: berth_io::load_mdms(&sources.mdms, &mdms).map_err(CliError::input)?,
    })
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "valid: '{}' (PRS {}, MDMS {})",
        config.name, config.prs.file, config.mdms.file,
    );
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn read_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::new(EXIT_INPUT, format!("cannot read config {}: {e}", config_path.display()))
    })?;
    ReconConfig::from_toml(&config_str).map_err(CliError::config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::export(format!("JSON serialization error: {e}")))?;
    println!("{json_str}");
    Ok(())
}

/// In JSON mode a failed command still emits an envelope on stdout.
/// Findings are not failures: their envelope was already printed.
fn json_failure(json_output: bool, result: Result<(), CliError>) -> Result<(), CliError> {
    if let Err(ref err) = result {
        if json_output && err.code != EXIT_FINDINGS {
            let envelope: Envelope<()> = Envelope::error(err.message.clone());
            // Best effort: the error itself is reported on stderr regardless
            if let Ok(json_str) = serde_json::to_string_pretty(&envelope) {
                println!("{json_str}");
            }
        }
    }
    result
}
