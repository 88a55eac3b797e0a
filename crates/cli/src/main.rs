// berthrecon - PRS/MDMS berth configuration reconciliation

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use berth_io::IoError;
use berth_recon::config::ExportFormat;
use berth_recon::ReconError;

use exit_codes::{EXIT_EXPORT, EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "berthrecon")]
#[command(about = "Reconcile PRS berth rows against MDMS coach layouts")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  berthrecon run recon.toml
  berthrecon run recon.toml --json
  berthrecon run recon.toml --output report.json
  berthrecon run recon.toml --export out --format xlsx")]
    Run {
        /// Path to the recon config file
        config: PathBuf,

        /// Output the JSON envelope to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file (overrides [output].json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export tabular sheets into this directory (overrides [output].export_dir)
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format (overrides [output].format)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// List discrepancies between a PRS and an MDMS file
    #[command(after_help = "\
Examples:
  berthrecon discrepancies --prs prs.csv --mdms mdms.xlsx
  berthrecon discrepancies --prs prs.csv --mdms mdms.csv --kind TYPE_MISMATCH
  berthrecon discrepancies --prs prs.csv --mdms mdms.csv --coach b1 --json")]
    Discrepancies {
        #[command(flatten)]
        sources: SourceArgs,

        /// Only this kind: TYPE_MISMATCH, MISSING_IN_TARGET, MISSING_IN_SOURCE
        #[arg(long)]
        kind: Option<String>,

        /// Only this coach (compared case- and whitespace-insensitively)
        #[arg(long)]
        coach: Option<String>,

        /// Output the JSON envelope to stdout
        #[arg(long)]
        json: bool,
    },

    /// List duplicate berth groups within and across the two files
    #[command(after_help = "\
Examples:
  berthrecon duplicates --prs prs.csv --mdms mdms.csv
  berthrecon duplicates --prs prs.csv --mdms mdms.csv --origin CROSS_SOURCE --json")]
    Duplicates {
        #[command(flatten)]
        sources: SourceArgs,

        /// Only this origin: SOURCE_ONLY, TARGET_ONLY, CROSS_SOURCE
        #[arg(long)]
        origin: Option<String>,

        /// Output the JSON envelope to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  berthrecon validate recon.toml")]
    Validate {
        /// Path to the recon config file
        config: PathBuf,
    },
}

/// PRS/MDMS inputs for the ad-hoc commands. Default column headers apply.
#[derive(clap::Args)]
struct SourceArgs {
    /// PRS file (.csv, .tsv, .xlsx, .xls, .xlsb, .ods)
    #[arg(long)]
    prs: PathBuf,

    /// MDMS file (.csv, .tsv, .xlsx, .xls, .xlsb, .ods)
    #[arg(long)]
    mdms: PathBuf,

    /// Worksheet of the PRS file (first sheet when omitted)
    #[arg(long)]
    prs_sheet: Option<String>,

    /// Worksheet of the MDMS file (first sheet when omitted)
    #[arg(long)]
    mdms_sheet: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Xlsx,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Xlsx => ExportFormat::Xlsx,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  berth-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, json, output, export, format } => {
            recon::cmd_run(config, json, output, export, format.map(ExportFormat::from))
        }
        Commands::Discrepancies { sources, kind, coach, json } => {
            recon::cmd_discrepancies(sources, kind, coach, json)
        }
        Commands::Duplicates { sources, origin, json } => recon::cmd_duplicates(sources, origin, json),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::new(EXIT_EXPORT, msg)
    }

    /// Config errors exit 3; a bad filter value passed on the command line is usage (2).
    pub fn config(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::InvalidFilter { .. } => Some("filter values are case-insensitive; '-' and '_' are interchangeable"),
            ReconError::ConfigValidation(_) => Some("run `berthrecon validate <config>` after editing"),
            _ => None,
        };
        let cli_err = Self::new(EXIT_INVALID_CONFIG, err.to_string());
        match hint {
            Some(hint) => cli_err.with_hint(hint),
            None => cli_err,
        }
    }

    pub fn input(err: IoError) -> Self {
        let code = match &err {
            IoError::Write { .. } => EXIT_EXPORT,
            _ => EXIT_INPUT,
        };
        let hint = match &err {
            IoError::MissingColumn { .. } => Some("map header names under [prs.columns] / [mdms.columns]"),
            IoError::UnsupportedFormat(_) => Some("convert the file to CSV or XLSX"),
            _ => None,
        };
        let cli_err = Self::new(code, err.to_string());
        match hint {
            Some(hint) => cli_err.with_hint(hint),
            None => cli_err,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
