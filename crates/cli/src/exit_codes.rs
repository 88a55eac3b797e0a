//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts gate on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success, nothing to report                           |
//! | 1    | Discrepancies or duplicate groups found              |
//! | 2    | CLI usage error (bad flag value)                     |
//! | 3    | Invalid config (TOML, column mapping, filter values) |
//! | 4    | Input read error (config or data file)               |
//! | 5    | Export error (JSON output, CSV/XLSX export)          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed and the snapshot is clean.
pub const EXIT_SUCCESS: u8 = 0;

/// Findings - discrepancies or duplicate groups exist.
/// Like `diff(1)`, exit 1 means "the relations differ."
pub const EXIT_FINDINGS: u8 = 1;

/// Usage error - bad arguments (e.g. unknown `--kind`).
/// Clap's own argument errors also exit with 2.
pub const EXIT_USAGE: u8 = 2;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Config or data file could not be read or mapped onto records.
pub const EXIT_INPUT: u8 = 4;

/// Report output could not be written.
pub const EXIT_EXPORT: u8 = 5;
