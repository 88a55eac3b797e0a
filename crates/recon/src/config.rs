use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ReconError;
use crate::filter::{DiscrepancyFilter, DuplicateFilter};
use crate::normalize::normalize;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub prs: SourceConfig<PrsColumns>,
    pub mdms: SourceConfig<MdmsColumns>,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "berth reconciliation".into()
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where one relation's rows come from.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig<C> {
    pub file: String,
    /// Worksheet name for spreadsheet inputs; first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: C,
}

/// Header names of the PRS table. Matched trim- and case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrsColumns {
    pub serial_no: String,
    pub coach_code: String,
    pub composite_flag: String,
    pub class_code: String,
    pub berth_number: String,
    pub berth_type: String,
}

impl Default for PrsColumns {
    fn default() -> Self {
        Self {
            serial_no: "serialNo".into(),
            coach_code: "coachCode".into(),
            composite_flag: "compositeFlag".into(),
            class_code: "classCode".into(),
            berth_number: "berthNumber".into(),
            berth_type: "berthType".into(),
        }
    }
}

impl PrsColumns {
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("serial_no", self.serial_no.as_str()),
            ("coach_code", self.coach_code.as_str()),
            ("composite_flag", self.composite_flag.as_str()),
            ("class_code", self.class_code.as_str()),
            ("berth_number", self.berth_number.as_str()),
            ("berth_type", self.berth_type.as_str()),
        ]
    }
}

/// Header names of the MDMS table. Matched trim- and case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MdmsColumns {
    pub serial_no: String,
    pub layout_variant_no: String,
    pub composite_flag: String,
    pub coach_class_first: String,
    pub coach_class_second: String,
    pub coach_id: String,
    pub class_code: String,
    pub berth_number: String,
    pub berth_qualifier: String,
}

impl Default for MdmsColumns {
    fn default() -> Self {
        Self {
            serial_no: "serialNo".into(),
            layout_variant_no: "layoutVariantNo".into(),
            composite_flag: "compositeFlag".into(),
            coach_class_first: "coachClassFirst".into(),
            coach_class_second: "coachClassSecond".into(),
            coach_id: "coachId".into(),
            class_code: "classCode".into(),
            berth_number: "berthNumber".into(),
            berth_qualifier: "berthQualifier".into(),
        }
    }
}

impl MdmsColumns {
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("serial_no", self.serial_no.as_str()),
            ("layout_variant_no", self.layout_variant_no.as_str()),
            ("composite_flag", self.composite_flag.as_str()),
            ("coach_class_first", self.coach_class_first.as_str()),
            ("coach_class_second", self.coach_class_second.as_str()),
            ("coach_id", self.coach_id.as_str()),
            ("class_code", self.class_code.as_str()),
            ("berth_number", self.berth_number.as_str()),
            ("berth_qualifier", self.berth_qualifier.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Filter + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub coach_id: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
}

impl FilterConfig {
    pub fn discrepancy_filter(&self) -> Result<DiscrepancyFilter, ReconError> {
        DiscrepancyFilter::parse(self.kind.as_deref(), self.coach_id.as_deref())
    }

    pub fn duplicate_filter(&self) -> Result<DuplicateFilter, ReconError> {
        DuplicateFilter::parse(self.origin.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub export_dir: Option<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (side, file) in [("prs", &self.prs.file), ("mdms", &self.mdms.file)] {
            if file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{side}: file must not be empty")));
            }
        }

        check_columns("prs", &self.prs.columns.entries())?;
        check_columns("mdms", &self.mdms.columns.entries())?;

        self.filter.discrepancy_filter()?;
        self.filter.duplicate_filter()?;

        Ok(())
    }
}

fn check_columns(side: &str, entries: &[(&'static str, &str)]) -> Result<(), ReconError> {
    let mut seen = HashSet::new();
    for (field, header) in entries {
        let header = normalize(header);
        if header.is_empty() {
            return Err(ReconError::ConfigValidation(format!(
                "{side}: column for '{field}' must not be empty"
            )));
        }
        if !seen.insert(header) {
            return Err(ReconError::ConfigValidation(format!(
                "{side}: column for '{field}' duplicates another column"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[prs]
file = "prs.csv"

[mdms]
file = "mdms.xlsx"
sheet = "Layouts"
"#;

    #[test]
    fn parse_minimal() {
        let config = ReconConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.name, "berth reconciliation");
        assert_eq!(config.prs.file, "prs.csv");
        assert_eq!(config.prs.columns, PrsColumns::default());
        assert_eq!(config.mdms.sheet.as_deref(), Some("Layouts"));
        assert_eq!(config.output.format, ExportFormat::Csv);
        assert!(config.filter.discrepancy_filter().unwrap().is_empty());
    }

    #[test]
    fn parse_column_overrides_and_output() {
        let input = r#"
name = "Rajdhani audit"

[prs]
file = "prs.csv"

[prs.columns]
berth_type = "Berth Type"
serial_no = "S.No"

[mdms]
file = "mdms.csv"

[filter]
kind = "TYPE_MISMATCH"
coach_id = "b1"

[output]
json = "report.json"
export_dir = "out"
format = "xlsx"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.name, "Rajdhani audit");
        assert_eq!(config.prs.columns.berth_type, "Berth Type");
        assert_eq!(config.prs.columns.serial_no, "S.No");
        // Unspecified columns keep their defaults
        assert_eq!(config.prs.columns.coach_code, "coachCode");
        assert_eq!(config.output.format, ExportFormat::Xlsx);
        assert_eq!(config.output.export_dir.as_deref(), Some("out"));
        let f = config.filter.discrepancy_filter().unwrap();
        assert_eq!(f.coach_id.as_deref(), Some("B1"));
    }

    #[test]
    fn reject_invalid_filter_kind() {
        let input = format!("{MINIMAL}\n[filter]\nkind = \"MISMATCH\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::InvalidFilter { .. }));
    }

    #[test]
    fn reject_duplicate_column_headers() {
        let input = r#"
[prs]
file = "prs.csv"
[prs.columns]
berth_type = "coachcode"

[mdms]
file = "mdms.csv"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("berth_type"));
    }

    #[test]
    fn reject_empty_file() {
        let input = r#"
[prs]
file = " "
[mdms]
file = "mdms.csv"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("prs: file"));
    }

    #[test]
    fn reject_unknown_format() {
        let input = format!("{MINIMAL}\n[output]\nformat = \"pdf\"\n");
        assert!(matches!(ReconConfig::from_toml(&input), Err(ReconError::ConfigParse(_))));
    }
}
