//! Check pipeline: source text in, violations and diagnostics out
//!
//! The input format follows the file name: `.toml` and `.json` files are
//! hierarchy descriptions, anything else is parsed as class declarations.
//! Input errors (parse errors, malformed descriptions, duplicate classes,
//! unknown bases) abort the check and come back as a [`CheckFailure`]; rule
//! violations are all collected into the [`CheckReport`].

use std::fmt;

use diagnostics::error_codes::format_error_code;
use diagnostics::hierarchy::HierarchyDiagnostics;
use diagnostics::{Diagnostics, ErrorFormatter, FileId, SourceMap};
use log::{debug, info};
use parser::ParseFailure;
use serde::Serialize;

use crate::config::CheckerConfig;
use crate::description::{DescriptionError, DescriptionFormat, HierarchyDescription};
use crate::hierarchy::{ClassNode, Hierarchy, HierarchyError};
use crate::lower;
use crate::report;
use crate::validate::{validate_with, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Declarations,
    Toml,
    Json,
}

impl SourceKind {
    pub fn from_file_name(file_name: &str) -> Self {
        match DescriptionFormat::from_file_name(file_name) {
            Some(DescriptionFormat::Toml) => SourceKind::Toml,
            Some(DescriptionFormat::Json) => SourceKind::Json,
            None => SourceKind::Declarations,
        }
    }
}

/// Why an input could not be checked
#[derive(Debug)]
pub enum InputError {
    Parse(ParseFailure),
    Description(DescriptionError),
    Hierarchy(HierarchyError),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Parse(e) => write!(f, "parse error: {}", e),
            InputError::Description(e) => write!(f, "{}", e),
            InputError::Hierarchy(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Parse(e) => Some(e),
            InputError::Description(e) => Some(e),
            InputError::Hierarchy(e) => Some(e),
        }
    }
}

/// A fatal input error with the diagnostics describing it
#[derive(Debug)]
pub struct CheckFailure {
    pub file_name: String,
    pub error: InputError,
    pub diagnostics: Diagnostics,
    pub source_map: SourceMap,
    colored: bool,
}

impl CheckFailure {
    pub fn render(&self) -> String {
        formatter(self.colored).format_diagnostics(&self.diagnostics, &self.source_map)
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name, self.error)
    }
}

impl std::error::Error for CheckFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Outcome of checking one input that could be analysed
#[derive(Debug)]
pub struct CheckReport {
    pub file_name: String,
    pub kind: SourceKind,
    pub violations: Vec<Violation>,
    /// Lowering warnings followed by one error per violation
    pub diagnostics: Diagnostics,
    pub source_map: SourceMap,
    colored: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    kind: SourceKind,
    valid: bool,
    violations: Vec<JsonViolation<'a>>,
}

#[derive(Serialize)]
struct JsonViolation<'a> {
    #[serde(flatten)]
    violation: &'a Violation,
    code: String,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn render(&self) -> String {
        formatter(self.colored).format_diagnostics(&self.diagnostics, &self.source_map)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonReport {
            file: &self.file_name,
            kind: self.kind,
            valid: self.is_valid(),
            violations: self
                .violations
                .iter()
                .map(|violation| JsonViolation {
                    violation,
                    code: format_error_code(violation.kind.error_code()),
                })
                .collect(),
        })
    }
}

fn formatter(colored: bool) -> ErrorFormatter {
    if colored {
        ErrorFormatter::with_colors()
    } else {
        ErrorFormatter::new()
    }
}

struct Pipeline<'c> {
    file_name: String,
    config: &'c CheckerConfig,
    source_map: SourceMap,
    file_id: FileId,
}

impl Pipeline<'_> {
    fn fail(self, error: InputError, diagnostics: Diagnostics) -> CheckFailure {
        info!("{}: {}", self.file_name, error);
        CheckFailure {
            file_name: self.file_name,
            error,
            diagnostics,
            source_map: self.source_map,
            colored: self.config.colored_diagnostics,
        }
    }

    fn classes(&self, kind: SourceKind, text: &str) -> Result<(Vec<ClassNode>, Diagnostics), InputError> {
        let format = match kind {
            SourceKind::Declarations => {
                let file = parser::parse_declarations(&self.file_name, text).map_err(InputError::Parse)?;
                let lowered = lower::lower(&file, self.file_id, &self.source_map);
                return Ok((lowered.classes, lowered.diagnostics));
            }
            SourceKind::Toml => DescriptionFormat::Toml,
            SourceKind::Json => DescriptionFormat::Json,
        };
        let description = HierarchyDescription::parse(text, format).map_err(InputError::Description)?;
        Ok((description.into_classes(), Diagnostics::new()))
    }

    fn error_diagnostic(&self, error: &InputError) -> Diagnostics {
        let diagnostic = match error {
            InputError::Parse(failure) => failure.to_diagnostic(self.file_id, &self.source_map),
            InputError::Description(e) => {
                HierarchyDiagnostics::invalid_description(&e.format().to_string(), &e.message())
            }
            InputError::Hierarchy(e) => e.to_diagnostic(),
        };
        Diagnostics::from(diagnostic)
    }
}

/// Check one input. `file_name` selects the format and labels diagnostics.
pub fn check_source(
    file_name: &str,
    text: &str,
    config: &CheckerConfig,
) -> Result<CheckReport, CheckFailure> {
    let kind = SourceKind::from_file_name(file_name);
    info!("checking '{}' as {:?}", file_name, kind);

    let mut source_map = SourceMap::new();
    let file_id = source_map.add_file(file_name, text);
    let pipeline = Pipeline {
        file_name: file_name.to_string(),
        config,
        source_map,
        file_id,
    };

    let (classes, mut diagnostics) = match pipeline.classes(kind, text) {
        Ok(lowered) => lowered,
        Err(error) => {
            let diagnostics = pipeline.error_diagnostic(&error);
            return Err(pipeline.fail(error, diagnostics));
        }
    };
    debug!("{} classes in '{}'", classes.len(), file_name);

    let hierarchy = match Hierarchy::new(classes) {
        Ok(hierarchy) => hierarchy,
        Err(e) => {
            let error = InputError::Hierarchy(e);
            let mut error_diagnostics = diagnostics;
            error_diagnostics.extend(pipeline.error_diagnostic(&error));
            return Err(pipeline.fail(error, error_diagnostics));
        }
    };

    let violations = validate_with(&hierarchy, config);
    diagnostics.extend(report::violation_diagnostics(&hierarchy, &violations));
    info!(
        "'{}': {} classes, {} violation(s)",
        file_name,
        hierarchy.len(),
        violations.len()
    );

    Ok(CheckReport {
        file_name: pipeline.file_name,
        kind,
        violations,
        diagnostics,
        source_map: pipeline.source_map,
        colored: config.colored_diagnostics,
    })
}
