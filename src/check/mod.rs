//! Catalog checks.
//!
//! A [`Checker`] runs a set of [`Rule`]s over every context of a catalog and
//! turns their findings into [`Diagnostic`]s. A file that cannot be parsed
//! produces a single `parse` error instead.

pub mod rules;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{compile_location_patterns, CheckSettings};
use crate::error::Result;
use crate::parse::{Catalog, Location, TsParser};
pub use rules::{
    Accelerator, DuplicateMessage, EmptyTranslation, EndingPunctuation, LocationPattern,
    PlaceMarker, Rule, SurroundingWhitespace, UnlinkedLocation,
};

/// Rule id used for files that fail to parse
pub const PARSE_RULE: &str = "parse";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// One problem found in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub severity: Severity,
    pub file: PathBuf,
    /// Line of the offending `<message>` in the TS file (0 when unknown)
    pub line: usize,
    pub context: Option<String>,
    pub source: Option<String>,
    /// Where the message is used in the application sources
    pub location: Option<Location>,
    pub message: String,
}

/// Diagnostics for a set of files
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub files_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

/// Runs the enabled rules over catalogs
pub struct Checker {
    rules: Vec<Box<dyn Rule>>,
}

impl Checker {
    /// Build a checker with every rule not listed in `settings.disabled`
    pub fn new(settings: &CheckSettings) -> Result<Self> {
        let patterns = compile_location_patterns(&settings.location_patterns)?;
        let all: Vec<Box<dyn Rule>> = vec![
            Box::new(EmptyTranslation),
            Box::new(DuplicateMessage),
            Box::new(LocationPattern::new(
                settings.location_patterns.clone(),
                patterns,
            )),
            Box::new(UnlinkedLocation::new(settings.sentinel_line)),
            Box::new(Accelerator),
            Box::new(PlaceMarker::new()),
            Box::new(EndingPunctuation),
            Box::new(SurroundingWhitespace),
        ];
        let rules = all
            .into_iter()
            .filter(|r| !settings.disabled.iter().any(|d| d == r.id()))
            .collect();
        Ok(Self { rules })
    }

    /// Ids of the rules this checker runs
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn check_catalog(&self, catalog: &Catalog, file: &Path) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for context in &catalog.contexts {
            for rule in &self.rules {
                for (index, text) in rule.check(context) {
                    let message = &context.messages[index];
                    diagnostics.push(Diagnostic {
                        rule: rule.id(),
                        severity: rule.severity(),
                        file: file.to_path_buf(),
                        line: message.file_line,
                        context: Some(context.name.clone()),
                        source: Some(message.source.clone()),
                        location: message.primary_location().cloned(),
                        message: text,
                    });
                }
            }
        }
        diagnostics.sort_by_key(|d| d.line);
        diagnostics
    }

    /// Parse and check one file; parse failures become a `parse` diagnostic
    pub fn check_file(&self, file: &Path) -> Vec<Diagnostic> {
        match TsParser::parse_file(file) {
            Ok(catalog) => self.check_catalog(&catalog, file),
            Err(e) => vec![Diagnostic {
                rule: PARSE_RULE,
                severity: Severity::Error,
                file: file.to_path_buf(),
                line: 0,
                context: None,
                source: None,
                location: None,
                message: e.to_string(),
            }],
        }
    }

    pub fn check_files(&self, files: &[PathBuf]) -> CheckReport {
        let mut report = CheckReport::default();
        for file in files {
            report.files_checked += 1;
            report.diagnostics.extend(self.check_file(file));
        }
        report
    }
}
