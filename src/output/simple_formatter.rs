use crate::check::{CheckReport, Diagnostic, Severity};
use crate::output::formatter::single_line;
use crate::stats::CatalogStats;
use crate::SearchResult;

/// Formatter for simple, machine-readable output (ripgrep-compatible)
pub struct SimpleFormatter;

impl SimpleFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Format a search result as `file:line:context: 'source' => 'translation'`
    pub fn format(&self, result: &SearchResult) -> String {
        let mut output = String::new();

        for entry in &result.translation_entries {
            let line = format!(
                "{}:{}:{}: '{}' => '{}'",
                entry.file.display(),
                entry.line,
                entry.context,
                single_line(&entry.source),
                single_line(&entry.translation)
            );
            output.push_str(&line);
            output.push('\n');
        }

        output
    }

    /// One diagnostic per line followed by a summary
    pub fn format_report(&self, report: &CheckReport) -> String {
        let mut output = String::new();
        for diagnostic in &report.diagnostics {
            output.push_str(&Self::format_diagnostic(diagnostic));
            output.push('\n');
        }
        output.push_str(&format!(
            "{} file{} checked: {} error{}, {} warning{}, {} info\n",
            report.files_checked,
            plural(report.files_checked),
            report.count(Severity::Error),
            plural(report.count(Severity::Error)),
            report.count(Severity::Warning),
            plural(report.count(Severity::Warning)),
            report.count(Severity::Info),
        ));
        output
    }

    /// `file:line: severity[rule]: message`, plus the message it concerns
    pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
        let mut line = format!(
            "{}:{}: {}[{}]: {}",
            diagnostic.file.display(),
            diagnostic.line,
            diagnostic.severity,
            diagnostic.rule,
            diagnostic.message
        );
        if let (Some(context), Some(source)) = (&diagnostic.context, &diagnostic.source) {
            line.push_str(&format!(" ({}: '{}')", context, single_line(source)));
        }
        line
    }

    /// A table per file: one row per context and a total row
    pub fn format_stats(&self, stats: &[CatalogStats]) -> String {
        let mut output = String::new();
        for catalog in stats {
            output.push_str(&format!(
                "{} [{}]\n",
                catalog.file.display(),
                catalog.language.as_deref().unwrap_or("?")
            ));
            let width = catalog
                .contexts
                .iter()
                .map(|c| c.name.chars().count())
                .max()
                .unwrap_or(0)
                .max("total".len());
            output.push_str(&format!(
                "  {:<width$}  {:>8}  {:>10}  {:>8}  {:>7}\n",
                "context",
                "finished",
                "unfinished",
                "obsolete",
                "done",
                width = width
            ));
            for context in &catalog.contexts {
                output.push_str(&format!(
                    "  {:<width$}  {:>8}  {:>10}  {:>8}  {:>6.1}%\n",
                    context.name,
                    context.counts.finished,
                    context.counts.unfinished,
                    context.counts.obsolete,
                    context.completion,
                    width = width
                ));
            }
            output.push_str(&format!(
                "  {:<width$}  {:>8}  {:>10}  {:>8}  {:>6.1}%\n",
                "total",
                catalog.total.finished,
                catalog.total.unfinished,
                catalog.total.obsolete,
                catalog.completion,
                width = width
            ));
        }
        output
    }
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
