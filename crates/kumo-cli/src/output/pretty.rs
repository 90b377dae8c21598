//! Pretty warning printer
//!
//! Renders warnings with colored severities, 1-based positions, and a
//! caret underline beneath the offending source line.

use colored::Colorize;
use kumo_core::warnings::{Severity, Warning};
use kumo_core::Analysis;

pub struct PrettyFormatter {
    pub color: bool,
}

impl PrettyFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn format(&self, analysis: &Analysis, warnings: &[&Warning]) -> String {
        let mut out = String::new();
        for warning in warnings {
            out.push_str(&self.format_one(analysis, warning));
            out.push('\n');
        }
        out.push_str(&self.summary(warnings));
        out
    }

    fn format_one(&self, analysis: &Analysis, warning: &Warning) -> String {
        let severity = self.severity_label(warning.severity);
        let location = format!(
            "{}:{}:{}",
            warning.range.file,
            warning.range.start.line + 1,
            warning.range.start.column + 1
        );

        let mut out = format!(
            "{severity}[{}] {}\n  --> {location}\n",
            warning.code, warning.message
        );

        if let Some(line) = self.source_line(analysis, warning) {
            let start = warning.range.start.column.min(line.len());
            let end = if warning.range.end.line == warning.range.start.line {
                warning.range.end.column.min(line.len())
            } else {
                line.len()
            };
            let caret_len = end.saturating_sub(start).max(1);
            out.push_str(&format!(
                "   | {line}\n   | {}{}\n",
                " ".repeat(start),
                "^".repeat(caret_len)
            ));
        }
        out
    }

    fn source_line(&self, analysis: &Analysis, warning: &Warning) -> Option<String> {
        let document = analysis.get_document(&warning.range.file)?;
        document
            .scanned()
            .parsed
            .text()
            .lines()
            .nth(warning.range.start.line)
            .map(|line| line.replace('\t', " "))
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = match severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        if !self.color {
            return label.to_string();
        }
        match severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Info => label.blue().to_string(),
        }
    }

    fn summary(&self, warnings: &[&Warning]) -> String {
        if warnings.is_empty() {
            return "No warnings found.\n".to_string();
        }
        let errors = warnings
            .iter()
            .filter(|w| w.severity == Severity::Error)
            .count();
        format!(
            "{} warning(s), {} error(s)\n",
            warnings.len() - errors,
            errors
        )
    }
}
