//! Structured warnings with stable codes and source ranges
//!
//! Analysis failures are always surfaced as warnings attached to the feature
//! or document where they occurred; nothing in the scan/resolve pipeline
//! throws. Ranges are half-open with 0-based line and column.

use serde::Serialize;

use crate::urls::ResolvedUrl;

/// Stable warning codes. New codes may be added; existing codes keep their
/// meaning.
pub mod codes {
    pub const PARSE_ERROR: &str = "parse-error";
    pub const COULD_NOT_LOAD: &str = "could-not-load";
    pub const COULD_NOT_RESOLVE_REFERENCE: &str = "could-not-resolve-reference";
    pub const MULTIPLE_GLOBAL_DECLARATIONS: &str = "multiple-global-declarations";
    pub const CLASS_EXTENDS_ANNOTATION_NO_ID: &str = "class-extends-annotation-no-id";
    pub const INVALID_POLYMER_CALL: &str = "invalid-polymer-call";
    pub const DYNAMIC_NAMESPACE_NO_NAME: &str = "dynamic-namespace-no-name";
    pub const INVALID_DATABINDING: &str = "invalid-databinding";
    pub const INVALID_ATTRIBUTE: &str = "invalid-attribute";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// 0-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open range in a resolved document; `end >= start` by position order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    pub file: ResolvedUrl,
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceRange {
    pub fn new(file: ResolvedUrl, start: SourcePosition, end: SourcePosition) -> Self {
        debug_assert!(end >= start, "source range end precedes start");
        Self { file, start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: &'static str,
    pub message: String,
    pub severity: Severity,
    pub range: SourceRange,
}

impl Warning {
    pub fn new(
        code: &'static str,
        severity: Severity,
        message: impl Into<String>,
        range: SourceRange,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            severity,
            range,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>, range: SourceRange) -> Self {
        Self::new(code, Severity::Error, message, range)
    }

    pub fn warning(code: &'static str, message: impl Into<String>, range: SourceRange) -> Self {
        Self::new(code, Severity::Warning, message, range)
    }
}
