//! Scanner registries
//!
//! Per language, a fixed-order set of scanners walks a parsed document's
//! AST exactly once via a shared dispatcher. Scanners are pure over one
//! document: they may not trigger loads, and they own their intermediate
//! state. Inline scripts and styles are reported back to the analysis
//! context, which parses and scans them as nested documents.

pub mod html;
pub mod js;

use crate::features::ScannedFeature;
use crate::parser::{Language, ParsedDocument};
use crate::text::LocationOffset;
use crate::warnings::Warning;

/// An inline document discovered during an HTML scan, to be parsed by the
/// context with the script parser at the given location offset.
#[derive(Debug, Clone)]
pub struct InlineSource {
    pub language: Language,
    /// Element tag hosting the content (`script` or `style`).
    pub tag: &'static str,
    pub text: String,
    pub offset: LocationOffset,
    /// Content span in the host document.
    pub span: (usize, usize),
}

#[derive(Debug, Default)]
pub struct ScanOutput {
    pub features: Vec<ScannedFeature>,
    pub warnings: Vec<Warning>,
    pub inline: Vec<InlineSource>,
}

/// Run the registered scanners for the document's language. Style documents
/// are opaque and scan to nothing.
pub fn scan_parsed(parsed: &ParsedDocument) -> ScanOutput {
    match parsed {
        ParsedDocument::Html(doc) => html::scan_html(doc),
        ParsedDocument::Js(doc) => js::scan_js(doc),
        ParsedDocument::Css(_) => ScanOutput::default(),
    }
}
