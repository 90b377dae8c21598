//! Parser registry
//!
//! Dispatches source text to a language parser by file extension or by the
//! `type` attribute of an inline `<script>`. Parsers are pure; a parse
//! failure yields a synthetic empty document plus a `parse-error` warning at
//! the offending range.

pub mod html;
pub mod js;

use std::sync::Arc;

use crate::text::{LineIndex, LocationOffset};
use crate::urls::ResolvedUrl;
use crate::warnings::{codes, SourceRange, Warning};

pub use html::{HtmlNode, HtmlNodeData, HtmlTree, NodeId};
pub use js::JsDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Html,
    Js,
    Css,
}

pub fn language_for_url(url: &ResolvedUrl) -> Option<Language> {
    let ext = url.path().rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "html" | "htm" => Some(Language::Html),
        "js" | "mjs" => Some(Language::Js),
        "css" => Some(Language::Css),
        _ => None,
    }
}

/// Language of an inline `<script>` by its `type` attribute. `None` means
/// the content is not scannable script (e.g. a JSON payload).
pub fn language_for_script_type(type_attr: Option<&str>) -> Option<Language> {
    match type_attr.map(str::trim) {
        None | Some("") => Some(Language::Js),
        Some("module") | Some("text/javascript") | Some("application/javascript") => {
            Some(Language::Js)
        }
        Some(_) => None,
    }
}

/// A parsed markup document: tree plus original text.
#[derive(Debug)]
pub struct HtmlDocument {
    pub url: ResolvedUrl,
    pub source: Arc<str>,
    pub tree: html::HtmlTree,
    pub line_index: LineIndex,
}

impl HtmlDocument {
    pub fn range_of_offsets(&self, start: usize, end: usize) -> SourceRange {
        SourceRange::new(
            self.url.clone(),
            self.line_index.position(start),
            self.line_index.position(end),
        )
    }

    pub fn node_range(&self, id: html::NodeId) -> SourceRange {
        let node = self.tree.node(id);
        self.range_of_offsets(node.start, node.end)
    }

    pub fn text_of(&self, start: usize, end: usize) -> &str {
        &self.source[start..end]
    }
}

/// Style documents are opaque to the analyzer.
#[derive(Debug)]
pub struct CssDocument {
    pub url: ResolvedUrl,
    pub source_url: ResolvedUrl,
    pub source: Arc<str>,
    pub is_inline: bool,
}

#[derive(Debug)]
pub enum ParsedDocument {
    Html(HtmlDocument),
    Js(JsDocument),
    Css(CssDocument),
}

impl ParsedDocument {
    pub fn url(&self) -> &ResolvedUrl {
        match self {
            ParsedDocument::Html(d) => &d.url,
            ParsedDocument::Js(d) => &d.url,
            ParsedDocument::Css(d) => &d.url,
        }
    }

    /// URL that source ranges in this document point into; differs from
    /// `url()` for inline documents.
    pub fn source_url(&self) -> &ResolvedUrl {
        match self {
            ParsedDocument::Html(d) => &d.url,
            ParsedDocument::Js(d) => &d.source_url,
            ParsedDocument::Css(d) => &d.source_url,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ParsedDocument::Html(d) => &d.source,
            ParsedDocument::Js(d) => &d.source,
            ParsedDocument::Css(d) => &d.source,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            ParsedDocument::Html(_) => Language::Html,
            ParsedDocument::Js(_) => Language::Js,
            ParsedDocument::Css(_) => Language::Css,
        }
    }

    pub fn is_inline(&self) -> bool {
        match self {
            ParsedDocument::Html(_) => false,
            ParsedDocument::Js(d) => d.is_inline,
            ParsedDocument::Css(d) => d.is_inline,
        }
    }

    /// Whole-document source range.
    pub fn full_range(&self) -> SourceRange {
        match self {
            ParsedDocument::Html(d) => d.range_of_offsets(0, d.source.len()),
            ParsedDocument::Js(d) => d.range_of_offsets(0, d.source.len()),
            ParsedDocument::Css(d) => {
                let index = LineIndex::new(&d.source);
                SourceRange::new(
                    d.source_url.clone(),
                    index.position(0),
                    index.position(d.source.len()),
                )
            }
        }
    }

    /// Re-emit the source. For markup, the texts in `inline_documents` are
    /// spliced back into the content spans of inline `<script>`/`<style>`
    /// elements in document order.
    pub fn stringify(&self, inline_documents: &[String]) -> String {
        match self {
            ParsedDocument::Js(d) => d.source.to_string(),
            ParsedDocument::Css(d) => d.source.to_string(),
            ParsedDocument::Html(d) => {
                if inline_documents.is_empty() {
                    return d.source.to_string();
                }
                let mut spans = Vec::new();
                for node in &d.tree.nodes {
                    if let HtmlNodeData::Element {
                        tag,
                        content_start,
                        content_end,
                        ..
                    } = &node.data
                    {
                        let is_inline_script =
                            tag == "script" && node.attr("src").is_none();
                        if is_inline_script || tag == "style" {
                            spans.push((*content_start, *content_end));
                        }
                    }
                }
                let mut out = String::with_capacity(d.source.len());
                let mut cursor = 0;
                for ((start, end), replacement) in spans.iter().zip(inline_documents) {
                    out.push_str(&d.source[cursor..*start]);
                    out.push_str(replacement);
                    cursor = *end;
                }
                out.push_str(&d.source[cursor..]);
                out
            }
        }
    }
}

/// Extension- and type-keyed dispatch to the language parsers.
#[derive(Debug, Default, Clone)]
pub struct ParserRegistry {}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {}
    }

    /// Parse a top-level document. `hint` overrides extension detection when
    /// the crawl already knows what kind of import produced the URL.
    pub fn parse(
        &self,
        url: &ResolvedUrl,
        text: &str,
        hint: Option<Language>,
    ) -> (ParsedDocument, Vec<Warning>) {
        let language = hint
            .or_else(|| language_for_url(url))
            .unwrap_or(Language::Html);
        self.parse_as(url, url, text, language, LocationOffset::default(), false)
    }

    /// Parse an inline document embedded in `parent` at `offset`.
    pub fn parse_inline(
        &self,
        parent: &ResolvedUrl,
        language: Language,
        tag: &str,
        ordinal: usize,
        text: &str,
        offset: LocationOffset,
    ) -> (ParsedDocument, Vec<Warning>) {
        let url = parent.inline(tag, ordinal);
        self.parse_as(&url, parent, text, language, offset, true)
    }

    fn parse_as(
        &self,
        url: &ResolvedUrl,
        source_url: &ResolvedUrl,
        text: &str,
        language: Language,
        offset: LocationOffset,
        is_inline: bool,
    ) -> (ParsedDocument, Vec<Warning>) {
        match language {
            Language::Html => {
                let (tree, errors) = html::parse_html(text);
                let doc = HtmlDocument {
                    url: url.clone(),
                    source: Arc::from(text),
                    tree,
                    line_index: LineIndex::new(text),
                };
                let warnings = errors
                    .into_iter()
                    .map(|e| {
                        Warning::error(
                            codes::PARSE_ERROR,
                            e.message,
                            doc.range_of_offsets(e.offset, e.offset + 1),
                        )
                    })
                    .collect();
                (ParsedDocument::Html(doc), warnings)
            }
            Language::Js => {
                let outcome =
                    js::parse_js(url.clone(), source_url.clone(), text, offset, is_inline);
                let warnings = outcome
                    .errors
                    .iter()
                    .map(|e| {
                        Warning::error(
                            codes::PARSE_ERROR,
                            e.message.clone(),
                            outcome.document.range_of_offsets(e.start, e.end),
                        )
                    })
                    .collect();
                (ParsedDocument::Js(outcome.document), warnings)
            }
            Language::Css => (
                ParsedDocument::Css(CssDocument {
                    url: url.clone(),
                    source_url: source_url.clone(),
                    source: Arc::from(text),
                    is_inline,
                }),
                Vec::new(),
            ),
        }
    }
}
