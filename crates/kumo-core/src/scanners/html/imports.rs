//! HTML import scanner
//!
//! Emits `html-import` for `<link rel="import">`, `html-script` for
//! external `<script src>`, and `html-style` for external stylesheet links.
//! Inline `<script>` and `<style>` content is reported as an `InlineSource`
//! with a location offset at the element's content start.

use super::HtmlScanner;
use crate::features::{kinds, ScannedFeature, ScannedImport};
use crate::parser::html::{HtmlNodeData, NodeId};
use crate::parser::{language_for_script_type, HtmlDocument, Language};
use crate::scanners::{InlineSource, ScanOutput};
use crate::text::LocationOffset;
use crate::urls::FileRelativeUrl;

#[derive(Default)]
pub struct HtmlImportScanner {}

impl HtmlImportScanner {
    fn emit_import(
        &self,
        kind: &'static str,
        url: &str,
        lazy: bool,
        id: NodeId,
        doc: &HtmlDocument,
        out: &mut ScanOutput,
    ) {
        out.features.push(ScannedFeature::Import(ScannedImport {
            kind,
            url: FileRelativeUrl::new(url),
            lazy,
            range: doc.node_range(id),
            warnings: Vec::new(),
        }));
    }

    fn emit_inline(
        &self,
        language: Language,
        tag: &'static str,
        id: NodeId,
        doc: &HtmlDocument,
        out: &mut ScanOutput,
    ) {
        let node = doc.tree.node(id);
        let HtmlNodeData::Element {
            content_start,
            content_end,
            ..
        } = node.data
        else {
            return;
        };
        let pos = doc.line_index.position(content_start);
        out.inline.push(InlineSource {
            language,
            tag,
            text: doc.text_of(content_start, content_end).to_string(),
            offset: LocationOffset::new(pos.line, pos.column),
            span: (content_start, content_end),
        });
    }
}

impl HtmlScanner for HtmlImportScanner {
    fn enter_element(&mut self, id: NodeId, doc: &HtmlDocument, out: &mut ScanOutput) {
        let node = doc.tree.node(id);
        match node.tag() {
            Some("link") => {
                let rel = node.attr_value("rel").unwrap_or("");
                let rels: Vec<&str> = rel.split_ascii_whitespace().collect();
                let Some(href) = node.attr_value("href") else {
                    return;
                };
                if rels.contains(&"import") || rels.contains(&"lazy-import") {
                    self.emit_import(
                        kinds::HTML_IMPORT,
                        href,
                        rels.contains(&"lazy-import"),
                        id,
                        doc,
                        out,
                    );
                } else if rels.contains(&"stylesheet") {
                    self.emit_import(kinds::HTML_STYLE, href, false, id, doc, out);
                }
            }
            Some("script") => {
                if let Some(src) = node.attr_value("src") {
                    self.emit_import(kinds::HTML_SCRIPT, src, false, id, doc, out);
                } else if let Some(language) = language_for_script_type(node.attr_value("type")) {
                    self.emit_inline(language, "script", id, doc, out);
                }
            }
            Some("style") => {
                self.emit_inline(Language::Css, "style", id, doc, out);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::features::{kinds, ScannedFeature};
    use crate::parser::Language;
    use crate::scanners::html::test_support::scan_source;

    fn import_kinds(source: &str) -> Vec<&'static str> {
        scan_source(source)
            .features
            .iter()
            .filter_map(|f| match f {
                ScannedFeature::Import(i) => Some(i.kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn link_rel_import_is_html_import() {
        let kinds_found = import_kinds(r#"<link rel="import" href="./a.html">"#);
        assert_eq!(kinds_found, vec![kinds::HTML_IMPORT]);
    }

    #[test]
    fn lazy_import_is_marked_lazy() {
        let out = scan_source(r#"<link rel="lazy-import" href="./a.html">"#);
        match &out.features[0] {
            ScannedFeature::Import(i) => {
                assert!(i.lazy);
                assert_eq!(i.kind, kinds::HTML_IMPORT);
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn external_script_is_html_script() {
        let kinds_found = import_kinds(r#"<script src="./a.js"></script>"#);
        assert_eq!(kinds_found, vec![kinds::HTML_SCRIPT]);
    }

    #[test]
    fn stylesheet_link_is_html_style() {
        let kinds_found = import_kinds(r#"<link rel="stylesheet" href="./a.css">"#);
        assert_eq!(kinds_found, vec![kinds::HTML_STYLE]);
    }

    #[test]
    fn link_without_href_is_ignored() {
        assert!(import_kinds(r#"<link rel="import">"#).is_empty());
    }

    #[test]
    fn inline_script_becomes_inline_source() {
        let out = scan_source("<p></p>\n<script>var x = 1;</script>");
        assert_eq!(out.inline.len(), 1);
        let inline = &out.inline[0];
        assert_eq!(inline.language, Language::Js);
        assert_eq!(inline.tag, "script");
        assert_eq!(inline.text, "var x = 1;");
        assert_eq!(inline.offset.line, 1);
        assert_eq!(inline.offset.column, 8);
    }

    #[test]
    fn json_script_is_not_scanned() {
        let out = scan_source(r#"<script type="application/json">{"a":1}</script>"#);
        assert!(out.inline.is_empty());
    }

    #[test]
    fn inline_style_is_a_css_inline_source() {
        let out = scan_source("<style>p { color: red; }</style>");
        assert_eq!(out.inline.len(), 1);
        assert_eq!(out.inline[0].language, Language::Css);
        assert_eq!(out.inline[0].tag, "style");
    }

    #[test]
    fn imports_are_emitted_in_document_order() {
        let out = scan_source(
            r#"<link rel="import" href="./a.html">
<link rel="import" href="./b.html">"#,
        );
        let urls: Vec<_> = out
            .features
            .iter()
            .filter_map(|f| match f {
                ScannedFeature::Import(i) => Some(i.url.as_str().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(urls, vec!["./a.html", "./b.html"]);
    }
}
