//! Markup parsing
//!
//! A byte-level tree parser for the HTML dialect the analyzer understands:
//! elements with attribute spans, text, comments, doctype, raw-text elements
//! (`<script>`, `<style>`) and void elements. The parser always produces a
//! tree; malformations are collected as recoverable errors with offsets.

use memchr::memchr;

pub type NodeId = usize;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone)]
pub struct HtmlAttr {
    /// Lowercased attribute name.
    pub name: String,
    pub value: Option<String>,
    pub name_start: usize,
    pub name_end: usize,
    /// Span of the value text, excluding quotes.
    pub value_span: Option<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub enum HtmlNodeData {
    Element {
        /// Lowercased tag name.
        tag: String,
        attrs: Vec<HtmlAttr>,
        children: Vec<NodeId>,
        /// Span of the element's content, between the open and close tags.
        content_start: usize,
        content_end: usize,
    },
    Text,
    Comment {
        text_start: usize,
        text_end: usize,
    },
    Doctype,
}

#[derive(Debug, Clone)]
pub struct HtmlNode {
    pub data: HtmlNodeData,
    pub parent: Option<NodeId>,
    pub start: usize,
    pub end: usize,
}

impl HtmlNode {
    pub fn tag(&self) -> Option<&str> {
        match &self.data {
            HtmlNodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attrs(&self) -> &[HtmlAttr] {
        match &self.data {
            HtmlNodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn attr(&self, name: &str) -> Option<&HtmlAttr> {
        self.attrs().iter().find(|a| a.name == name)
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|a| a.value.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct HtmlParseError {
    pub message: String,
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct HtmlTree {
    pub nodes: Vec<HtmlNode>,
    pub roots: Vec<NodeId>,
}

impl HtmlTree {
    pub fn node(&self, id: NodeId) -> &HtmlNode {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id].data {
            HtmlNodeData::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Nearest ancestor element satisfying the predicate.
    pub fn ancestor_where(
        &self,
        id: NodeId,
        mut pred: impl FnMut(&HtmlNode) -> bool,
    ) -> Option<NodeId> {
        let mut current = self.nodes[id].parent;
        while let Some(parent) = current {
            if pred(&self.nodes[parent]) {
                return Some(parent);
            }
            current = self.nodes[parent].parent;
        }
        None
    }
}

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

struct Parser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tree: HtmlTree,
    stack: Vec<NodeId>,
    errors: Vec<HtmlParseError>,
}

pub fn parse_html(source: &str) -> (HtmlTree, Vec<HtmlParseError>) {
    let mut parser = Parser {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        tree: HtmlTree::default(),
        stack: Vec::new(),
        errors: Vec::new(),
    };
    parser.run();
    (parser.tree, parser.errors)
}

impl<'a> Parser<'a> {
    fn run(&mut self) {
        let len = self.bytes.len();
        while self.pos < len {
            if self.bytes[self.pos] == b'<' {
                self.tag_open();
            } else {
                self.text();
            }
        }
        // Unclosed elements swallow the rest of the document.
        while let Some(open) = self.stack.pop() {
            self.close_element(open, len, len);
        }
    }

    fn text(&mut self) {
        let start = self.pos;
        let end = match memchr(b'<', &self.bytes[self.pos..]) {
            Some(delta) => self.pos + delta,
            None => self.bytes.len(),
        };
        self.pos = end;
        if end > start {
            self.push_node(HtmlNodeData::Text, start, end);
        }
    }

    fn tag_open(&mut self) {
        let start = self.pos;
        let rest = &self.source[self.pos..];

        if rest.starts_with("<!--") {
            self.comment(start);
        } else if rest.starts_with("<!") {
            self.doctype(start);
        } else if rest.starts_with("</") {
            self.closing_tag(start);
        } else if rest.len() > 1 && rest.as_bytes()[1].is_ascii_alphabetic() {
            self.element(start);
        } else {
            // A stray `<`; treat it as text.
            self.pos += 1;
            self.push_node(HtmlNodeData::Text, start, self.pos);
        }
    }

    fn comment(&mut self, start: usize) {
        let text_start = start + 4;
        match self.source[text_start..].find("-->") {
            Some(delta) => {
                let text_end = text_start + delta;
                self.pos = text_end + 3;
                self.push_node(
                    HtmlNodeData::Comment {
                        text_start,
                        text_end,
                    },
                    start,
                    self.pos,
                );
            }
            None => {
                self.error("unterminated comment", start);
                self.pos = self.bytes.len();
                self.push_node(
                    HtmlNodeData::Comment {
                        text_start,
                        text_end: self.pos,
                    },
                    start,
                    self.pos,
                );
            }
        }
    }

    fn doctype(&mut self, start: usize) {
        match memchr(b'>', &self.bytes[start..]) {
            Some(delta) => {
                self.pos = start + delta + 1;
                self.push_node(HtmlNodeData::Doctype, start, self.pos);
            }
            None => {
                self.error("unterminated doctype", start);
                self.pos = self.bytes.len();
            }
        }
    }

    fn closing_tag(&mut self, start: usize) {
        let name_start = start + 2;
        let name_end = self.scan_name(name_start);
        let tag = self.source[name_start..name_end].to_ascii_lowercase();
        self.pos = match memchr(b'>', &self.bytes[name_end..]) {
            Some(delta) => name_end + delta + 1,
            None => self.bytes.len(),
        };

        match self.stack.iter().rposition(|&id| {
            self.tree.nodes[id]
                .tag()
                .map(|t| t == tag)
                .unwrap_or(false)
        }) {
            Some(stack_idx) => {
                // Implicitly close anything opened since the matching tag.
                while self.stack.len() > stack_idx {
                    let open = self.stack.pop().expect("stack entry");
                    self.close_element(open, start, self.pos);
                }
            }
            None => self.error(&format!("unmatched closing tag </{tag}>"), start),
        }
    }

    fn element(&mut self, start: usize) {
        let name_start = start + 1;
        let name_end = self.scan_name(name_start);
        let tag = self.source[name_start..name_end].to_ascii_lowercase();
        self.pos = name_end;

        let attrs = self.attributes();
        let mut self_closing = false;
        if self.bytes.get(self.pos) == Some(&b'/') {
            self_closing = true;
            self.pos += 1;
        }
        if self.bytes.get(self.pos) == Some(&b'>') {
            self.pos += 1;
        } else {
            self.error(&format!("malformed tag <{tag}>"), start);
            self.pos = self.pos.min(self.bytes.len());
        }

        let content_start = self.pos;
        let id = self.push_node(
            HtmlNodeData::Element {
                tag: tag.clone(),
                attrs,
                children: Vec::new(),
                content_start,
                content_end: content_start,
            },
            start,
            content_start,
        );

        if self_closing || is_void_element(&tag) {
            return;
        }

        if is_raw_text_element(&tag) {
            self.raw_text(id, &tag, content_start);
            return;
        }

        self.stack.push(id);
    }

    /// Consume raw content up to the matching close tag, emitting it as a
    /// single text child.
    fn raw_text(&mut self, id: NodeId, tag: &str, content_start: usize) {
        let closer = format!("</{tag}");
        let lower = self.source[content_start..].to_ascii_lowercase();
        let content_end = match lower.find(&closer) {
            Some(delta) => content_start + delta,
            None => {
                self.error(&format!("unterminated <{tag}>"), content_start);
                self.bytes.len()
            }
        };
        if content_end > content_start {
            let text = self.push_node(HtmlNodeData::Text, content_start, content_end);
            self.tree.nodes[text].parent = Some(id);
            if let HtmlNodeData::Element { children, .. } = &mut self.tree.nodes[id].data {
                children.push(text);
            }
        }
        self.pos = match memchr(b'>', &self.bytes[content_end..]) {
            Some(delta) => content_end + delta + 1,
            None => self.bytes.len(),
        };
        self.seal_element(id, content_end, self.pos);
    }

    fn attributes(&mut self) -> Vec<HtmlAttr> {
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(&byte) = self.bytes.get(self.pos) else {
                break;
            };
            if byte == b'>' || byte == b'/' {
                break;
            }

            let name_start = self.pos;
            while let Some(&b) = self.bytes.get(self.pos) {
                if b.is_ascii_whitespace() || b == b'=' || b == b'>' || b == b'/' {
                    break;
                }
                self.pos += 1;
            }
            let name_end = self.pos;
            if name_end == name_start {
                // Unscannable byte; skip it so the loop advances.
                self.pos += 1;
                continue;
            }
            let name = self.source[name_start..name_end].to_ascii_lowercase();

            self.skip_whitespace();
            let (value, value_span) = if self.bytes.get(self.pos) == Some(&b'=') {
                self.pos += 1;
                self.skip_whitespace();
                self.attribute_value()
            } else {
                (None, None)
            };

            attrs.push(HtmlAttr {
                name,
                value,
                name_start,
                name_end,
                value_span,
            });
        }
        attrs
    }

    fn attribute_value(&mut self) -> (Option<String>, Option<(usize, usize)>) {
        match self.bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let value_start = self.pos + 1;
                let value_end = match memchr(quote, &self.bytes[value_start..]) {
                    Some(delta) => value_start + delta,
                    None => {
                        self.error("unterminated attribute value", self.pos);
                        self.bytes.len()
                    }
                };
                self.pos = (value_end + 1).min(self.bytes.len());
                (
                    Some(self.source[value_start..value_end].to_string()),
                    Some((value_start, value_end)),
                )
            }
            Some(_) => {
                let value_start = self.pos;
                while let Some(&b) = self.bytes.get(self.pos) {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    self.pos += 1;
                }
                (
                    Some(self.source[value_start..self.pos].to_string()),
                    Some((value_start, self.pos)),
                )
            }
            None => (None, None),
        }
    }

    fn scan_name(&self, start: usize) -> usize {
        let mut idx = start;
        while let Some(&b) = self.bytes.get(idx) {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' {
                idx += 1;
            } else {
                break;
            }
        }
        idx
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn push_node(&mut self, data: HtmlNodeData, start: usize, end: usize) -> NodeId {
        let parent = self.stack.last().copied();
        let id = self.tree.nodes.len();
        self.tree.nodes.push(HtmlNode {
            data,
            parent,
            start,
            end,
        });
        match parent {
            Some(p) => {
                if let HtmlNodeData::Element { children, .. } = &mut self.tree.nodes[p].data {
                    children.push(id);
                }
            }
            None => self.tree.roots.push(id),
        }
        id
    }

    fn close_element(&mut self, id: NodeId, content_end: usize, end: usize) {
        self.seal_element(id, content_end, end);
    }

    fn seal_element(&mut self, id: NodeId, content_end_at: usize, end: usize) {
        let node = &mut self.tree.nodes[id];
        node.end = end;
        if let HtmlNodeData::Element { content_end, .. } = &mut node.data {
            *content_end = content_end_at;
        }
    }

    fn error(&mut self, message: &str, offset: usize) {
        self.errors.push(HtmlParseError {
            message: message.to_string(),
            offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element<'t>(tree: &'t HtmlTree, tag: &str) -> &'t HtmlNode {
        tree.nodes
            .iter()
            .find(|n| n.tag() == Some(tag))
            .unwrap_or_else(|| panic!("no <{tag}> in tree"))
    }

    #[test]
    fn parses_nested_elements() {
        let (tree, errors) = parse_html("<div><span>hi</span></div>");
        assert!(errors.is_empty());

        let div = first_element(&tree, "div");
        assert_eq!(div.start, 0);
        assert_eq!(div.end, 26);

        let span = first_element(&tree, "span");
        assert_eq!(span.parent, Some(0));
        match &span.data {
            HtmlNodeData::Element {
                content_start,
                content_end,
                ..
            } => {
                assert_eq!((*content_start, *content_end), (11, 13));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_attributes_with_spans() {
        let source = r#"<link rel="import" href='./a.html'>"#;
        let (tree, errors) = parse_html(source);
        assert!(errors.is_empty());

        let link = first_element(&tree, "link");
        assert_eq!(link.attr_value("rel"), Some("import"));
        assert_eq!(link.attr_value("href"), Some("./a.html"));

        let href = link.attr("href").unwrap();
        let (vs, ve) = href.value_span.unwrap();
        assert_eq!(&source[vs..ve], "./a.html");
    }

    #[test]
    fn boolean_attribute_has_no_value() {
        let (tree, _) = parse_html("<script defer src=\"x.js\"></script>");
        let script = first_element(&tree, "script");
        assert!(script.attr("defer").unwrap().value.is_none());
        assert_eq!(script.attr_value("src"), Some("x.js"));
    }

    #[test]
    fn script_content_is_raw_text() {
        let source = "<script>if (a < b) { go(); }</script><p>after</p>";
        let (tree, errors) = parse_html(source);
        assert!(errors.is_empty());

        let script = first_element(&tree, "script");
        match &script.data {
            HtmlNodeData::Element {
                content_start,
                content_end,
                children,
                ..
            } => {
                assert_eq!(&source[*content_start..*content_end], "if (a < b) { go(); }");
                assert_eq!(children.len(), 1);
            }
            _ => unreachable!(),
        }
        assert!(tree.nodes.iter().any(|n| n.tag() == Some("p")));
    }

    #[test]
    fn void_elements_do_not_nest() {
        let (tree, errors) = parse_html("<div><br><img src=\"a.png\"><p>x</p></div>");
        assert!(errors.is_empty());
        let p = first_element(&tree, "p");
        let parent = p.parent.unwrap();
        assert_eq!(tree.node(parent).tag(), Some("div"));
    }

    #[test]
    fn comments_carry_text_spans() {
        let source = "<!-- @pseudoElement x-pseudo -->";
        let (tree, errors) = parse_html(source);
        assert!(errors.is_empty());
        match tree.nodes[0].data {
            HtmlNodeData::Comment {
                text_start,
                text_end,
            } => assert_eq!(&source[text_start..text_end], " @pseudoElement x-pseudo "),
            _ => unreachable!(),
        }
    }

    #[test]
    fn unmatched_close_tag_is_recoverable() {
        let (tree, errors) = parse_html("<div>text</span></div>");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("</span>"));
        assert!(tree.nodes.iter().any(|n| n.tag() == Some("div")));
    }

    #[test]
    fn unclosed_element_runs_to_end() {
        let (tree, _) = parse_html("<div><p>dangling");
        let div = first_element(&tree, "div");
        assert_eq!(div.end, 16);
    }

    #[test]
    fn mismatched_nesting_implicitly_closes() {
        let (tree, errors) = parse_html("<ul><li>one<li>two</ul>");
        assert!(errors.is_empty());
        // </ul> implicitly closes both dangling <li>s.
        let lis: Vec<_> = tree
            .nodes
            .iter()
            .filter(|n| n.tag() == Some("li"))
            .collect();
        assert_eq!(lis.len(), 2);
    }

    #[test]
    fn template_subtree_is_parsed() {
        let source = r#"<template is="dom-bind">Hello {{name}}!</template>"#;
        let (tree, errors) = parse_html(source);
        assert!(errors.is_empty());
        let template = first_element(&tree, "template");
        assert_eq!(template.attr_value("is"), Some("dom-bind"));
        assert_eq!(tree.children(0).len(), 1);
    }

    #[test]
    fn doctype_is_a_node() {
        let (tree, errors) = parse_html("<!DOCTYPE html><html></html>");
        assert!(errors.is_empty());
        assert!(matches!(tree.nodes[0].data, HtmlNodeData::Doctype));
    }
}
