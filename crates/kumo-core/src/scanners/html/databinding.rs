//! Databinding expression scanner
//!
//! Walks `<template>` subtrees that are databound (`is="dom-bind"`,
//! `dom-if`, `dom-repeat`, or parented by a `dom-module`) and extracts
//! `{{expr}}` and `[[expr]]` occurrences from text nodes and attribute
//! values with a linear scan. An opener without a matching closer ends the
//! scan of that string; it was not a binding.

use super::HtmlScanner;
use crate::features::{
    BindingDirection, DatabindingInto, ScannedDatabinding, ScannedFeature,
};
use crate::parser::html::NodeId;
use crate::parser::{js, HtmlDocument};
use crate::scanners::ScanOutput;
use crate::warnings::{codes, Warning};

const DATABOUND_IS: &[&str] = &["dom-bind", "dom-if", "dom-repeat"];

#[derive(Default)]
pub struct DatabindingScanner {
    /// Stack of template nodes whose subtrees are being scanned.
    active_templates: Vec<NodeId>,
}

impl DatabindingScanner {
    fn is_databound_template(&self, id: NodeId, doc: &HtmlDocument) -> bool {
        let node = doc.tree.node(id);
        if node.tag() != Some("template") {
            return false;
        }
        if matches!(node.attr_value("is"), Some(is) if DATABOUND_IS.contains(&is)) {
            return true;
        }
        doc.tree
            .ancestor_where(id, |n| n.tag() == Some("dom-module"))
            .is_some()
    }

    fn active(&self) -> bool {
        !self.active_templates.is_empty()
    }

    fn extract(
        &self,
        text: &str,
        base_offset: usize,
        is_attribute_value: bool,
        doc: &HtmlDocument,
        out: &mut ScanOutput,
    ) {
        let bytes = text.as_bytes();
        let mut cursor = 0;
        while cursor + 1 < bytes.len() {
            let opener = match find_opener(bytes, cursor) {
                Some(found) => found,
                None => return,
            };
            let (open_idx, direction) = opener;
            let closer_pat: &[u8] = match direction {
                BindingDirection::TwoWay => b"}}",
                BindingDirection::OneWay => b"]]",
            };
            let Some(close_idx) = find_subslice(bytes, closer_pat, open_idx + 2) else {
                // No closer anywhere after the opener: the opener was not a
                // binding, and neither is anything after it.
                return;
            };
            let close_end = close_idx + 2;

            let raw_expr = &text[open_idx + 2..close_idx];
            let (expression_text, event_name) = match direction {
                BindingDirection::TwoWay => match raw_expr.split_once("::") {
                    Some((expr, event)) => (expr.to_string(), Some(event.to_string())),
                    None => (raw_expr.to_string(), None),
                },
                BindingDirection::OneWay => (raw_expr.to_string(), None),
            };

            let into = if is_attribute_value && open_idx == 0 && close_end == text.len() {
                DatabindingInto::Attribute
            } else {
                DatabindingInto::StringInterpolation
            };

            let range =
                doc.range_of_offsets(base_offset + open_idx, base_offset + close_end);
            let mut warnings = Vec::new();
            if let Err(message) = js::parse_expression(&expression_text) {
                warnings.push(Warning::warning(
                    codes::INVALID_DATABINDING,
                    format!("invalid databinding expression: {message}"),
                    range.clone(),
                ));
            }

            out.features.push(ScannedFeature::Databinding(ScannedDatabinding {
                expression_text,
                direction,
                event_name,
                into,
                range,
                warnings,
            }));

            cursor = close_end;
        }
    }
}

fn find_opener(bytes: &[u8], from: usize) -> Option<(usize, BindingDirection)> {
    let mut idx = from;
    while idx + 1 < bytes.len() {
        match (bytes[idx], bytes[idx + 1]) {
            (b'{', b'{') => return Some((idx, BindingDirection::TwoWay)),
            (b'[', b'[') => return Some((idx, BindingDirection::OneWay)),
            _ => idx += 1,
        }
    }
    None
}

fn find_subslice(bytes: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|p| p + from)
}

impl HtmlScanner for DatabindingScanner {
    fn enter_element(&mut self, id: NodeId, doc: &HtmlDocument, out: &mut ScanOutput) {
        let entering_databound =
            self.is_databound_template(id, doc) || (self.active() && doc.tree.node(id).tag() == Some("template"));
        if entering_databound {
            self.active_templates.push(id);
        }
        if !self.active() {
            return;
        }

        let node = doc.tree.node(id);
        for attr in node.attrs() {
            let (Some(value), Some((value_start, _))) = (&attr.value, attr.value_span) else {
                continue;
            };
            self.extract(value, value_start, true, doc, out);
        }
    }

    fn leave_element(&mut self, id: NodeId, _doc: &HtmlDocument, _out: &mut ScanOutput) {
        if self.active_templates.last() == Some(&id) {
            self.active_templates.pop();
        }
    }

    fn visit_text(&mut self, id: NodeId, doc: &HtmlDocument, out: &mut ScanOutput) {
        if !self.active() {
            return;
        }
        let node = doc.tree.node(id);
        let text = doc.text_of(node.start, node.end);
        self.extract(text, node.start, false, doc, out);
    }
}
