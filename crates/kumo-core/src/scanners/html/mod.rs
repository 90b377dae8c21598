//! Markup scanners
//!
//! One traversal per document: `scan_html` walks the parse tree exactly
//! once, multiplexing enter (top-down) and leave (bottom-up) callbacks to
//! every registered scanner in registration order.

mod databinding;
mod dom_module;
mod element_references;
mod imports;
mod pseudo_elements;

pub use databinding::DatabindingScanner;
pub use dom_module::DomModuleScanner;
pub use element_references::ElementReferenceScanner;
pub use imports::HtmlImportScanner;
pub use pseudo_elements::PseudoElementScanner;

use super::ScanOutput;
use crate::parser::html::{HtmlNodeData, NodeId};
use crate::parser::HtmlDocument;

pub trait HtmlScanner {
    fn enter_element(&mut self, _id: NodeId, _doc: &HtmlDocument, _out: &mut ScanOutput) {}

    fn leave_element(&mut self, _id: NodeId, _doc: &HtmlDocument, _out: &mut ScanOutput) {}

    fn visit_text(&mut self, _id: NodeId, _doc: &HtmlDocument, _out: &mut ScanOutput) {}

    fn visit_comment(&mut self, _id: NodeId, _doc: &HtmlDocument, _out: &mut ScanOutput) {}

    /// Called once after the traversal, for scanners that accumulate.
    fn finish(&mut self, _doc: &HtmlDocument, _out: &mut ScanOutput) {}
}

pub fn scan_html(doc: &HtmlDocument) -> ScanOutput {
    let mut scanners: Vec<Box<dyn HtmlScanner>> = vec![
        Box::new(HtmlImportScanner::default()),
        Box::new(DomModuleScanner::default()),
        Box::new(DatabindingScanner::default()),
        Box::new(ElementReferenceScanner::default()),
        Box::new(PseudoElementScanner::default()),
    ];
    let mut out = ScanOutput::default();
    for &root in &doc.tree.roots {
        walk(root, doc, &mut scanners, &mut out);
    }
    for scanner in &mut scanners {
        scanner.finish(doc, &mut out);
    }
    out
}

fn walk(
    id: NodeId,
    doc: &HtmlDocument,
    scanners: &mut [Box<dyn HtmlScanner>],
    out: &mut ScanOutput,
) {
    match &doc.tree.node(id).data {
        HtmlNodeData::Element { children, .. } => {
            for scanner in scanners.iter_mut() {
                scanner.enter_element(id, doc, out);
            }
            // Children vectors are owned by the tree; clone the id list so
            // the tree stays borrowed immutably.
            let children = children.clone();
            for child in children {
                walk(child, doc, scanners, out);
            }
            for scanner in scanners.iter_mut() {
                scanner.leave_element(id, doc, out);
            }
        }
        HtmlNodeData::Text => {
            for scanner in scanners.iter_mut() {
                scanner.visit_text(id, doc, out);
            }
        }
        HtmlNodeData::Comment { .. } => {
            for scanner in scanners.iter_mut() {
                scanner.visit_comment(id, doc, out);
            }
        }
        HtmlNodeData::Doctype => {}
    }
}
