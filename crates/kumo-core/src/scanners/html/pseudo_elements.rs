//! Pseudo-element scanner (markup side)
//!
//! An HTML comment annotated `@pseudoElement` documents an element with no
//! class or call-form definition, e.g. browser-provided shadow parts.

use super::HtmlScanner;
use crate::features::{ElementMembers, Privacy, ScannedElement, ScannedFeature};
use crate::jsdoc;
use crate::parser::html::{HtmlNodeData, NodeId};
use crate::parser::HtmlDocument;
use crate::scanners::ScanOutput;

#[derive(Default)]
pub struct PseudoElementScanner {}

impl HtmlScanner for PseudoElementScanner {
    fn visit_comment(&mut self, id: NodeId, doc: &HtmlDocument, out: &mut ScanOutput) {
        let node = doc.tree.node(id);
        let HtmlNodeData::Comment {
            text_start,
            text_end,
        } = node.data
        else {
            return;
        };
        let text = doc.text_of(text_start, text_end);
        if !text.contains("@pseudoElement") {
            return;
        }
        let parsed = jsdoc::parse(text);
        let Some(tag) = parsed.tag("pseudoElement") else {
            return;
        };

        out.features.push(ScannedFeature::Element(ScannedElement {
            tag_name: tag.name.clone(),
            class_name: None,
            superclass: None,
            mixins: Vec::new(),
            behaviors: Vec::new(),
            members: ElementMembers::default(),
            demos: Vec::new(),
            description: parsed.description.clone(),
            summary: parsed.summary(),
            privacy: Privacy::Public,
            pseudo: true,
            range: doc.node_range(id),
            warnings: Vec::new(),
        }));
    }
}
