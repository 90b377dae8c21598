//! Pseudo-element scanner (script side)
//!
//! Standalone block comments annotated `@pseudoElement` document elements
//! with no class or call-form definition.

use super::{JsScanContext, JsScanner};
use crate::features::{ElementMembers, Privacy, ScannedElement, ScannedFeature};
use crate::jsdoc;
use crate::scanners::ScanOutput;

#[derive(Default)]
pub struct JsPseudoElementScanner {}

impl JsScanner for JsPseudoElementScanner {
    fn finish(&mut self, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        for comment in &ctx.doc.comments {
            if !comment.block || !comment.text.contains("@pseudoElement") {
                continue;
            }
            let parsed = jsdoc::parse(&comment.text);
            let Some(tag) = parsed.tag("pseudoElement") else {
                continue;
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
                range: ctx.doc.range_of_offsets(comment.start, comment.end),
                warnings: Vec::new(),
            }));
        }
    }
}
