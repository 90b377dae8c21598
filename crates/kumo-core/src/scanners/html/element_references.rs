//! Element reference scanner
//!
//! Records each use of a custom element (a tag name containing `-`) in
//! markup, with its authored attributes.

use super::HtmlScanner;
use crate::features::{Attribute, ScannedElementReference, ScannedFeature};
use crate::parser::html::NodeId;
use crate::parser::HtmlDocument;
use crate::scanners::ScanOutput;

/// Built-in hyphenated tags that are not custom element uses.
const EXCLUDED_TAGS: &[&str] = &["dom-module"];

#[derive(Default)]
pub struct ElementReferenceScanner {}

impl HtmlScanner for ElementReferenceScanner {
    fn enter_element(&mut self, id: NodeId, doc: &HtmlDocument, out: &mut ScanOutput) {
        let node = doc.tree.node(id);
        let Some(tag) = node.tag() else { return };
        if !tag.contains('-') || EXCLUDED_TAGS.contains(&tag) {
            return;
        }

        let attributes = node
            .attrs()
            .iter()
            .map(|attr| Attribute {
                name: attr.name.clone(),
                description: None,
                range: doc.range_of_offsets(attr.name_start, attr.name_end),
            })
            .collect();

        out.features
            .push(ScannedFeature::ElementReference(ScannedElementReference {
                tag_name: tag.to_string(),
                attributes,
                range: doc.node_range(id),
                warnings: Vec::new(),
            }));
    }
}

#[cfg(test)]
mod tests {
    use crate::features::ScannedFeature;
    use crate::scanners::html::test_support::scan_source;

    fn references(source: &str) -> Vec<String> {
        scan_source(source)
            .features
            .into_iter()
            .filter_map(|f| match f {
                ScannedFeature::ElementReference(r) => Some(r.tag_name),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn custom_element_use_is_recorded() {
        assert_eq!(
            references(r#"<x-card elevation="2"></x-card>"#),
            vec!["x-card"]
        );
    }

    #[test]
    fn standard_elements_are_not_references() {
        assert!(references("<div><p>x</p></div>").is_empty());
    }

    #[test]
    fn dom_module_is_not_a_reference() {
        assert!(references(r#"<dom-module id="x"></dom-module>"#).is_empty());
    }

    #[test]
    fn attributes_are_captured() {
        let out = scan_source(r#"<x-card elevation="2" raised></x-card>"#);
        let reference = out
            .features
            .iter()
            .find_map(|f| match f {
                ScannedFeature::ElementReference(r) => Some(r),
                _ => None,
            })
            .unwrap();
        let names: Vec<_> = reference.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["elevation", "raised"]);
    }
}
