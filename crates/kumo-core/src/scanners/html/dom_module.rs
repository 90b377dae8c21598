//! dom-module scanner
//!
//! A `<dom-module id="x-el">` binds a template (and its `<slot>`s) to an
//! element declared elsewhere; the association is made during element
//! resolution via a `dom-module` kind lookup.

use super::HtmlScanner;
use crate::features::{ScannedDomModule, ScannedFeature, Slot};
use crate::parser::html::NodeId;
use crate::parser::HtmlDocument;
use crate::scanners::ScanOutput;

#[derive(Default)]
pub struct DomModuleScanner {
    /// Stack of open dom-modules being collected.
    open: Vec<PendingModule>,
}

struct PendingModule {
    node: NodeId,
    id: Option<String>,
    slots: Vec<Slot>,
}

impl HtmlScanner for DomModuleScanner {
    fn enter_element(&mut self, id: NodeId, doc: &HtmlDocument, _out: &mut ScanOutput) {
        let node = doc.tree.node(id);
        match node.tag() {
            Some("dom-module") => {
                self.open.push(PendingModule {
                    node: id,
                    id: node.attr_value("id").map(String::from),
                    slots: Vec::new(),
                });
            }
            Some("slot") => {
                if let Some(module) = self.open.last_mut() {
                    module.slots.push(Slot {
                        name: node.attr_value("name").map(String::from),
                        range: doc.node_range(id),
                    });
                }
            }
            _ => {}
        }
    }

    fn leave_element(&mut self, id: NodeId, doc: &HtmlDocument, out: &mut ScanOutput) {
        if self.open.last().map(|m| m.node) != Some(id) {
            return;
        }
        let module = self.open.pop().expect("open dom-module");
        out.features.push(ScannedFeature::DomModule(ScannedDomModule {
            id: module.id,
            slots: module.slots,
            range: doc.node_range(id),
            warnings: Vec::new(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use crate::features::ScannedFeature;
    use crate::scanners::html::test_support::scan_source;

    #[test]
    fn scans_dom_module_with_id() {
        let out = scan_source(r#"<dom-module id="x-el"><template></template></dom-module>"#);
        let module = out
            .features
            .iter()
            .find_map(|f| match f {
                ScannedFeature::DomModule(m) => Some(m),
                _ => None,
            })
            .expect("dom-module scanned");
        assert_eq!(module.id.as_deref(), Some("x-el"));
        assert!(module.slots.is_empty());
    }

    #[test]
    fn collects_slots_inside_module_template() {
        let out = scan_source(
            r#"<dom-module id="x-card">
  <template>
    <slot name="header"></slot>
    <slot></slot>
  </template>
</dom-module>"#,
        );
        let module = out
            .features
            .iter()
            .find_map(|f| match f {
                ScannedFeature::DomModule(m) => Some(m),
                _ => None,
            })
            .unwrap();
        assert_eq!(module.slots.len(), 2);
        assert_eq!(module.slots[0].name.as_deref(), Some("header"));
        assert!(module.slots[1].name.is_none());
    }

    #[test]
    fn slot_outside_dom_module_is_ignored() {
        let out = scan_source("<slot name=\"x\"></slot>");
        assert!(out
            .features
            .iter()
            .all(|f| !matches!(f, ScannedFeature::DomModule(_))));
    }
}
