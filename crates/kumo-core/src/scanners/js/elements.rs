//! Element scanner
//!
//! Finds custom elements in both their forms: class declarations and
//! expressions (annotated, carrying a `static get is()` getter, or bound by
//! `customElements.define`), and the legacy `Polymer({...})` call form with
//! behaviors. Also picks up `Polymer.Base._addFeature` core features.

use std::collections::HashSet;

use swc_ecma_ast::{CallExpr, Callee, Class, Expr, Ident};

use super::helpers::{polymer_object_members, scan_class_members};
use super::{JsScanContext, JsScanner};
use crate::eval;
use crate::features::{
    kinds, Demo, Event, Privacy, ScannedElement, ScannedFeature, ScannedPolymerCoreFeature,
    ScannedReference,
};
use crate::jsdoc::{JsDoc, ELEMENT_TAGS};
use crate::scanners::ScanOutput;
use crate::warnings::{codes, SourceRange, Warning};

/// Superclasses that are platform-provided rather than analyzable features.
const BUILTIN_SUPERCLASSES: &[&str] = &["HTMLElement", "Polymer.Element"];

#[derive(Default)]
pub struct ElementScanner {
    candidates: Vec<Candidate>,
    /// `customElements.define(tag, ClassName)` bindings, applied at finish.
    defines: Vec<(String, String)>,
    /// Class expressions already consumed by a surrounding `define` call.
    consumed_classes: HashSet<u32>,
}

struct Candidate {
    element: ScannedElement,
    class_name: Option<String>,
    /// Emit even without a tag name (annotated or defined).
    emit: bool,
}

impl ElementScanner {
    fn scan_class(
        &mut self,
        class: &Class,
        name: Option<&Ident>,
        doc: &JsDoc,
        ctx: &JsScanContext<'_>,
    ) -> Candidate {
        let range = ctx.range(class.span);
        let scan = scan_class_members(class, ctx);
        let mut warnings = scan.warnings;

        let (mut superclass, mut mixins) = superclass_and_mixins(class, ctx);

        // The @extends annotation wins over the extends clause.
        if let Some(extends) = doc.tag("extends") {
            match &extends.name {
                Some(id) => {
                    superclass = Some(ScannedReference::new(kinds::ELEMENT, id.clone(), range.clone()));
                }
                None => warnings.push(Warning::warning(
                    codes::CLASS_EXTENDS_ANNOTATION_NO_ID,
                    "@extends annotation is missing an identifier",
                    range.clone(),
                )),
            }
        }

        for tag in doc.tags_named("appliesMixin").chain(doc.tags_named("mixes")) {
            if let Some(id) = &tag.name {
                mixins.push(ScannedReference::new(
                    kinds::ELEMENT_MIXIN,
                    id.clone(),
                    range.clone(),
                ));
            }
        }

        let class_name = name.map(|ident| ident.sym.to_string());
        let annotated = doc.has_any(ELEMENT_TAGS);
        let mut members = scan.members;
        members.events = events_from(doc, &range);
        let element = ScannedElement {
            tag_name: scan.tag_name.clone(),
            class_name: class_name.clone(),
            superclass,
            mixins,
            behaviors: Vec::new(),
            members,
            demos: demos_from(doc),
            description: doc.description.clone(),
            summary: doc.summary(),
            privacy: privacy_from(doc),
            pseudo: false,
            range,
            warnings,
        };

        Candidate {
            emit: annotated || element.tag_name.is_some(),
            element,
            class_name,
        }
    }

    fn scan_polymer_call(&mut self, call: &CallExpr, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        let range = ctx.range(call.span);
        let Some(Expr::Object(config)) = call.args.first().map(|a| a.expr.as_ref()) else {
            out.warnings.push(Warning::warning(
                codes::INVALID_POLYMER_CALL,
                "Polymer() must be passed an object literal",
                range,
            ));
            return;
        };

        let mut warnings = Vec::new();
        let tag_name = object_string_value(config, "is");
        if tag_name.is_none() {
            warnings.push(Warning::warning(
                codes::INVALID_POLYMER_CALL,
                "Polymer() call has no 'is' property; the element cannot be registered",
                range.clone(),
            ));
        }

        let behaviors = behavior_references(config, ctx, &mut warnings);
        let mut members = polymer_object_members(config, ctx);

        let (lo, _) = ctx.doc.span_offsets(call.span);
        let doc = ctx
            .doc
            .attached_comment(lo)
            .map(|c| crate::jsdoc::parse(&c.text))
            .unwrap_or_default();
        members.events = events_from(&doc, &range);

        self.candidates.push(Candidate {
            element: ScannedElement {
                tag_name,
                class_name: None,
                superclass: None,
                mixins: Vec::new(),
                behaviors,
                members,
                demos: demos_from(&doc),
                description: doc.description.clone(),
                summary: doc.summary(),
                privacy: Privacy::Public,
                pseudo: false,
                range,
                warnings,
            },
            class_name: None,
            emit: true,
        });
    }
}

impl JsScanner for ElementScanner {
    fn enter_class(
        &mut self,
        class: &Class,
        name: Option<&Ident>,
        ctx: &JsScanContext<'_>,
        _out: &mut ScanOutput,
    ) {
        if self.consumed_classes.contains(&class.span.lo.0) {
            return;
        }
        let doc = ctx.jsdoc_for_span(class.span).unwrap_or_default();
        let candidate = self.scan_class(class, name, &doc, ctx);
        self.candidates.push(candidate);
    }

    fn enter_call(&mut self, call: &CallExpr, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        let Callee::Expr(callee) = &call.callee else {
            return;
        };
        let path = eval::member_path(callee);

        match path.as_deref() {
            Some("Polymer") => self.scan_polymer_call(call, ctx, out),
            Some("Polymer.Base._addFeature") => {
                if let Some(Expr::Object(config)) = call.args.first().map(|a| a.expr.as_ref()) {
                    let (lo, _) = ctx.doc.span_offsets(call.span);
                    let doc = ctx
                        .doc
                        .attached_comment(lo)
                        .map(|c| crate::jsdoc::parse(&c.text))
                        .unwrap_or_default();
                    out.features.push(ScannedFeature::PolymerCoreFeature(
                        ScannedPolymerCoreFeature {
                            description: doc.description,
                            members: polymer_object_members(config, ctx),
                            range: ctx.range(call.span),
                            warnings: Vec::new(),
                        },
                    ));
                }
            }
            Some(p) if p.ends_with("customElements.define") => {
                let Some(tag) = call
                    .args
                    .first()
                    .and_then(|a| eval::fold_string(&a.expr))
                else {
                    return;
                };
                match call.args.get(1).map(|a| a.expr.as_ref()) {
                    Some(Expr::Ident(class_ident)) => {
                        self.defines.push((tag, class_ident.sym.to_string()));
                    }
                    Some(Expr::Class(class_expr)) => {
                        self.consumed_classes.insert(class_expr.class.span.lo.0);
                        let doc = ctx.jsdoc_for_span(call.span).unwrap_or_default();
                        let mut candidate = self.scan_class(
                            &class_expr.class,
                            class_expr.ident.as_ref(),
                            &doc,
                            ctx,
                        );
                        candidate.element.tag_name.get_or_insert(tag);
                        candidate.emit = true;
                        self.candidates.push(candidate);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn finish(&mut self, _ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        for (tag, class_name) in self.defines.drain(..) {
            if let Some(candidate) = self
                .candidates
                .iter_mut()
                .find(|c| c.class_name.as_deref() == Some(class_name.as_str()))
            {
                candidate.element.tag_name.get_or_insert(tag);
                candidate.emit = true;
            }
        }
        for candidate in self.candidates.drain(..) {
            if candidate.emit {
                out.features.push(ScannedFeature::Element(candidate.element));
            }
        }
    }
}

/// Unwrap `extends MixinA(MixinB(Base))`: each call layer is a mixin
/// reference; the innermost non-call expression names the superclass.
fn superclass_and_mixins(
    class: &Class,
    ctx: &JsScanContext<'_>,
) -> (Option<ScannedReference>, Vec<ScannedReference>) {
    let mut mixins = Vec::new();
    let Some(super_class) = &class.super_class else {
        return (None, mixins);
    };

    let mut expr: &Expr = super_class;
    loop {
        match expr {
            Expr::Call(call) => {
                if let Callee::Expr(callee) = &call.callee {
                    if let Some(path) = eval::member_path(callee) {
                        mixins.push(ScannedReference::new(
                            kinds::ELEMENT_MIXIN,
                            path,
                            ctx.range(call.span),
                        ));
                    }
                }
                match call.args.first() {
                    Some(arg) => expr = &arg.expr,
                    None => return (None, mixins),
                }
            }
            other => {
                let superclass = eval::member_path(other)
                    .filter(|path| !BUILTIN_SUPERCLASSES.contains(&path.as_str()))
                    .map(|path| {
                        ScannedReference::new(kinds::ELEMENT, path, ctx.range(class.span))
                    });
                return (superclass, mixins);
            }
        }
    }
}

fn behavior_references(
    config: &swc_ecma_ast::ObjectLit,
    ctx: &JsScanContext<'_>,
    warnings: &mut Vec<Warning>,
) -> Vec<ScannedReference> {
    use swc_common::Spanned;
    use swc_ecma_ast::{Prop, PropOrSpread};

    let mut refs = Vec::new();
    for prop in &config.props {
        let PropOrSpread::Prop(prop) = prop else { continue };
        let Prop::KeyValue(kv) = prop.as_ref() else { continue };
        if super::helpers::prop_name(&kv.key).as_deref() != Some("behaviors") {
            continue;
        }
        let Expr::Array(array) = kv.value.as_ref() else {
            continue;
        };
        for elem in array.elems.iter().flatten() {
            match eval::member_path(&elem.expr) {
                Some(path) => refs.push(ScannedReference::new(
                    kinds::BEHAVIOR,
                    path,
                    ctx.range(elem.expr.span()),
                )),
                None => warnings.push(Warning::warning(
                    codes::INVALID_POLYMER_CALL,
                    "could not determine behavior name statically",
                    ctx.range(elem.expr.span()),
                )),
            }
        }
    }
    refs
}

fn object_string_value(obj: &swc_ecma_ast::ObjectLit, key: &str) -> Option<String> {
    use swc_ecma_ast::{Prop, PropOrSpread};
    obj.props.iter().find_map(|prop| {
        let PropOrSpread::Prop(prop) = prop else {
            return None;
        };
        let Prop::KeyValue(kv) = prop.as_ref() else {
            return None;
        };
        if super::helpers::prop_name(&kv.key).as_deref() != Some(key) {
            return None;
        }
        eval::fold_string(&kv.value)
    })
}

fn demos_from(doc: &JsDoc) -> Vec<Demo> {
    doc.tags_named("demo")
        .filter_map(|tag| {
            tag.name.as_ref().map(|url| Demo {
                url: url.clone(),
                description: tag.description.clone(),
            })
        })
        .collect()
}

fn privacy_from(doc: &JsDoc) -> Privacy {
    if doc.has("private") {
        Privacy::Private
    } else if doc.has("protected") {
        Privacy::Protected
    } else {
        Privacy::Public
    }
}

/// Events come from `@event` annotations on the element's doc comment.
fn events_from(doc: &JsDoc, range: &SourceRange) -> Vec<Event> {
    doc.tags_named("event")
        .filter_map(|tag| {
            tag.name.as_ref().map(|name| Event {
                name: name.clone(),
                description: tag.description.clone(),
                range: range.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanners::js::test_support::scan_source;

    fn elements(source: &str) -> Vec<ScannedElement> {
        scan_source(source)
            .features
            .into_iter()
            .filter_map(|f| match f {
                ScannedFeature::Element(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn class_with_static_is_getter() {
        let found = elements(
            r#"class El extends HTMLElement {
  static get is() { return 'x-el'; }
}"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag_name.as_deref(), Some("x-el"));
        assert_eq!(found[0].class_name.as_deref(), Some("El"));
        assert!(found[0].superclass.is_none());
    }

    #[test]
    fn annotated_class_without_tag_is_still_an_element() {
        let found = elements("/** @customElement */\nclass Base extends HTMLElement {}");
        assert_eq!(found.len(), 1);
        assert!(found[0].tag_name.is_none());
        assert_eq!(found[0].class_name.as_deref(), Some("Base"));
    }

    #[test]
    fn legacy_polymer_element_annotation_is_a_synonym() {
        let found = elements("/** @polymerElement */\nclass Base extends HTMLElement {}");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn unannotated_class_without_tag_is_not_emitted() {
        assert!(elements("class Plain {}").is_empty());
    }

    #[test]
    fn define_binds_tag_to_class() {
        let found = elements(
            r#"class El extends HTMLElement {}
customElements.define('x-el', El);"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag_name.as_deref(), Some("x-el"));
        assert_eq!(found[0].class_name.as_deref(), Some("El"));
    }

    #[test]
    fn define_with_inline_class_expression() {
        let found = elements(
            "customElements.define('x-inline', class extends HTMLElement {});",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag_name.as_deref(), Some("x-inline"));
        assert!(found[0].class_name.is_none());
    }

    #[test]
    fn window_qualified_define_is_recognized() {
        let found = elements(
            r#"class El extends HTMLElement {}
window.customElements.define('x-el', El);"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag_name.as_deref(), Some("x-el"));
    }

    #[test]
    fn mixin_chain_in_extends_clause() {
        let found = elements(
            r#"/** @customElement */
class El extends MixinA(MixinB(BaseEl)) {}"#,
        );
        assert_eq!(found.len(), 1);
        let mixin_ids: Vec<_> = found[0].mixins.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(mixin_ids, vec!["MixinA", "MixinB"]);
        assert_eq!(
            found[0].superclass.as_ref().unwrap().identifier,
            "BaseEl"
        );
    }

    #[test]
    fn html_element_superclass_is_not_a_reference() {
        let found = elements(
            "/** @customElement */\nclass El extends HTMLElement {}",
        );
        assert!(found[0].superclass.is_none());
    }

    #[test]
    fn extends_annotation_wins_over_clause() {
        let found = elements(
            r#"/**
 * @customElement
 * @extends AnnotatedBase
 */
class El extends ClauseBase {}"#,
        );
        assert_eq!(
            found[0].superclass.as_ref().unwrap().identifier,
            "AnnotatedBase"
        );
    }

    #[test]
    fn extends_annotation_without_id_warns_and_keeps_clause() {
        let found = elements(
            r#"/**
 * @customElement
 * @extends
 */
class El extends ClauseBase {}"#,
        );
        assert_eq!(
            found[0].superclass.as_ref().unwrap().identifier,
            "ClauseBase"
        );
        assert!(found[0]
            .warnings
            .iter()
            .any(|w| w.code == codes::CLASS_EXTENDS_ANNOTATION_NO_ID));
    }

    #[test]
    fn observed_attributes_with_docs() {
        let found = elements(
            r#"class El extends HTMLElement {
  static get is() { return 'x-el'; }
  static get observedAttributes() {
    return [
      /** When set, the element is disabled. */
      'disabled',
      'label'
    ];
  }
}"#,
        );
        let attrs = &found[0].members.attributes;
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "disabled");
        assert!(attrs[0]
            .description
            .as_deref()
            .unwrap()
            .contains("disabled"));
        assert!(attrs[1].description.is_none());
    }

    #[test]
    fn non_literal_observed_attribute_warns() {
        let found = elements(
            r#"class El extends HTMLElement {
  static get is() { return 'x-el'; }
  static get observedAttributes() { return [DYNAMIC]; }
}"#,
        );
        assert!(found[0]
            .warnings
            .iter()
            .any(|w| w.code == codes::INVALID_ATTRIBUTE));
    }

    #[test]
    fn class_properties_and_methods() {
        let found = elements(
            r#"class El extends HTMLElement {
  static get is() { return 'x-el'; }
  static get properties() {
    return {
      label: String,
      _count: { type: Number }
    };
  }
  /** Re-renders the element. */
  render() {}
  _update(value) {}
}"#,
        );
        let members = &found[0].members;
        assert_eq!(members.properties.len(), 2);
        assert_eq!(members.properties[0].type_.as_deref(), Some("String"));
        assert_eq!(members.properties[1].type_.as_deref(), Some("Number"));
        assert_eq!(members.properties[1].privacy, Privacy::Private);

        assert_eq!(members.methods.len(), 2);
        assert_eq!(members.methods[0].name, "render");
        assert!(members.methods[0].description.is_some());
        assert_eq!(members.methods[1].privacy, Privacy::Private);
    }

    #[test]
    fn polymer_call_form() {
        let found = elements(
            r#"Polymer({
  is: 'x-legacy',
  behaviors: [My.Behavior, Other.Behavior],
  properties: { value: Number },
  reset: function() {}
});"#,
        );
        assert_eq!(found.len(), 1);
        let element = &found[0];
        assert_eq!(element.tag_name.as_deref(), Some("x-legacy"));
        let behavior_ids: Vec<_> = element
            .behaviors
            .iter()
            .map(|b| b.identifier.as_str())
            .collect();
        assert_eq!(behavior_ids, vec!["My.Behavior", "Other.Behavior"]);
        assert_eq!(element.members.properties.len(), 1);
        assert_eq!(element.members.methods.len(), 1);
        assert_eq!(element.members.methods[0].name, "reset");
    }

    #[test]
    fn polymer_call_without_object_warns() {
        let out = scan_source("Polymer();");
        assert!(out
            .warnings
            .iter()
            .any(|w| w.code == codes::INVALID_POLYMER_CALL));
        assert!(out
            .features
            .iter()
            .all(|f| !matches!(f, ScannedFeature::Element(_))));
    }

    #[test]
    fn polymer_call_without_is_warns_on_element() {
        let found = elements("Polymer({ properties: {} });");
        assert_eq!(found.len(), 1);
        assert!(found[0].tag_name.is_none());
        assert!(found[0]
            .warnings
            .iter()
            .any(|w| w.code == codes::INVALID_POLYMER_CALL));
    }

    #[test]
    fn core_feature_call_is_scanned() {
        let out = scan_source("Polymer.Base._addFeature({ _marshalArgs: function() {} });");
        assert!(out
            .features
            .iter()
            .any(|f| matches!(f, ScannedFeature::PolymerCoreFeature(_))));
    }

    #[test]
    fn demo_annotations_are_collected() {
        let found = elements(
            r#"/**
 * @customElement
 * @demo demo/index.html Shows the basics
 */
class El extends HTMLElement {}"#,
        );
        assert_eq!(found[0].demos.len(), 1);
        assert_eq!(found[0].demos[0].url, "demo/index.html");
    }
}
