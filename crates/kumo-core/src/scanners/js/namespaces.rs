//! Namespace scanner
//!
//! `@namespace`-annotated declarations become namespaces, named by the
//! annotation argument or by statically folding the declaration target.
//! Object-literal assignments onto a known namespace (`Foo.Bar = {...}`
//! after `Foo` was declared) are namespaces as well. A target that cannot
//! be statically named produces a warning carrying the source range.

use std::collections::HashSet;

use swc_common::Span;
use swc_ecma_ast::{
    AssignExpr, AssignTarget, Expr, MemberProp, SimpleAssignTarget, VarDeclarator,
};

use super::helpers::{assign_target_path, pat_name};
use super::{JsScanContext, JsScanner};
use crate::eval;
use crate::features::{ScannedFeature, ScannedNamespace};
use crate::jsdoc::JsDoc;
use crate::scanners::ScanOutput;
use crate::warnings::{codes, Warning};

#[derive(Default)]
pub struct NamespaceScanner {
    /// Names of namespaces declared earlier in this document.
    known: HashSet<String>,
}

impl NamespaceScanner {
    fn emit(
        &mut self,
        name: String,
        doc: &JsDoc,
        span: Span,
        ctx: &JsScanContext<'_>,
        out: &mut ScanOutput,
    ) {
        self.known.insert(name.clone());
        out.features.push(ScannedFeature::Namespace(ScannedNamespace {
            name,
            description: doc.description.clone(),
            summary: doc.summary(),
            range: ctx.range(span),
            warnings: Vec::new(),
        }));
    }

    fn parent_is_known(&self, path: &str) -> bool {
        path.rsplit_once('.')
            .map(|(parent, _)| self.known.contains(parent))
            .unwrap_or(false)
    }
}

impl JsScanner for NamespaceScanner {
    fn enter_var_declarator(
        &mut self,
        declarator: &VarDeclarator,
        stmt_span: Span,
        ctx: &JsScanContext<'_>,
        out: &mut ScanOutput,
    ) {
        let Some(doc) = ctx.jsdoc_for_span(stmt_span) else {
            return;
        };
        let Some(tag) = doc.tag("namespace") else { return };

        let name = tag.name.clone().or_else(|| pat_name(&declarator.name));
        match name {
            Some(name) => self.emit(name, &doc, declarator.span, ctx, out),
            None => out.warnings.push(Warning::warning(
                codes::DYNAMIC_NAMESPACE_NO_NAME,
                "Unable to determine name for @namespace",
                ctx.range(declarator.span),
            )),
        }
    }

    fn enter_assign(&mut self, assign: &AssignExpr, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        let doc = ctx.jsdoc_for_span(assign.span);
        let annotation = doc.as_ref().and_then(|d| d.tag("namespace"));

        let path = assign_target_path(&assign.left);

        if let Some(tag) = annotation {
            let name = tag.name.clone().or_else(|| path.clone());
            match name {
                Some(name) => {
                    let doc = doc.clone().unwrap_or_default();
                    self.emit(name, &doc, assign.span, ctx, out);
                }
                None => out.warnings.push(Warning::warning(
                    codes::DYNAMIC_NAMESPACE_NO_NAME,
                    "Unable to determine name for @namespace",
                    ctx.range(assign.span),
                )),
            }
            return;
        }

        // Unannotated object-literal assignments: a member of a known
        // namespace extends the namespace tree; a dynamically-subscripted
        // target cannot be named at all.
        if !matches!(assign.right.as_ref(), Expr::Object(_)) {
            return;
        }
        match path {
            Some(path) if self.parent_is_known(&path) => {
                let doc = doc.unwrap_or_default();
                self.emit(path, &doc, assign.span, ctx, out);
            }
            Some(_) => {}
            None => {
                if has_dynamic_subscript(&assign.left) {
                    out.warnings.push(Warning::warning(
                        codes::DYNAMIC_NAMESPACE_NO_NAME,
                        "Unable to determine name for @namespace",
                        ctx.range(assign.span),
                    ));
                }
            }
        }
    }
}

fn has_dynamic_subscript(target: &AssignTarget) -> bool {
    let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = target else {
        return false;
    };
    match &member.prop {
        MemberProp::Computed(computed) => eval::fold_string(&computed.expr).is_none(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanners::js::test_support::scan_source;

    fn namespaces(source: &str) -> Vec<ScannedNamespace> {
        scan_source(source)
            .features
            .into_iter()
            .filter_map(|f| match f {
                ScannedFeature::Namespace(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn annotated_var_declaration() {
        let found = namespaces("/** @namespace */ var Foo = {};");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Foo");
        assert!(found[0].warnings.is_empty());
    }

    #[test]
    fn member_of_known_namespace_extends_the_tree() {
        let found = namespaces("/** @namespace */ var Foo = {};\nFoo.Bar = { baz: 1 };");
        let names: Vec<_> = found.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Foo", "Foo.Bar"]);
        assert!(found.iter().all(|n| n.warnings.is_empty()));
    }

    #[test]
    fn nested_members_chain_through_the_tree() {
        let found = namespaces(
            "/** @namespace */ var Foo = {};\nFoo.Bar = {};\nFoo.Bar.Baz = {};",
        );
        let names: Vec<_> = found.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Foo", "Foo.Bar", "Foo.Bar.Baz"]);
    }

    #[test]
    fn unrelated_object_assignment_is_not_a_namespace() {
        assert!(namespaces("Unknown.Thing = { a: 1 };").is_empty());
    }

    #[test]
    fn annotation_name_argument_wins() {
        let found = namespaces("/** @namespace Fully.Qualified */ var FQ = {};");
        assert_eq!(found[0].name, "Fully.Qualified");
    }

    #[test]
    fn annotated_assignment_with_literal_subscript() {
        let found = namespaces("/** @namespace */ Foo['Bar'] = {};");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Foo.Bar");
    }

    #[test]
    fn dynamic_subscript_warns_without_name() {
        let out = scan_source("DynamicNamespace[baz] = { foo: 'bar' };");
        assert!(out
            .features
            .iter()
            .all(|f| !matches!(f, ScannedFeature::Namespace(_))));
        let warning = out
            .warnings
            .iter()
            .find(|w| w.code == codes::DYNAMIC_NAMESPACE_NO_NAME)
            .expect("dynamic namespace warning");
        assert!(warning
            .message
            .contains("Unable to determine name for @namespace"));
    }

    #[test]
    fn annotated_dynamic_target_with_name_argument_resolves() {
        let found = namespaces("/** @namespace Named.Space */ DynamicNamespace[baz] = {};");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Named.Space");
    }

    #[test]
    fn description_is_captured() {
        let found = namespaces("/** Utilities for flubbing.\n * @namespace */ var Flub = {};");
        assert!(found[0].description.contains("flubbing"));
    }
}
