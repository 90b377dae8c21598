//! Behavior scanner
//!
//! `@polymerBehavior`-annotated object assignments and declarations become
//! behaviors. The object payload is read the same way as a `Polymer({...})`
//! configuration: a `properties` key plus method-valued entries.

use swc_common::Span;
use swc_ecma_ast::{AssignExpr, Expr, VarDeclarator};

use super::helpers::{assign_target_path, pat_name, polymer_object_members};
use super::{JsScanContext, JsScanner};
use crate::features::{ElementMembers, Event, ScannedBehavior, ScannedFeature};
use crate::jsdoc::{JsDoc, BEHAVIOR_TAG};
use crate::scanners::ScanOutput;

#[derive(Default)]
pub struct BehaviorScanner {}

impl BehaviorScanner {
    fn emit(
        &self,
        name: String,
        value: Option<&Expr>,
        doc: &JsDoc,
        span: Span,
        ctx: &JsScanContext<'_>,
        out: &mut ScanOutput,
    ) {
        let range = ctx.range(span);
        let mut members = match value {
            Some(Expr::Object(obj)) => polymer_object_members(obj, ctx),
            _ => ElementMembers::default(),
        };
        members.events = doc
            .tags_named("event")
            .filter_map(|tag| {
                tag.name.as_ref().map(|event_name| Event {
                    name: event_name.clone(),
                    description: tag.description.clone(),
                    range: range.clone(),
                })
            })
            .collect();

        out.features.push(ScannedFeature::Behavior(ScannedBehavior {
            name,
            members,
            description: doc.description.clone(),
            summary: doc.summary(),
            range,
            warnings: Vec::new(),
        }));
    }
}

impl JsScanner for BehaviorScanner {
    fn enter_assign(&mut self, assign: &AssignExpr, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        let Some(doc) = ctx.jsdoc_for_span(assign.span) else {
            return;
        };
        let Some(tag) = doc.tag(BEHAVIOR_TAG) else { return };

        let name = tag
            .name
            .clone()
            .or_else(|| assign_target_path(&assign.left));
        if let Some(name) = name {
            self.emit(name, Some(assign.right.as_ref()), &doc, assign.span, ctx, out);
        }
    }

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
        let Some(tag) = doc.tag(BEHAVIOR_TAG) else { return };

        let name = tag.name.clone().or_else(|| pat_name(&declarator.name));
        if let Some(name) = name {
            self.emit(
                name,
                declarator.init.as_deref(),
                &doc,
                declarator.span,
                ctx,
                out,
            );
        }
    }
}
