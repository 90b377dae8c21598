//! Element mixin scanner
//!
//! A `@mixinFunction` (legacy `@polymerMixin`) function takes a base class
//! and returns an extended one. Members are read from the returned class
//! expression when one is statically visible.

use swc_common::Span;
use swc_ecma_ast::{
    AssignExpr, BlockStmtOrExpr, Class, Expr, FnDecl, Function, Stmt, VarDeclarator,
};

use super::helpers::{assign_target_path, pat_name, privacy_from_jsdoc, scan_class_members};
use super::{JsScanContext, JsScanner};
use crate::features::{ElementMembers, ScannedElementMixin, ScannedFeature};
use crate::jsdoc::{JsDoc, MIXIN_TAGS};
use crate::scanners::ScanOutput;

#[derive(Default)]
pub struct MixinScanner {}

impl MixinScanner {
    fn emit(
        &self,
        name: String,
        returned_class: Option<&Class>,
        doc: &JsDoc,
        span: Span,
        ctx: &JsScanContext<'_>,
        out: &mut ScanOutput,
    ) {
        let (members, warnings) = match returned_class {
            Some(class) => {
                let scan = scan_class_members(class, ctx);
                (scan.members, scan.warnings)
            }
            None => (ElementMembers::default(), Vec::new()),
        };

        out.features.push(ScannedFeature::ElementMixin(ScannedElementMixin {
            privacy: privacy_from_jsdoc(doc, &name),
            name,
            members,
            description: doc.description.clone(),
            summary: doc.summary(),
            range: ctx.range(span),
            warnings,
        }));
    }
}

/// The class expression a mixin function returns, when statically visible.
fn returned_class(function: &Function) -> Option<&Class> {
    let body = function.body.as_ref()?;
    body.stmts.iter().find_map(|stmt| match stmt {
        Stmt::Return(ret) => match ret.arg.as_deref() {
            Some(Expr::Class(class_expr)) => Some(&*class_expr.class),
            _ => None,
        },
        _ => None,
    })
}

fn returned_class_of_expr(expr: &Expr) -> Option<&Class> {
    match expr {
        Expr::Fn(fn_expr) => returned_class(&fn_expr.function),
        Expr::Arrow(arrow) => match arrow.body.as_ref() {
            BlockStmtOrExpr::Expr(body) => match body.as_ref() {
                Expr::Class(class_expr) => Some(&*class_expr.class),
                _ => None,
            },
            BlockStmtOrExpr::BlockStmt(block) => block.stmts.iter().find_map(|stmt| match stmt {
                Stmt::Return(ret) => match ret.arg.as_deref() {
                    Some(Expr::Class(class_expr)) => Some(&*class_expr.class),
                    _ => None,
                },
                _ => None,
            }),
        },
        _ => None,
    }
}

impl JsScanner for MixinScanner {
    fn enter_fn_decl(&mut self, decl: &FnDecl, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        let Some(doc) = ctx.jsdoc_for_span(decl.function.span) else {
            return;
        };
        if !doc.has_any(MIXIN_TAGS) {
            return;
        }
        self.emit(
            decl.ident.sym.to_string(),
            returned_class(&decl.function),
            &doc,
            decl.function.span,
            ctx,
            out,
        );
    }

    fn enter_var_declarator(
        &mut self,
        declarator: &VarDeclarator,
        stmt_span: Span,
        ctx: &JsScanContext<'_>,
        out: &mut ScanOutput,
    ) {
        let Some(init) = &declarator.init else { return };
        let Some(doc) = ctx.jsdoc_for_span(stmt_span) else {
            return;
        };
        if !doc.has_any(MIXIN_TAGS) {
            return;
        }
        let Some(name) = pat_name(&declarator.name) else {
            return;
        };
        self.emit(
            name,
            returned_class_of_expr(init),
            &doc,
            declarator.span,
            ctx,
            out,
        );
    }

    fn enter_assign(&mut self, assign: &AssignExpr, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        let Some(doc) = ctx.jsdoc_for_span(assign.span) else {
            return;
        };
        if !doc.has_any(MIXIN_TAGS) {
            return;
        }
        let Some(name) = assign_target_path(&assign.left) else {
            return;
        };
        self.emit(
            name,
            returned_class_of_expr(&assign.right),
            &doc,
            assign.span,
            ctx,
            out,
        );
    }
}
