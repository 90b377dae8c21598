//! Function scanner
//!
//! Free functions become features when their documentation places them in a
//! namespace with `@memberof` (and they are not mixin functions). Covers
//! named function declarations, variable-bound function expressions,
//! function-valued assignments, and object methods.

use swc_common::Span;
use swc_ecma_ast::{
    AssignExpr, AssignTarget, Expr, FnDecl, Prop, SimpleAssignTarget, VarDeclarator,
};

use super::helpers::{apply_fn_docs, function_params, pat_name, privacy_from_jsdoc, prop_name};
use super::{JsScanContext, JsScanner};
use crate::eval;
use crate::features::{MethodParam, ScannedFeature, ScannedFunction};
use crate::jsdoc::{JsDoc, MIXIN_TAGS};
use crate::scanners::ScanOutput;

#[derive(Default)]
pub struct FunctionScanner {}

impl FunctionScanner {
    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        local_name: &str,
        mut params: Vec<MethodParam>,
        doc: &JsDoc,
        span: Span,
        ctx: &JsScanContext<'_>,
        out: &mut ScanOutput,
    ) {
        let Some(namespace) = doc.tag("memberof").and_then(|t| t.name.clone()) else {
            return;
        };
        if doc.has_any(MIXIN_TAGS) {
            return;
        }

        let (return_type, return_description) = apply_fn_docs(&mut params, doc);
        out.features.push(ScannedFeature::Function(ScannedFunction {
            privacy: privacy_from_jsdoc(doc, local_name),
            name: format!("{namespace}.{local_name}"),
            params,
            return_type,
            return_description,
            description: doc.description.clone(),
            summary: doc.summary(),
            range: ctx.range(span),
            warnings: Vec::new(),
        }));
    }

    fn params_of(expr: &Expr) -> Option<Vec<MethodParam>> {
        match expr {
            Expr::Fn(fn_expr) => Some(function_params(&fn_expr.function)),
            Expr::Arrow(arrow) => Some(
                arrow
                    .params
                    .iter()
                    .enumerate()
                    .map(|(idx, pat)| MethodParam {
                        name: pat_name(pat).unwrap_or_else(|| format!("arg{idx}")),
                        type_: None,
                        description: None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl JsScanner for FunctionScanner {
    fn enter_fn_decl(&mut self, decl: &FnDecl, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        let Some(doc) = ctx.jsdoc_for_span(decl.function.span) else {
            return;
        };
        self.emit(
            &decl.ident.sym,
            function_params(&decl.function),
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
        let Some(params) = Self::params_of(init) else {
            return;
        };
        let Some(name) = pat_name(&declarator.name) else {
            return;
        };
        let Some(doc) = ctx.jsdoc_for_span(stmt_span) else {
            return;
        };
        self.emit(&name, params, &doc, declarator.span, ctx, out);
    }

    fn enter_assign(&mut self, assign: &AssignExpr, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        let Some(params) = Self::params_of(&assign.right) else {
            return;
        };
        let path = match &assign.left {
            AssignTarget::Simple(SimpleAssignTarget::Ident(ident)) => ident.id.sym.to_string(),
            AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
                match eval::member_expr_path(member) {
                    Some(path) => path,
                    None => return,
                }
            }
            _ => return,
        };
        let local_name = path.rsplit('.').next().unwrap_or(&path).to_string();
        let Some(doc) = ctx.jsdoc_for_span(assign.span) else {
            return;
        };
        self.emit(&local_name, params, &doc, assign.span, ctx, out);
    }

    fn enter_object_member(&mut self, prop: &Prop, ctx: &JsScanContext<'_>, out: &mut ScanOutput) {
        use swc_common::Spanned;
        let (name, params, span) = match prop {
            Prop::Method(method) => {
                let Some(name) = prop_name(&method.key) else {
                    return;
                };
                (name, function_params(&method.function), method.key.span())
            }
            Prop::KeyValue(kv) => {
                let Some(name) = prop_name(&kv.key) else { return };
                let Some(params) = Self::params_of(&kv.value) else {
                    return;
                };
                (name, params, kv.key.span())
            }
            _ => return,
        };
        let (lo, _) = ctx.doc.span_offsets(span);
        let Some(comment) = ctx.doc.attached_comment(lo) else {
            return;
        };
        let doc = crate::jsdoc::parse(&comment.text);
        self.emit(&name, params, &doc, span, ctx, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Privacy;
    use crate::scanners::js::test_support::scan_source;

    fn functions(source: &str) -> Vec<ScannedFunction> {
        scan_source(source)
            .features
            .into_iter()
            .filter_map(|f| match f {
                ScannedFeature::Function(func) => Some(func),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn memberof_function_declaration_is_scanned() {
        let found = functions(
            r#"/**
 * Greets a person.
 * @memberof Foo.Utils
 * @param {string} name who to greet
 * @return {string} the greeting
 */
function greet(name) { return 'hi ' + name; }"#,
        );
        assert_eq!(found.len(), 1);
        let func = &found[0];
        assert_eq!(func.name, "Foo.Utils.greet");
        assert_eq!(func.params.len(), 1);
        assert_eq!(func.params[0].type_.as_deref(), Some("string"));
        assert_eq!(func.return_type.as_deref(), Some("string"));
        assert!(func.description.contains("Greets"));
    }

    #[test]
    fn undocumented_function_is_not_scanned() {
        assert!(functions("function plain() {}").is_empty());
    }

    #[test]
    fn function_without_memberof_is_not_scanned() {
        assert!(functions("/** Just docs. */\nfunction plain() {}").is_empty());
    }

    #[test]
    fn mixin_function_is_excluded() {
        let found = functions(
            r#"/**
 * @memberof Foo
 * @mixinFunction
 */
function MyMixin(base) { return class extends base {}; }"#,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn variable_bound_arrow_function() {
        let found = functions(
            r#"/**
 * @memberof Foo
 */
const sum = (a, b) => a + b;"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Foo.sum");
        assert_eq!(found[0].params.len(), 2);
    }

    #[test]
    fn function_valued_assignment() {
        let found = functions(
            r#"/**
 * @memberof Foo.Utils
 */
Foo.Utils.clamp = function(value, lo, hi) { return value; };"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Foo.Utils.clamp");
        assert_eq!(found[0].params.len(), 3);
    }

    #[test]
    fn object_method_with_memberof() {
        let found = functions(
            r#"var api = {
  /**
   * @memberof Foo.Api
   */
  fetchAll: function() {}
};"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Foo.Api.fetchAll");
    }

    #[test]
    fn underscore_name_is_private() {
        let found = functions("/** @memberof Foo */\nfunction _hidden() {}");
        assert_eq!(found[0].privacy, Privacy::Private);
    }
}
