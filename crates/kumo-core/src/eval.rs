//! Limited static evaluation
//!
//! Folds exactly what feature extraction needs: string literals, template
//! literals without substitutions, and member chains with identifier or
//! literal-string subscripts. Anything else declines by returning `None`.

use swc_ecma_ast::{Expr, Lit, MemberExpr, MemberProp};

/// Fold an expression to a string value.
pub fn fold_string(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() && tpl.quasis.len() == 1 => tpl.quasis[0]
            .cooked
            .as_ref()
            .map(|cooked| cooked.to_string()),
        Expr::Paren(paren) => fold_string(&paren.expr),
        _ => None,
    }
}

/// Fold the static name of an expression: `Foo`, `Foo.Bar.baz`, or
/// `Foo['Bar']` (literal subscripts only) become dotted paths.
pub fn member_path(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => member_expr_path(member),
        Expr::Paren(paren) => member_path(&paren.expr),
        _ => None,
    }
}

pub fn member_expr_path(member: &MemberExpr) -> Option<String> {
    let base = member_path(&member.obj)?;
    let segment = match &member.prop {
        MemberProp::Ident(ident) => ident.sym.to_string(),
        MemberProp::Computed(computed) => fold_string(&computed.expr)?,
        MemberProp::PrivateName(_) => return None,
    };
    Some(format!("{base}.{segment}"))
}
