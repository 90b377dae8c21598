//! Shared extraction helpers for the script scanners.

use swc_common::Spanned;
use swc_ecma_ast::{
    Class, ClassMember, ClassMethod, Expr, Function, MethodKind, ObjectLit, Pat, Prop, PropName,
    PropOrSpread,
};

use super::JsScanContext;
use crate::eval;
use crate::features::{
    Attribute, ElementMembers, Method, MethodParam, Privacy, Property,
};
use crate::jsdoc::JsDoc;
use crate::warnings::{codes, Warning};

pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}

pub fn assign_target_path(target: &swc_ecma_ast::AssignTarget) -> Option<String> {
    use swc_ecma_ast::{AssignTarget, SimpleAssignTarget};
    match target {
        AssignTarget::Simple(SimpleAssignTarget::Ident(ident)) => Some(ident.id.sym.to_string()),
        AssignTarget::Simple(SimpleAssignTarget::Member(member)) => eval::member_expr_path(member),
        _ => None,
    }
}

pub fn pat_name(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(ident) => Some(ident.id.sym.to_string()),
        Pat::Assign(assign) => pat_name(&assign.left),
        Pat::Rest(rest) => pat_name(&rest.arg),
        _ => None,
    }
}

pub fn function_params(function: &Function) -> Vec<MethodParam> {
    function
        .params
        .iter()
        .enumerate()
        .map(|(idx, param)| MethodParam {
            name: pat_name(&param.pat).unwrap_or_else(|| format!("arg{idx}")),
            type_: None,
            description: None,
        })
        .collect()
}

/// Fill parameter types/descriptions from `@param` tags and return the
/// `@return`/`@returns` type and description.
pub fn apply_fn_docs(
    params: &mut [MethodParam],
    doc: &JsDoc,
) -> (Option<String>, Option<String>) {
    for tag in doc.tags_named("param") {
        let Some(name) = &tag.name else { continue };
        if let Some(param) = params.iter_mut().find(|p| &p.name == name) {
            param.type_ = tag.type_.clone();
            param.description = tag.description.clone();
        }
    }
    let ret = doc.tag("returns").or_else(|| doc.tag("return"));
    match ret {
        Some(tag) => (tag.type_.clone(), tag.description.clone()),
        None => (None, None),
    }
}

pub fn privacy_from_jsdoc(doc: &JsDoc, name: &str) -> Privacy {
    if doc.has("private") {
        Privacy::Private
    } else if doc.has("protected") {
        Privacy::Protected
    } else {
        Privacy::from_name(name)
    }
}

/// The expression returned by a getter body, when it has a single reachable
/// return.
pub fn getter_return_expr(function: &Function) -> Option<&Expr> {
    let body = function.body.as_ref()?;
    body.stmts.iter().find_map(|stmt| match stmt {
        swc_ecma_ast::Stmt::Return(ret) => ret.arg.as_deref(),
        _ => None,
    })
}

/// Class-level extraction shared by the element and mixin scanners: members,
/// the tag name from a `static get is()` getter, and any attribute warnings.
pub struct ClassScan {
    pub members: ElementMembers,
    pub tag_name: Option<String>,
    pub warnings: Vec<Warning>,
}

pub fn scan_class_members(class: &Class, ctx: &JsScanContext<'_>) -> ClassScan {
    let mut scan = ClassScan {
        members: ElementMembers::default(),
        tag_name: None,
        warnings: Vec::new(),
    };

    for member in &class.body {
        let ClassMember::Method(method) = member else {
            continue;
        };
        let Some(name) = prop_name(&method.key) else {
            continue;
        };

        if method.is_static && method.kind == MethodKind::Getter {
            match name.as_str() {
                "is" => {
                    scan.tag_name = getter_return_expr(&method.function).and_then(eval::fold_string);
                }
                "observedAttributes" => {
                    scan_observed_attributes(method, ctx, &mut scan);
                }
                "properties" => {
                    if let Some(Expr::Object(obj)) = getter_return_expr(&method.function) {
                        scan.members.properties = object_properties(obj, ctx);
                    }
                }
                _ => {}
            }
            continue;
        }

        if !method.is_static && method.kind == MethodKind::Method {
            scan.members.methods.push(method_from_function(
                &name,
                &method.function,
                ctx,
                method.key.span(),
            ));
        }
    }

    scan
}

fn scan_observed_attributes(method: &ClassMethod, ctx: &JsScanContext<'_>, scan: &mut ClassScan) {
    let Some(Expr::Array(array)) = getter_return_expr(&method.function) else {
        return;
    };
    for elem in array.elems.iter().flatten() {
        match eval::fold_string(&elem.expr) {
            Some(name) => {
                let span = elem.expr.span();
                let (lo, _) = ctx.doc.span_offsets(span);
                let description = ctx
                    .doc
                    .attached_comment(lo)
                    .map(|c| crate::jsdoc::parse(&c.text).description);
                scan.members.attributes.push(Attribute {
                    name,
                    description,
                    range: ctx.range(span),
                });
            }
            None => scan.warnings.push(Warning::warning(
                codes::INVALID_ATTRIBUTE,
                "observedAttributes entries must be string literals",
                ctx.range(elem.expr.span()),
            )),
        }
    }
}

/// Properties from a `properties` object: `{ name: String }` or
/// `{ name: { type: String, ... } }` forms.
pub fn object_properties(obj: &ObjectLit, ctx: &JsScanContext<'_>) -> Vec<Property> {
    let mut out = Vec::new();
    for prop in &obj.props {
        let PropOrSpread::Prop(prop) = prop else { continue };
        let Prop::KeyValue(kv) = prop.as_ref() else { continue };
        let Some(name) = prop_name(&kv.key) else { continue };

        let type_ = match kv.value.as_ref() {
            Expr::Ident(ident) => Some(ident.sym.to_string()),
            Expr::Object(value_obj) => value_obj.props.iter().find_map(|p| {
                let PropOrSpread::Prop(p) = p else { return None };
                let Prop::KeyValue(type_kv) = p.as_ref() else {
                    return None;
                };
                if prop_name(&type_kv.key).as_deref() != Some("type") {
                    return None;
                }
                match type_kv.value.as_ref() {
                    Expr::Ident(ident) => Some(ident.sym.to_string()),
                    _ => None,
                }
            }),
            _ => None,
        };

        let span = kv.key.span();
        let (lo, _) = ctx.doc.span_offsets(span);
        let description = ctx
            .doc
            .attached_comment(lo)
            .map(|c| crate::jsdoc::parse(&c.text).description);

        out.push(Property {
            privacy: Privacy::from_name(&name),
            name,
            type_,
            description,
            range: ctx.range(span),
        });
    }
    out
}

/// Members from a Polymer call-form or behavior object literal: the
/// `properties` key plus method-valued entries. Polymer plumbing keys are
/// not members.
pub fn polymer_object_members(obj: &ObjectLit, ctx: &JsScanContext<'_>) -> ElementMembers {
    const PLUMBING: &[&str] = &["is", "behaviors", "observers", "listeners", "hostAttributes"];
    let mut members = ElementMembers::default();

    for prop in &obj.props {
        let PropOrSpread::Prop(prop) = prop else { continue };
        match prop.as_ref() {
            Prop::KeyValue(kv) => {
                let Some(name) = prop_name(&kv.key) else { continue };
                if name == "properties" {
                    if let Expr::Object(properties) = kv.value.as_ref() {
                        members.properties = object_properties(properties, ctx);
                    }
                } else if !PLUMBING.contains(&name.as_str()) {
                    if let Expr::Fn(fn_expr) = kv.value.as_ref() {
                        members.methods.push(method_from_function(
                            &name,
                            &fn_expr.function,
                            ctx,
                            kv.key.span(),
                        ));
                    }
                }
            }
            Prop::Method(method) => {
                let Some(name) = prop_name(&method.key) else { continue };
                if !PLUMBING.contains(&name.as_str()) {
                    members.methods.push(method_from_function(
                        &name,
                        &method.function,
                        ctx,
                        method.key.span(),
                    ));
                }
            }
            _ => {}
        }
    }
    members
}

fn method_from_function(
    name: &str,
    function: &Function,
    ctx: &JsScanContext<'_>,
    key_span: swc_common::Span,
) -> Method {
    let (lo, _) = ctx.doc.span_offsets(key_span);
    let doc = ctx
        .doc
        .attached_comment(lo)
        .map(|c| crate::jsdoc::parse(&c.text))
        .unwrap_or_default();

    let mut params = function_params(function);
    let (return_type, return_description) = apply_fn_docs(&mut params, &doc);

    Method {
        privacy: privacy_from_jsdoc(&doc, name),
        name: name.to_string(),
        params,
        return_type,
        return_description,
        description: (!doc.description.is_empty()).then(|| doc.description.clone()),
        range: ctx.range(function.span),
    }
}
