//! Script scanners
//!
//! A single traversal per parsed script multiplexes enter callbacks
//! (top-down) and class leave callbacks (bottom-up) to every registered
//! scanner in registration order. Scanners accumulate their own state and
//! emit features either during traversal or in `finish`.

pub mod behaviors;
pub mod elements;
pub mod functions;
mod helpers;
pub mod mixins;
pub mod namespaces;
pub mod pseudo_elements;

pub use behaviors::BehaviorScanner;
pub use elements::ElementScanner;
pub use functions::FunctionScanner;
pub use mixins::MixinScanner;
pub use namespaces::NamespaceScanner;
pub use pseudo_elements::JsPseudoElementScanner;

use swc_common::Span;
use swc_ecma_ast::{
    AssignExpr, BlockStmtOrExpr, Callee, Class, ClassMember, Decl, Expr, FnDecl, Ident,
    ModuleDecl, ModuleItem, Program, Prop, PropOrSpread, Stmt, VarDeclarator,
};

use super::ScanOutput;
use crate::jsdoc::{self, JsDoc};
use crate::parser::JsDocument;
use crate::warnings::SourceRange;

pub struct JsScanContext<'a> {
    pub doc: &'a JsDocument,
}

impl<'a> JsScanContext<'a> {
    pub fn range(&self, span: Span) -> SourceRange {
        self.doc.range_of_span(span)
    }

    /// Doc comment attached to the node starting at `span`, parsed.
    pub fn jsdoc_for_span(&self, span: Span) -> Option<JsDoc> {
        let (lo, _) = self.doc.span_offsets(span);
        self.doc
            .attached_comment(lo)
            .map(|comment| jsdoc::parse(&comment.text))
    }
}

pub trait JsScanner {
    fn enter_class(
        &mut self,
        _class: &Class,
        _name: Option<&Ident>,
        _ctx: &JsScanContext<'_>,
        _out: &mut ScanOutput,
    ) {
    }

    fn leave_class(&mut self, _class: &Class, _ctx: &JsScanContext<'_>, _out: &mut ScanOutput) {}

    fn enter_call(
        &mut self,
        _call: &swc_ecma_ast::CallExpr,
        _ctx: &JsScanContext<'_>,
        _out: &mut ScanOutput,
    ) {
    }

    fn enter_assign(
        &mut self,
        _assign: &AssignExpr,
        _ctx: &JsScanContext<'_>,
        _out: &mut ScanOutput,
    ) {
    }

    fn enter_fn_decl(&mut self, _decl: &FnDecl, _ctx: &JsScanContext<'_>, _out: &mut ScanOutput) {}

    /// `stmt_span` is the span of the containing `var`/`let`/`const`
    /// statement, where the doc comment attaches.
    fn enter_var_declarator(
        &mut self,
        _declarator: &VarDeclarator,
        _stmt_span: Span,
        _ctx: &JsScanContext<'_>,
        _out: &mut ScanOutput,
    ) {
    }

    fn enter_object_member(
        &mut self,
        _prop: &Prop,
        _ctx: &JsScanContext<'_>,
        _out: &mut ScanOutput,
    ) {
    }

    fn finish(&mut self, _ctx: &JsScanContext<'_>, _out: &mut ScanOutput) {}
}

pub fn scan_js(doc: &JsDocument) -> ScanOutput {
    let ctx = JsScanContext { doc };
    let mut scanners: Vec<Box<dyn JsScanner>> = vec![
        Box::new(ElementScanner::default()),
        Box::new(MixinScanner::default()),
        Box::new(NamespaceScanner::default()),
        Box::new(BehaviorScanner::default()),
        Box::new(FunctionScanner::default()),
        Box::new(JsPseudoElementScanner::default()),
    ];
    let mut out = ScanOutput::default();
    {
        let mut walker = Walker {
            ctx: &ctx,
            scanners: &mut scanners,
            out: &mut out,
        };
        match &doc.program {
            Program::Module(module) => {
                for item in &module.body {
                    walker.module_item(item);
                }
            }
            Program::Script(script) => {
                for stmt in &script.body {
                    walker.stmt(stmt);
                }
            }
        }
    }
    for scanner in &mut scanners {
        scanner.finish(&ctx, &mut out);
    }
    out
}

struct Walker<'w, 'a> {
    ctx: &'w JsScanContext<'a>,
    scanners: &'w mut Vec<Box<dyn JsScanner>>,
    out: &'w mut ScanOutput,
}

impl Walker<'_, '_> {
    fn module_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::ModuleDecl(decl) => match decl {
                ModuleDecl::ExportDecl(export) => self.decl(&export.decl),
                ModuleDecl::ExportDefaultExpr(export) => self.expr(&export.expr),
                _ => {}
            },
            ModuleItem::Stmt(stmt) => self.stmt(stmt),
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.decl(decl),
            Stmt::Expr(expr_stmt) => self.expr(&expr_stmt.expr),
            Stmt::Block(block) => {
                for s in &block.stmts {
                    self.stmt(s);
                }
            }
            Stmt::If(if_stmt) => {
                self.expr(&if_stmt.test);
                self.stmt(&if_stmt.cons);
                if let Some(alt) = &if_stmt.alt {
                    self.stmt(alt);
                }
            }
            Stmt::Return(ret) => {
                if let Some(arg) = &ret.arg {
                    self.expr(arg);
                }
            }
            Stmt::While(w) => {
                self.expr(&w.test);
                self.stmt(&w.body);
            }
            Stmt::DoWhile(w) => {
                self.stmt(&w.body);
                self.expr(&w.test);
            }
            Stmt::For(f) => {
                match &f.init {
                    Some(swc_ecma_ast::VarDeclOrExpr::Expr(e)) => self.expr(e),
                    Some(swc_ecma_ast::VarDeclOrExpr::VarDecl(v)) => {
                        self.decl(&Decl::Var(v.clone()))
                    }
                    None => {}
                }
                if let Some(test) = &f.test {
                    self.expr(test);
                }
                if let Some(update) = &f.update {
                    self.expr(update);
                }
                self.stmt(&f.body);
            }
            Stmt::ForIn(f) => {
                self.expr(&f.right);
                self.stmt(&f.body);
            }
            Stmt::ForOf(f) => {
                self.expr(&f.right);
                self.stmt(&f.body);
            }
            Stmt::Try(t) => {
                for s in &t.block.stmts {
                    self.stmt(s);
                }
                if let Some(handler) = &t.handler {
                    for s in &handler.body.stmts {
                        self.stmt(s);
                    }
                }
                if let Some(finalizer) = &t.finalizer {
                    for s in &finalizer.stmts {
                        self.stmt(s);
                    }
                }
            }
            Stmt::Switch(s) => {
                self.expr(&s.discriminant);
                for case in &s.cases {
                    for stmt in &case.cons {
                        self.stmt(stmt);
                    }
                }
            }
            Stmt::Labeled(l) => self.stmt(&l.body),
            Stmt::Throw(t) => self.expr(&t.arg),
            _ => {}
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Class(class_decl) => {
                self.class(&class_decl.class, Some(&class_decl.ident));
            }
            Decl::Fn(fn_decl) => {
                for scanner in self.scanners.iter_mut() {
                    scanner.enter_fn_decl(fn_decl, self.ctx, self.out);
                }
                if let Some(body) = &fn_decl.function.body {
                    for s in &body.stmts {
                        self.stmt(s);
                    }
                }
            }
            Decl::Var(var_decl) => {
                for declarator in &var_decl.decls {
                    for scanner in self.scanners.iter_mut() {
                        scanner.enter_var_declarator(declarator, var_decl.span, self.ctx, self.out);
                    }
                    if let Some(init) = &declarator.init {
                        self.expr(init);
                    }
                }
            }
            _ => {}
        }
    }

    fn class(&mut self, class: &Class, name: Option<&Ident>) {
        for scanner in self.scanners.iter_mut() {
            scanner.enter_class(class, name, self.ctx, self.out);
        }
        for member in &class.body {
            match member {
                ClassMember::Method(method) => {
                    if let Some(body) = &method.function.body {
                        for s in &body.stmts {
                            self.stmt(s);
                        }
                    }
                }
                ClassMember::Constructor(ctor) => {
                    if let Some(body) = &ctor.body {
                        for s in &body.stmts {
                            self.stmt(s);
                        }
                    }
                }
                ClassMember::ClassProp(prop) => {
                    if let Some(value) = &prop.value {
                        self.expr(value);
                    }
                }
                _ => {}
            }
        }
        for scanner in self.scanners.iter_mut() {
            scanner.leave_class(class, self.ctx, self.out);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Call(call) => {
                for scanner in self.scanners.iter_mut() {
                    scanner.enter_call(call, self.ctx, self.out);
                }
                if let Callee::Expr(callee) = &call.callee {
                    self.expr(callee);
                }
                for arg in &call.args {
                    self.expr(&arg.expr);
                }
            }
            Expr::Assign(assign) => {
                for scanner in self.scanners.iter_mut() {
                    scanner.enter_assign(assign, self.ctx, self.out);
                }
                self.expr(&assign.right);
            }
            Expr::Object(object) => {
                for prop in &object.props {
                    if let PropOrSpread::Prop(prop) = prop {
                        for scanner in self.scanners.iter_mut() {
                            scanner.enter_object_member(prop, self.ctx, self.out);
                        }
                        match prop.as_ref() {
                            Prop::KeyValue(kv) => self.expr(&kv.value),
                            Prop::Method(method) => {
                                if let Some(body) = &method.function.body {
                                    for s in &body.stmts {
                                        self.stmt(s);
                                    }
                                }
                            }
                            Prop::Getter(getter) => {
                                if let Some(body) = &getter.body {
                                    for s in &body.stmts {
                                        self.stmt(s);
                                    }
                                }
                            }
                            Prop::Setter(setter) => {
                                if let Some(body) = &setter.body {
                                    for s in &body.stmts {
                                        self.stmt(s);
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            Expr::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.expr(&elem.expr);
                }
            }
            Expr::Fn(fn_expr) => {
                if let Some(body) = &fn_expr.function.body {
                    for s in &body.stmts {
                        self.stmt(s);
                    }
                }
            }
            Expr::Arrow(arrow) => match arrow.body.as_ref() {
                BlockStmtOrExpr::BlockStmt(block) => {
                    for s in &block.stmts {
                        self.stmt(s);
                    }
                }
                BlockStmtOrExpr::Expr(e) => self.expr(e),
            },
            Expr::Class(class_expr) => {
                self.class(&class_expr.class, class_expr.ident.as_ref());
            }
            Expr::Paren(paren) => self.expr(&paren.expr),
            Expr::Member(member) => self.expr(&member.obj),
            Expr::Cond(cond) => {
                self.expr(&cond.test);
                self.expr(&cond.cons);
                self.expr(&cond.alt);
            }
            Expr::Bin(bin) => {
                self.expr(&bin.left);
                self.expr(&bin.right);
            }
            Expr::Unary(unary) => self.expr(&unary.arg),
            Expr::New(new) => {
                self.expr(&new.callee);
                if let Some(args) = &new.args {
                    for arg in args {
                        self.expr(&arg.expr);
                    }
                }
            }
            Expr::Seq(seq) => {
                for e in &seq.exprs {
                    self.expr(e);
                }
            }
            Expr::Tpl(tpl) => {
                for e in &tpl.exprs {
                    self.expr(e);
                }
            }
            Expr::Await(await_expr) => self.expr(&await_expr.arg),
            _ => {}
        }
    }
}
