//! Hoisted declaration collection.
//!
//! Walks a function or program body and yields every `var` declarator and
//! function declaration hoisted to that entity, in source order. Nested
//! function bodies are not entered; their declarations hoist to their own
//! entity.

use flatscript_ast::{ForInTarget, ForInit, Function, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Func,
}

/// One hoisted declaration of an entity.
#[derive(Debug, Clone, Copy)]
pub struct Decl<'a> {
    pub name: &'a str,
    pub kind: DeclKind,
    /// The declared function for `DeclKind::Func`.
    pub function: Option<&'a Function>,
}

/// Collect the hoisted declarations of a function or program body.
pub fn collect(body: &[Stmt]) -> Vec<Decl<'_>> {
    let mut out = Vec::new();
    for stmt in body {
        walk(stmt, &mut out);
    }
    out
}

fn walk<'a>(stmt: &'a Stmt, out: &mut Vec<Decl<'a>>) {
    match stmt {
        Stmt::VarDecl { declarations } => {
            for d in declarations {
                out.push(Decl {
                    name: &d.name,
                    kind: DeclKind::Var,
                    function: None,
                });
            }
        }
        Stmt::FunctionDecl { function } => {
            if let Some(name) = &function.id {
                out.push(Decl {
                    name,
                    kind: DeclKind::Func,
                    function: Some(function),
                });
            }
        }
        Stmt::Block { body } => {
            for s in body {
                walk(s, out);
            }
        }
        Stmt::If {
            consequent,
            alternate,
            ..
        } => {
            walk(consequent, out);
            if let Some(alt) = alternate {
                walk(alt, out);
            }
        }
        Stmt::Labeled { body, .. } => walk(body, out),
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } | Stmt::With { body, .. } => {
            walk(body, out);
        }
        Stmt::For { init, body, .. } => {
            if let Some(ForInit::Decl(declarations)) = init {
                for d in declarations {
                    out.push(Decl {
                        name: &d.name,
                        kind: DeclKind::Var,
                        function: None,
                    });
                }
            }
            walk(body, out);
        }
        Stmt::ForIn { left, body, .. } => {
            if let ForInTarget::Decl { declarations } = left {
                for d in declarations {
                    out.push(Decl {
                        name: &d.name,
                        kind: DeclKind::Var,
                        function: None,
                    });
                }
            }
            walk(body, out);
        }
        Stmt::Switch { cases, .. } => {
            for case in cases {
                for s in &case.consequent {
                    walk(s, out);
                }
            }
        }
        Stmt::Try {
            block,
            handlers,
            finalizer,
        } => {
            for s in block {
                walk(s, out);
            }
            for h in handlers {
                for s in &h.body {
                    walk(s, out);
                }
            }
            if let Some(fin) = finalizer {
                for s in fin {
                    walk(s, out);
                }
            }
        }
        Stmt::Empty
        | Stmt::Expr { .. }
        | Stmt::Return { .. }
        | Stmt::Debugger
        | Stmt::Throw { .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. } => {}
    }
}
