//! Test helpers: normalization shorthands and normal-form checkers.

use std::collections::HashSet;

use flatscript_ast::factory::function;
use flatscript_ast::{AssignOp, BinaryOp, Expr, Function, Program, PropertyKind, Stmt, UnaryOp};

use crate::{Options, normalize_function, normalize_program};

pub fn norm_fn(params: &[&str], body: Vec<Stmt>) -> Function {
    norm_fn_opts(params, body, Options::default())
}

pub fn norm_fn_opts(params: &[&str], body: Vec<Stmt>, opts: Options) -> Function {
    let fun = function(Some("f"), params, body);
    normalize_function(&fun, &opts).expect("normalization succeeds")
}

pub fn norm_fn_src(params: &[&str], body: Vec<Stmt>) -> String {
    norm_fn(params, body).to_string()
}

pub fn norm_fn_opts_src(params: &[&str], body: Vec<Stmt>, opts: Options) -> String {
    norm_fn_opts(params, body, opts).to_string()
}

pub fn norm_prog(body: Vec<Stmt>) -> Program {
    norm_prog_opts(body, Options::default())
}

pub fn norm_prog_opts(body: Vec<Stmt>, opts: Options) -> Program {
    normalize_program(&Program { body }, &opts).expect("normalization succeeds")
}

pub fn norm_prog_src(body: Vec<Stmt>) -> String {
    norm_prog(body).to_string()
}

pub fn norm_prog_opts_src(body: Vec<Stmt>, opts: Options) -> String {
    norm_prog_opts(body, opts).to_string()
}

fn is_atom(e: &Expr) -> bool {
    e.is_atom()
}

fn member_of_atoms(e: &Expr) -> bool {
    match e {
        Expr::Member {
            object, property, ..
        } => is_atom(object) && is_atom(property),
        _ => false,
    }
}

/// Check the output invariants: every operation has only atomic operands,
/// the lowered constructs (`switch`, `with`, `for`, `do-while`, sequence,
/// conditional and logical expressions, updates) are gone, and every
/// `break` and `continue` carries a label.
pub fn assert_normal_form(stmts: &[Stmt]) {
    for s in stmts {
        check_stmt(s);
    }
}

fn check_stmt(s: &Stmt) {
    match s {
        Stmt::Empty | Stmt::Debugger => {}
        Stmt::Expr { expression } => check_stmt_expr(expression),
        Stmt::VarDecl { declarations } => {
            for d in declarations {
                assert!(d.init.is_none(), "hoisted declarator with initializer");
            }
        }
        Stmt::Block { body } => assert_normal_form(body),
        Stmt::Return { argument } => {
            if let Some(a) = argument {
                assert!(is_atom(a), "non-atomic return argument: {a}");
            }
        }
        Stmt::If {
            test,
            consequent,
            alternate,
        } => {
            check_if_test(test);
            check_stmt(consequent);
            if let Some(alt) = alternate {
                check_stmt(alt);
            }
        }
        Stmt::Throw { argument } => assert!(is_atom(argument), "non-atomic throw: {argument}"),
        Stmt::Try {
            block,
            handlers,
            finalizer,
        } => {
            assert_normal_form(block);
            assert!(handlers.len() <= 1, "multiple handlers in output");
            for h in handlers {
                assert!(h.guard.is_none(), "guarded handler in output");
                assert_normal_form(&h.body);
            }
            if let Some(fin) = finalizer {
                assert_normal_form(fin);
            }
        }
        Stmt::Labeled { body, .. } => check_stmt(body),
        Stmt::Break { label } => assert!(label.is_some(), "unlabeled break in output"),
        Stmt::Continue { label } => assert!(label.is_some(), "unlabeled continue in output"),
        Stmt::While { test, body } => {
            assert!(
                matches!(test, Expr::Ident { .. }),
                "non-identifier while test: {test}"
            );
            check_stmt(body);
        }
        Stmt::ForIn { left, right, body } => {
            assert!(
                matches!(left, flatscript_ast::ForInTarget::Ident { .. }),
                "for-in target not an identifier"
            );
            assert!(is_atom(right), "non-atomic for-in object: {right}");
            check_stmt(body);
        }
        Stmt::DoWhile { .. } => panic!("do-while survived normalization"),
        Stmt::For { .. } => panic!("for survived normalization"),
        Stmt::Switch { .. } => panic!("switch survived normalization"),
        Stmt::With { .. } => panic!("with survived normalization"),
        Stmt::FunctionDecl { .. } => panic!("function declaration survived normalization"),
    }
}

/// Statement-position expressions are always plain assignments.
fn check_stmt_expr(e: &Expr) {
    match e {
        Expr::Assign {
            operator: AssignOp::Assign,
            left,
            right,
        } => {
            assert!(
                is_atom(left) || member_of_atoms(left),
                "non-flat assignment target: {left}"
            );
            check_rhs(right);
        }
        other => panic!("statement expression is not an assignment: {other}"),
    }
}

/// An assignment right-hand side is an atom or exactly one operation over
/// atoms.
fn check_rhs(e: &Expr) {
    match e {
        Expr::Ident { .. } | Expr::Lit { .. } | Expr::This => {}
        Expr::Binary { left, right, .. } => {
            assert!(is_atom(left), "non-atomic operand: {left}");
            assert!(is_atom(right), "non-atomic operand: {right}");
        }
        Expr::Unary { operator, argument } => {
            if *operator == UnaryOp::Delete {
                assert!(
                    is_atom(argument) || member_of_atoms(argument),
                    "non-flat delete operand: {argument}"
                );
            } else {
                assert!(is_atom(argument), "non-atomic operand: {argument}");
            }
        }
        Expr::Member { .. } => assert!(member_of_atoms(e), "non-flat member: {e}"),
        Expr::Call { callee, arguments } | Expr::New { callee, arguments } => {
            assert!(
                is_atom(callee) || member_of_atoms(callee),
                "non-flat callee: {callee}"
            );
            for a in arguments {
                assert!(is_atom(a), "non-atomic argument: {a}");
            }
        }
        Expr::Array { elements } => {
            for el in elements.iter().flatten() {
                assert!(is_atom(el), "non-atomic element: {el}");
            }
        }
        Expr::Object { properties } => {
            for p in properties {
                match p.kind {
                    PropertyKind::Init => {
                        assert!(is_atom(&p.value), "non-atomic property value: {}", p.value);
                    }
                    PropertyKind::Get | PropertyKind::Set => {
                        if let Expr::Function { function } = &p.value {
                            assert_normal_form(&function.body);
                        } else {
                            panic!("accessor value is not a function");
                        }
                    }
                }
            }
        }
        Expr::Function { function } => assert_normal_form(&function.body),
        other => panic!("unexpected right-hand side shape: {other}"),
    }
}

/// Guard tests on if statements are identifiers or a membership check over
/// identifiers.
fn check_if_test(test: &Expr) {
    match test {
        Expr::Ident { .. } => {}
        Expr::Binary {
            operator: BinaryOp::In,
            left,
            right,
        } => {
            assert!(is_atom(left) && is_atom(right), "non-flat guard: {test}");
        }
        other => panic!("unexpected if test: {other}"),
    }
}

/// Every temporary read inside an entity body is declared by its hoisted
/// `var`, exactly once; nested functions are checked recursively.
pub fn assert_hoisted(fun: &Function) {
    let declared: Vec<&str> = match fun.body.first() {
        Some(Stmt::VarDecl { declarations }) => {
            declarations.iter().map(|d| d.name.as_str()).collect()
        }
        _ => Vec::new(),
    };
    let unique: HashSet<&str> = declared.iter().copied().collect();
    assert_eq!(unique.len(), declared.len(), "duplicate hoisted names");

    let mut used = Vec::new();
    collect_entity_idents(&fun.body, &mut used);
    for name in used {
        if crate::is_tmp(&name) {
            assert!(
                unique.contains(name.as_str()),
                "temporary {name} read but not declared"
            );
        }
    }
}

fn collect_entity_idents(stmts: &[Stmt], out: &mut Vec<String>) {
    for s in stmts {
        collect_stmt_idents(s, out);
    }
}

fn collect_stmt_idents(s: &Stmt, out: &mut Vec<String>) {
    match s {
        Stmt::Expr { expression } => collect_expr_idents(expression, out),
        Stmt::Block { body } => collect_entity_idents(body, out),
        Stmt::Return { argument } => {
            if let Some(a) = argument {
                collect_expr_idents(a, out);
            }
        }
        Stmt::If {
            test,
            consequent,
            alternate,
        } => {
            collect_expr_idents(test, out);
            collect_stmt_idents(consequent, out);
            if let Some(alt) = alternate {
                collect_stmt_idents(alt, out);
            }
        }
        Stmt::Throw { argument } => collect_expr_idents(argument, out),
        Stmt::Try {
            block,
            handlers,
            finalizer,
        } => {
            collect_entity_idents(block, out);
            for h in handlers {
                collect_entity_idents(&h.body, out);
            }
            if let Some(fin) = finalizer {
                collect_entity_idents(fin, out);
            }
        }
        Stmt::Labeled { body, .. } => collect_stmt_idents(body, out),
        Stmt::While { test, body } => {
            collect_expr_idents(test, out);
            collect_stmt_idents(body, out);
        }
        Stmt::ForIn { left, right, body } => {
            if let flatscript_ast::ForInTarget::Ident { name } = left {
                out.push(name.clone());
            }
            collect_expr_idents(right, out);
            collect_stmt_idents(body, out);
        }
        _ => {}
    }
}

fn collect_expr_idents(e: &Expr, out: &mut Vec<String>) {
    match e {
        Expr::Ident { name } => out.push(name.clone()),
        Expr::Member {
            object, property, ..
        } => {
            collect_expr_idents(object, out);
            collect_expr_idents(property, out);
        }
        Expr::Assign { left, right, .. } => {
            collect_expr_idents(left, out);
            collect_expr_idents(right, out);
        }
        Expr::Binary { left, right, .. } => {
            collect_expr_idents(left, out);
            collect_expr_idents(right, out);
        }
        Expr::Unary { argument, .. } => collect_expr_idents(argument, out),
        Expr::Call { callee, arguments } | Expr::New { callee, arguments } => {
            collect_expr_idents(callee, out);
            for a in arguments {
                collect_expr_idents(a, out);
            }
        }
        Expr::Array { elements } => {
            for el in elements.iter().flatten() {
                collect_expr_idents(el, out);
            }
        }
        Expr::Object { properties } => {
            for p in properties {
                // Nested accessor bodies declare their own temporaries.
                if !matches!(p.value, Expr::Function { .. }) {
                    collect_expr_idents(&p.value, out);
                }
            }
        }
        // Function bodies declare their own temporaries.
        Expr::Function { .. } | Expr::Lit { .. } | Expr::This => {}
        Expr::Seq { expressions } => {
            for x in expressions {
                collect_expr_idents(x, out);
            }
        }
        Expr::Logical { left, right, .. } => {
            collect_expr_idents(left, out);
            collect_expr_idents(right, out);
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            collect_expr_idents(test, out);
            collect_expr_idents(consequent, out);
            collect_expr_idents(alternate, out);
        }
        Expr::Update { argument, .. } => collect_expr_idents(argument, out),
    }
}

/// Under `unify_ret` a function body holds exactly one `return`, in tail
/// position.
pub fn assert_single_trailing_return(fun: &Function) {
    let mut count = 0;
    count_returns(&fun.body, &mut count);
    assert_eq!(count, 1, "expected exactly one return");
    assert!(
        matches!(fun.body.last(), Some(Stmt::Return { .. })),
        "return is not the final statement"
    );
}

fn count_returns(stmts: &[Stmt], count: &mut usize) {
    for s in stmts {
        count_returns_stmt(s, count);
    }
}

fn count_returns_stmt(s: &Stmt, count: &mut usize) {
    match s {
        Stmt::Return { .. } => *count += 1,
        Stmt::Block { body } => count_returns(body, count),
        Stmt::If {
            consequent,
            alternate,
            ..
        } => {
            count_returns_stmt(consequent, count);
            if let Some(alt) = alternate {
                count_returns_stmt(alt, count);
            }
        }
        Stmt::Labeled { body, .. } => count_returns_stmt(body, count),
        Stmt::While { body, .. } | Stmt::ForIn { body, .. } => {
            count_returns_stmt(body, count);
        }
        Stmt::Try {
            block,
            handlers,
            finalizer,
        } => {
            count_returns(block, count);
            for h in handlers {
                count_returns(&h.body, count);
            }
            if let Some(fin) = finalizer {
                count_returns(fin, count);
            }
        }
        _ => {}
    }
}
