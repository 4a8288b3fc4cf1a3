//! Constructor helpers for building syntax trees.
//!
//! The normalizer assembles its whole output through these; tests use them
//! to spell out expected shapes without the struct-literal noise.

use crate::syntax::*;

pub fn ident(name: impl Into<String>) -> Expr {
    Expr::Ident { name: name.into() }
}

pub fn str_lit(value: impl Into<String>) -> Expr {
    Expr::Lit {
        value: Lit::Str(value.into()),
    }
}

pub fn num(value: f64) -> Expr {
    Expr::Lit {
        value: Lit::Num(value),
    }
}

pub fn bool_lit(value: bool) -> Expr {
    Expr::Lit {
        value: Lit::Bool(value),
    }
}

pub fn null_lit() -> Expr {
    Expr::Lit { value: Lit::Null }
}

pub fn member(object: Expr, property: Expr, computed: bool) -> Expr {
    Expr::Member {
        object: Box::new(object),
        property: Box::new(property),
        computed,
        was_computed: false,
    }
}

/// Member node that remembers whether the source access was computed.
pub fn member_from(object: Expr, property: Expr, was_computed: bool) -> Expr {
    Expr::Member {
        object: Box::new(object),
        property: Box::new(property),
        computed: true,
        was_computed,
    }
}

pub fn binary(operator: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn logical(operator: LogicalOp, left: Expr, right: Expr) -> Expr {
    Expr::Logical {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn unary(operator: UnaryOp, argument: Expr) -> Expr {
    Expr::Unary {
        operator,
        argument: Box::new(argument),
    }
}

pub fn update(operator: UpdateOp, prefix: bool, argument: Expr) -> Expr {
    Expr::Update {
        operator,
        prefix,
        argument: Box::new(argument),
    }
}

pub fn assign(left: Expr, right: Expr) -> Expr {
    assign_op(AssignOp::Assign, left, right)
}

pub fn assign_op(operator: AssignOp, left: Expr, right: Expr) -> Expr {
    Expr::Assign {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn call(callee: Expr, arguments: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        arguments,
    }
}

pub fn new_expr(callee: Expr, arguments: Vec<Expr>) -> Expr {
    Expr::New {
        callee: Box::new(callee),
        arguments,
    }
}

pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Expr {
    Expr::Conditional {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
    }
}

pub fn func_expr(id: Option<&str>, params: &[&str], body: Vec<Stmt>) -> Expr {
    Expr::Function {
        function: Box::new(function(id, params, body)),
    }
}

pub fn function(id: Option<&str>, params: &[&str], body: Vec<Stmt>) -> Function {
    Function {
        id: id.map(str::to_string),
        params: params.iter().map(|p| (*p).to_string()).collect(),
        body,
    }
}

pub fn expr_stmt(expression: Expr) -> Stmt {
    Stmt::Expr { expression }
}

/// `name = value;` as a statement.
pub fn assign_stmt(name: &str, value: Expr) -> Stmt {
    expr_stmt(assign(ident(name), value))
}

/// `target = value;` for an arbitrary assignable target.
pub fn store_stmt(target: Expr, value: Expr) -> Stmt {
    expr_stmt(assign(target, value))
}

pub fn block(body: Vec<Stmt>) -> Stmt {
    Stmt::Block { body }
}

pub fn labeled(label: impl Into<String>, body: Stmt) -> Stmt {
    Stmt::Labeled {
        label: label.into(),
        body: Box::new(body),
    }
}

pub fn break_stmt(label: Option<&str>) -> Stmt {
    Stmt::Break {
        label: label.map(str::to_string),
    }
}

pub fn continue_stmt(label: Option<&str>) -> Stmt {
    Stmt::Continue {
        label: label.map(str::to_string),
    }
}

pub fn ret(argument: Option<Expr>) -> Stmt {
    Stmt::Return { argument }
}

pub fn throw_stmt(argument: Expr) -> Stmt {
    Stmt::Throw { argument }
}

pub fn if_stmt(test: Expr, consequent: Stmt, alternate: Option<Stmt>) -> Stmt {
    Stmt::If {
        test,
        consequent: Box::new(consequent),
        alternate: alternate.map(Box::new),
    }
}

pub fn while_stmt(test: Expr, body: Stmt) -> Stmt {
    Stmt::While {
        test,
        body: Box::new(body),
    }
}

pub fn declarator(name: impl Into<String>, init: Option<Expr>) -> Declarator {
    Declarator {
        name: name.into(),
        init,
        exposed: false,
    }
}

/// `var a, b, c;` over bare names.
pub fn var_decl(names: &[&str]) -> Stmt {
    Stmt::VarDecl {
        declarations: names.iter().map(|n| declarator(*n, None)).collect(),
    }
}

pub fn prop(key: PropertyKey, value: Expr, kind: PropertyKind) -> Property {
    Property { key, value, kind }
}

pub fn prop_key(name: impl Into<String>) -> PropertyKey {
    PropertyKey::Ident { name: name.into() }
}
