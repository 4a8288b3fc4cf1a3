//! Source-like text rendering of syntax trees.
//!
//! Deterministic, two-space indented output used by tests and for eyeballing
//! normalizer results. Not a code generator: no precedence reconstruction
//! beyond defensive parentheses, no comment or location handling.

use std::fmt::{self, Write};

use crate::syntax::*;

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmts(f, &self.body, 0)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_function(f, self, 0)?;
        writeln!(f)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self, 0)
    }
}

fn indent(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    for _ in 0..level {
        f.write_str("  ")?;
    }
    Ok(())
}

fn write_stmts(f: &mut fmt::Formatter<'_>, stmts: &[Stmt], level: usize) -> fmt::Result {
    for s in stmts {
        write_stmt(f, s, level)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, level: usize) -> fmt::Result {
    indent(f, level)?;
    write_stmt_here(f, stmt, level)
}

/// Write a statement assuming the cursor already sits at its start column.
fn write_stmt_here(f: &mut fmt::Formatter<'_>, stmt: &Stmt, level: usize) -> fmt::Result {
    match stmt {
        Stmt::Empty => writeln!(f, ";"),
        Stmt::Expr { expression } => {
            write_expr(f, expression, level)?;
            writeln!(f, ";")
        }
        Stmt::VarDecl { declarations } => {
            f.write_str("var ")?;
            for (i, d) in declarations.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(&d.name)?;
                if let Some(init) = &d.init {
                    f.write_str(" = ")?;
                    write_expr(f, init, level)?;
                }
            }
            writeln!(f, ";")
        }
        Stmt::FunctionDecl { function } => {
            write_function(f, function, level)?;
            writeln!(f)
        }
        Stmt::Block { body } => {
            write_braced(f, body, level)?;
            writeln!(f)
        }
        Stmt::Return { argument } => match argument {
            Some(e) => {
                f.write_str("return ")?;
                write_expr(f, e, level)?;
                writeln!(f, ";")
            }
            None => writeln!(f, "return;"),
        },
        Stmt::Debugger => writeln!(f, "debugger;"),
        Stmt::If {
            test,
            consequent,
            alternate,
        } => {
            f.write_str("if (")?;
            write_expr(f, test, level)?;
            f.write_str(") ")?;
            write_body(f, consequent, level)?;
            if let Some(alt) = alternate {
                f.write_str(" else ")?;
                write_body(f, alt, level)?;
            }
            writeln!(f)
        }
        Stmt::Throw { argument } => {
            f.write_str("throw ")?;
            write_expr(f, argument, level)?;
            writeln!(f, ";")
        }
        Stmt::Try {
            block,
            handlers,
            finalizer,
        } => {
            f.write_str("try ")?;
            write_braced(f, block, level)?;
            for h in handlers {
                write!(f, " catch ({}", h.param)?;
                if let Some(g) = &h.guard {
                    f.write_str(" if ")?;
                    write_expr(f, g, level)?;
                }
                f.write_str(") ")?;
                write_braced(f, &h.body, level)?;
            }
            if let Some(fin) = finalizer {
                f.write_str(" finally ")?;
                write_braced(f, fin, level)?;
            }
            writeln!(f)
        }
        Stmt::Labeled { label, body } => {
            write!(f, "{label}: ")?;
            write_stmt_here(f, body, level)
        }
        Stmt::Break { label } => match label {
            Some(l) => writeln!(f, "break {l};"),
            None => writeln!(f, "break;"),
        },
        Stmt::Continue { label } => match label {
            Some(l) => writeln!(f, "continue {l};"),
            None => writeln!(f, "continue;"),
        },
        Stmt::While { test, body } => {
            f.write_str("while (")?;
            write_expr(f, test, level)?;
            f.write_str(") ")?;
            write_body(f, body, level)?;
            writeln!(f)
        }
        Stmt::DoWhile { body, test } => {
            f.write_str("do ")?;
            write_body(f, body, level)?;
            f.write_str(" while (")?;
            write_expr(f, test, level)?;
            writeln!(f, ");")
        }
        Stmt::For {
            init,
            test,
            update,
            body,
        } => {
            f.write_str("for (")?;
            match init {
                Some(ForInit::Decl(ds)) => {
                    f.write_str("var ")?;
                    for (i, d) in ds.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        f.write_str(&d.name)?;
                        if let Some(e) = &d.init {
                            f.write_str(" = ")?;
                            write_expr(f, e, level)?;
                        }
                    }
                }
                Some(ForInit::Expr(e)) => write_expr(f, e, level)?,
                None => {}
            }
            f.write_str("; ")?;
            if let Some(t) = test {
                write_expr(f, t, level)?;
            }
            f.write_str("; ")?;
            if let Some(u) = update {
                write_expr(f, u, level)?;
            }
            f.write_str(") ")?;
            write_body(f, body, level)?;
            writeln!(f)
        }
        Stmt::ForIn { left, right, body } => {
            f.write_str("for (")?;
            match left {
                ForInTarget::Decl { declarations } => {
                    f.write_str("var ")?;
                    if let Some(d) = declarations.first() {
                        f.write_str(&d.name)?;
                    }
                }
                ForInTarget::Ident { name } => f.write_str(name)?,
                ForInTarget::Member {
                    object,
                    property,
                    computed,
                } => {
                    let m = Expr::Member {
                        object: object.clone(),
                        property: property.clone(),
                        computed: *computed,
                        was_computed: false,
                    };
                    write_expr(f, &m, level)?;
                }
            }
            f.write_str(" in ")?;
            write_expr(f, right, level)?;
            f.write_str(") ")?;
            write_body(f, body, level)?;
            writeln!(f)
        }
        Stmt::Switch {
            discriminant,
            cases,
        } => {
            f.write_str("switch (")?;
            write_expr(f, discriminant, level)?;
            writeln!(f, ") {{")?;
            for case in cases {
                indent(f, level + 1)?;
                match &case.test {
                    Some(t) => {
                        f.write_str("case ")?;
                        write_expr(f, t, level + 1)?;
                        writeln!(f, ":")?;
                    }
                    None => writeln!(f, "default:")?,
                }
                write_stmts(f, &case.consequent, level + 2)?;
            }
            indent(f, level)?;
            writeln!(f, "}}")
        }
        Stmt::With { object, body } => {
            f.write_str("with (")?;
            write_expr(f, object, level)?;
            f.write_str(") ")?;
            write_body(f, body, level)?;
            writeln!(f)
        }
    }
}

/// Write a statement used as a loop or `if` body. Blocks are written brace
/// style at the current level; any other statement is wrapped in braces.
fn write_body(f: &mut fmt::Formatter<'_>, body: &Stmt, level: usize) -> fmt::Result {
    match body {
        Stmt::Block { body } => write_braced(f, body, level),
        other => {
            writeln!(f, "{{")?;
            write_stmt(f, other, level + 1)?;
            indent(f, level)?;
            f.write_str("}")
        }
    }
}

/// `{ ... }` with the closing brace at `level`; empty bodies collapse to `{}`.
fn write_braced(f: &mut fmt::Formatter<'_>, stmts: &[Stmt], level: usize) -> fmt::Result {
    if stmts.is_empty() {
        return f.write_str("{}");
    }
    writeln!(f, "{{")?;
    write_stmts(f, stmts, level + 1)?;
    indent(f, level)?;
    f.write_str("}")
}

fn write_function(f: &mut fmt::Formatter<'_>, fun: &Function, level: usize) -> fmt::Result {
    f.write_str("function ")?;
    if let Some(id) = &fun.id {
        f.write_str(id)?;
    }
    write!(f, "({}) ", fun.params.join(", "))?;
    write_braced(f, &fun.body, level)
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, level: usize) -> fmt::Result {
    match expr {
        Expr::Lit { value } => write_lit(f, value),
        Expr::Ident { name } => f.write_str(name),
        Expr::This => f.write_str("this"),
        Expr::Array { elements } => {
            f.write_str("[")?;
            for (i, el) in elements.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                if let Some(e) = el {
                    write_expr(f, e, level)?;
                }
            }
            f.write_str("]")
        }
        Expr::Object { properties } => {
            if properties.is_empty() {
                return f.write_str("{}");
            }
            f.write_str("{ ")?;
            for (i, p) in properties.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                match p.kind {
                    PropertyKind::Init => {
                        write_prop_key(f, &p.key)?;
                        f.write_str(": ")?;
                        write_expr(f, &p.value, level)?;
                    }
                    PropertyKind::Get | PropertyKind::Set => {
                        f.write_str(if p.kind == PropertyKind::Get {
                            "get "
                        } else {
                            "set "
                        })?;
                        write_prop_key(f, &p.key)?;
                        if let Expr::Function { function } = &p.value {
                            write!(f, "({}) ", function.params.join(", "))?;
                            write_braced(f, &function.body, level)?;
                        }
                    }
                }
            }
            f.write_str(" }")
        }
        Expr::Function { function } => write_function(f, function, level),
        Expr::Member {
            object,
            property,
            computed,
            ..
        } => {
            write_operand(f, object, level)?;
            match (&**property, computed) {
                (Expr::Ident { name }, false) => write!(f, ".{name}"),
                _ => {
                    f.write_str("[")?;
                    write_expr(f, property, level)?;
                    f.write_str("]")
                }
            }
        }
        Expr::Assign {
            operator,
            left,
            right,
        } => {
            write_expr(f, left, level)?;
            write!(f, " {} ", operator.symbol())?;
            write_expr(f, right, level)
        }
        Expr::Call { callee, arguments } => {
            write_operand(f, callee, level)?;
            write_args(f, arguments, level)
        }
        Expr::New { callee, arguments } => {
            f.write_str("new ")?;
            write_operand(f, callee, level)?;
            write_args(f, arguments, level)
        }
        Expr::Seq { expressions } => {
            for (i, e) in expressions.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_expr(f, e, level)?;
            }
            Ok(())
        }
        Expr::Logical {
            operator,
            left,
            right,
        } => {
            write_operand(f, left, level)?;
            write!(f, " {} ", operator.symbol())?;
            write_operand(f, right, level)
        }
        Expr::Binary {
            operator,
            left,
            right,
        } => {
            write_operand(f, left, level)?;
            write!(f, " {} ", operator.symbol())?;
            write_operand(f, right, level)
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            write_operand(f, test, level)?;
            f.write_str(" ? ")?;
            write_operand(f, consequent, level)?;
            f.write_str(" : ")?;
            write_operand(f, alternate, level)
        }
        Expr::Update {
            operator,
            prefix,
            argument,
        } => {
            if *prefix {
                f.write_str(operator.symbol())?;
                write_operand(f, argument, level)
            } else {
                write_operand(f, argument, level)?;
                f.write_str(operator.symbol())
            }
        }
        Expr::Unary { operator, argument } => {
            f.write_str(operator.symbol())?;
            if operator.is_word() {
                f.write_str(" ")?;
            }
            write_operand(f, argument, level)
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr], level: usize) -> fmt::Result {
    f.write_str("(")?;
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_expr(f, a, level)?;
    }
    f.write_str(")")
}

/// Parenthesize compound sub-expressions so input dumps stay unambiguous.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, level: usize) -> fmt::Result {
    let needs_parens = matches!(
        expr,
        Expr::Binary { .. }
            | Expr::Logical { .. }
            | Expr::Conditional { .. }
            | Expr::Assign { .. }
            | Expr::Seq { .. }
            | Expr::Function { .. }
    );
    if needs_parens {
        f.write_str("(")?;
        write_expr(f, expr, level)?;
        f.write_str(")")
    } else {
        write_expr(f, expr, level)
    }
}

fn write_prop_key(f: &mut fmt::Formatter<'_>, key: &PropertyKey) -> fmt::Result {
    match key {
        PropertyKey::Ident { name } => f.write_str(name),
        PropertyKey::Lit { value } => write_lit(f, value),
    }
}

fn write_lit(f: &mut fmt::Formatter<'_>, lit: &Lit) -> fmt::Result {
    match lit {
        Lit::Null => f.write_str("null"),
        Lit::Bool(b) => write!(f, "{b}"),
        Lit::Num(n) => {
            if n.fract() == 0.0 && n.is_finite() && n.abs() < 9e15 {
                write!(f, "{}", *n as i64)
            } else {
                write!(f, "{n}")
            }
        }
        Lit::Str(s) => {
            f.write_char('\'')?;
            for c in s.chars() {
                match c {
                    '\\' => f.write_str("\\\\")?,
                    '\'' => f.write_str("\\'")?,
                    '\n' => f.write_str("\\n")?,
                    '\r' => f.write_str("\\r")?,
                    '\t' => f.write_str("\\t")?,
                    _ => f.write_char(c)?,
                }
            }
            f.write_char('\'')
        }
    }
}
