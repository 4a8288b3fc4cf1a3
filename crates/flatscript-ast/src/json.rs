//! JSON interchange for syntax trees.
//!
//! Trees serialize with ESTree-style `type` tags, so output can be consumed
//! by ESTree tooling and input can come from any front end that emits the
//! same shape. Extra keys a parser attaches (`loc`, `range`, `raw`, ...)
//! are ignored on the way in.

use crate::syntax::{Expr, Program, Stmt};

pub fn program_from_json(json: &str) -> serde_json::Result<Program> {
    serde_json::from_str(json)
}

pub fn program_to_json(program: &Program) -> serde_json::Result<String> {
    serde_json::to_string_pretty(program)
}

pub fn stmt_from_json(json: &str) -> serde_json::Result<Stmt> {
    serde_json::from_str(json)
}

pub fn expr_from_json(json: &str) -> serde_json::Result<Expr> {
    serde_json::from_str(json)
}
