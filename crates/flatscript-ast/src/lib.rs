//! Syntax tree definitions for FlatScript.
//!
//! This crate is the data layer under the normalizer:
//! - `syntax` - node definitions (ESTree-shaped, serde-tagged)
//! - `factory` - constructor helpers
//! - `dump` - deterministic source-like rendering
//! - `json` - ESTree JSON interchange

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod factory;
pub mod json;
pub mod syntax;

mod dump;

#[cfg(test)]
mod syntax_tests;

pub use syntax::{
    AssignOp, BinaryOp, CatchClause, Declarator, Expr, ForInTarget, ForInit, Function, Lit,
    LogicalOp, Program, Property, PropertyKey, PropertyKind, Stmt, SwitchCase, UnaryOp, UpdateOp,
};
