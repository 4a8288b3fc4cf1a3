//! AST normalizer for FlatScript.
//!
//! Rewrites an ESTree-shaped source tree into a simplified normal form in
//! which every expression is at most one operation deep and every
//! side-effecting sub-expression is named by a fresh temporary:
//! - `options` - option record and canonicalization
//! - `decls` - hoisted declaration collector
//! - `scope` - lexical scope chain with `with`-object tracking
//! - `cflow` - normal-completion analysis
//! - `normalize` - expression/statement/entity rewriting
//!
//! The output is still a tree in the same surface grammar, deliberately more
//! verbose but far easier for downstream analyses (slicing, symbolic
//! execution, taint) to reason about. All global reads and writes go through
//! the reserved identifier `__global`, loops are unified to `while`, and
//! every `break`/`continue` carries an explicit label.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod cflow;
pub mod decls;
pub mod normalize;
pub mod options;
pub mod scope;

#[cfg(test)]
mod test_utils;

pub use normalize::{is_tmp, normalize_function, normalize_program};
pub use options::Options;

/// Errors raised while normalizing.
///
/// Normalization has no recovery path: any of these aborts the whole call
/// and no partial tree is returned. Callers are expected to hand in
/// grammatically valid input; most variants flag constructs the grammar
/// allows but the normalizer does not support.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("cannot assign to this expression form")]
    InvalidAssignTarget,

    #[error("non-computed member property must be an identifier")]
    InvalidMemberProperty,

    #[error("`delete` applied to a non-identifier, non-member operand")]
    InvalidDeleteOperand,

    #[error("guarded catch clauses are not supported")]
    GuardedCatch,

    #[error("multiple catch clauses are not supported")]
    MultipleCatchClauses,

    #[error("`for-in` target must be an identifier or a declaration")]
    InvalidForInTarget,

    #[error("`ReferenceError` is shadowed by a local binding")]
    ShadowedReferenceError,

    #[error("cannot normalize downward-exposed function `{0}`")]
    ExposedFunction(String),

    #[error("`break` outside of a loop or switch")]
    OrphanBreak,

    #[error("`continue` outside of a loop")]
    OrphanContinue,

    #[error("undefined label `{0}`")]
    UndefinedLabel(String),
}

/// Result type for normalization passes.
pub type Result<T> = std::result::Result<T, NormalizeError>;
