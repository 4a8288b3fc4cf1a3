//! Normal-completion analysis.
//!
//! `may_complete_normally` answers whether control can fall off the end of
//! a statement. The analysis is conservative: anything it cannot rule out
//! counts as completing, which at worst produces an unreachable trailing
//! `return` or a duplicated unreachable switch tail, never a semantic
//! change. It is exact for the forms that matter: abrupt statements and
//! blocks ending in one.

use flatscript_ast::Stmt;

pub fn may_complete_normally(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return { .. }
        | Stmt::Throw { .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. } => false,
        Stmt::Block { body } => block_completes(body),
        Stmt::If {
            consequent,
            alternate,
            ..
        } => match alternate {
            // Without an else the test may simply fail.
            None => true,
            Some(alt) => may_complete_normally(consequent) || may_complete_normally(alt),
        },
        Stmt::With { body, .. } => may_complete_normally(body),
        Stmt::Try {
            block,
            handlers,
            finalizer,
        } => {
            let body_completes =
                block_completes(block) || handlers.iter().any(|h| block_completes(&h.body));
            let finalizer_completes = finalizer.as_ref().is_none_or(|fin| block_completes(fin));
            body_completes && finalizer_completes
        }
        // A loop may run zero iterations; a labeled statement or switch may
        // be exited by a break targeting it.
        Stmt::While { .. }
        | Stmt::DoWhile { .. }
        | Stmt::For { .. }
        | Stmt::ForIn { .. }
        | Stmt::Labeled { .. }
        | Stmt::Switch { .. } => true,
        Stmt::Empty
        | Stmt::Expr { .. }
        | Stmt::VarDecl { .. }
        | Stmt::FunctionDecl { .. }
        | Stmt::Debugger => true,
    }
}

/// A statement sequence completes normally when it is empty or its last
/// statement does.
pub fn block_completes(stmts: &[Stmt]) -> bool {
    stmts.last().is_none_or(may_complete_normally)
}

#[cfg(test)]
mod tests {
    use flatscript_ast::factory::*;

    use super::*;

    #[test]
    fn abrupt_statements_do_not_complete() {
        assert!(!may_complete_normally(&ret(None)));
        assert!(!may_complete_normally(&throw_stmt(ident("e"))));
        assert!(!may_complete_normally(&break_stmt(Some("l"))));
    }

    #[test]
    fn blocks_follow_their_last_statement() {
        assert!(may_complete_normally(&block(vec![])));
        assert!(may_complete_normally(&block(vec![expr_stmt(ident("x"))])));
        assert!(!may_complete_normally(&block(vec![
            expr_stmt(ident("x")),
            ret(None),
        ])));
    }

    #[test]
    fn if_requires_both_arms_abrupt() {
        let both = if_stmt(
            ident("c"),
            block(vec![ret(None)]),
            Some(block(vec![throw_stmt(ident("e"))])),
        );
        assert!(!may_complete_normally(&both));
        let one_armed = if_stmt(ident("c"), block(vec![ret(None)]), None);
        assert!(may_complete_normally(&one_armed));
    }

    #[test]
    fn finalizer_gates_try_completion() {
        let t = flatscript_ast::Stmt::Try {
            block: vec![ret(None)],
            handlers: vec![],
            finalizer: Some(vec![throw_stmt(ident("e"))]),
        };
        assert!(!may_complete_normally(&t));
        let t = flatscript_ast::Stmt::Try {
            block: vec![ret(None)],
            handlers: vec![flatscript_ast::CatchClause {
                param: "e".into(),
                guard: None,
                body: vec![],
            }],
            finalizer: None,
        };
        // The handler may complete even though the block cannot.
        assert!(may_complete_normally(&t));
    }

    #[test]
    fn loops_and_switches_may_complete() {
        assert!(may_complete_normally(&while_stmt(
            ident("c"),
            block(vec![ret(None)])
        )));
        assert!(may_complete_normally(&labeled("l", block(vec![ret(None)]))));
    }
}
