//! Unit tests for node definitions and operator helpers.

use crate::factory::*;
use crate::syntax::*;

#[test]
fn update_op_desugars_to_binary_and_compound() {
    assert_eq!(UpdateOp::Inc.binary_op(), BinaryOp::Add);
    assert_eq!(UpdateOp::Dec.binary_op(), BinaryOp::Sub);
    assert_eq!(UpdateOp::Inc.compound_op(), AssignOp::AddAssign);
    assert_eq!(UpdateOp::Dec.compound_op(), AssignOp::SubAssign);
}

#[test]
fn compound_assign_maps_to_binary() {
    assert_eq!(AssignOp::Assign.binary_op(), None);
    assert_eq!(AssignOp::AddAssign.binary_op(), Some(BinaryOp::Add));
    assert_eq!(AssignOp::UShrAssign.binary_op(), Some(BinaryOp::UShr));
    assert_eq!(AssignOp::BitXorAssign.binary_op(), Some(BinaryOp::BitXor));
}

#[test]
fn atoms_are_identifiers_and_literals() {
    assert!(ident("x").is_atom());
    assert!(num(3.0).is_atom());
    assert!(str_lit("s").is_atom());
    assert!(!Expr::This.is_atom());
    assert!(!binary(BinaryOp::Add, ident("a"), ident("b")).is_atom());
    assert!(!member(ident("a"), ident("b"), true).is_atom());
}

#[test]
fn operator_symbols() {
    assert_eq!(BinaryOp::StrictEq.symbol(), "===");
    assert_eq!(BinaryOp::In.symbol(), "in");
    assert_eq!(LogicalOp::And.symbol(), "&&");
    assert_eq!(UnaryOp::TypeOf.symbol(), "typeof");
    assert!(UnaryOp::Delete.is_word());
    assert!(!UnaryOp::Not.is_word());
}

#[test]
fn factory_builds_expected_shapes() {
    let s = assign_stmt("tmp0", null_lit());
    match s {
        Stmt::Expr {
            expression:
                Expr::Assign {
                    operator: AssignOp::Assign,
                    left,
                    right,
                },
        } => {
            assert_eq!(*left, ident("tmp0"));
            assert_eq!(*right, Expr::Lit { value: Lit::Null });
        }
        other => panic!("unexpected statement: {other:?}"),
    }

    let m = member_from(ident("a"), ident("tmp1"), true);
    match m {
        Expr::Member {
            computed,
            was_computed,
            ..
        } => {
            assert!(computed);
            assert!(was_computed);
        }
        other => panic!("unexpected expression: {other:?}"),
    }
}

#[test]
fn declarators_default_unexposed() {
    let d = declarator("x", Some(num(1.0)));
    assert!(!d.exposed);
    assert_eq!(d.name, "x");
}
