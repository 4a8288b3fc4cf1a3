//! Expression normalization.
//!
//! Every rewrite returns a statement list plus the name the value lives in
//! after the list runs. Sub-expressions are evaluated into temporaries in
//! source order, so temporaries number up in emission order. Reads and
//! writes of globals go through `__global`; names possibly captured by a
//! `with` object compile to membership-test cascades, innermost object
//! tested first.

use flatscript_ast::factory::*;
use flatscript_ast::{
    AssignOp, BinaryOp, Expr, LogicalOp, Property, PropertyKind, Stmt, UnaryOp, UpdateOp,
};

use super::{Normalizer, Slot, is_tmp};
use crate::scope::Scope;
use crate::{NormalizeError, Result};

fn arg_idents(names: &[String]) -> Vec<Expr> {
    names.iter().map(ident).collect()
}

fn build_call(is_new: bool, callee: Expr, args: Vec<Expr>) -> Expr {
    if is_new {
        new_expr(callee, args)
    } else {
        call(callee, args)
    }
}

impl Normalizer {
    /// Normalize `expr` into a statement list; the value ends up in
    /// `target` when given, otherwise in a lazily allocated temporary whose
    /// name is returned.
    pub(crate) fn norm_expr(
        &mut self,
        expr: &Expr,
        scope: &Scope<'_>,
        target: Option<&str>,
    ) -> Result<(Vec<Stmt>, String)> {
        let mut slot = Slot::new(target);
        match expr {
            Expr::Lit { value } => {
                let t = self.target(&mut slot);
                let lit = Expr::Lit {
                    value: value.clone(),
                };
                Ok((vec![assign_stmt(&t, lit)], t))
            }
            Expr::This => {
                let t = self.target(&mut slot);
                let value = if scope.in_global_entity() {
                    ident("__global")
                } else {
                    Expr::This
                };
                Ok((vec![assign_stmt(&t, value)], t))
            }
            Expr::Ident { name } => {
                let stmts = self.read_ident(name, scope, &mut slot)?;
                let t = self.target(&mut slot);
                Ok((stmts, t))
            }
            Expr::Array { elements } => {
                let mut stmts = Vec::new();
                let mut elems = Vec::new();
                for element in elements {
                    match element {
                        Some(e) => {
                            let (es, en) = self.norm_expr(e, scope, None)?;
                            stmts.extend(es);
                            elems.push(Some(ident(en)));
                        }
                        // Elisions stay elisions.
                        None => elems.push(None),
                    }
                }
                let t = self.target(&mut slot);
                stmts.push(assign_stmt(&t, Expr::Array { elements: elems }));
                Ok((stmts, t))
            }
            Expr::Object { properties } => {
                let mut stmts = Vec::new();
                let mut props = Vec::new();
                for p in properties {
                    match (p.kind, &p.value) {
                        (
                            PropertyKind::Get | PropertyKind::Set,
                            Expr::Function { function },
                        ) => {
                            let accessor = self.entity_function(function, scope, None)?;
                            props.push(Property {
                                key: p.key.clone(),
                                value: Expr::Function {
                                    function: Box::new(accessor),
                                },
                                kind: p.kind,
                            });
                        }
                        _ => {
                            let (vs, vn) = self.norm_expr(&p.value, scope, None)?;
                            stmts.extend(vs);
                            props.push(Property {
                                key: p.key.clone(),
                                value: ident(vn),
                                kind: p.kind,
                            });
                        }
                    }
                }
                let t = self.target(&mut slot);
                stmts.push(assign_stmt(&t, Expr::Object { properties: props }));
                Ok((stmts, t))
            }
            Expr::Function { function } => {
                let binding = self.fn_binding.take();
                let normalized = self.entity_function(function, scope, binding)?;
                let t = self.target(&mut slot);
                let value = Expr::Function {
                    function: Box::new(normalized),
                };
                Ok((vec![assign_stmt(&t, value)], t))
            }
            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                let (mut stmts, base) = self.norm_expr(object, scope, None)?;
                let (idx_stmts, index) = self.member_index(property, *computed, scope)?;
                stmts.extend(idx_stmts);
                let t = self.target(&mut slot);
                stmts.push(assign_stmt(
                    &t,
                    member_from(ident(&base), ident(&index), *computed),
                ));
                Ok((stmts, t))
            }
            Expr::Assign {
                operator,
                left,
                right,
            } => self.norm_assign(*operator, left, right, scope, &mut slot),
            Expr::Call { callee, arguments } => {
                self.norm_call_like(callee, arguments, scope, &mut slot, false)
            }
            Expr::New { callee, arguments } => {
                self.norm_call_like(callee, arguments, scope, &mut slot, true)
            }
            Expr::Seq { expressions } => {
                let Some((last, init)) = expressions.split_last() else {
                    let t = self.target(&mut slot);
                    return Ok((Vec::new(), t));
                };
                let mut stmts = Vec::new();
                for e in init {
                    let (es, _) = self.norm_expr(e, scope, None)?;
                    stmts.extend(es);
                }
                let (ls, t) = self.norm_expr(last, scope, slot.given.as_deref())?;
                stmts.extend(ls);
                Ok((stmts, t))
            }
            Expr::Logical {
                operator,
                left,
                right,
            } => {
                let (mut stmts, ln) = self.norm_expr(left, scope, None)?;
                let t = self.target(&mut slot);
                let (rs, _) = self.norm_expr(right, scope, Some(&t))?;
                let copy = vec![assign_stmt(&t, ident(&ln))];
                let (then_stmts, else_stmts) = match operator {
                    LogicalOp::And => (rs, copy),
                    LogicalOp::Or => (copy, rs),
                };
                stmts.extend(self.mk_if(&ln, then_stmts, else_stmts));
                Ok((stmts, t))
            }
            Expr::Binary {
                operator,
                left,
                right,
            } => {
                let (mut stmts, ln) = self.norm_expr(left, scope, None)?;
                let (rs, rn) = self.norm_expr(right, scope, None)?;
                stmts.extend(rs);
                let t = self.target(&mut slot);
                stmts.push(assign_stmt(&t, binary(*operator, ident(ln), ident(rn))));
                Ok((stmts, t))
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let (mut stmts, tn) = self.norm_expr(test, scope, None)?;
                let t = self.target(&mut slot);
                let (cs, _) = self.norm_expr(consequent, scope, Some(&t))?;
                let (als, _) = self.norm_expr(alternate, scope, Some(&t))?;
                stmts.extend(self.mk_if(&tn, cs, als));
                Ok((stmts, t))
            }
            Expr::Update {
                operator,
                prefix,
                argument,
            } => self.norm_update(*operator, *prefix, argument, scope, &mut slot),
            Expr::Unary { operator, argument } => {
                if *operator == UnaryOp::Delete {
                    return self.norm_delete(argument, scope, &mut slot);
                }
                let (mut stmts, an) = self.norm_expr(argument, scope, None)?;
                let t = self.target(&mut slot);
                stmts.push(assign_stmt(&t, unary(*operator, ident(an))));
                Ok((stmts, t))
            }
        }
    }

    /// Read an identifier into the slot, routing through `__global` and the
    /// active `with` cascade as needed.
    fn read_ident(&mut self, name: &str, scope: &Scope<'_>, slot: &mut Slot) -> Result<Vec<Stmt>> {
        if is_tmp(name) {
            let t = self.target(slot);
            return Ok(vec![assign_stmt(&t, ident(name))]);
        }
        let withs = scope.possible_with_bindings(name);
        if scope.is_global(name) {
            let name_tmp = self.gen_tmp();
            let mut stmts = vec![assign_stmt(&name_tmp, str_lit(name))];
            let t = self.target(slot);
            let base = if self.opts.reference_errors && !scope.is_declared_global(name) {
                if !scope.is_global("ReferenceError") {
                    return Err(NormalizeError::ShadowedReferenceError);
                }
                let read = vec![assign_stmt(
                    &t,
                    member(ident("__global"), ident(&name_tmp), true),
                )];
                let ctor_name = self.gen_tmp();
                let ctor = self.gen_tmp();
                let exn = self.gen_tmp();
                let raise = vec![
                    assign_stmt(&ctor_name, str_lit("ReferenceError")),
                    assign_stmt(&ctor, member(ident("__global"), ident(&ctor_name), true)),
                    assign_stmt(&exn, new_expr(ident(&ctor), vec![])),
                    throw_stmt(ident(&exn)),
                ];
                vec![self.guard_if(
                    binary(BinaryOp::In, ident(&name_tmp), ident("__global")),
                    read,
                    raise,
                )]
            } else {
                vec![assign_stmt(
                    &t,
                    member(ident("__global"), ident(&name_tmp), true),
                )]
            };
            stmts.extend(self.wrap_with_reads(&withs, &name_tmp, &t, base));
            Ok(stmts)
        } else if withs.is_empty() {
            let t = self.target(slot);
            Ok(vec![assign_stmt(&t, ident(name))])
        } else {
            let name_tmp = self.gen_tmp();
            let mut stmts = vec![assign_stmt(&name_tmp, str_lit(name))];
            let t = self.target(slot);
            let base = vec![assign_stmt(&t, ident(name))];
            stmts.extend(self.wrap_with_reads(&withs, &name_tmp, &t, base));
            Ok(stmts)
        }
    }

    /// Resolve an identifier ignoring any `with` objects, reusing an
    /// already-materialized name literal for the global read. Used as the
    /// innermost fallback of call cascades.
    fn read_ident_plain(
        &mut self,
        name: &str,
        scope: &Scope<'_>,
        slot: &mut Slot,
        name_tmp: &str,
    ) -> Vec<Stmt> {
        let t = self.target(slot);
        if !is_tmp(name) && scope.is_global(name) {
            vec![assign_stmt(
                &t,
                member(ident("__global"), ident(name_tmp), true),
            )]
        } else {
            vec![assign_stmt(&t, ident(name))]
        }
    }

    fn wrap_with_reads(
        &self,
        withs: &[String],
        name_tmp: &str,
        t: &str,
        mut acc: Vec<Stmt>,
    ) -> Vec<Stmt> {
        for w in withs {
            let through = vec![assign_stmt(t, member(ident(w), ident(name_tmp), true))];
            acc = vec![self.guard_if(
                binary(BinaryOp::In, ident(name_tmp), ident(w)),
                through,
                acc,
            )];
        }
        acc
    }

    fn wrap_with_writes(
        &self,
        withs: &[String],
        name_tmp: &str,
        t: &str,
        mut acc: Vec<Stmt>,
    ) -> Vec<Stmt> {
        for w in withs {
            let through = vec![store_stmt(
                member(ident(w), ident(name_tmp), true),
                ident(t),
            )];
            acc = vec![self.guard_if(
                binary(BinaryOp::In, ident(name_tmp), ident(w)),
                through,
                acc,
            )];
        }
        acc
    }

    fn norm_assign(
        &mut self,
        operator: AssignOp,
        left: &Expr,
        right: &Expr,
        scope: &Scope<'_>,
        slot: &mut Slot,
    ) -> Result<(Vec<Stmt>, String)> {
        if let Some(bin) = operator.binary_op() {
            return self.norm_compound_assign(bin, left, right, scope, slot);
        }
        match left {
            Expr::Ident { name } => {
                if !is_tmp(name) && scope.is_global(name) {
                    let name_tmp = self.gen_tmp();
                    let mut stmts = vec![assign_stmt(&name_tmp, str_lit(name))];
                    let (rs, t) = self.norm_expr(right, scope, slot.given.as_deref())?;
                    stmts.extend(rs);
                    let withs = scope.possible_with_bindings(name);
                    let base = vec![store_stmt(
                        member(ident("__global"), ident(&name_tmp), true),
                        ident(&t),
                    )];
                    stmts.extend(self.wrap_with_writes(&withs, &name_tmp, &t, base));
                    Ok((stmts, t))
                } else {
                    if !is_tmp(name) && !scope.is_local(name) {
                        // Assigned from a nested function; downstream passes
                        // need the binding flagged.
                        if let Some(binding) = scope.lookup(name) {
                            self.exposed.insert((binding.entity, binding.name));
                        }
                    }
                    let withs = if is_tmp(name) {
                        Vec::new()
                    } else {
                        scope.possible_with_bindings(name)
                    };
                    if withs.is_empty() {
                        if let Some(given) = slot.given.clone() {
                            let (mut stmts, _) = self.norm_expr(right, scope, Some(&given))?;
                            stmts.push(assign_stmt(name, ident(&given)));
                            Ok((stmts, given))
                        } else {
                            // No consumer provided a slot: the variable
                            // itself is the target, sparing the copy.
                            self.norm_expr(right, scope, Some(name))
                        }
                    } else {
                        let name_tmp = self.gen_tmp();
                        let mut stmts = vec![assign_stmt(&name_tmp, str_lit(name))];
                        let (rs, t) = self.norm_expr(right, scope, slot.given.as_deref())?;
                        stmts.extend(rs);
                        let base = vec![assign_stmt(name, ident(&t))];
                        stmts.extend(self.wrap_with_writes(&withs, &name_tmp, &t, base));
                        Ok((stmts, t))
                    }
                }
            }
            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                let (mut stmts, base) = self.norm_expr(object, scope, None)?;
                let (idx_stmts, index) = self.member_index(property, *computed, scope)?;
                stmts.extend(idx_stmts);
                let (rs, t) = self.norm_expr(right, scope, slot.given.as_deref())?;
                stmts.extend(rs);
                stmts.push(store_stmt(
                    member_from(ident(&base), ident(&index), *computed),
                    ident(&t),
                ));
                Ok((stmts, t))
            }
            _ => Err(NormalizeError::InvalidAssignTarget),
        }
    }

    /// `L op= R` desugars to `T := R; L := L op T`, with base and index of
    /// a member target evaluated exactly once.
    fn norm_compound_assign(
        &mut self,
        bin: BinaryOp,
        left: &Expr,
        right: &Expr,
        scope: &Scope<'_>,
        slot: &mut Slot,
    ) -> Result<(Vec<Stmt>, String)> {
        match left {
            Expr::Ident { .. } => {
                let (mut stmts, rn) = self.norm_expr(right, scope, None)?;
                let desugared = assign(left.clone(), binary(bin, left.clone(), ident(&rn)));
                let (ds, t) = self.norm_expr(&desugared, scope, slot.given.as_deref())?;
                stmts.extend(ds);
                Ok((stmts, t))
            }
            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                let (mut stmts, base) = self.norm_expr(object, scope, None)?;
                let (idx_stmts, index) = self.member_index(property, *computed, scope)?;
                stmts.extend(idx_stmts);
                let old = self.gen_tmp();
                stmts.push(assign_stmt(
                    &old,
                    member_from(ident(&base), ident(&index), *computed),
                ));
                let (rs, rn) = self.norm_expr(right, scope, None)?;
                stmts.extend(rs);
                let t = self.target(slot);
                stmts.push(assign_stmt(&t, binary(bin, ident(&old), ident(&rn))));
                stmts.push(store_stmt(
                    member_from(ident(&base), ident(&index), *computed),
                    ident(&t),
                ));
                Ok((stmts, t))
            }
            _ => Err(NormalizeError::InvalidAssignTarget),
        }
    }

    fn norm_update(
        &mut self,
        operator: UpdateOp,
        prefix: bool,
        argument: &Expr,
        scope: &Scope<'_>,
        slot: &mut Slot,
    ) -> Result<(Vec<Stmt>, String)> {
        // Prefix updates, and postfix ones whose value nobody reads, are
        // plain compound assignments.
        if prefix || slot.given.is_none() {
            let desugared = assign_op(operator.compound_op(), argument.clone(), num(1.0));
            return self.norm_expr(&desugared, scope, slot.given.as_deref());
        }
        match argument {
            Expr::Ident { name } => {
                let mut stmts = self.read_ident(name, scope, slot)?;
                let t = self.target(slot);
                let desugared = assign_op(operator.compound_op(), argument.clone(), num(1.0));
                let (us, _) = self.norm_expr(&desugared, scope, None)?;
                stmts.extend(us);
                Ok((stmts, t))
            }
            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                let (mut stmts, base) = self.norm_expr(object, scope, None)?;
                let (idx_stmts, index) = self.member_index(property, *computed, scope)?;
                stmts.extend(idx_stmts);
                let t = self.target(slot);
                stmts.push(assign_stmt(
                    &t,
                    member_from(ident(&base), ident(&index), *computed),
                ));
                let one = self.gen_tmp();
                stmts.push(assign_stmt(&one, num(1.0)));
                let updated = self.gen_tmp();
                stmts.push(assign_stmt(
                    &updated,
                    binary(operator.binary_op(), ident(&t), ident(&one)),
                ));
                stmts.push(store_stmt(
                    member_from(ident(&base), ident(&index), *computed),
                    ident(&updated),
                ));
                Ok((stmts, t))
            }
            _ => Err(NormalizeError::InvalidAssignTarget),
        }
    }

    fn norm_delete(
        &mut self,
        argument: &Expr,
        scope: &Scope<'_>,
        slot: &mut Slot,
    ) -> Result<(Vec<Stmt>, String)> {
        match argument {
            Expr::Ident { name } => {
                if !is_tmp(name) && scope.is_global(name) {
                    let name_tmp = self.gen_tmp();
                    let mut stmts = vec![assign_stmt(&name_tmp, str_lit(name))];
                    let t = self.target(slot);
                    stmts.push(assign_stmt(
                        &t,
                        unary(
                            UnaryOp::Delete,
                            member(ident("__global"), ident(&name_tmp), true),
                        ),
                    ));
                    Ok((stmts, t))
                } else {
                    // Deleting a local is a fixed no-op at runtime; keep the
                    // operand untouched.
                    let t = self.target(slot);
                    Ok((
                        vec![assign_stmt(&t, unary(UnaryOp::Delete, ident(name)))],
                        t,
                    ))
                }
            }
            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                let (mut stmts, base) = self.norm_expr(object, scope, None)?;
                let (idx_stmts, index) = self.member_index(property, *computed, scope)?;
                stmts.extend(idx_stmts);
                let t = self.target(slot);
                stmts.push(assign_stmt(
                    &t,
                    unary(
                        UnaryOp::Delete,
                        member_from(ident(&base), ident(&index), *computed),
                    ),
                ));
                Ok((stmts, t))
            }
            _ => Err(NormalizeError::InvalidDeleteOperand),
        }
    }

    fn norm_call_like(
        &mut self,
        callee: &Expr,
        arguments: &[Expr],
        scope: &Scope<'_>,
        slot: &mut Slot,
        is_new: bool,
    ) -> Result<(Vec<Stmt>, String)> {
        match callee {
            // Method calls keep the receiver: base and index evaluate once,
            // then the call goes through the member node itself.
            Expr::Member {
                object,
                property,
                computed,
                ..
            } if !is_new => {
                let (mut stmts, base) = self.norm_expr(object, scope, None)?;
                let (idx_stmts, index) = self.member_index(property, *computed, scope)?;
                stmts.extend(idx_stmts);
                let (arg_stmts, args) = self.norm_args(arguments, scope)?;
                stmts.extend(arg_stmts);
                let t = self.target(slot);
                stmts.push(assign_stmt(
                    &t,
                    call(
                        member_from(ident(&base), ident(&index), *computed),
                        arg_idents(&args),
                    ),
                ));
                Ok((stmts, t))
            }
            // `eval` stays a direct call; anything else would break its
            // access to the caller scope. TODO(with): an `eval` shadowed by
            // a with object still calls the real one here.
            Expr::Ident { name } if name == "eval" && !is_new => {
                let (mut stmts, args) = self.norm_args(arguments, scope)?;
                let t = self.target(slot);
                stmts.push(assign_stmt(&t, call(ident("eval"), arg_idents(&args))));
                Ok((stmts, t))
            }
            Expr::Ident { name }
                if !is_tmp(name) && !scope.possible_with_bindings(name).is_empty() =>
            {
                let withs = scope.possible_with_bindings(name);
                let name_tmp = self.gen_tmp();
                let mut stmts = vec![assign_stmt(&name_tmp, str_lit(name))];
                let (arg_stmts, args) = self.norm_args(arguments, scope)?;
                stmts.extend(arg_stmts);
                let mut fallback_slot = Slot::new(None);
                let mut fallback = self.read_ident_plain(name, scope, &mut fallback_slot, &name_tmp);
                let fname = self.target(&mut fallback_slot);
                let t = self.target(slot);
                fallback.push(assign_stmt(
                    &t,
                    build_call(is_new, ident(&fname), arg_idents(&args)),
                ));
                let mut acc = fallback;
                for w in &withs {
                    // Calling through the with object makes it the receiver,
                    // matching what the source form would do.
                    let through = vec![assign_stmt(
                        &t,
                        build_call(
                            is_new,
                            member(ident(w), ident(&name_tmp), true),
                            arg_idents(&args),
                        ),
                    )];
                    acc = vec![self.guard_if(
                        binary(BinaryOp::In, ident(&name_tmp), ident(w)),
                        through,
                        acc,
                    )];
                }
                stmts.extend(acc);
                Ok((stmts, t))
            }
            _ => {
                let (mut stmts, fname) = self.norm_expr(callee, scope, None)?;
                let (arg_stmts, args) = self.norm_args(arguments, scope)?;
                stmts.extend(arg_stmts);
                let t = self.target(slot);
                stmts.push(assign_stmt(
                    &t,
                    build_call(is_new, ident(&fname), arg_idents(&args)),
                ));
                Ok((stmts, t))
            }
        }
    }

    fn norm_args(
        &mut self,
        arguments: &[Expr],
        scope: &Scope<'_>,
    ) -> Result<(Vec<Stmt>, Vec<String>)> {
        let mut stmts = Vec::new();
        let mut names = Vec::new();
        for arg in arguments {
            let (es, en) = self.norm_expr(arg, scope, None)?;
            stmts.extend(es);
            names.push(en);
        }
        Ok((stmts, names))
    }

    /// Name the index of a member access: the property expression for
    /// computed accesses, a synthesized string literal for dotted ones.
    fn member_index(
        &mut self,
        property: &Expr,
        computed: bool,
        scope: &Scope<'_>,
    ) -> Result<(Vec<Stmt>, String)> {
        if computed {
            self.norm_expr(property, scope, None)
        } else if let Expr::Ident { name } = property {
            let t = self.gen_tmp();
            Ok((vec![assign_stmt(&t, str_lit(name))], t))
        } else {
            Err(NormalizeError::InvalidMemberProperty)
        }
    }
}
