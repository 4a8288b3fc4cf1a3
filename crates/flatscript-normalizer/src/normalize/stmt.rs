//! Statement normalization and control-flow lowering.
//!
//! Loops reduce to the one `while` form with a labeled continue header and
//! an explicit condition recomputation (`for-in` stays a native loop under
//! a single label), `switch` lowers to chained ifs with fall-through
//! preserved, `with` disappears into the scope chain, and every
//! `break`/`continue` is rewritten to target an explicit label.

use flatscript_ast::factory::*;
use flatscript_ast::{BinaryOp, CatchClause, Declarator, ForInTarget, ForInit, Stmt, SwitchCase};

use super::{ContTarget, Normalizer, is_tmp};
use crate::scope::Scope;
use crate::{NormalizeError, Result, cflow};

fn is_loop(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::While { .. } | Stmt::DoWhile { .. } | Stmt::For { .. } | Stmt::ForIn { .. }
    )
}

/// Statements a case body runs when its test matches: its own consequent
/// plus every following consequent up to the first that cannot complete
/// normally. This is what preserves source fall-through once the switch
/// becomes chained ifs.
fn extended_consequent<'a>(cases: &'a [SwitchCase], idx: usize) -> Vec<&'a Stmt> {
    let mut out = Vec::new();
    for case in &cases[idx..] {
        out.extend(case.consequent.iter());
        if let Some(last) = case.consequent.last() {
            if !cflow::may_complete_normally(last) {
                break;
            }
        }
    }
    out
}

impl Normalizer {
    pub(crate) fn norm_stmts(
        &mut self,
        stmts: &[Stmt],
        scope: &Scope<'_>,
        brk: Option<&str>,
        cont: Option<&ContTarget>,
    ) -> Result<Vec<Stmt>> {
        let mut out = Vec::new();
        for s in stmts {
            out.extend(self.norm_stmt(s, scope, brk, cont)?);
        }
        Ok(out)
    }

    fn norm_slice(
        &mut self,
        stmts: &[&Stmt],
        scope: &Scope<'_>,
        brk: Option<&str>,
        cont: Option<&ContTarget>,
    ) -> Result<Vec<Stmt>> {
        let mut out = Vec::new();
        for s in stmts {
            out.extend(self.norm_stmt(s, scope, brk, cont)?);
        }
        Ok(out)
    }

    /// Normalize one statement. `brk` and `cont` are the targets an
    /// unlabeled `break`/`continue` reaches here; they are only absent
    /// outside of any loop or switch.
    pub(crate) fn norm_stmt(
        &mut self,
        stmt: &Stmt,
        scope: &Scope<'_>,
        brk: Option<&str>,
        cont: Option<&ContTarget>,
    ) -> Result<Vec<Stmt>> {
        match stmt {
            Stmt::Empty => Ok(Vec::new()),
            Stmt::Expr { expression } => Ok(self.norm_expr(expression, scope, None)?.0),
            Stmt::VarDecl { declarations } => self.norm_declarators(declarations, scope),
            // Hoisted; the entity prelude re-emits it as an assignment.
            Stmt::FunctionDecl { .. } => Ok(Vec::new()),
            Stmt::Block { body } => self.norm_stmts(body, scope, brk, cont),
            Stmt::Return { argument } => {
                if let (Some(lbl), Some(ret_var)) =
                    (self.entity.ret_label.clone(), self.entity.ret_var.clone())
                {
                    let mut out = Vec::new();
                    if let Some(arg) = argument {
                        out.extend(self.norm_expr(arg, scope, Some(&ret_var))?.0);
                    }
                    out.push(break_stmt(Some(&lbl)));
                    Ok(out)
                } else {
                    match argument {
                        Some(arg) => {
                            let (mut out, tn) = self.norm_expr(arg, scope, None)?;
                            out.push(ret(Some(ident(&tn))));
                            Ok(out)
                        }
                        None => Ok(vec![ret(None)]),
                    }
                }
            }
            Stmt::Debugger => Ok(vec![Stmt::Debugger]),
            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                let (mut out, tn) = self.norm_expr(test, scope, None)?;
                let cons = self.norm_stmt(consequent, scope, brk, cont)?;
                let alt = match alternate {
                    Some(a) => self.norm_stmt(a, scope, brk, cont)?,
                    None => Vec::new(),
                };
                out.extend(self.mk_if(&tn, cons, alt));
                Ok(out)
            }
            Stmt::Throw { argument } => {
                let (mut out, tn) = self.norm_expr(argument, scope, None)?;
                out.push(throw_stmt(ident(&tn)));
                Ok(out)
            }
            Stmt::Try {
                block,
                handlers,
                finalizer,
            } => {
                if let Some(fin) = finalizer {
                    if !handlers.is_empty() {
                        // Split into catch-only inside finally-only and go
                        // through normalization again.
                        let inner = Stmt::Try {
                            block: block.clone(),
                            handlers: handlers.clone(),
                            finalizer: None,
                        };
                        let outer = Stmt::Try {
                            block: vec![inner],
                            handlers: Vec::new(),
                            finalizer: Some(fin.clone()),
                        };
                        return self.norm_stmt(&outer, scope, brk, cont);
                    }
                    if fin.is_empty() {
                        return self.norm_stmts(block, scope, brk, cont);
                    }
                    let mut nb = self.norm_stmts(block, scope, brk, cont)?;
                    self.compat_pad(&mut nb);
                    let mut nf = self.norm_stmts(fin, scope, brk, cont)?;
                    self.compat_pad(&mut nf);
                    return Ok(vec![Stmt::Try {
                        block: nb,
                        handlers: Vec::new(),
                        finalizer: Some(nf),
                    }]);
                }
                match handlers.as_slice() {
                    [] => self.norm_stmts(block, scope, brk, cont),
                    [h] => {
                        if h.guard.is_some() {
                            return Err(NormalizeError::GuardedCatch);
                        }
                        let mut nb = self.norm_stmts(block, scope, brk, cont)?;
                        self.compat_pad(&mut nb);
                        let catch_scope = Scope::Catch {
                            parent: scope,
                            param: &h.param,
                        };
                        let mut hb = self.norm_stmts(&h.body, &catch_scope, brk, cont)?;
                        self.compat_pad(&mut hb);
                        Ok(vec![Stmt::Try {
                            block: nb,
                            handlers: vec![CatchClause {
                                param: h.param.clone(),
                                guard: None,
                                body: hb,
                            }],
                            finalizer: None,
                        }])
                    }
                    _ => Err(NormalizeError::MultipleCatchClauses),
                }
            }
            Stmt::Labeled { .. } => {
                let mut chain: Vec<String> = Vec::new();
                let mut core: &Stmt = stmt;
                while let Stmt::Labeled { label, body } = core {
                    chain.push(label.clone());
                    core = body.as_ref();
                }
                let inner = if is_loop(core) {
                    // Lowered loops place this label on their continue
                    // header; a for-in keeps it on the loop itself and its
                    // continues stay native.
                    let cont_header = self.gen_label();
                    let target = if matches!(core, Stmt::ForIn { .. }) {
                        ContTarget::Loop(cont_header.clone())
                    } else {
                        ContTarget::Header(cont_header.clone())
                    };
                    let saved: Vec<(String, Option<ContTarget>)> = chain
                        .iter()
                        .map(|l| (l.clone(), self.cont_labels.insert(l.clone(), target.clone())))
                        .collect();
                    let result = self.norm_loop(core, scope, Some(&cont_header));
                    for (l, old) in saved {
                        match old {
                            Some(o) => {
                                self.cont_labels.insert(l, o);
                            }
                            None => {
                                self.cont_labels.remove(&l);
                            }
                        }
                    }
                    result?
                } else {
                    self.norm_stmt(core, scope, brk, cont)?
                };
                let mut wrapped = self.mk_block(inner);
                for l in chain.into_iter().rev() {
                    wrapped = labeled(l, wrapped);
                }
                Ok(vec![wrapped])
            }
            Stmt::Break { label } => match label {
                Some(_) => Ok(vec![stmt.clone()]),
                None => {
                    let target = brk.ok_or(NormalizeError::OrphanBreak)?;
                    Ok(vec![break_stmt(Some(target))])
                }
            },
            Stmt::Continue { label } => {
                let target = match label {
                    Some(l) => self
                        .cont_labels
                        .get(l)
                        .cloned()
                        .ok_or_else(|| NormalizeError::UndefinedLabel(l.clone()))?,
                    None => cont.cloned().ok_or(NormalizeError::OrphanContinue)?,
                };
                Ok(vec![match target {
                    // Breaking out of the header block falls through to the
                    // update and condition recomputation.
                    ContTarget::Header(l) => break_stmt(Some(&l)),
                    // Breaking a native loop's own label would terminate it.
                    ContTarget::Loop(l) => continue_stmt(Some(&l)),
                }])
            }
            Stmt::While { .. } | Stmt::DoWhile { .. } | Stmt::For { .. } | Stmt::ForIn { .. } => {
                self.norm_loop(stmt, scope, None)
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                let (mut out, disc) = self.norm_expr(discriminant, scope, None)?;
                let sw_lbl = self.gen_label();
                // Walk the cases bottom-up; whatever is accumulated so far
                // is the not-matched tail of the if being built.
                let mut accum: Vec<Stmt> = Vec::new();
                for idx in (0..cases.len()).rev() {
                    let case = &cases[idx];
                    let ext = extended_consequent(cases, idx);
                    match &case.test {
                        None => {
                            accum = self.norm_slice(&ext, scope, Some(&sw_lbl), cont)?;
                        }
                        Some(test) => {
                            let (mut chunk, tn) = self.norm_expr(test, scope, None)?;
                            let eq = self.gen_tmp();
                            chunk.push(assign_stmt(
                                &eq,
                                binary(BinaryOp::StrictEq, ident(&disc), ident(&tn)),
                            ));
                            let body = self.norm_slice(&ext, scope, Some(&sw_lbl), cont)?;
                            chunk.extend(self.mk_if(&eq, body, accum));
                            accum = chunk;
                        }
                    }
                }
                out.push(labeled(sw_lbl, self.mk_block(accum)));
                Ok(out)
            }
            Stmt::With { object, body } => {
                let with_tmp = self.gen_tmp();
                let (mut out, _) = self.norm_expr(object, scope, Some(&with_tmp))?;
                let with_scope = Scope::With {
                    parent: scope,
                    object_tmp: with_tmp,
                };
                out.extend(self.norm_stmt(body, &with_scope, brk, cont)?);
                Ok(out)
            }
        }
    }

    /// Emit the initializing assignments of a `var` statement; the names
    /// themselves are hoisted by the entity.
    fn norm_declarators(
        &mut self,
        declarations: &[Declarator],
        scope: &Scope<'_>,
    ) -> Result<Vec<Stmt>> {
        let mut out = Vec::new();
        for d in declarations {
            if let Some(init) = &d.init {
                let store = assign(ident(d.name.as_str()), init.clone());
                out.extend(self.norm_expr(&store, scope, None)?.0);
            }
        }
        Ok(out)
    }

    /// Lower any loop to the unified `while` shape:
    /// `cond; brk: while (condTmp) { cont: { body } update; cond }`.
    /// `preset_cont` is the continue-header label an enclosing labeled
    /// statement already registered for its `continue lbl` rewrites.
    fn norm_loop(
        &mut self,
        stmt: &Stmt,
        scope: &Scope<'_>,
        preset_cont: Option<&str>,
    ) -> Result<Vec<Stmt>> {
        match stmt {
            Stmt::While { test, body } => {
                let cond = self.gen_tmp();
                let brk = self.gen_label();
                let cont = match preset_cont {
                    Some(c) => c.to_string(),
                    None => self.gen_label(),
                };
                let cont_target = ContTarget::Header(cont.clone());
                let (mut out, _) = self.norm_expr(test, scope, Some(&cond))?;
                let nbody = self.norm_stmt(body, scope, Some(&brk), Some(&cont_target))?;
                let (recompute, _) = self.norm_expr(test, scope, Some(&cond))?;
                let mut loop_body = vec![labeled(cont, self.mk_block(nbody))];
                loop_body.extend(recompute);
                out.push(labeled(
                    brk,
                    while_stmt(ident(&cond), self.mk_block(loop_body)),
                ));
                Ok(out)
            }
            Stmt::DoWhile { body, test } => {
                let cond = self.gen_tmp();
                let brk = self.gen_label();
                let cont = match preset_cont {
                    Some(c) => c.to_string(),
                    None => self.gen_label(),
                };
                // Prime the condition so the first iteration always runs.
                let cont_target = ContTarget::Header(cont.clone());
                let mut out = vec![assign_stmt(&cond, bool_lit(true))];
                let nbody = self.norm_stmt(body, scope, Some(&brk), Some(&cont_target))?;
                let (recompute, _) = self.norm_expr(test, scope, Some(&cond))?;
                let mut loop_body = vec![labeled(cont, self.mk_block(nbody))];
                loop_body.extend(recompute);
                out.push(labeled(
                    brk,
                    while_stmt(ident(&cond), self.mk_block(loop_body)),
                ));
                Ok(out)
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                let mut out = match init {
                    Some(ForInit::Decl(ds)) => self.norm_declarators(ds, scope)?,
                    Some(ForInit::Expr(e)) => self.norm_expr(e, scope, None)?.0,
                    None => Vec::new(),
                };
                let cond = self.gen_tmp();
                let brk = self.gen_label();
                let cont = match preset_cont {
                    Some(c) => c.to_string(),
                    None => self.gen_label(),
                };
                match test {
                    Some(t) => out.extend(self.norm_expr(t, scope, Some(&cond))?.0),
                    // No test: the condition holds once and is never
                    // recomputed.
                    None => out.push(assign_stmt(&cond, bool_lit(true))),
                }
                let cont_target = ContTarget::Header(cont.clone());
                let nbody = self.norm_stmt(body, scope, Some(&brk), Some(&cont_target))?;
                let upd = match update {
                    Some(u) => self.norm_expr(u, scope, None)?.0,
                    None => Vec::new(),
                };
                let recompute = match test {
                    Some(t) => self.norm_expr(t, scope, Some(&cond))?.0,
                    None => Vec::new(),
                };
                let mut loop_body = vec![labeled(cont, self.mk_block(nbody))];
                loop_body.extend(upd);
                loop_body.extend(recompute);
                out.push(labeled(
                    brk,
                    while_stmt(ident(&cond), self.mk_block(loop_body)),
                ));
                Ok(out)
            }
            Stmt::ForIn { left, right, body } => {
                let mut out = Vec::new();
                if let ForInTarget::Decl { declarations } = left {
                    out.extend(self.norm_declarators(declarations, scope)?);
                }
                let (os, obj) = self.norm_expr(right, scope, None)?;
                out.extend(os);
                let (loop_var, prefix) = self.forin_var(left, scope)?;
                let lbl = match preset_cont {
                    Some(c) => c.to_string(),
                    None => self.gen_label(),
                };
                // One label serves both jumps: break exits the loop,
                // continue advances it.
                let cont_target = ContTarget::Loop(lbl.clone());
                let nbody = self.norm_stmt(body, scope, Some(&lbl), Some(&cont_target))?;
                let mut full = prefix;
                full.extend(nbody);
                out.push(labeled(
                    lbl,
                    Stmt::ForIn {
                        left: ForInTarget::Ident { name: loop_var },
                        right: ident(&obj),
                        body: Box::new(self.mk_block(full)),
                    },
                ));
                Ok(out)
            }
            _ => unreachable!("norm_loop requires a loop statement"),
        }
    }

    /// Pick the iteration variable of a `for-in`: a local identifier serves
    /// directly; anything routed through `with` or the global object gets a
    /// fresh temporary assigned onward in the body prefix.
    fn forin_var(&mut self, left: &ForInTarget, scope: &Scope<'_>) -> Result<(String, Vec<Stmt>)> {
        let name = match left {
            ForInTarget::Decl { declarations } => declarations
                .first()
                .map(|d| d.name.as_str())
                .ok_or(NormalizeError::InvalidForInTarget)?,
            ForInTarget::Ident { name } => name.as_str(),
            ForInTarget::Member { .. } => return Err(NormalizeError::InvalidForInTarget),
        };
        if is_tmp(name) || (scope.is_local(name) && scope.possible_with_bindings(name).is_empty()) {
            Ok((name.to_string(), Vec::new()))
        } else {
            let loop_var = self.gen_tmp();
            let store = assign(ident(name), ident(loop_var.as_str()));
            let (prefix, _) = self.norm_expr(&store, scope, None)?;
            Ok((loop_var, prefix))
        }
    }
}
