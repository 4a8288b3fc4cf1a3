//! Normalization driver.
//!
//! Owns the per-call state (temporary counter, exposure table, label map)
//! and the per-entity state (temporary list, unified-return slots), and
//! finalizes each function or program entity: hoisted `var` construction,
//! function-declaration prelude, trailing or unified return, and the
//! program wrapper `(function(__global){ ... })(this);`.
//!
//! The per-kind rewriting lives in the submodules:
//! - `expr` - expression normalization into three-address statements
//! - `stmt` - statement normalization and control-flow lowering

use std::collections::HashMap;
use std::mem;

use flatscript_ast::factory::*;
use flatscript_ast::{Declarator, Expr, Function, Program, Stmt};
use indexmap::IndexSet;

use crate::decls::{self, DeclKind};
use crate::options::Options;
use crate::scope::{EntityId, Scope};
use crate::{NormalizeError, Result, cflow};

mod expr;
mod stmt;


/// Recognize names generated by [`Normalizer::gen_tmp`].
pub fn is_tmp(name: &str) -> bool {
    name.strip_prefix("tmp")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Normalize a whole program.
///
/// The result is a single expression statement applying an anonymous
/// function to `this`; the parameter `__global` names the global object
/// for every global access in the rewritten body.
pub fn normalize_program(program: &Program, options: &Options) -> Result<Program> {
    let mut n = Normalizer::new(options);
    let scope = Scope::Global {
        decls: decls::collect(&program.body),
        entity: n.entity.id,
    };
    let body = n.norm_stmts(&program.body, &scope, None, None)?;
    let prelude = n.function_prelude(&scope)?;

    let mut inner = Vec::new();
    if !n.entity.tmps.is_empty() {
        let declarations = n
            .entity
            .tmps
            .iter()
            .map(|t| declarator(t.clone(), None))
            .collect();
        inner.push(Stmt::VarDecl { declarations });
    }
    inner.extend(prelude);
    inner.extend(body);
    n.compat_pad(&mut inner);

    let wrapper = Function {
        id: None,
        params: vec!["__global".to_string()],
        body: inner,
    };
    Ok(Program {
        body: vec![expr_stmt(call(
            Expr::Function {
                function: Box::new(wrapper),
            },
            vec![Expr::This],
        ))],
    })
}

/// Normalize a top-level function.
///
/// Free names inside the function are treated as globals.
pub fn normalize_function(fun: &Function, options: &Options) -> Result<Function> {
    let mut n = Normalizer::new(options);
    let scope = Scope::Global {
        decls: vec![],
        entity: n.entity.id,
    };
    n.entity_function(fun, &scope, None)
}

pub(crate) struct Normalizer {
    opts: Options,
    tmp_count: usize,
    next_entity: EntityId,
    entity: EntityState,
    /// Bindings assigned from a nested function, keyed by declaring entity.
    exposed: IndexSet<(EntityId, String)>,
    /// Source label → continue target of its loop.
    cont_labels: HashMap<String, ContTarget>,
    /// Binding of the hoisted function declaration about to be normalized.
    fn_binding: Option<(EntityId, String)>,
}

/// Where a `continue` lands after rewriting.
///
/// Loops lowered to `while` put the body in a labeled header block, so
/// continuing is a labeled `break` that falls through to the update and
/// condition recomputation. `for-in` stays a native loop; there the label
/// sits on the loop itself and a labeled `break` would terminate it, so
/// continues stay native labeled continues.
#[derive(Debug, Clone)]
pub(crate) enum ContTarget {
    Header(String),
    Loop(String),
}

struct EntityState {
    id: EntityId,
    /// Temporaries to declare in this entity's hoisted `var`.
    tmps: Vec<String>,
    ret_label: Option<String>,
    ret_var: Option<String>,
}

impl EntityState {
    fn new(id: EntityId) -> Self {
        Self {
            id,
            tmps: Vec::new(),
            ret_label: None,
            ret_var: None,
        }
    }
}

/// Lazily allocated result slot of one expression normalization.
pub(crate) struct Slot {
    given: Option<String>,
    alloc: Option<String>,
}

impl Slot {
    pub(crate) fn new(target: Option<&str>) -> Self {
        Self {
            given: target.map(str::to_string),
            alloc: None,
        }
    }
}

impl Normalizer {
    fn new(options: &Options) -> Self {
        Self {
            opts: options.canonical(),
            tmp_count: 0,
            next_entity: 1,
            entity: EntityState::new(0),
            exposed: IndexSet::new(),
            cont_labels: HashMap::new(),
            fn_binding: None,
        }
    }

    /// Fresh temporary, declared in the current entity.
    fn gen_tmp(&mut self) -> String {
        let name = format!("tmp{}", self.tmp_count);
        self.tmp_count += 1;
        self.entity.tmps.push(name.clone());
        name
    }

    /// Fresh label; shares the temporary name space but is never declared.
    fn gen_label(&mut self) -> String {
        let name = format!("tmp{}", self.tmp_count);
        self.tmp_count += 1;
        name
    }

    /// The name the current expression's value lives in, allocating a
    /// temporary on first demand when the caller did not provide one.
    pub(crate) fn target(&mut self, slot: &mut Slot) -> String {
        if let Some(given) = &slot.given {
            return given.clone();
        }
        match &slot.alloc {
            Some(t) => t.clone(),
            None => {
                let t = self.gen_tmp();
                slot.alloc = Some(t.clone());
                t
            }
        }
    }

    /// Normalize one nested function into a fresh entity.
    ///
    /// `binding` names the declaration binding the function hoists from, if
    /// any; a binding marked exposed aborts normalization.
    pub(crate) fn entity_function(
        &mut self,
        fun: &Function,
        parent: &Scope<'_>,
        binding: Option<(EntityId, String)>,
    ) -> Result<Function> {
        let id = self.next_entity;
        self.next_entity += 1;
        let saved = mem::replace(&mut self.entity, EntityState::new(id));
        let result = self.function_entity_inner(fun, parent, binding);
        self.entity = saved;
        result
    }

    fn function_entity_inner(
        &mut self,
        fun: &Function,
        parent: &Scope<'_>,
        binding: Option<(EntityId, String)>,
    ) -> Result<Function> {
        let scope = Scope::Function {
            parent,
            fun,
            decls: decls::collect(&fun.body),
            entity: self.entity.id,
        };
        if self.opts.unify_ret {
            self.entity.ret_label = Some(self.gen_label());
            self.entity.ret_var = Some(self.gen_tmp());
        }

        let mut body = self.norm_stmts(&fun.body, &scope, None, None)?;
        if let (Some(lbl), Some(ret_var)) =
            (self.entity.ret_label.clone(), self.entity.ret_var.clone())
        {
            let wrapped = labeled(lbl, self.mk_block(body));
            body = vec![wrapped, ret(Some(ident(ret_var)))];
        } else if cflow::block_completes(&body) {
            body.push(ret(Some(null_lit())));
        }

        if let Some((entity, name)) = &binding {
            if self.exposed.contains(&(*entity, name.clone())) {
                return Err(NormalizeError::ExposedFunction(name.clone()));
            }
        }
        if let Some(name) = &fun.id {
            if self.exposed.contains(&(self.entity.id, name.clone())) {
                return Err(NormalizeError::ExposedFunction(name.clone()));
            }
        }

        let prelude = self.function_prelude(&scope)?;

        let entity_id = self.entity.id;
        let mut names: IndexSet<String> =
            scope.decls().iter().map(|d| d.name.to_string()).collect();
        names.extend(self.entity.tmps.iter().cloned());

        let mut stmts = Vec::new();
        if !names.is_empty() {
            let declarations = names
                .into_iter()
                .map(|name| {
                    let exposed = self.exposed.contains(&(entity_id, name.clone()));
                    Declarator {
                        name,
                        init: None,
                        exposed,
                    }
                })
                .collect();
            stmts.push(Stmt::VarDecl { declarations });
        }
        stmts.extend(prelude);
        stmts.extend(body);
        self.compat_pad(&mut stmts);

        Ok(Function {
            id: fun.id.clone(),
            params: fun.params.clone(),
            body: stmts,
        })
    }

    /// Rebuild the entity's hoisted function declarations as assignments,
    /// in declaration order. Inner names are stripped outside compatibility
    /// mode so the emitted functions are plain anonymous expressions.
    fn function_prelude(&mut self, scope: &Scope<'_>) -> Result<Vec<Stmt>> {
        let entity = scope.entity();
        let funcs: Vec<(String, Function)> = scope
            .decls()
            .iter()
            .filter(|d| d.kind == DeclKind::Func)
            .filter_map(|d| d.function.map(|f| (d.name.to_string(), f.clone())))
            .collect();

        let mut out = Vec::new();
        for (name, f) in funcs {
            let inner = Function {
                id: if self.opts.backwards_compatible {
                    f.id.clone()
                } else {
                    None
                },
                params: f.params.clone(),
                body: f.body.clone(),
            };
            let hoisted = assign(
                ident(&name),
                Expr::Function {
                    function: Box::new(inner),
                },
            );
            self.fn_binding = Some((entity, name));
            let (stmts, _) = self.norm_expr(&hoisted, scope, None)?;
            out.extend(stmts);
        }
        Ok(out)
    }

    /// Build an `if` on an already-named condition. Under `unfold_ifs`,
    /// two-armed ifs with non-empty arms split into two one-armed ifs
    /// sharing a captured test value.
    pub(crate) fn mk_if(
        &mut self,
        cond: &str,
        then_stmts: Vec<Stmt>,
        else_stmts: Vec<Stmt>,
    ) -> Vec<Stmt> {
        if self.opts.unfold_ifs && !then_stmts.is_empty() && !else_stmts.is_empty() {
            let capture = self.gen_tmp();
            vec![
                assign_stmt(&capture, ident(cond)),
                if_stmt(
                    ident(cond),
                    self.mk_block(then_stmts),
                    Some(self.mk_block(vec![])),
                ),
                if_stmt(
                    ident(&capture),
                    self.mk_block(vec![]),
                    Some(self.mk_block(else_stmts)),
                ),
            ]
        } else {
            vec![if_stmt(
                ident(cond),
                self.mk_block(then_stmts),
                Some(self.mk_block(else_stmts)),
            )]
        }
    }

    /// Guard statements on a raw test expression, used by the `with` and
    /// global-read cascades where the test is a membership check.
    pub(crate) fn guard_if(&self, test: Expr, then_stmts: Vec<Stmt>, else_stmts: Vec<Stmt>) -> Stmt {
        if_stmt(
            test,
            self.mk_block(then_stmts),
            Some(self.mk_block(else_stmts)),
        )
    }

    pub(crate) fn mk_block(&self, mut stmts: Vec<Stmt>) -> Stmt {
        self.compat_pad(&mut stmts);
        Stmt::Block { body: stmts }
    }

    /// Compatibility consumers reparse the output; a block ending in `if`
    /// gets an empty statement (rendered as an empty block) appended.
    pub(crate) fn compat_pad(&self, stmts: &mut Vec<Stmt>) {
        if self.opts.backwards_compatible && matches!(stmts.last(), Some(Stmt::If { .. })) {
            stmts.push(Stmt::Block { body: vec![] });
        }
    }
}
