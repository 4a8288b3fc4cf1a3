//! Lexical scope chain.
//!
//! An immutable chain of scope links built on the stack while the
//! normalizer descends the tree. Besides the usual function/catch binding
//! lookups it tracks the temporaries holding live `with` objects, so
//! identifier rewriting can compile the membership-test cascades.

use flatscript_ast::Function;

use crate::decls::{Decl, DeclKind};

/// Identifies one function or program entity within a normalization call.
pub type EntityId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Func,
    Param,
    CatchParam,
    /// The self-name of a named function expression or declaration.
    FnSelf,
}

/// A resolved binding: which entity declares the name, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub entity: EntityId,
    pub name: String,
    pub kind: BindingKind,
}

pub enum Scope<'a> {
    Global {
        decls: Vec<Decl<'a>>,
        entity: EntityId,
    },
    Function {
        parent: &'a Scope<'a>,
        fun: &'a Function,
        decls: Vec<Decl<'a>>,
        entity: EntityId,
    },
    Catch {
        parent: &'a Scope<'a>,
        param: &'a str,
    },
    With {
        parent: &'a Scope<'a>,
        /// Temporary holding the `with` object, live for the whole body.
        object_tmp: String,
    },
}

impl<'a> Scope<'a> {
    /// Binding introduced by this link itself, ignoring parents.
    fn binds_here(&self, name: &str) -> Option<BindingKind> {
        match self {
            Scope::Global { decls, .. } => find_decl(decls, name),
            Scope::Function { fun, decls, .. } => {
                if fun.params.iter().any(|p| p == name) {
                    return Some(BindingKind::Param);
                }
                if let Some(kind) = find_decl(decls, name) {
                    return Some(kind);
                }
                if fun.id.as_deref() == Some(name) {
                    return Some(BindingKind::FnSelf);
                }
                None
            }
            Scope::Catch { param, .. } => (*param == name).then_some(BindingKind::CatchParam),
            Scope::With { .. } => None,
        }
    }

    /// Whether a reference to `name` resolves to the global object.
    pub fn is_global(&self, name: &str) -> bool {
        let mut scope = self;
        loop {
            match scope {
                Scope::Global { .. } => return true,
                Scope::With { parent, .. } => scope = parent,
                _ => {
                    if scope.binds_here(name).is_some() {
                        return false;
                    }
                    scope = scope.parent_or_self();
                }
            }
        }
    }

    /// Whether `name` is global and declared by a top-level `var` or
    /// function declaration.
    pub fn is_declared_global(&self, name: &str) -> bool {
        let mut scope = self;
        loop {
            match scope {
                Scope::Global { decls, .. } => return find_decl(decls, name).is_some(),
                Scope::With { parent, .. } => scope = parent,
                _ => {
                    if scope.binds_here(name).is_some() {
                        return false;
                    }
                    scope = scope.parent_or_self();
                }
            }
        }
    }

    /// Whether `name` is bound within the innermost enclosing function,
    /// counting params, hoisted declarations, self-names, and catch params.
    pub fn is_local(&self, name: &str) -> bool {
        let mut scope = self;
        loop {
            match scope {
                Scope::Global { .. } => return false,
                Scope::With { parent, .. } => scope = parent,
                Scope::Catch { parent, param } => {
                    if *param == name {
                        return true;
                    }
                    scope = parent;
                }
                Scope::Function { .. } => return scope.binds_here(name).is_some(),
            }
        }
    }

    /// Resolve a name to its declaring binding, if any non-global one exists.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        let mut scope = self;
        loop {
            match scope {
                Scope::With { parent, .. } => scope = parent,
                Scope::Global { .. } => {
                    return scope.binds_here(name).map(|kind| Binding {
                        entity: scope.entity(),
                        name: name.to_string(),
                        kind,
                    });
                }
                _ => {
                    if let Some(kind) = scope.binds_here(name) {
                        return Some(Binding {
                            entity: scope.entity(),
                            name: name.to_string(),
                            kind,
                        });
                    }
                    scope = scope.parent_or_self();
                }
            }
        }
    }

    /// Temporaries of the `with` objects that may capture a reference to
    /// `name`, ordered innermost last.
    pub fn possible_with_bindings(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut scope = self;
        loop {
            match scope {
                Scope::With { parent, object_tmp } => {
                    out.push(object_tmp.clone());
                    scope = parent;
                }
                Scope::Global { .. } => break,
                _ => {
                    if scope.binds_here(name).is_some() {
                        break;
                    }
                    scope = scope.parent_or_self();
                }
            }
        }
        out.reverse();
        out
    }

    /// Hoisted declarations of the nearest enclosing function or program.
    pub fn decls(&self) -> &[Decl<'a>] {
        match self {
            Scope::Global { decls, .. } | Scope::Function { decls, .. } => decls,
            Scope::Catch { parent, .. } | Scope::With { parent, .. } => parent.decls(),
        }
    }

    /// Entity id of the nearest enclosing function or program.
    pub fn entity(&self) -> EntityId {
        match self {
            Scope::Global { entity, .. } | Scope::Function { entity, .. } => *entity,
            Scope::Catch { parent, .. } | Scope::With { parent, .. } => parent.entity(),
        }
    }

    /// Whether the nearest enclosing entity is the program itself, which
    /// decides the `this` → `__global` rewrite.
    pub fn in_global_entity(&self) -> bool {
        match self {
            Scope::Global { .. } => true,
            Scope::Function { .. } => false,
            Scope::Catch { parent, .. } | Scope::With { parent, .. } => parent.in_global_entity(),
        }
    }

    fn parent_or_self(&self) -> &Scope<'a> {
        match self {
            Scope::Global { .. } => self,
            Scope::Function { parent, .. }
            | Scope::Catch { parent, .. }
            | Scope::With { parent, .. } => parent,
        }
    }
}

fn find_decl(decls: &[Decl<'_>], name: &str) -> Option<BindingKind> {
    decls.iter().find(|d| d.name == name).map(|d| match d.kind {
        DeclKind::Var => BindingKind::Var,
        DeclKind::Func => BindingKind::Func,
    })
}

#[cfg(test)]
mod tests {
    use flatscript_ast::factory::function;

    use super::*;
    use crate::decls;

    #[test]
    fn unbound_names_are_global() {
        let global = Scope::Global {
            decls: vec![],
            entity: 0,
        };
        assert!(global.is_global("x"));
        assert!(!global.is_declared_global("x"));
        assert!(!global.is_local("x"));
        assert!(global.lookup("x").is_none());
    }

    #[test]
    fn params_and_decls_bind_locally() {
        let global = Scope::Global {
            decls: vec![],
            entity: 0,
        };
        let body = vec![flatscript_ast::factory::var_decl(&["v"])];
        let fun = function(Some("f"), &["p"], vec![]);
        let scope = Scope::Function {
            parent: &global,
            fun: &fun,
            decls: decls::collect(&body),
            entity: 1,
        };
        assert!(scope.is_local("p"));
        assert!(scope.is_local("v"));
        assert!(scope.is_local("f"));
        assert!(!scope.is_global("p"));
        assert!(scope.is_global("x"));
        let b = scope.lookup("v").expect("bound");
        assert_eq!(b.kind, BindingKind::Var);
        assert_eq!(b.entity, 1);
        assert_eq!(scope.lookup("f").expect("bound").kind, BindingKind::FnSelf);
    }

    #[test]
    fn catch_params_are_local_to_the_function() {
        let global = Scope::Global {
            decls: vec![],
            entity: 0,
        };
        let fun = function(None, &[], vec![]);
        let fscope = Scope::Function {
            parent: &global,
            fun: &fun,
            decls: vec![],
            entity: 1,
        };
        let cscope = Scope::Catch {
            parent: &fscope,
            param: "e",
        };
        assert!(cscope.is_local("e"));
        assert!(!cscope.is_global("e"));
        assert_eq!(
            cscope.lookup("e").expect("bound").kind,
            BindingKind::CatchParam
        );
    }

    #[test]
    fn with_objects_collect_until_the_binding_scope() {
        let global = Scope::Global {
            decls: vec![],
            entity: 0,
        };
        let fun = function(None, &["x"], vec![]);
        let fscope = Scope::Function {
            parent: &global,
            fun: &fun,
            decls: vec![],
            entity: 1,
        };
        let w1 = Scope::With {
            parent: &fscope,
            object_tmp: "tmp0".into(),
        };
        let w2 = Scope::With {
            parent: &w1,
            object_tmp: "tmp1".into(),
        };
        // Innermost last.
        assert_eq!(w2.possible_with_bindings("x"), vec!["tmp0", "tmp1"]);
        // Free names keep collecting out to the global scope.
        assert_eq!(w2.possible_with_bindings("y"), vec!["tmp0", "tmp1"]);
        // A name bound between the withs and the reference sees none... and
        // one bound inside sees all of them.
        let inner_fun = function(None, &["z"], vec![]);
        let inner = Scope::Function {
            parent: &w2,
            fun: &inner_fun,
            decls: vec![],
            entity: 2,
        };
        assert!(inner.possible_with_bindings("z").is_empty());
        assert_eq!(inner.possible_with_bindings("x"), vec!["tmp0", "tmp1"]);
    }
}
