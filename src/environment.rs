//! Lexically scoped bindings.
//!
//! Scopes live in a [`ScopeTree`] arena and refer to their parent by
//! [`ScopeId`]. The origin scope created with the tree has a terminal parent:
//! lookups that reach it fail, and global bindings issued anywhere in the
//! chain land in the origin itself. An [`Environment`] is a mutable view of
//! the tree positioned at one scope.

use crate::types::{Expression, Symbol};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug)]
pub struct UnknownSymbol(pub Symbol);

impl fmt::Display for UnknownSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol '{}' is not defined", self.0)
    }
}

#[derive(Debug)]
pub struct LockedSymbol(pub Symbol);

impl fmt::Display for LockedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol '{}' is locked and cannot be rebound", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy)]
enum Parent {
    Terminal,
    Scope(ScopeId),
}

#[derive(Debug)]
struct Scope {
    parent: Parent,
    bindings: HashMap<Symbol, Expression>,
    locked: HashSet<Symbol>,
}

impl Scope {
    fn new(parent: Parent) -> Self {
        Self {
            parent,
            bindings: HashMap::new(),
            locked: HashSet::new(),
        }
    }

    fn bind(&mut self, symbol: Symbol, value: Expression) -> Result<Binding<'_>, LockedSymbol> {
        if self.locked.contains(&symbol) {
            return Err(LockedSymbol(symbol));
        }
        log::trace!("bind {} to {}", symbol, value);
        self.bindings.insert(symbol.clone(), value);
        Ok(Binding {
            locked: &mut self.locked,
            symbol,
        })
    }
}

/// Handle on a binding that was just installed.
#[derive(Debug)]
pub struct Binding<'a> {
    locked: &'a mut HashSet<Symbol>,
    symbol: Symbol,
}

impl Binding<'_> {
    /// Rejects any further rebinding of the symbol in the same scope.
    pub fn lock(self) {
        log::trace!("lock {}", self.symbol);
        self.locked.insert(self.symbol);
    }
}

#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(Parent::Terminal)],
        }
    }

    pub fn origin(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn root(&mut self) -> Environment<'_> {
        let scope = self.origin();
        Environment { tree: self, scope }
    }

    /// Repositions on a scope previously handed out by this tree.
    pub fn at(&mut self, scope: ScopeId) -> Option<Environment<'_>> {
        match scope.0 < self.scopes.len() {
            true => Some(Environment { tree: self, scope }),
            false => None,
        }
    }

    fn origin_of(&self, mut id: ScopeId) -> ScopeId {
        while let Parent::Scope(parent) = self.scopes[id.0].parent {
            id = parent;
        }
        id
    }
}

pub struct Environment<'t> {
    tree: &'t mut ScopeTree,
    scope: ScopeId,
}

impl Environment<'_> {
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn bind(&mut self, symbol: Symbol, value: Expression) -> Result<Binding<'_>, LockedSymbol> {
        self.tree.scopes[self.scope.0].bind(symbol, value)
    }

    pub fn bind_global(
        &mut self,
        symbol: Symbol,
        value: Expression,
    ) -> Result<Binding<'_>, LockedSymbol> {
        let origin = self.tree.origin_of(self.scope);
        self.tree.scopes[origin.0].bind(symbol, value)
    }

    pub fn find(&self, symbol: &Symbol) -> Result<Expression, UnknownSymbol> {
        let mut id = self.scope;
        loop {
            let scope = &self.tree.scopes[id.0];
            if let Some(value) = scope.bindings.get(symbol) {
                return Ok(value.clone());
            }
            match scope.parent {
                Parent::Scope(parent) => id = parent,
                Parent::Terminal => return Err(UnknownSymbol(symbol.clone())),
            }
        }
    }

    pub fn is_locked(&self, symbol: &Symbol) -> bool {
        self.tree.scopes[self.scope.0].locked.contains(symbol)
    }

    pub fn extend(&mut self) -> Environment<'_> {
        let child = ScopeId(self.tree.scopes.len());
        self.tree.scopes.push(Scope::new(Parent::Scope(self.scope)));
        Environment {
            tree: &mut *self.tree,
            scope: child,
        }
    }
}
