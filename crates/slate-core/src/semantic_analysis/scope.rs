// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! Scoped identifier-to-type environment for the type checker.
//!
//! Scopes nest lexically: one per class (holding `self` and attributes),
//! one per method (formals), one per `let` body and `case` branch. Lookup
//! searches innermost-first, so inner bindings shadow outer ones; a
//! duplicate is only an error within a single scope level.

use crate::symbol::Symbol;
use std::collections::HashMap;

/// Why a `bind` call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    /// The name is `self`, which can never be rebound.
    ReservedSelf,
    /// The name is already bound in the innermost scope.
    AlreadyBound,
}

/// A stack of lexical scopes mapping identifiers to their declared types.
#[derive(Debug, Clone)]
pub struct TypeEnvironment {
    levels: Vec<ScopeLevel>,
    self_name: Symbol,
}

#[derive(Debug, Clone, Default)]
struct ScopeLevel {
    bindings: HashMap<Symbol, Symbol>,
}

impl TypeEnvironment {
    /// Creates an environment with a single root scope.
    ///
    /// `self_name` is the interned `self` symbol, which [`bind`](Self::bind)
    /// refuses to bind.
    #[must_use]
    pub fn new(self_name: Symbol) -> Self {
        Self {
            levels: vec![ScopeLevel::default()],
            self_name,
        }
    }

    /// Enters a new nested scope.
    pub fn enter_scope(&mut self) {
        self.levels.push(ScopeLevel::default());
    }

    /// Exits the current scope.
    ///
    /// Returns `true` if a scope was popped, `false` if already at the root.
    /// Popping the root scope is a no-op, never a panic.
    pub fn exit_scope(&mut self) -> bool {
        if self.levels.len() > 1 {
            self.levels.pop();
            true
        } else {
            false
        }
    }

    /// Binds `name` to `declared_type` in the innermost scope.
    ///
    /// Rejects `self` and duplicates within the innermost scope; shadowing
    /// an outer scope is legal and succeeds.
    ///
    /// # Panics
    /// Never panics: `levels` always contains at least the root scope.
    pub fn bind(&mut self, name: Symbol, declared_type: Symbol) -> Result<(), BindError> {
        if name == self.self_name {
            return Err(BindError::ReservedSelf);
        }
        // INVARIANT: levels always contains at least the root scope
        let level = self.levels.last_mut().expect("levels is never empty");
        if level.bindings.contains_key(&name) {
            return Err(BindError::AlreadyBound);
        }
        level.bindings.insert(name, declared_type);
        Ok(())
    }

    /// Binds `self` in the innermost scope.
    ///
    /// Only the class traversal calls this, once per class scope;
    /// everything else goes through [`bind`](Self::bind).
    ///
    /// # Panics
    /// Never panics: `levels` always contains at least the root scope.
    pub fn bind_self(&mut self, declared_type: Symbol) {
        self.levels
            .last_mut()
            .expect("levels is never empty")
            .bindings
            .insert(self.self_name, declared_type);
    }

    /// Looks up a name, searching innermost to outermost.
    #[must_use]
    pub fn lookup(&self, name: Symbol) -> Option<Symbol> {
        self.levels
            .iter()
            .rev()
            .find_map(|level| level.bindings.get(&name).copied())
    }

    /// Current nesting depth (0 = root).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }
}
