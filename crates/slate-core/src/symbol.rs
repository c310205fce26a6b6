// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! String interning for the compiler.
//!
//! Every name in the compiler — class names, method names, identifiers,
//! type names — is interned into a [`Symbol`], a small copyable handle
//! compared by integer equality. The [`Interner`] owns the backing strings
//! and is created by the driver and threaded by reference through the
//! analysis; there is no global table.

use ecow::EcoString;
use std::collections::HashMap;

/// An interned string handle.
///
/// Two symbols from the same [`Interner`] are equal iff they were interned
/// from equal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

/// Owns interned strings and hands out [`Symbol`] handles.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    names: Vec<EcoString>,
    index: HashMap<EcoString, Symbol>,
}

impl Interner {
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string, returning the existing handle if it was seen before.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.index.get(name) {
            return sym;
        }
        let sym = Symbol(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        let owned = EcoString::from(name);
        self.names.push(owned.clone());
        self.index.insert(owned, sym);
        sym
    }

    /// Resolves a symbol back to its string.
    ///
    /// # Panics
    /// Panics if `sym` was produced by a different interner. Symbols never
    /// cross interner boundaries in this crate.
    #[must_use]
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.names[sym.0 as usize].as_str()
    }

    /// Number of distinct strings interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The fixed names the semantic analyzer needs, pre-interned.
///
/// Populated once per analysis run so every comparison against a built-in
/// name is a handle comparison.
#[derive(Debug, Clone, Copy)]
pub struct WellKnownSymbols {
    pub object: Symbol,
    pub io: Symbol,
    pub int: Symbol,
    pub boolean: Symbol,
    pub string: Symbol,
    /// The `SELF_TYPE` pseudo-type.
    pub self_type: Symbol,
    /// The `self` identifier.
    pub self_name: Symbol,
    /// Placeholder parent of `Object`.
    pub no_class: Symbol,
    /// Bottom type given to absent initializers.
    pub no_type: Symbol,
    pub main_class: Symbol,
    pub main_method: Symbol,

    // Built-in method and formal names.
    pub abort: Symbol,
    pub type_name: Symbol,
    pub copy: Symbol,
    pub out_string: Symbol,
    pub out_int: Symbol,
    pub in_string: Symbol,
    pub in_int: Symbol,
    pub length: Symbol,
    pub concat: Symbol,
    pub substr: Symbol,
    pub arg: Symbol,
    pub arg2: Symbol,
}

impl WellKnownSymbols {
    /// Interns every well-known name into `interner`.
    pub fn populate(interner: &mut Interner) -> Self {
        Self {
            object: interner.intern("Object"),
            io: interner.intern("IO"),
            int: interner.intern("Int"),
            boolean: interner.intern("Bool"),
            string: interner.intern("String"),
            self_type: interner.intern("SELF_TYPE"),
            self_name: interner.intern("self"),
            no_class: interner.intern("_no_class"),
            no_type: interner.intern("_no_type"),
            main_class: interner.intern("Main"),
            main_method: interner.intern("main"),
            abort: interner.intern("abort"),
            type_name: interner.intern("type_name"),
            copy: interner.intern("copy"),
            out_string: interner.intern("out_string"),
            out_int: interner.intern("out_int"),
            in_string: interner.intern("in_string"),
            in_int: interner.intern("in_int"),
            length: interner.intern("length"),
            concat: interner.intern("concat"),
            substr: interner.intern("substr"),
            arg: interner.intern("arg"),
            arg2: interner.intern("arg2"),
        }
    }
}
