// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! Built-in class definitions for the class hierarchy.
//!
//! The five built-in classes (`Object`, `IO`, `Int`, `Bool`, `String`) are
//! registered before any user-defined class, so a user class redefining one
//! of them is caught by the ordinary duplicate-class check.
//!
//! The runtime's private value slots on `Int`/`Bool`/`String` are a code
//! generation concern and are not modelled here.

use super::{AttrSig, ClassInfo, FormalSig, MethodSig};
use crate::symbol::{Symbol, WellKnownSymbols};
use ecow::EcoString;
use std::collections::HashMap;

/// File tag carried by built-in class diagnostics (which never fire in
/// practice; built-ins are well-formed by construction).
pub(super) const BUILTIN_FILE: &str = "<builtin>";

/// Returns true if `name` is one of the five built-in classes.
pub(super) fn is_builtin_class(wk: &WellKnownSymbols, name: Symbol) -> bool {
    name == wk.object || name == wk.io || name == wk.int || name == wk.boolean || name == wk.string
}

fn method(name: Symbol, formals: Vec<FormalSig>, return_type: Symbol, defined_in: Symbol) -> MethodSig {
    MethodSig {
        name,
        formals,
        return_type,
        defined_in,
        line: 0,
    }
}

fn class(name: Symbol, parent: Option<Symbol>, methods: Vec<MethodSig>) -> ClassInfo {
    ClassInfo {
        name,
        parent,
        attributes: Vec::<AttrSig>::new(),
        methods,
        file: EcoString::from(BUILTIN_FILE),
        line: 0,
    }
}

/// Returns all built-in class definitions, keyed by class name.
pub(super) fn builtin_classes(wk: &WellKnownSymbols) -> HashMap<Symbol, ClassInfo> {
    let mut classes = HashMap::new();

    classes.insert(
        wk.object,
        class(
            wk.object,
            None,
            vec![
                method(wk.abort, vec![], wk.object, wk.object),
                method(wk.type_name, vec![], wk.string, wk.object),
                method(wk.copy, vec![], wk.self_type, wk.object),
            ],
        ),
    );

    classes.insert(
        wk.io,
        class(
            wk.io,
            Some(wk.object),
            vec![
                method(
                    wk.out_string,
                    vec![FormalSig { name: wk.arg, declared_type: wk.string }],
                    wk.self_type,
                    wk.io,
                ),
                method(
                    wk.out_int,
                    vec![FormalSig { name: wk.arg, declared_type: wk.int }],
                    wk.self_type,
                    wk.io,
                ),
                method(wk.in_string, vec![], wk.string, wk.io),
                method(wk.in_int, vec![], wk.int, wk.io),
            ],
        ),
    );

    classes.insert(wk.int, class(wk.int, Some(wk.object), vec![]));
    classes.insert(wk.boolean, class(wk.boolean, Some(wk.object), vec![]));

    classes.insert(
        wk.string,
        class(
            wk.string,
            Some(wk.object),
            vec![
                method(wk.length, vec![], wk.int, wk.string),
                method(
                    wk.concat,
                    vec![FormalSig { name: wk.arg, declared_type: wk.string }],
                    wk.string,
                    wk.string,
                ),
                method(
                    wk.substr,
                    vec![
                        FormalSig { name: wk.arg, declared_type: wk.int },
                        FormalSig { name: wk.arg2, declared_type: wk.int },
                    ],
                    wk.string,
                    wk.string,
                ),
            ],
        ),
    );

    classes
}
