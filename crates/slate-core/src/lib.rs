// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! Slate compiler core.
//!
//! This crate contains the static semantic analyser for Slate:
//! - Symbol interning (compact identifiers for names and types)
//! - The abstract syntax tree the parser produces
//! - Semantic analysis (class hierarchy, inheritance checks, type checking)
//!
//! Analysis decorates the AST in place with static types; the driver
//! inspects the returned diagnostics to decide whether compilation
//! continues into later phases.

#![doc = include_str!("../../../README.md")]

pub mod ast;
pub mod semantic_analysis;
pub mod symbol;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{ClassDecl, Expr, ExprKind, Feature, Program};
    pub use crate::semantic_analysis::{analyse, AnalysisResult, Diagnostics, SemanticError};
    pub use crate::symbol::{Interner, Symbol, WellKnownSymbols};
}
