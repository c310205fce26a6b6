// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis for Slate.
//!
//! Analysis runs in three stages over the parsed program:
//! 1. Hierarchy construction: built-ins are installed, user classes are
//!    registered, and duplicate classes, undeclared parents, and
//!    inheritance cycles are rejected.
//! 2. Hierarchy validation: a depth-first walk checks attribute
//!    uniqueness and method override compatibility along every
//!    inheritance path.
//! 3. Type checking: every attribute initializer and method body is
//!    checked against the subtype lattice, decorating each expression
//!    node with its static type.
//!
//! Stages 1 and 2 are gates: if either records an error, analysis stops
//! there, because later stages assume a well-formed tree. Stage 3 never
//! stops early; it recovers at each error so one run reports as much as
//! possible.

use crate::ast::Program;
use crate::symbol::{Interner, WellKnownSymbols};
use tracing::debug;

pub mod class_hierarchy;
pub mod error;
pub mod scope;
mod type_checker;


pub use class_hierarchy::ClassHierarchy;
pub use error::{Diagnostics, SemanticError, SemanticErrorKind};
pub use scope::{BindError, TypeEnvironment};

/// Message the driver prints when analysis halts with errors.
pub const HALT_MESSAGE: &str = "Compilation halted due to static semantic errors.";

/// Result of semantic analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Errors from all stages that ran, in report order.
    pub diagnostics: Diagnostics,
}

impl AnalysisResult {
    /// Returns `true` if the program passed all stages.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Analyses `program`, decorating expression types in place.
///
/// On success every reachable expression node carries its static type.
/// On failure the program is left partially decorated; callers must not
/// feed it to later phases, and should print [`HALT_MESSAGE`] after the
/// collected errors.
pub fn analyse(
    program: &mut Program,
    interner: &mut Interner,
) -> AnalysisResult {
    let wk = WellKnownSymbols::populate(interner);
    let mut diagnostics = Diagnostics::new();

    let hierarchy = ClassHierarchy::build(program, interner, wk, &mut diagnostics);
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "halting after hierarchy construction");
        return AnalysisResult { diagnostics };
    }

    hierarchy.validate(interner, &mut diagnostics);
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "halting after hierarchy validation");
        return AnalysisResult { diagnostics };
    }

    type_checker::check_program(program, &hierarchy, interner, wk, &mut diagnostics);
    debug!(errors = diagnostics.error_count(), "semantic analysis finished");
    AnalysisResult { diagnostics }
}
