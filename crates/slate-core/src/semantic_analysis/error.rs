// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis error types and the diagnostic sink.

use ecow::EcoString;
use std::fmt;
use thiserror::Error;

/// A semantic error discovered during analysis, located in a source file.
///
/// Renders as `<filename>:<line>: <message>`, the format the driver prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub file: EcoString,
    pub line: u32,
    pub kind: SemanticErrorKind,
}

impl SemanticError {
    /// Create a new semantic error.
    #[must_use]
    pub fn new(file: EcoString, line: u32, kind: SemanticErrorKind) -> Self {
        Self { file, line, kind }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.kind)
    }
}

/// Types of semantic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticErrorKind {
    /// A class name declared more than once, or redefining a built-in.
    #[error("class `{name}` is defined multiple times")]
    DuplicateClass { name: EcoString },

    /// A class that participates in an inheritance cycle.
    #[error("class `{name}`, or an ancestor of `{name}`, is involved in an inheritance cycle")]
    CyclicInheritance { name: EcoString },

    /// A class whose declared parent does not exist.
    #[error("class `{class}` inherits from undefined class `{parent}`")]
    UndeclaredParent { class: EcoString, parent: EcoString },

    /// An attribute redeclaring one already visible in the class.
    #[error("attribute `{name}` is already defined in this class or an ancestor")]
    DuplicateAttribute { name: EcoString },

    /// An attribute named `self`.
    #[error("`self` cannot be the name of an attribute")]
    IllegalSelfAttribute,

    /// A method declared more than once in the same class.
    #[error("method `{name}` is defined multiple times in the same class")]
    DuplicateMethod { name: EcoString },

    /// An override changing the declared return type.
    #[error(
        "override of method `{method}` changes its return type from `{expected}` to `{found}`"
    )]
    InvalidOverrideReturnType {
        method: EcoString,
        expected: EcoString,
        found: EcoString,
    },

    /// An override changing the number of formals.
    #[error(
        "override of method `{method}` declares {found} formals where the inherited method declares {expected}"
    )]
    InvalidOverrideArity {
        method: EcoString,
        expected: usize,
        found: usize,
    },

    /// An override changing a formal's declared type.
    #[error(
        "override of method `{method}` changes the type of formal `{formal}` from `{expected}` to `{found}`"
    )]
    InvalidOverrideArgType {
        method: EcoString,
        formal: EcoString,
        expected: EcoString,
        found: EcoString,
    },

    /// An identifier with no visible binding.
    #[error("undefined identifier `{name}`")]
    UndefinedIdentifier { name: EcoString },

    /// A binding that collides in its own scope, or tries to bind `self`.
    #[error("`{name}` cannot be bound here: it is `self` or already bound in this scope")]
    DuplicateBinding { name: EcoString },

    /// A dispatch to a method the receiver's class does not have.
    #[error("dispatch to undefined method `{method}`")]
    UndefinedMethod { method: EcoString },

    /// A dispatch with the wrong number of arguments.
    #[error("method `{method}` called with {found} arguments but declared with {expected} formals")]
    ArityMismatch {
        method: EcoString,
        expected: usize,
        found: usize,
    },

    /// A dispatch argument that does not conform to its formal.
    #[error(
        "in call of method `{method}`, type `{found}` of argument `{formal}` does not conform to declared type `{expected}`"
    )]
    ArgumentTypeMismatch {
        method: EcoString,
        formal: EcoString,
        expected: EcoString,
        found: EcoString,
    },

    /// A method body whose type does not conform to the declared return type.
    #[error(
        "inferred return type `{found}` of method `{method}` does not conform to declared return type `{expected}`"
    )]
    ReturnTypeMismatch {
        method: EcoString,
        expected: EcoString,
        found: EcoString,
    },

    /// An assignment or initializer whose type does not conform to the
    /// declared type of its target.
    #[error(
        "type `{found}` of assigned expression does not conform to declared type `{expected}` of `{target}`"
    )]
    AssignmentTypeMismatch {
        target: EcoString,
        expected: EcoString,
        found: EcoString,
    },

    /// A condition (or `not` operand) that is not `Bool`.
    #[error("`{construct}` condition has type `{found}` instead of `Bool`")]
    ConditionNotBool {
        construct: EcoString,
        found: EcoString,
    },

    /// A non-`Int` operand to `+ - * /` or `~`.
    #[error("non-`Int` operand to arithmetic operator `{op}`")]
    ArithmeticOperandNotInt { op: EcoString },

    /// A non-`Int` operand to `<` or `<=`.
    #[error("non-`Int` operand to comparison operator `{op}`")]
    ComparisonOperandNotInt { op: EcoString },

    /// An `=` between a primitive type and a different type.
    #[error("illegal comparison: `{lhs}` and `{rhs}` cannot be tested for equality")]
    IncomparableEquality { lhs: EcoString, rhs: EcoString },

    /// Two `case` branches declaring the same type.
    #[error("duplicate branch type `{ty}` in case expression")]
    DuplicateCaseBranchType { ty: EcoString },

    /// A static dispatch whose target class is unknown or not a supertype
    /// of the receiver.
    #[error("static dispatch target `{target}` is not a supertype of expression type `{found}`")]
    InvalidStaticDispatchTarget { target: EcoString, found: EcoString },
}

/// Accumulates semantic errors across the analysis.
///
/// Every check receives the sink by mutable reference; there is no global
/// error state. The driver decides whether to halt based on
/// [`Diagnostics::has_errors`] after each gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    errors: Vec<SemanticError>,
}

impl Diagnostics {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error.
    pub fn report(&mut self, error: SemanticError) {
        self.errors.push(error);
    }

    /// Number of errors recorded so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if any error has been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Iterates over recorded errors in report order.
    pub fn iter(&self) -> impl Iterator<Item = &SemanticError> {
        self.errors.iter()
    }

    /// Consumes the sink, yielding the errors in report order.
    #[must_use]
    pub fn into_errors(self) -> Vec<SemanticError> {
        self.errors
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a SemanticError;
    type IntoIter = std::slice::Iter<'a, SemanticError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
