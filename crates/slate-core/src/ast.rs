// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! The decorated abstract syntax tree.
//!
//! The parser produces this tree with every [`Expr::ty`] slot set to
//! `None`; the semantic analyzer writes each slot exactly once per pass.
//! All names are interned [`Symbol`]s — the tree owns no strings except
//! string literals and the per-class file tag.

use crate::symbol::Symbol;
use ecow::EcoString;

/// A complete parsed program: one or more class declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: Symbol,
    /// Declared parent. The parser defaults this to `Object` when the
    /// source has no `inherits` clause.
    pub parent: Symbol,
    pub features: Vec<Feature>,
    /// Name of the source file this class came from, used in diagnostics.
    pub file: EcoString,
    pub line: u32,
}

/// A class body member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    Attribute(Attribute),
    Method(Method),
}

/// An attribute: `name : Type <- init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Symbol,
    pub declared_type: Symbol,
    /// `ExprKind::NoExpr` when the attribute has no initializer.
    pub init: Expr,
    pub line: u32,
}

/// A method: `name(formals) : ReturnType { body }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: Symbol,
    pub formals: Vec<Formal>,
    pub return_type: Symbol,
    pub body: Expr,
    pub line: u32,
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formal {
    pub name: Symbol,
    pub declared_type: Symbol,
    pub line: u32,
}

/// An expression node with its source line and (after analysis) its
/// static type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
    /// Written by the type checker; `None` until then.
    pub ty: Option<Symbol>,
}

impl Expr {
    /// Creates an undecorated expression node.
    #[must_use]
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Self { kind, line, ty: None }
    }

    /// The absent-expression placeholder (empty attribute or `let`
    /// initializer).
    #[must_use]
    pub fn no_expr(line: u32) -> Self {
        Self::new(ExprKind::NoExpr, line)
    }

    /// The static type written by the analyzer, if it has run.
    #[must_use]
    pub fn static_type(&self) -> Option<Symbol> {
        self.ty
    }
}

/// Arithmetic operators over `Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    /// Source spelling, for diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

/// Ordering comparisons over `Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
}

impl CompareOp {
    /// Source spelling, for diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// One branch of a `case` expression: `binding : Type => body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseBranch {
    pub binding: Symbol,
    pub declared_type: Symbol,
    pub body: Expr,
    pub line: u32,
}

/// The closed set of expression forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// `target <- value`
    Assign { target: Symbol, value: Box<Expr> },
    /// `receiver@StaticType.method(args)`
    StaticDispatch {
        receiver: Box<Expr>,
        static_type: Symbol,
        method: Symbol,
        args: Vec<Expr>,
    },
    /// `receiver.method(args)`
    Dispatch {
        receiver: Box<Expr>,
        method: Symbol,
        args: Vec<Expr>,
    },
    /// `if condition then … else … fi`
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `while condition loop body pool`
    While { condition: Box<Expr>, body: Box<Expr> },
    /// `case scrutinee of branches esac`
    Case {
        scrutinee: Box<Expr>,
        branches: Vec<CaseBranch>,
    },
    /// `{ e1; …; en; }` — never empty in parser output.
    Block { body: Vec<Expr> },
    /// A single `let` binding; the parser desugars multi-binding `let`s
    /// into a nest of these.
    Let {
        binding: Symbol,
        declared_type: Symbol,
        init: Box<Expr>,
        body: Box<Expr>,
    },
    Arith {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Integer negation `~e`.
    Neg(Box<Expr>),
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `lhs = rhs`
    Eq { lhs: Box<Expr>, rhs: Box<Expr> },
    /// Boolean complement `not e`.
    Not(Box<Expr>),
    /// `isvoid e`
    IsVoid(Box<Expr>),
    IntLit(i64),
    StrLit(EcoString),
    BoolLit(bool),
    /// An identifier reference, including `self`.
    Ident(Symbol),
    /// `new Type`, including `new SELF_TYPE`.
    New(Symbol),
    /// Absent initializer placeholder.
    NoExpr,
}
