// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! The expression type checker.
//!
//! Runs after both hierarchy gates have passed, so the hierarchy is a
//! valid tree and every inherited feature is consistent. The checker walks
//! the class tree depth-first, opens one environment scope per class
//! (`self` plus all visible attributes), and checks every attribute
//! initializer and method body against the rules of the type lattice.
//!
//! Type errors never abort the pass: each rule reports into the sink and
//! produces a best-effort type for its node, so one run surfaces as many
//! errors as possible. Every expression node's `ty` slot is written
//! exactly once.

use crate::ast::{Attribute, ClassDecl, Expr, ExprKind, Feature, Method, Program};
use crate::symbol::{Interner, Symbol, WellKnownSymbols};
use ecow::EcoString;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::class_hierarchy::ClassHierarchy;
use super::error::{Diagnostics, SemanticError, SemanticErrorKind};
use super::scope::TypeEnvironment;

/// Type-checks every user class in the program, decorating expression
/// nodes in place.
pub(super) fn check_program(
    program: &mut Program,
    hierarchy: &ClassHierarchy,
    interner: &Interner,
    wk: WellKnownSymbols,
    diagnostics: &mut Diagnostics,
) {
    // Index of the surviving (first) declaration of each class name.
    let mut index: HashMap<Symbol, usize> = HashMap::new();
    for (i, decl) in program.classes.iter().enumerate() {
        index.entry(decl.name).or_insert(i);
    }

    let mut checker = TypeChecker {
        hierarchy,
        interner,
        wk,
        env: TypeEnvironment::new(wk.self_name),
        diagnostics,
        file: EcoString::new(),
    };
    checker.check_class_tree(wk.object, program, &index);
}

struct TypeChecker<'a> {
    hierarchy: &'a ClassHierarchy,
    interner: &'a Interner,
    wk: WellKnownSymbols,
    env: TypeEnvironment,
    diagnostics: &'a mut Diagnostics,
    /// File tag of the class currently being checked.
    file: EcoString,
}

impl<'a> TypeChecker<'a> {
    fn check_class_tree(
        &mut self,
        class: Symbol,
        program: &mut Program,
        index: &HashMap<Symbol, usize>,
    ) {
        if !self.hierarchy.is_builtin(class) {
            if let Some(&i) = index.get(&class) {
                self.check_class(class, &mut program.classes[i]);
            }
        }
        let hierarchy = self.hierarchy;
        for &child in hierarchy.children_of(class) {
            self.check_class_tree(child, program, index);
        }
    }

    fn check_class(&mut self, class: Symbol, decl: &mut ClassDecl) {
        debug!(class = self.interner.resolve(class), "type checking class");
        self.file = decl.file.clone();

        self.env.enter_scope();
        self.env.bind_self(class);
        let hierarchy = self.hierarchy;
        for attr in hierarchy.attributes_in_scope(class) {
            // The hierarchy gate already rejected duplicate and `self`
            // attributes.
            let _ = self.env.bind(attr.name, attr.declared_type);
        }

        for feature in &mut decl.features {
            match feature {
                Feature::Attribute(attr) => self.check_attribute(class, attr),
                Feature::Method(method) => self.check_method(class, method),
            }
        }

        self.env.exit_scope();
    }

    /// Attribute rule: the initializer (checked with `self` and all
    /// attributes in scope) must conform to the declared type. An absent
    /// initializer has the bottom type and conforms to anything.
    fn check_attribute(&mut self, class: Symbol, attr: &mut Attribute) {
        let t_init = self.check_expr(class, &mut attr.init);
        if !self.conforms(t_init, attr.declared_type, class) {
            self.error(
                attr.line,
                SemanticErrorKind::AssignmentTypeMismatch {
                    target: self.name(attr.name),
                    expected: self.name(attr.declared_type),
                    found: self.name(t_init),
                },
            );
        }
    }

    /// Method rule: formals are bound in a fresh scope, then the body must
    /// conform to the declared return type.
    fn check_method(&mut self, class: Symbol, method: &mut Method) {
        self.env.enter_scope();
        for formal in &method.formals {
            if self.env.bind(formal.name, formal.declared_type).is_err() {
                self.error(
                    formal.line,
                    SemanticErrorKind::DuplicateBinding {
                        name: self.name(formal.name),
                    },
                );
            }
        }

        let t_body = self.check_expr(class, &mut method.body);
        if !self.conforms(t_body, method.return_type, class) {
            self.error(
                method.line,
                SemanticErrorKind::ReturnTypeMismatch {
                    method: self.name(method.name),
                    expected: self.name(method.return_type),
                    found: self.name(t_body),
                },
            );
        }
        self.env.exit_scope();
    }

    /// Checks one expression, writes its `ty` slot, and returns the type.
    fn check_expr(&mut self, class: Symbol, expr: &mut Expr) -> Symbol {
        let line = expr.line;
        let wk = self.wk;

        let ty = match &mut expr.kind {
            ExprKind::Assign { target, value } => {
                let target = *target;
                let t_value = self.check_expr(class, value);
                match self.env.lookup(target) {
                    Some(declared) => {
                        if !self.conforms(t_value, declared, class) {
                            self.error(
                                line,
                                SemanticErrorKind::AssignmentTypeMismatch {
                                    target: self.name(target),
                                    expected: self.name(declared),
                                    found: self.name(t_value),
                                },
                            );
                        }
                    }
                    None => self.error(
                        line,
                        SemanticErrorKind::UndefinedIdentifier {
                            name: self.name(target),
                        },
                    ),
                }
                t_value
            }

            ExprKind::Dispatch { receiver, method, args } => {
                let method = *method;
                let t_recv = self.check_expr(class, receiver);
                let arg_types: Vec<Symbol> =
                    args.iter_mut().map(|arg| self.check_expr(class, arg)).collect();
                let lookup_class = self.hierarchy.resolve_self_type(t_recv, class);
                self.check_call(class, line, lookup_class, t_recv, method, &arg_types)
            }

            ExprKind::StaticDispatch { receiver, static_type, method, args } => {
                let (static_type, method) = (*static_type, *method);
                let t_recv = self.check_expr(class, receiver);
                let arg_types: Vec<Symbol> =
                    args.iter_mut().map(|arg| self.check_expr(class, arg)).collect();

                if static_type == wk.self_type || !self.hierarchy.has_class(static_type) {
                    self.error(
                        line,
                        SemanticErrorKind::InvalidStaticDispatchTarget {
                            target: self.name(static_type),
                            found: self.name(t_recv),
                        },
                    );
                    wk.object
                } else {
                    if !self.conforms(t_recv, static_type, class) {
                        self.error(
                            line,
                            SemanticErrorKind::InvalidStaticDispatchTarget {
                                target: self.name(static_type),
                                found: self.name(t_recv),
                            },
                        );
                    }
                    self.check_call(class, line, static_type, t_recv, method, &arg_types)
                }
            }

            ExprKind::If { condition, then_branch, else_branch } => {
                let t_cond = self.check_expr(class, condition);
                if t_cond != wk.boolean {
                    self.error(
                        condition.line,
                        SemanticErrorKind::ConditionNotBool {
                            construct: "if".into(),
                            found: self.name(t_cond),
                        },
                    );
                }
                let t_then = self.check_expr(class, then_branch);
                let t_else = self.check_expr(class, else_branch);
                let hierarchy = self.hierarchy;
                hierarchy.lub(
                    hierarchy.resolve_self_type(t_then, class),
                    hierarchy.resolve_self_type(t_else, class),
                )
            }

            ExprKind::While { condition, body } => {
                let t_cond = self.check_expr(class, condition);
                if t_cond != wk.boolean {
                    self.error(
                        condition.line,
                        SemanticErrorKind::ConditionNotBool {
                            construct: "while".into(),
                            found: self.name(t_cond),
                        },
                    );
                }
                self.check_expr(class, body);
                wk.object
            }

            ExprKind::Case { scrutinee, branches } => {
                self.check_expr(class, scrutinee);
                let mut seen = HashSet::new();
                let mut branch_types = Vec::with_capacity(branches.len());
                for branch in branches.iter_mut() {
                    if !seen.insert(branch.declared_type) {
                        self.error(
                            branch.line,
                            SemanticErrorKind::DuplicateCaseBranchType {
                                ty: self.name(branch.declared_type),
                            },
                        );
                    }
                    self.env.enter_scope();
                    let bound = self.hierarchy.resolve_self_type(branch.declared_type, class);
                    if self.env.bind(branch.binding, bound).is_err() {
                        self.error(
                            branch.line,
                            SemanticErrorKind::DuplicateBinding {
                                name: self.name(branch.binding),
                            },
                        );
                    }
                    let t_branch = self.check_expr(class, &mut branch.body);
                    self.env.exit_scope();
                    branch_types.push(self.hierarchy.resolve_self_type(t_branch, class));
                }
                self.hierarchy.join(branch_types)
            }

            ExprKind::Block { body } => {
                let mut t_last = wk.object;
                for e in body.iter_mut() {
                    t_last = self.check_expr(class, e);
                }
                t_last
            }

            ExprKind::Let { binding, declared_type, init, body } => {
                let (binding, declared_type) = (*binding, *declared_type);
                let t_init = self.check_expr(class, init);
                if !self.conforms(t_init, declared_type, class) {
                    self.error(
                        line,
                        SemanticErrorKind::AssignmentTypeMismatch {
                            target: self.name(binding),
                            expected: self.name(declared_type),
                            found: self.name(t_init),
                        },
                    );
                }
                self.env.enter_scope();
                // A declared SELF_TYPE is bound as the enclosing class.
                let bound = self.hierarchy.resolve_self_type(declared_type, class);
                if self.env.bind(binding, bound).is_err() {
                    self.error(
                        line,
                        SemanticErrorKind::DuplicateBinding {
                            name: self.name(binding),
                        },
                    );
                }
                let t_body = self.check_expr(class, body);
                self.env.exit_scope();
                t_body
            }

            ExprKind::Arith { op, lhs, rhs } => {
                let op = *op;
                let t_lhs = self.check_expr(class, lhs);
                let t_rhs = self.check_expr(class, rhs);
                if t_lhs != wk.int || t_rhs != wk.int {
                    self.error(
                        line,
                        SemanticErrorKind::ArithmeticOperandNotInt { op: op.as_str().into() },
                    );
                }
                wk.int
            }

            ExprKind::Neg(operand) => {
                let t = self.check_expr(class, operand);
                if t != wk.int {
                    self.error(
                        line,
                        SemanticErrorKind::ArithmeticOperandNotInt { op: "~".into() },
                    );
                }
                wk.int
            }

            ExprKind::Compare { op, lhs, rhs } => {
                let op = *op;
                let t_lhs = self.check_expr(class, lhs);
                let t_rhs = self.check_expr(class, rhs);
                if t_lhs != wk.int || t_rhs != wk.int {
                    self.error(
                        line,
                        SemanticErrorKind::ComparisonOperandNotInt { op: op.as_str().into() },
                    );
                }
                wk.boolean
            }

            ExprKind::Eq { lhs, rhs } => {
                let t_lhs = self.check_expr(class, lhs);
                let t_rhs = self.check_expr(class, rhs);
                let primitive =
                    |t: Symbol| t == wk.int || t == wk.boolean || t == wk.string;
                if (primitive(t_lhs) || primitive(t_rhs)) && t_lhs != t_rhs {
                    self.error(
                        line,
                        SemanticErrorKind::IncomparableEquality {
                            lhs: self.name(t_lhs),
                            rhs: self.name(t_rhs),
                        },
                    );
                }
                wk.boolean
            }

            ExprKind::Not(operand) => {
                let t = self.check_expr(class, operand);
                if t != wk.boolean {
                    self.error(
                        line,
                        SemanticErrorKind::ConditionNotBool {
                            construct: "not".into(),
                            found: self.name(t),
                        },
                    );
                }
                wk.boolean
            }

            ExprKind::IsVoid(operand) => {
                self.check_expr(class, operand);
                wk.boolean
            }

            ExprKind::IntLit(_) => wk.int,
            ExprKind::StrLit(_) => wk.string,
            ExprKind::BoolLit(_) => wk.boolean,

            ExprKind::Ident(name) => {
                let name = *name;
                // `self` is bound to the enclosing class by the class
                // traversal, so plain lookup covers it.
                if let Some(t) = self.env.lookup(name) {
                    t
                } else {
                    self.error(
                        line,
                        SemanticErrorKind::UndefinedIdentifier { name: self.name(name) },
                    );
                    wk.object
                }
            }

            ExprKind::New(ty) => {
                let ty = *ty;
                if ty == wk.self_type {
                    class
                } else if self.hierarchy.has_class(ty) {
                    ty
                } else {
                    self.error(
                        line,
                        SemanticErrorKind::UndefinedIdentifier { name: self.name(ty) },
                    );
                    wk.object
                }
            }

            ExprKind::NoExpr => wk.no_type,
        };

        expr.ty = Some(ty);
        ty
    }

    /// Shared tail of dynamic and static dispatch: resolve the method on
    /// `lookup_class`, check arity and argument conformance, and compute
    /// the result type. A `SELF_TYPE` return yields the receiver's
    /// decorated type, so `self.copy()` in class `C` has type `C`.
    fn check_call(
        &mut self,
        class: Symbol,
        line: u32,
        lookup_class: Symbol,
        receiver_type: Symbol,
        method: Symbol,
        arg_types: &[Symbol],
    ) -> Symbol {
        let hierarchy = self.hierarchy;
        let Some(sig) = hierarchy.resolve_method(lookup_class, method) else {
            self.error(
                line,
                SemanticErrorKind::UndefinedMethod { method: self.name(method) },
            );
            return self.wk.object;
        };

        if arg_types.len() != sig.formals.len() {
            self.error(
                line,
                SemanticErrorKind::ArityMismatch {
                    method: self.name(method),
                    expected: sig.formals.len(),
                    found: arg_types.len(),
                },
            );
        } else {
            for (&t_arg, formal) in arg_types.iter().zip(&sig.formals) {
                if !self.conforms(t_arg, formal.declared_type, class) {
                    self.error(
                        line,
                        SemanticErrorKind::ArgumentTypeMismatch {
                            method: self.name(method),
                            formal: self.name(formal.name),
                            expected: self.name(formal.declared_type),
                            found: self.name(t_arg),
                        },
                    );
                }
            }
        }

        if sig.return_type == self.wk.self_type {
            receiver_type
        } else {
            sig.return_type
        }
    }

    /// Conformance `a ≤ b` in class `class`, with `SELF_TYPE` resolved to
    /// the enclosing class on both sides. `self` and `new SELF_TYPE`
    /// already decorate as the enclosing class, so the substitution
    /// matters for declared types (`SELF_TYPE` returns and initializer
    /// targets) and for identifiers bound to a declared `SELF_TYPE`.
    fn conforms(&self, a: Symbol, b: Symbol, class: Symbol) -> bool {
        self.hierarchy.is_subtype(
            self.hierarchy.resolve_self_type(a, class),
            self.hierarchy.resolve_self_type(b, class),
        )
    }

    fn name(&self, sym: Symbol) -> EcoString {
        self.interner.resolve(sym).into()
    }

    fn error(&mut self, line: u32, kind: SemanticErrorKind) {
        self.diagnostics
            .report(SemanticError::new(self.file.clone(), line, kind));
    }
}
