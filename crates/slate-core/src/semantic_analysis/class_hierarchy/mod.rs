// Copyright 2026 The Slate Authors
// SPDX-License-Identifier: Apache-2.0

//! The class hierarchy: inheritance graph, type lattice, and method
//! resolution.
//!
//! [`ClassHierarchy::build`] installs the built-in classes, merges the user
//! classes from the program, and reports the structural errors that make a
//! hierarchy unusable: duplicate class names, undeclared parents, and
//! inheritance cycles (detected as unreachability from `Object`).
//! [`ClassHierarchy::validate`] then walks the tree checking inherited
//! features: attribute redefinition and override signature compatibility.
//!
//! Once both gates pass, the hierarchy is a tree rooted at `Object` and the
//! subtype relation, least upper bounds, and method resolution are defined
//! on it.

use crate::ast::{ClassDecl, Feature, Program};
use crate::symbol::{Interner, Symbol, WellKnownSymbols};
use ecow::EcoString;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::error::{Diagnostics, SemanticError, SemanticErrorKind};

mod builtins;

/// A formal parameter in a method signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalSig {
    pub name: Symbol,
    pub declared_type: Symbol,
}

/// A method signature in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: Symbol,
    pub formals: Vec<FormalSig>,
    pub return_type: Symbol,
    /// Class that declares this signature.
    pub defined_in: Symbol,
    pub line: u32,
}

/// An attribute signature in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSig {
    pub name: Symbol,
    pub declared_type: Symbol,
    pub line: u32,
}

/// Information about a class in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: Symbol,
    /// Declared parent; `None` only for `Object`.
    pub parent: Option<Symbol>,
    pub attributes: Vec<AttrSig>,
    pub methods: Vec<MethodSig>,
    /// Source file, used in diagnostics.
    pub file: EcoString,
    pub line: u32,
}

/// The class hierarchy built during semantic analysis.
#[derive(Debug, Clone)]
pub struct ClassHierarchy {
    classes: HashMap<Symbol, ClassInfo>,
    /// Parent-to-children edges, only for classes whose parent exists.
    children: HashMap<Symbol, Vec<Symbol>>,
    wk: WellKnownSymbols,
}

impl ClassHierarchy {
    /// Builds a hierarchy from the built-in classes and a parsed program.
    ///
    /// Reports `DuplicateClass`, `UndeclaredParent`, and
    /// `CyclicInheritance` into `diagnostics`. All structural errors in the
    /// program are collected; the caller decides whether to continue based
    /// on the sink.
    #[must_use]
    pub fn build(
        program: &Program,
        interner: &Interner,
        wk: WellKnownSymbols,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut classes = builtins::builtin_classes(&wk);

        // First declaration of a name wins; every later one is reported.
        let mut user_order = Vec::new();
        for decl in &program.classes {
            if classes.contains_key(&decl.name) {
                diagnostics.report(SemanticError::new(
                    decl.file.clone(),
                    decl.line,
                    SemanticErrorKind::DuplicateClass {
                        name: interner.resolve(decl.name).into(),
                    },
                ));
                continue;
            }
            classes.insert(decl.name, Self::class_info(decl));
            user_order.push(decl.name);
        }

        // A class whose parent is missing is a root of its own subtree:
        // it gets UndeclaredParent, and its descendants get no second-hand
        // cycle diagnostic.
        let mut orphans = Vec::new();
        for &name in &user_order {
            let Some(parent) = classes[&name].parent else {
                continue;
            };
            if !classes.contains_key(&parent) {
                let info = &classes[&name];
                diagnostics.report(SemanticError::new(
                    info.file.clone(),
                    info.line,
                    SemanticErrorKind::UndeclaredParent {
                        class: interner.resolve(name).into(),
                        parent: interner.resolve(parent).into(),
                    },
                ));
                orphans.push(name);
            }
        }

        let mut children: HashMap<Symbol, Vec<Symbol>> = HashMap::new();
        for info in classes.values() {
            if let Some(parent) = info.parent {
                if classes.contains_key(&parent) {
                    children.entry(parent).or_default().push(info.name);
                }
            }
        }
        // HashMap iteration order is arbitrary; keep child order stable.
        for siblings in children.values_mut() {
            siblings.sort_unstable();
        }

        // Everything not reachable from Object or an orphan root is on a
        // cycle.
        let mut reachable = HashSet::new();
        let mut queue = vec![wk.object];
        queue.extend(&orphans);
        while let Some(name) = queue.pop() {
            if !reachable.insert(name) {
                continue;
            }
            if let Some(kids) = children.get(&name) {
                queue.extend(kids);
            }
        }
        for &name in &user_order {
            if !reachable.contains(&name) {
                let info = &classes[&name];
                diagnostics.report(SemanticError::new(
                    info.file.clone(),
                    info.line,
                    SemanticErrorKind::CyclicInheritance {
                        name: interner.resolve(name).into(),
                    },
                ));
            }
        }

        debug!(
            classes = classes.len(),
            errors = diagnostics.error_count(),
            "class hierarchy built"
        );

        Self { classes, children, wk }
    }

    fn class_info(decl: &ClassDecl) -> ClassInfo {
        let mut attributes = Vec::new();
        let mut methods = Vec::new();
        for feature in &decl.features {
            match feature {
                Feature::Attribute(attr) => attributes.push(AttrSig {
                    name: attr.name,
                    declared_type: attr.declared_type,
                    line: attr.line,
                }),
                Feature::Method(m) => methods.push(MethodSig {
                    name: m.name,
                    formals: m
                        .formals
                        .iter()
                        .map(|f| FormalSig {
                            name: f.name,
                            declared_type: f.declared_type,
                        })
                        .collect(),
                    return_type: m.return_type,
                    defined_in: decl.name,
                    line: m.line,
                }),
            }
        }
        ClassInfo {
            name: decl.name,
            parent: Some(decl.parent),
            attributes,
            methods,
            file: decl.file.clone(),
            line: decl.line,
        }
    }

    /// Validates inherited features over the whole tree.
    ///
    /// Walks depth-first from `Object`, carrying the set of visible
    /// attribute names and the map of visible method signatures. Each child
    /// receives its own copy of the accumulators, so sibling subtrees
    /// cannot see each other's declarations.
    ///
    /// Must only be called on a hierarchy whose [`build`](Self::build)
    /// produced no errors; otherwise parts of the program are unreachable
    /// from `Object` and go unchecked.
    pub fn validate(&self, interner: &Interner, diagnostics: &mut Diagnostics) {
        self.validate_class(self.wk.object, HashSet::new(), HashMap::new(), interner, diagnostics);
        debug!(errors = diagnostics.error_count(), "class hierarchy validated");
    }

    fn validate_class(
        &self,
        name: Symbol,
        mut attrs: HashSet<Symbol>,
        mut methods: HashMap<Symbol, MethodSig>,
        interner: &Interner,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(info) = self.classes.get(&name) else {
            return;
        };

        for attr in &info.attributes {
            if attr.name == self.wk.self_name {
                diagnostics.report(SemanticError::new(
                    info.file.clone(),
                    attr.line,
                    SemanticErrorKind::IllegalSelfAttribute,
                ));
                continue;
            }
            if !attrs.insert(attr.name) {
                diagnostics.report(SemanticError::new(
                    info.file.clone(),
                    attr.line,
                    SemanticErrorKind::DuplicateAttribute {
                        name: interner.resolve(attr.name).into(),
                    },
                ));
            }
        }

        // Re-declaring a method within one class is its own error, not an
        // override of the first declaration (which wins).
        let mut declared_here = HashSet::new();
        for method in &info.methods {
            if !declared_here.insert(method.name) {
                diagnostics.report(SemanticError::new(
                    info.file.clone(),
                    method.line,
                    SemanticErrorKind::DuplicateMethod {
                        name: interner.resolve(method.name).into(),
                    },
                ));
                continue;
            }
            if let Some(inherited) = methods.get(&method.name) {
                if self.compatible_override(method, inherited, &info.file, interner, diagnostics) {
                    methods.insert(method.name, method.clone());
                }
            } else {
                methods.insert(method.name, method.clone());
            }
        }

        for &child in self.children_of(name) {
            self.validate_class(child, attrs.clone(), methods.clone(), interner, diagnostics);
        }
    }

    /// Checks an override against the inherited signature. Reports the
    /// first mismatch found and returns `false`; checking of the feature
    /// then ceases.
    fn compatible_override(
        &self,
        method: &MethodSig,
        inherited: &MethodSig,
        file: &EcoString,
        interner: &Interner,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        if method.return_type != inherited.return_type {
            diagnostics.report(SemanticError::new(
                file.clone(),
                method.line,
                SemanticErrorKind::InvalidOverrideReturnType {
                    method: interner.resolve(method.name).into(),
                    expected: interner.resolve(inherited.return_type).into(),
                    found: interner.resolve(method.return_type).into(),
                },
            ));
            return false;
        }
        if method.formals.len() != inherited.formals.len() {
            diagnostics.report(SemanticError::new(
                file.clone(),
                method.line,
                SemanticErrorKind::InvalidOverrideArity {
                    method: interner.resolve(method.name).into(),
                    expected: inherited.formals.len(),
                    found: method.formals.len(),
                },
            ));
            return false;
        }
        for (ours, theirs) in method.formals.iter().zip(&inherited.formals) {
            if ours.declared_type != theirs.declared_type {
                diagnostics.report(SemanticError::new(
                    file.clone(),
                    method.line,
                    SemanticErrorKind::InvalidOverrideArgType {
                        method: interner.resolve(method.name).into(),
                        formal: interner.resolve(ours.name).into(),
                        expected: interner.resolve(theirs.declared_type).into(),
                        found: interner.resolve(ours.declared_type).into(),
                    },
                ));
                return false;
            }
        }
        true
    }

    // --- Queries ---

    /// Look up a class by name.
    #[must_use]
    pub fn get_class(&self, name: Symbol) -> Option<&ClassInfo> {
        self.classes.get(&name)
    }

    /// Check if a class exists in the hierarchy.
    #[must_use]
    pub fn has_class(&self, name: Symbol) -> bool {
        self.classes.contains_key(&name)
    }

    /// Returns an iterator over all class names in the hierarchy.
    pub fn class_names(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.classes.keys().copied()
    }

    /// Returns true if `name` is one of the five built-in classes.
    #[must_use]
    pub fn is_builtin(&self, name: Symbol) -> bool {
        builtins::is_builtin_class(&self.wk, name)
    }

    /// Direct subclasses of a class, in stable order.
    #[must_use]
    pub fn children_of(&self, name: Symbol) -> &[Symbol] {
        self.children.get(&name).map_or(&[], Vec::as_slice)
    }

    /// Returns the ordered superclass chain for a class, excluding the
    /// class itself. Handles cycles gracefully by tracking visited classes.
    #[must_use]
    pub fn superclass_chain(&self, name: Symbol) -> Vec<Symbol> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(name);
        let mut current = name;
        while let Some(info) = self.classes.get(&current) {
            let Some(parent) = info.parent else {
                break;
            };
            if !visited.insert(parent) {
                break; // Cycle
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Substitutes the enclosing class for `SELF_TYPE`.
    #[must_use]
    pub fn resolve_self_type(&self, ty: Symbol, enclosing: Symbol) -> Symbol {
        if ty == self.wk.self_type { enclosing } else { ty }
    }

    /// The subtype relation `a ≤ b`: reflexive, and transitive over the
    /// parent chain. The bottom type (absent initializers) conforms to
    /// everything. `SELF_TYPE` must be substituted away by the caller.
    #[must_use]
    pub fn is_subtype(&self, a: Symbol, b: Symbol) -> bool {
        if a == b || a == self.wk.no_type {
            return true;
        }
        self.superclass_chain(a).contains(&b)
    }

    /// Least upper bound of two types in the hierarchy.
    ///
    /// The bottom type is the identity. Unknown classes join to `Object`.
    #[must_use]
    pub fn lub(&self, a: Symbol, b: Symbol) -> Symbol {
        if a == self.wk.no_type {
            return b;
        }
        if b == self.wk.no_type || a == b {
            return a;
        }
        let mut ancestors: HashSet<Symbol> = HashSet::new();
        ancestors.insert(a);
        ancestors.extend(self.superclass_chain(a));

        if ancestors.contains(&b) {
            return b;
        }
        for candidate in self.superclass_chain(b) {
            if ancestors.contains(&candidate) {
                return candidate;
            }
        }
        self.wk.object
    }

    /// Least upper bound of a set of types; `Object` for the empty set.
    #[must_use]
    pub fn join(&self, types: impl IntoIterator<Item = Symbol>) -> Symbol {
        types
            .into_iter()
            .reduce(|a, b| self.lub(a, b))
            .unwrap_or(self.wk.object)
    }

    /// Finds the nearest declaration of `method` on `class` or its
    /// ancestors. Handles cycles gracefully by tracking visited classes.
    #[must_use]
    pub fn resolve_method(&self, class: Symbol, method: Symbol) -> Option<&MethodSig> {
        let mut visited = HashSet::new();
        let mut current = class;
        loop {
            if !visited.insert(current) {
                return None;
            }
            let info = self.classes.get(&current)?;
            if let Some(sig) = info.methods.iter().find(|m| m.name == method) {
                return Some(sig);
            }
            current = info.parent?;
        }
    }

    /// All attributes visible in a class: its own plus everything
    /// inherited, nearest declaration first.
    #[must_use]
    pub fn attributes_in_scope(&self, class: Symbol) -> Vec<&AttrSig> {
        let mut attrs = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(class);
        while let Some(name) = current {
            if !visited.insert(name) {
                break;
            }
            let Some(info) = self.classes.get(&name) else {
                break;
            };
            attrs.extend(info.attributes.iter());
            current = info.parent;
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Attribute, Expr, Formal, Method};

    fn setup() -> (Interner, WellKnownSymbols) {
        let mut interner = Interner::new();
        let wk = WellKnownSymbols::populate(&mut interner);
        (interner, wk)
    }

    fn class_decl(interner: &mut Interner, name: &str, parent: &str) -> ClassDecl {
        ClassDecl {
            name: interner.intern(name),
            parent: interner.intern(parent),
            features: vec![],
            file: "test.sl".into(),
            line: 1,
        }
    }

    fn attr(interner: &mut Interner, name: &str, ty: &str) -> Feature {
        Feature::Attribute(Attribute {
            name: interner.intern(name),
            declared_type: interner.intern(ty),
            init: Expr::no_expr(2),
            line: 2,
        })
    }

    fn method(interner: &mut Interner, name: &str, formals: &[(&str, &str)], ret: &str) -> Feature {
        Feature::Method(Method {
            name: interner.intern(name),
            formals: formals
                .iter()
                .map(|(n, t)| Formal {
                    name: interner.intern(n),
                    declared_type: interner.intern(t),
                    line: 3,
                })
                .collect(),
            return_type: interner.intern(ret),
            body: Expr::no_expr(3),
            line: 3,
        })
    }

    fn build(
        interner: &Interner,
        wk: WellKnownSymbols,
        classes: Vec<ClassDecl>,
    ) -> (ClassHierarchy, Diagnostics) {
        let program = Program { classes };
        let mut diags = Diagnostics::new();
        let hierarchy = ClassHierarchy::build(&program, interner, wk, &mut diags);
        (hierarchy, diags)
    }

    // --- Build: structure ---

    #[test]
    fn builtins_are_installed() {
        let (interner, wk) = setup();
        let (h, diags) = build(&interner, wk, vec![]);
        assert!(!diags.has_errors());
        for name in [wk.object, wk.io, wk.int, wk.boolean, wk.string] {
            assert!(h.has_class(name));
            assert!(h.is_builtin(name));
        }
    }

    #[test]
    fn object_has_no_parent() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        assert!(h.get_class(wk.object).unwrap().parent.is_none());
        assert_eq!(h.get_class(wk.int).unwrap().parent, Some(wk.object));
    }

    #[test]
    fn user_class_registered_under_object() {
        let (mut interner, wk) = setup();
        let decl = class_decl(&mut interner, "Counter", "Object");
        let counter = decl.name;
        let (h, diags) = build(&interner, wk, vec![decl]);
        assert!(!diags.has_errors());
        assert!(h.has_class(counter));
        assert!(h.children_of(wk.object).contains(&counter));
        assert_eq!(h.superclass_chain(counter), vec![wk.object]);
    }

    // --- Build: structural errors ---

    #[test]
    fn duplicate_user_class_reported_first_wins() {
        let (mut interner, wk) = setup();
        let first = class_decl(&mut interner, "Counter", "Object");
        let mut second = class_decl(&mut interner, "Counter", "IO");
        second.line = 9;
        let name = first.name;
        let (h, diags) = build(&interner, wk, vec![first, second]);

        assert_eq!(diags.error_count(), 1);
        let err = diags.iter().next().unwrap();
        assert_eq!(err.line, 9);
        assert!(matches!(err.kind, SemanticErrorKind::DuplicateClass { .. }));
        // First declaration wins.
        assert_eq!(h.get_class(name).unwrap().parent, Some(wk.object));
    }

    #[test]
    fn redefining_a_builtin_is_a_duplicate() {
        let (mut interner, wk) = setup();
        let decl = class_decl(&mut interner, "Int", "Object");
        let (h, diags) = build(&interner, wk, vec![decl]);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::DuplicateClass { .. }
        ));
        // The built-in survives.
        assert!(h.get_class(wk.int).unwrap().methods.is_empty());
    }

    #[test]
    fn undeclared_parent_reported() {
        let (mut interner, wk) = setup();
        let decl = class_decl(&mut interner, "Orphan", "Missing");
        let (_, diags) = build(&interner, wk, vec![decl]);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::UndeclaredParent { .. }
        ));
    }

    #[test]
    fn orphan_descendants_get_no_cycle_diagnostic() {
        let (mut interner, wk) = setup();
        let orphan = class_decl(&mut interner, "Orphan", "Missing");
        let child = class_decl(&mut interner, "Child", "Orphan");
        let (_, diags) = build(&interner, wk, vec![orphan, child]);
        // Only the orphan itself is reported.
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::UndeclaredParent { .. }
        ));
    }

    #[test]
    fn two_class_cycle_reported_for_both() {
        let (mut interner, wk) = setup();
        let a = class_decl(&mut interner, "A", "B");
        let b = class_decl(&mut interner, "B", "A");
        let (_, diags) = build(&interner, wk, vec![a, b]);
        assert_eq!(diags.error_count(), 2);
        assert!(
            diags
                .iter()
                .all(|e| matches!(e.kind, SemanticErrorKind::CyclicInheritance { .. }))
        );
    }

    #[test]
    fn self_inheritance_is_a_cycle() {
        let (mut interner, wk) = setup();
        let a = class_decl(&mut interner, "Selfish", "Selfish");
        let (_, diags) = build(&interner, wk, vec![a]);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::CyclicInheritance { .. }
        ));
    }

    #[test]
    fn all_structural_errors_collected_together() {
        let (mut interner, wk) = setup();
        let dup1 = class_decl(&mut interner, "Twice", "Object");
        let dup2 = class_decl(&mut interner, "Twice", "Object");
        let orphan = class_decl(&mut interner, "Orphan", "Missing");
        let a = class_decl(&mut interner, "A", "B");
        let b = class_decl(&mut interner, "B", "A");
        let (_, diags) = build(&interner, wk, vec![dup1, dup2, orphan, a, b]);
        // One duplicate + one orphan + two cycle members.
        assert_eq!(diags.error_count(), 4);
    }

    // --- Validate: inherited features ---

    fn validate(interner: &Interner, h: &ClassHierarchy) -> Diagnostics {
        let mut diags = Diagnostics::new();
        h.validate(interner, &mut diags);
        diags
    }

    #[test]
    fn attribute_redefining_inherited_rejected() {
        let (mut interner, wk) = setup();
        let mut base = class_decl(&mut interner, "Base", "Object");
        base.features = vec![attr(&mut interner, "count", "Int")];
        let mut derived = class_decl(&mut interner, "Derived", "Base");
        derived.features = vec![attr(&mut interner, "count", "Int")];

        let (h, build_diags) = build(&interner, wk, vec![base, derived]);
        assert!(!build_diags.has_errors());
        let diags = validate(&interner, &h);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::DuplicateAttribute { .. }
        ));
    }

    #[test]
    fn duplicate_attribute_in_same_class_rejected() {
        let (mut interner, wk) = setup();
        let mut c = class_decl(&mut interner, "C", "Object");
        c.features = vec![attr(&mut interner, "x", "Int"), attr(&mut interner, "x", "String")];
        let (h, _) = build(&interner, wk, vec![c]);
        let diags = validate(&interner, &h);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn sibling_classes_may_reuse_attribute_names() {
        let (mut interner, wk) = setup();
        let mut left = class_decl(&mut interner, "Left", "Object");
        left.features = vec![attr(&mut interner, "x", "Int")];
        let mut right = class_decl(&mut interner, "Right", "Object");
        right.features = vec![attr(&mut interner, "x", "Int")];
        let (h, _) = build(&interner, wk, vec![left, right]);
        let diags = validate(&interner, &h);
        assert!(!diags.has_errors());
    }

    #[test]
    fn attribute_named_self_rejected() {
        let (mut interner, wk) = setup();
        let mut c = class_decl(&mut interner, "C", "Object");
        c.features = vec![attr(&mut interner, "self", "Int")];
        let (h, _) = build(&interner, wk, vec![c]);
        let diags = validate(&interner, &h);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::IllegalSelfAttribute
        ));
    }

    #[test]
    fn duplicate_method_in_same_class_rejected() {
        let (mut interner, wk) = setup();
        let mut c = class_decl(&mut interner, "C", "Object");
        c.features = vec![
            method(&mut interner, "run", &[], "Int"),
            method(&mut interner, "run", &[], "Int"),
        ];
        let (h, _) = build(&interner, wk, vec![c]);
        let diags = validate(&interner, &h);
        // An identical re-declaration is still a duplicate.
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::DuplicateMethod { .. }
        ));
    }

    #[test]
    fn conflicting_duplicate_method_is_not_an_override_error() {
        let (mut interner, wk) = setup();
        let mut c = class_decl(&mut interner, "C", "Object");
        c.features = vec![
            method(&mut interner, "run", &[], "Int"),
            method(&mut interner, "run", &[], "String"),
        ];
        let (h, _) = build(&interner, wk, vec![c]);
        let diags = validate(&interner, &h);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::DuplicateMethod { .. }
        ));
    }

    #[test]
    fn override_changing_return_type_rejected() {
        let (mut interner, wk) = setup();
        let mut base = class_decl(&mut interner, "Base", "Object");
        base.features = vec![method(&mut interner, "value", &[], "Int")];
        let mut derived = class_decl(&mut interner, "Derived", "Base");
        derived.features = vec![method(&mut interner, "value", &[], "String")];

        let (h, _) = build(&interner, wk, vec![base, derived]);
        let diags = validate(&interner, &h);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::InvalidOverrideReturnType { .. }
        ));
    }

    #[test]
    fn override_changing_arity_rejected() {
        let (mut interner, wk) = setup();
        let mut base = class_decl(&mut interner, "Base", "Object");
        base.features = vec![method(&mut interner, "set", &[("v", "Int")], "Int")];
        let mut derived = class_decl(&mut interner, "Derived", "Base");
        derived.features = vec![method(
            &mut interner,
            "set",
            &[("v", "Int"), ("w", "Int")],
            "Int",
        )];

        let (h, _) = build(&interner, wk, vec![base, derived]);
        let diags = validate(&interner, &h);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::InvalidOverrideArity { expected: 1, found: 2, .. }
        ));
    }

    #[test]
    fn override_changing_formal_type_rejected() {
        let (mut interner, wk) = setup();
        let mut base = class_decl(&mut interner, "Base", "Object");
        base.features = vec![method(&mut interner, "set", &[("v", "Int")], "Int")];
        let mut derived = class_decl(&mut interner, "Derived", "Base");
        derived.features = vec![method(&mut interner, "set", &[("v", "String")], "Int")];

        let (h, _) = build(&interner, wk, vec![base, derived]);
        let diags = validate(&interner, &h);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::InvalidOverrideArgType { .. }
        ));
    }

    #[test]
    fn identical_override_accepted() {
        let (mut interner, wk) = setup();
        let mut base = class_decl(&mut interner, "Base", "Object");
        base.features = vec![method(&mut interner, "set", &[("v", "Int")], "Int")];
        let mut derived = class_decl(&mut interner, "Derived", "Base");
        derived.features = vec![method(&mut interner, "set", &[("w", "Int")], "Int")];

        let (h, _) = build(&interner, wk, vec![base, derived]);
        let diags = validate(&interner, &h);
        // Renaming a formal is fine; only the type signature must match.
        assert!(!diags.has_errors());
    }

    #[test]
    fn overriding_builtin_io_method_checked() {
        let (mut interner, wk) = setup();
        let mut printer = class_decl(&mut interner, "Printer", "IO");
        printer.features = vec![method(&mut interner, "out_string", &[("s", "Int")], "SELF_TYPE")];
        let (h, _) = build(&interner, wk, vec![printer]);
        let diags = validate(&interner, &h);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.iter().next().unwrap().kind,
            SemanticErrorKind::InvalidOverrideArgType { .. }
        ));
    }

    // --- Lattice ---

    #[test]
    fn subtype_is_reflexive() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        for name in [wk.object, wk.int, wk.string] {
            assert!(h.is_subtype(name, name));
        }
    }

    #[test]
    fn builtins_are_subtypes_of_object_only() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        assert!(h.is_subtype(wk.int, wk.object));
        assert!(!h.is_subtype(wk.object, wk.int));
        assert!(!h.is_subtype(wk.int, wk.string));
    }

    #[test]
    fn subtype_is_transitive_over_user_chain() {
        let (mut interner, wk) = setup();
        let a = class_decl(&mut interner, "A", "Object");
        let b = class_decl(&mut interner, "B", "A");
        let c = class_decl(&mut interner, "C", "B");
        let (a_sym, b_sym, c_sym) = (a.name, b.name, c.name);
        let (h, diags) = build(&interner, wk, vec![a, b, c]);
        assert!(!diags.has_errors());
        assert!(h.is_subtype(c_sym, b_sym));
        assert!(h.is_subtype(c_sym, a_sym));
        assert!(h.is_subtype(c_sym, wk.object));
        assert!(!h.is_subtype(a_sym, c_sym));
    }

    #[test]
    fn bottom_type_conforms_to_everything() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        assert!(h.is_subtype(wk.no_type, wk.int));
        assert!(h.is_subtype(wk.no_type, wk.object));
    }

    #[test]
    fn lub_of_unrelated_builtins_is_object() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        assert_eq!(h.lub(wk.int, wk.string), wk.object);
        assert_eq!(h.lub(wk.boolean, wk.io), wk.object);
    }

    #[test]
    fn lub_with_ancestor_is_the_ancestor() {
        let (mut interner, wk) = setup();
        let base = class_decl(&mut interner, "Base", "Object");
        let derived = class_decl(&mut interner, "Derived", "Base");
        let (base_sym, derived_sym) = (base.name, derived.name);
        let (h, _) = build(&interner, wk, vec![base, derived]);
        assert_eq!(h.lub(base_sym, derived_sym), base_sym);
        assert_eq!(h.lub(derived_sym, base_sym), base_sym);
    }

    #[test]
    fn lub_of_siblings_is_their_parent() {
        let (mut interner, wk) = setup();
        let base = class_decl(&mut interner, "Base", "Object");
        let left = class_decl(&mut interner, "Left", "Base");
        let right = class_decl(&mut interner, "Right", "Base");
        let (base_sym, left_sym, right_sym) = (base.name, left.name, right.name);
        let (h, _) = build(&interner, wk, vec![base, left, right]);
        assert_eq!(h.lub(left_sym, right_sym), base_sym);
    }

    #[test]
    fn join_of_empty_set_is_object() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        assert_eq!(h.join(std::iter::empty()), wk.object);
    }

    #[test]
    fn join_folds_lub() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        assert_eq!(h.join([wk.int, wk.int]), wk.int);
        assert_eq!(h.join([wk.int, wk.string, wk.boolean]), wk.object);
    }

    #[test]
    fn lub_with_bottom_is_identity() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        assert_eq!(h.lub(wk.no_type, wk.int), wk.int);
        assert_eq!(h.lub(wk.int, wk.no_type), wk.int);
    }

    // --- Method resolution ---

    #[test]
    fn resolve_method_finds_local_declaration() {
        let (mut interner, wk) = setup();
        let mut c = class_decl(&mut interner, "C", "Object");
        c.features = vec![method(&mut interner, "run", &[], "Int")];
        let c_sym = c.name;
        let run = interner.intern("run");
        let (h, _) = build(&interner, wk, vec![c]);
        let sig = h.resolve_method(c_sym, run).unwrap();
        assert_eq!(sig.defined_in, c_sym);
    }

    #[test]
    fn resolve_method_walks_the_parent_chain() {
        let (mut interner, wk) = setup();
        let c = class_decl(&mut interner, "C", "IO");
        let c_sym = c.name;
        let (h, _) = build(&interner, wk, vec![c]);
        // Inherited from IO.
        assert_eq!(h.resolve_method(c_sym, wk.out_string).unwrap().defined_in, wk.io);
        // Inherited from Object.
        assert_eq!(h.resolve_method(c_sym, wk.abort).unwrap().defined_in, wk.object);
    }

    #[test]
    fn resolve_method_prefers_the_nearest_declaration() {
        let (mut interner, wk) = setup();
        let mut c = class_decl(&mut interner, "C", "Object");
        c.features = vec![method(&mut interner, "type_name", &[], "String")];
        let c_sym = c.name;
        let (h, _) = build(&interner, wk, vec![c]);
        assert_eq!(h.resolve_method(c_sym, wk.type_name).unwrap().defined_in, c_sym);
    }

    #[test]
    fn resolve_method_unknown_returns_none() {
        let (mut interner, wk) = setup();
        let missing = interner.intern("missing");
        let (h, _) = build(&interner, wk, vec![]);
        assert!(h.resolve_method(wk.int, missing).is_none());
    }

    // --- Attribute queries ---

    #[test]
    fn attributes_in_scope_include_inherited() {
        let (mut interner, wk) = setup();
        let mut base = class_decl(&mut interner, "Base", "Object");
        base.features = vec![attr(&mut interner, "count", "Int")];
        let mut derived = class_decl(&mut interner, "Derived", "Base");
        derived.features = vec![attr(&mut interner, "label", "String")];
        let derived_sym = derived.name;
        let count = interner.intern("count");
        let label = interner.intern("label");

        let (h, _) = build(&interner, wk, vec![base, derived]);
        let names: Vec<Symbol> = h.attributes_in_scope(derived_sym).iter().map(|a| a.name).collect();
        assert!(names.contains(&count));
        assert!(names.contains(&label));
    }

    #[test]
    fn builtin_string_resolves_its_methods() {
        let (interner, wk) = setup();
        let (h, _) = build(&interner, wk, vec![]);
        let substr = h.resolve_method(wk.string, wk.substr).unwrap();
        assert_eq!(substr.formals.len(), 2);
        assert_eq!(substr.return_type, wk.string);
        let copy = h.resolve_method(wk.string, wk.copy).unwrap();
        assert_eq!(copy.return_type, wk.self_type);
    }
}
