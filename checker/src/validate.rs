//! Override and finality rules
//!
//! [`validate`] walks every class of a [`Hierarchy`] and collects every rule
//! the hierarchy breaks. It never stops at the first violation. The result is
//! sorted by (class, method, kind) and free of duplicates, so two runs over
//! the same hierarchy compare equal.
//!
//! Rules, for a class `C` and each method `M` it declares:
//!
//! - `M` is marked `override` but no ancestor of `C` declares a virtual method
//!   with the same name: [`ViolationKind::OverrideWithoutBase`].
//! - some ancestor of `C` declares `M`'s name `final`, whether or not `M` is
//!   marked `override`: [`ViolationKind::OverrideOfFinal`].
//!
//! And for the class itself:
//!
//! - a base of `C` is final: [`ViolationKind::InheritFromFinal`].
//! - `C` is reachable from itself: [`ViolationKind::CyclicInheritance`].
//! - `C` is instantiated and not final, a method it declares or inherits is
//!   still pure, and no class derived from `C` redeclares it:
//!   [`ViolationKind::UnresolvedPureVirtual`].
//! - `C` does not declare a method but inherits two or more overriders of it
//!   that descend from one virtual declaration:
//!   [`ViolationKind::AmbiguousOverrideResolution`].

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, info, trace};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::CheckerConfig;
use crate::hierarchy::{ClassId, ClassNode, Hierarchy, HierarchyError, MethodDeclaration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    OverrideWithoutBase,
    OverrideOfFinal,
    InheritFromFinal,
    UnresolvedPureVirtual,
    CyclicInheritance,
    AmbiguousOverrideResolution,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 6] = [
        ViolationKind::OverrideWithoutBase,
        ViolationKind::OverrideOfFinal,
        ViolationKind::InheritFromFinal,
        ViolationKind::UnresolvedPureVirtual,
        ViolationKind::CyclicInheritance,
        ViolationKind::AmbiguousOverrideResolution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::OverrideWithoutBase => "override-without-base",
            ViolationKind::OverrideOfFinal => "override-of-final",
            ViolationKind::InheritFromFinal => "inherit-from-final",
            ViolationKind::UnresolvedPureVirtual => "unresolved-pure-virtual",
            ViolationKind::CyclicInheritance => "cyclic-inheritance",
            ViolationKind::AmbiguousOverrideResolution => "ambiguous-override-resolution",
        }
    }

    /// Numeric diagnostic code (see [`crate::error_codes`])
    pub fn error_code(self) -> u16 {
        match self {
            ViolationKind::OverrideWithoutBase => 2001,
            ViolationKind::OverrideOfFinal => 2002,
            ViolationKind::InheritFromFinal => 2003,
            ViolationKind::UnresolvedPureVirtual => 2004,
            ViolationKind::CyclicInheritance => 2005,
            ViolationKind::AmbiguousOverrideResolution => 2006,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broken rule. Class-level rules carry no method name and sort before
/// the method-level records of the same class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Violation {
    pub class: String,
    pub method: Option<String>,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn class_level(class: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            class: class.into(),
            method: None,
            kind,
        }
    }

    pub fn method_level(
        class: impl Into<String>,
        method: impl Into<String>,
        kind: ViolationKind,
    ) -> Self {
        Self {
            class: class.into(),
            method: Some(method.into()),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{}::{}: {}", self.class, method, self.kind),
            None => write!(f, "{}: {}", self.class, self.kind),
        }
    }
}

/// Check every rule with the default configuration
pub fn validate(hierarchy: &Hierarchy) -> Vec<Violation> {
    validate_with(hierarchy, &CheckerConfig::default())
}

pub fn validate_with(hierarchy: &Hierarchy, config: &CheckerConfig) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (id, class) in hierarchy.classes() {
        debug!(
            "validating '{}' ({} bases, {} methods)",
            class.name,
            class.bases.len(),
            class.methods.len()
        );

        if hierarchy.graph().cycle_through(id).is_some() {
            violations.push(Violation::class_level(
                &class.name,
                ViolationKind::CyclicInheritance,
            ));
        }
        if first_final_base(hierarchy, id).is_some() {
            violations.push(Violation::class_level(
                &class.name,
                ViolationKind::InheritFromFinal,
            ));
        }

        for method in &class.methods {
            trace!(
                "  {}::{} ({}, override: {}, final: {})",
                class.name,
                method.name,
                method.virtuality,
                method.is_override,
                method.is_final
            );
            if method.is_override && overridden_declaration(hierarchy, id, &method.name).is_none() {
                violations.push(Violation::method_level(
                    &class.name,
                    &method.name,
                    ViolationKind::OverrideWithoutBase,
                ));
            }
            if final_declaration(hierarchy, id, &method.name).is_some() {
                violations.push(Violation::method_level(
                    &class.name,
                    &method.name,
                    ViolationKind::OverrideOfFinal,
                ));
            }
        }

        if config.check_unresolved_pure_virtuals {
            check_pure_virtuals(hierarchy, id, class, &mut violations);
        }
        if config.check_ambiguous_overrides {
            for name in inherited_names(hierarchy, id) {
                if ambiguous_overriders(hierarchy, id, name).is_some() {
                    violations.push(Violation::method_level(
                        &class.name,
                        name,
                        ViolationKind::AmbiguousOverrideResolution,
                    ));
                }
            }
        }
    }

    violations.sort();
    violations.dedup();
    debug!("{} violation(s) in {} classes", violations.len(), hierarchy.len());
    violations
}

/// Build a hierarchy from `classes` and validate it
pub fn validate_classes(classes: Vec<ClassNode>) -> Result<Vec<Violation>, HierarchyError> {
    Hierarchy::new(classes).map(|hierarchy| validate(&hierarchy))
}

/// Validate independent hierarchies in parallel; results keep the input order
pub fn validate_all(hierarchies: &[Hierarchy]) -> Vec<Vec<Violation>> {
    validate_all_with(hierarchies, &CheckerConfig::default())
}

pub fn validate_all_with(hierarchies: &[Hierarchy], config: &CheckerConfig) -> Vec<Vec<Violation>> {
    info!("validating {} hierarchies", hierarchies.len());
    hierarchies
        .par_iter()
        .map(|hierarchy| validate_with(hierarchy, config))
        .collect()
}

fn check_pure_virtuals(
    hierarchy: &Hierarchy,
    id: ClassId,
    class: &ClassNode,
    violations: &mut Vec<Violation>,
) {
    if !class.instantiated || class.is_final {
        return;
    }

    let own = class.methods.iter().map(|m| m.name.as_str());
    let names: BTreeSet<&str> = own.chain(inherited_names(hierarchy, id)).collect();
    let descendants = hierarchy.descendants(id);

    for name in names {
        if resolved_pure_declaration(hierarchy, id, name).is_none() {
            continue;
        }
        let overridden_below = descendants
            .iter()
            .any(|&d| hierarchy.class(d).declares(name));
        if !overridden_below {
            violations.push(Violation::method_level(
                &class.name,
                name,
                ViolationKind::UnresolvedPureVirtual,
            ));
        }
    }
}

/// Method names declared by some ancestor of `id` but not by `id` itself
pub fn inherited_names(hierarchy: &Hierarchy, id: ClassId) -> BTreeSet<&str> {
    let class = hierarchy.class(id);
    hierarchy
        .ancestors(id)
        .into_iter()
        .flat_map(|a| hierarchy.class(a).methods.iter())
        .map(|m| m.name.as_str())
        .filter(|name| !class.declares(name))
        .collect()
}

/// The first base of `id` that is declared final
pub fn first_final_base(hierarchy: &Hierarchy, id: ClassId) -> Option<ClassId> {
    hierarchy
        .bases(id)
        .iter()
        .copied()
        .find(|&base| hierarchy.class(base).is_final)
}

/// The nearest virtual declaration of `name` that a method of `id` would
/// override
pub fn overridden_declaration<'h>(
    hierarchy: &'h Hierarchy,
    id: ClassId,
    name: &str,
) -> Option<(ClassId, &'h MethodDeclaration)> {
    find_in_ancestors(hierarchy, id, name, MethodDeclaration::is_effectively_virtual)
}

/// The nearest declaration of `name` marked final in some ancestor of `id`
pub fn final_declaration<'h>(
    hierarchy: &'h Hierarchy,
    id: ClassId,
    name: &str,
) -> Option<(ClassId, &'h MethodDeclaration)> {
    find_in_ancestors(hierarchy, id, name, |m| m.is_final)
}

/// First match in breadth-first order over the bases: fewest inheritance
/// steps wins, then the base listed first
fn find_in_ancestors<'h>(
    hierarchy: &'h Hierarchy,
    id: ClassId,
    name: &str,
    predicate: impl Fn(&MethodDeclaration) -> bool,
) -> Option<(ClassId, &'h MethodDeclaration)> {
    hierarchy
        .graph()
        .ancestors_by_distance(id)
        .into_iter()
        .find_map(|ancestor| {
            hierarchy
                .class(ancestor)
                .methods
                .iter()
                .find(|&m| m.name == name && predicate(m))
                .map(|m| (ancestor, m))
        })
}

/// The pure declaration of `name` as seen from `id`: its own if it declares
/// the name, otherwise one of the nearest inherited declarations
pub fn resolved_pure_declaration<'h>(
    hierarchy: &'h Hierarchy,
    id: ClassId,
    name: &str,
) -> Option<(ClassId, &'h MethodDeclaration)> {
    let class = hierarchy.class(id);
    if class.declares(name) {
        return class
            .methods
            .iter()
            .find(|m| m.name == name && m.is_pure())
            .map(|m| (id, m));
    }
    hierarchy
        .nearest_declarers(id, name)
        .into_iter()
        .find_map(|declarer| {
            hierarchy
                .class(declarer)
                .methods
                .iter()
                .find(|m| m.name == name && m.is_pure())
                .map(|m| (declarer, m))
        })
}

/// The competing overriders of `name` inherited by `id`, if there is no
/// unique one.
///
/// A class that declares `name` itself is its unique final overrider. Nearest
/// declarations only compete when at least two of them descend from a common
/// virtual declaration of `name`.
pub fn ambiguous_overriders(hierarchy: &Hierarchy, id: ClassId, name: &str) -> Option<Vec<ClassId>> {
    if hierarchy.class(id).declares(name) {
        return None;
    }
    let candidates = hierarchy.nearest_declarers(id, name);
    if candidates.len() < 2 {
        return None;
    }

    let virtual_roots: Vec<Vec<ClassId>> = candidates
        .iter()
        .map(|&candidate| {
            hierarchy
                .ancestors(candidate)
                .into_iter()
                .filter(|&a| {
                    hierarchy
                        .class(a)
                        .declarations(name)
                        .any(MethodDeclaration::is_effectively_virtual)
                })
                .collect()
        })
        .collect();

    let shares_root = virtual_roots.iter().enumerate().any(|(i, roots)| {
        virtual_roots[i + 1..]
            .iter()
            .any(|other| roots.iter().any(|r| other.contains(r)))
    });
    shares_root.then_some(candidates)
}
