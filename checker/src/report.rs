//! Diagnostics for rule violations
//!
//! A [`Violation`] only names a class, a method and a kind. The functions here
//! look the names up in the [`Hierarchy`] again to attach the declaration that
//! caused the violation (the final method, the final base, the pure
//! declaration) as a secondary label.

use diagnostics::hierarchy::HierarchyDiagnostics;
use diagnostics::{Diagnostic, Diagnostics};
use source_map::SourceSpan;

use crate::hierarchy::{ClassId, Hierarchy};
use crate::validate::{self, Violation, ViolationKind};

pub fn violation_diagnostics(hierarchy: &Hierarchy, violations: &[Violation]) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    for violation in violations {
        diagnostics.push(violation_diagnostic(hierarchy, violation));
    }
    diagnostics
}

pub fn violation_diagnostic(hierarchy: &Hierarchy, violation: &Violation) -> Diagnostic {
    let class = violation.class.as_str();
    let method = violation.method.as_deref().unwrap_or_default();

    let Some(id) = hierarchy.id(class) else {
        return detached(violation);
    };
    let class_span = hierarchy.class(id).span.clone();
    let method_span = method_span(hierarchy, id, method);

    match violation.kind {
        ViolationKind::OverrideWithoutBase => {
            HierarchyDiagnostics::override_without_base(class, method, method_span)
        }
        ViolationKind::OverrideOfFinal => {
            let declared = validate::final_declaration(hierarchy, id, method);
            HierarchyDiagnostics::override_of_final(
                class,
                method,
                method_span,
                declared.map(|(owner, _)| hierarchy.class(owner).name.as_str()),
                declared.and_then(|(_, m)| m.span.clone()),
            )
        }
        ViolationKind::InheritFromFinal => {
            let base = validate::first_final_base(hierarchy, id).map(|b| hierarchy.class(b));
            let base_ref_span = base
                .and_then(|b| hierarchy.class(id).base(&b.name))
                .and_then(|r| r.span.clone());
            HierarchyDiagnostics::inherit_from_final(
                class,
                base.map(|b| b.name.as_str()),
                base_ref_span.or(class_span),
                base.and_then(|b| b.span.clone()),
            )
        }
        ViolationKind::UnresolvedPureVirtual => {
            let declared = validate::resolved_pure_declaration(hierarchy, id, method);
            HierarchyDiagnostics::unresolved_pure_virtual(
                class,
                method,
                class_span,
                declared.and_then(|(_, m)| m.span.clone()),
            )
        }
        ViolationKind::CyclicInheritance => {
            let cycle: Vec<String> = hierarchy
                .graph()
                .cycle_through(id)
                .unwrap_or_default()
                .into_iter()
                .map(|c| hierarchy.class(c).name.clone())
                .collect();
            HierarchyDiagnostics::cyclic_inheritance(class, &cycle, class_span)
        }
        ViolationKind::AmbiguousOverrideResolution => {
            let candidates: Vec<String> = validate::ambiguous_overriders(hierarchy, id, method)
                .unwrap_or_default()
                .into_iter()
                .map(|c| format!("{}::{}", hierarchy.class(c).name, method))
                .collect();
            HierarchyDiagnostics::ambiguous_override(class, method, class_span, &candidates)
        }
    }
}

fn method_span(hierarchy: &Hierarchy, id: ClassId, method: &str) -> Option<SourceSpan> {
    hierarchy
        .class(id)
        .method(method)
        .and_then(|m| m.span.clone())
}

/// A violation whose class is not in the hierarchy (it was produced from a
/// different one); report it without locations
fn detached(violation: &Violation) -> Diagnostic {
    let class = violation.class.as_str();
    let method = violation.method.as_deref().unwrap_or_default();
    match violation.kind {
        ViolationKind::OverrideWithoutBase => {
            HierarchyDiagnostics::override_without_base(class, method, None)
        }
        ViolationKind::OverrideOfFinal => {
            HierarchyDiagnostics::override_of_final(class, method, None, None, None)
        }
        ViolationKind::InheritFromFinal => {
            HierarchyDiagnostics::inherit_from_final(class, None, None, None)
        }
        ViolationKind::UnresolvedPureVirtual => {
            HierarchyDiagnostics::unresolved_pure_virtual(class, method, None, None)
        }
        ViolationKind::CyclicInheritance => {
            HierarchyDiagnostics::cyclic_inheritance(class, &[], None)
        }
        ViolationKind::AmbiguousOverrideResolution => {
            HierarchyDiagnostics::ambiguous_override(class, method, None, &[])
        }
    }
}
