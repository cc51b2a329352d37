//! Lowering from parsed declarations to [`ClassNode`]s
//!
//! - `= 0` makes a method pure virtual, `virtual` makes it virtual, anything
//!   else is non-virtual (`override`/`final` still count as virtual when the
//!   rules run, see [`MethodDeclaration::is_effectively_virtual`]).
//! - Constructors are dropped; they never take part in overriding.
//! - Every destructor is named `~`, so a derived destructor redeclares the
//!   base destructor whatever the class names are.
//! - `[[instantiated]]` on a class sets its instantiation intent.
//! - Out-of-line definitions (`void Base::foobar() {}`) do not change the
//!   hierarchy; one that names an undeclared class or method is reported as a
//!   warning.
//! - A base written with template arguments (`Mixin<int>`) refers to the
//!   class template of the same name. When no such class is declared in the
//!   file the base is left out with a warning instead of failing as unknown.
//! - Skipped constructs that look like class definitions or overriding
//!   methods are reported as warnings, since nothing in them is checked.

use std::collections::HashSet;

use diagnostics::hierarchy::HierarchyDiagnostics;
use diagnostics::{Diagnostics, FileId, SourceMap};
use log::{debug, trace};
use parser::{ClassDecl, DeclFile, FunctionDecl, MethodDecl, Span};

use crate::hierarchy::{BaseRef, ClassNode, MethodDeclaration, Virtuality};

/// Class attribute that marks a class as meant to be instantiated
pub const INSTANTIATED_ATTRIBUTE: &str = "instantiated";

/// Name given to every destructor
pub const DESTRUCTOR_NAME: &str = "~";

#[derive(Debug, Default)]
pub struct Lowered {
    pub classes: Vec<ClassNode>,
    /// Warnings about definitions that were ignored
    pub diagnostics: Diagnostics,
}

struct Lowerer<'a> {
    file_id: FileId,
    source_map: &'a SourceMap,
    declared: HashSet<&'a str>,
}

/// Lower every class of `file`; spans are resolved against `file_id`
pub fn lower<'a>(file: &'a DeclFile, file_id: FileId, source_map: &'a SourceMap) -> Lowered {
    let lowerer = Lowerer {
        file_id,
        source_map,
        declared: file.classes().map(|c| c.name.as_str()).collect(),
    };
    let mut lowered = Lowered::default();

    for skipped in &file.skipped {
        debug!("skipped {} '{}'", skipped.kind.as_str(), skipped.name);
        lowered.diagnostics.push(HierarchyDiagnostics::skipped_declaration(
            skipped.kind.as_str(),
            &skipped.name,
            lowerer.span(skipped.span),
        ));
    }
    for class in file.classes() {
        lowered
            .classes
            .push(lowerer.class(class, &mut lowered.diagnostics));
    }
    for function in file.functions() {
        if let Some(owner) = &function.owner {
            lowerer.check_definition(file, owner, function, &mut lowered.diagnostics);
        }
    }

    debug!(
        "lowered {} classes from '{}' ({} warnings)",
        lowered.classes.len(),
        file.filename,
        lowered.diagnostics.len()
    );
    lowered
}

/// Last segment of a qualified name
fn simple_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

impl Lowerer<'_> {
    fn span(&self, span: Span) -> Option<source_map::SourceSpan> {
        span.to_source_span(self.file_id, self.source_map)
    }

    fn class(&self, class: &ClassDecl, diagnostics: &mut Diagnostics) -> ClassNode {
        let mut node = ClassNode::new(&class.name).with_span(self.span(class.name_span));
        node.is_final = class.is_final;
        node.instantiated = class
            .attributes
            .iter()
            .any(|a| simple_name(&a.name) == INSTANTIATED_ATTRIBUTE);

        for base in &class.bases {
            let name = simple_name(&base.name);
            if let Some(args) = &base.template_args {
                if !self.declared.contains(name) {
                    debug!("'{}' leaves out template base '{}{}'", class.name, base.name, args);
                    diagnostics.push(HierarchyDiagnostics::undeclared_template_base(
                        &class.name,
                        &format!("{}{}", base.name, args),
                        self.span(base.span),
                    ));
                    continue;
                }
            }
            node.bases.push(BaseRef::new(name, self.span(base.span)));
        }

        for (_, method) in class.methods() {
            if method.name == class.name {
                trace!("skipping constructor {}::{}", class.name, method.name);
                continue;
            }
            node.methods.push(self.method(method));
        }
        node
    }

    fn method(&self, method: &MethodDecl) -> MethodDeclaration {
        let virtuality = if method.is_pure() {
            Virtuality::PureVirtual
        } else if method.is_virtual() {
            Virtuality::Virtual
        } else {
            Virtuality::NonVirtual
        };
        let name = if method.is_destructor() {
            DESTRUCTOR_NAME
        } else {
            method.name.as_str()
        };

        let mut lowered =
            MethodDeclaration::new(name, virtuality).with_span(self.span(method.name_span));
        lowered.is_override = method.is_override();
        lowered.is_final = method.is_final();
        lowered
    }

    fn check_definition(
        &self,
        file: &DeclFile,
        owner: &str,
        function: &FunctionDecl,
        diagnostics: &mut Diagnostics,
    ) {
        let owner = simple_name(owner);
        let span = self.span(function.decl.name_span);

        let Some(class) = file.classes().find(|c| c.name == owner) else {
            diagnostics.push(HierarchyDiagnostics::definition_for_unknown_class(
                owner,
                &function.name,
                span,
            ));
            return;
        };

        let is_destructor = function.name.starts_with('~');
        let declared = class.methods().any(|(_, m)| {
            m.name == function.name || (is_destructor && m.is_destructor())
        });
        if !declared {
            diagnostics.push(HierarchyDiagnostics::definition_for_unknown_method(
                owner,
                &function.name,
                span,
            ));
        }
    }
}
