//! Class hierarchy model
//!
//! A [`Hierarchy`] is built once from a list of [`ClassNode`]s and never
//! mutated afterwards. Building it resolves every base name to a [`ClassId`]
//! and rejects input that cannot be analysed at all (duplicate class names,
//! bases that name no class). Rule violations are not detected here; see
//! [`crate::validate`].

use std::collections::HashMap;
use std::fmt;

use diagnostics::hierarchy::HierarchyDiagnostics;
use diagnostics::Diagnostic;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use source_map::SourceSpan;

use crate::inheritance_graph::InheritanceGraph;

/// How a method takes part in dynamic dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Virtuality {
    #[default]
    NonVirtual,
    Virtual,
    PureVirtual,
}

impl fmt::Display for Virtuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Virtuality::NonVirtual => write!(f, "non-virtual"),
            Virtuality::Virtual => write!(f, "virtual"),
            Virtuality::PureVirtual => write!(f, "pure-virtual"),
        }
    }
}

/// A method declared in one class
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub name: String,
    pub virtuality: Virtuality,
    pub is_override: bool,
    pub is_final: bool,
    pub span: Option<SourceSpan>,
}

impl MethodDeclaration {
    pub fn new(name: impl Into<String>, virtuality: Virtuality) -> Self {
        Self {
            name: name.into(),
            virtuality,
            is_override: false,
            is_final: false,
            span: None,
        }
    }

    pub fn non_virtual(name: impl Into<String>) -> Self {
        Self::new(name, Virtuality::NonVirtual)
    }

    pub fn virtual_method(name: impl Into<String>) -> Self {
        Self::new(name, Virtuality::Virtual)
    }

    pub fn pure_virtual(name: impl Into<String>) -> Self {
        Self::new(name, Virtuality::PureVirtual)
    }

    pub fn with_override(mut self) -> Self {
        self.is_override = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_span(mut self, span: Option<SourceSpan>) -> Self {
        self.span = span;
        self
    }

    pub fn is_pure(&self) -> bool {
        self.virtuality == Virtuality::PureVirtual
    }

    /// `override` and `final` only apply to virtual methods, so either one
    /// makes the method virtual even without the keyword.
    pub fn is_effectively_virtual(&self) -> bool {
        self.virtuality != Virtuality::NonVirtual || self.is_override || self.is_final
    }
}

/// A base as written in a class's base list
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRef {
    pub name: String,
    pub span: Option<SourceSpan>,
}

impl BaseRef {
    pub fn new(name: impl Into<String>, span: Option<SourceSpan>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl From<&str> for BaseRef {
    fn from(name: &str) -> Self {
        Self::new(name, None)
    }
}

/// One class with its bases and method declarations
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
    pub name: String,
    pub is_final: bool,
    /// Whether the class is meant to be instantiated
    pub instantiated: bool,
    pub bases: Vec<BaseRef>,
    pub methods: Vec<MethodDeclaration>,
    pub span: Option<SourceSpan>,
}

impl ClassNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_final: false,
            instantiated: false,
            bases: Vec::new(),
            methods: Vec::new(),
            span: None,
        }
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_instantiated(mut self) -> Self {
        self.instantiated = true;
        self
    }

    pub fn with_base(mut self, base: impl Into<BaseRef>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn with_method(mut self, method: MethodDeclaration) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_span(mut self, span: Option<SourceSpan>) -> Self {
        self.span = span;
        self
    }

    /// Every declaration named `name` (overloads share a name)
    pub fn declarations<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDeclaration> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.declarations(name).next().is_some()
    }

    pub fn method(&self, name: &str) -> Option<&MethodDeclaration> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn base(&self, name: &str) -> Option<&BaseRef> {
        self.bases.iter().find(|b| b.name == name)
    }
}

/// Index of a class in its [`Hierarchy`], in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Input that cannot be turned into a hierarchy
#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyError {
    DuplicateClass {
        name: String,
        first: Option<SourceSpan>,
        duplicate: Option<SourceSpan>,
    },
    UnknownBase {
        class: String,
        base: String,
        span: Option<SourceSpan>,
    },
}

impl HierarchyError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            HierarchyError::DuplicateClass {
                name,
                first,
                duplicate,
            } => HierarchyDiagnostics::duplicate_class(name, duplicate.clone(), first.clone()),
            HierarchyError::UnknownBase { class, base, span } => {
                HierarchyDiagnostics::unknown_base(class, base, span.clone())
            }
        }
    }
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyError::DuplicateClass { name, .. } => {
                write!(f, "class '{}' is declared more than once", name)
            }
            HierarchyError::UnknownBase { class, base, .. } => {
                write!(f, "class '{}' derives from unknown class '{}'", class, base)
            }
        }
    }
}

impl std::error::Error for HierarchyError {}

/// A resolved, immutable set of classes
#[derive(Debug, Clone)]
pub struct Hierarchy {
    classes: IndexMap<String, ClassNode>,
    graph: InheritanceGraph,
}

impl Hierarchy {
    /// Resolve base names and build the inheritance graph.
    ///
    /// Classes are examined in declaration order and the first problem found
    /// is returned: a class whose name was already taken, or a base naming no
    /// class in the input.
    pub fn new(classes: Vec<ClassNode>) -> Result<Self, HierarchyError> {
        let mut first_index: HashMap<&str, usize> = HashMap::new();
        for (index, class) in classes.iter().enumerate() {
            first_index.entry(class.name.as_str()).or_insert(index);
        }

        for (index, class) in classes.iter().enumerate() {
            let first = first_index[class.name.as_str()];
            if first != index {
                return Err(HierarchyError::DuplicateClass {
                    name: class.name.clone(),
                    first: classes[first].span.clone(),
                    duplicate: class.span.clone(),
                });
            }
            if let Some(base) = class
                .bases
                .iter()
                .find(|b| !first_index.contains_key(b.name.as_str()))
            {
                return Err(HierarchyError::UnknownBase {
                    class: class.name.clone(),
                    base: base.name.clone(),
                    span: base.span.clone(),
                });
            }
        }

        let mut graph = InheritanceGraph::new(classes.len());
        for (index, class) in classes.iter().enumerate() {
            for base in &class.bases {
                graph.add_edge(ClassId(index), ClassId(first_index[base.name.as_str()]));
            }
        }

        let classes = classes
            .into_iter()
            .map(|class| (class.name.clone(), class))
            .collect();
        Ok(Self { classes, graph })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn id(&self, name: &str) -> Option<ClassId> {
        self.classes.get_index_of(name).map(ClassId)
    }

    pub fn get(&self, name: &str) -> Option<&ClassNode> {
        self.classes.get(name)
    }

    /// The class behind an id handed out by this hierarchy
    pub fn class(&self, id: ClassId) -> &ClassNode {
        &self.classes[id.0]
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassNode)> {
        self.classes.values().enumerate().map(|(i, c)| (ClassId(i), c))
    }

    pub fn graph(&self) -> &InheritanceGraph {
        &self.graph
    }

    pub fn bases(&self, id: ClassId) -> &[ClassId] {
        self.graph.direct_bases(id)
    }

    pub fn derived(&self, id: ClassId) -> &[ClassId] {
        self.graph.direct_derived(id)
    }

    pub fn ancestors(&self, id: ClassId) -> Vec<ClassId> {
        self.graph.ancestors(id)
    }

    pub fn descendants(&self, id: ClassId) -> Vec<ClassId> {
        self.graph.descendants(id)
    }

    /// Nearest classes above `id` that declare `name`, with declarations
    /// hidden by a more derived one removed
    pub fn nearest_declarers(&self, id: ClassId, name: &str) -> Vec<ClassId> {
        self.graph.nearest(id, |c| self.class(c).declares(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(hierarchy: &Hierarchy, ids: &[ClassId]) -> Vec<String> {
        ids.iter().map(|&id| hierarchy.class(id).name.clone()).collect()
    }

    #[test]
    fn test_effective_virtuality() {
        assert!(!MethodDeclaration::non_virtual("f").is_effectively_virtual());
        assert!(MethodDeclaration::non_virtual("f")
            .with_override()
            .is_effectively_virtual());
        assert!(MethodDeclaration::non_virtual("f")
            .with_final()
            .is_effectively_virtual());
        assert!(MethodDeclaration::pure_virtual("f").is_pure());
        assert!(!MethodDeclaration::virtual_method("f").is_pure());
    }

    #[test]
    fn test_resolves_bases_in_declaration_order() {
        let hierarchy = Hierarchy::new(vec![
            ClassNode::new("Left").with_base("Root"),
            ClassNode::new("Root"),
            ClassNode::new("Right").with_base("Root"),
            ClassNode::new("Bottom").with_base("Left").with_base("Right"),
        ])
        .unwrap();

        let bottom = hierarchy.id("Bottom").unwrap();
        let root = hierarchy.id("Root").unwrap();
        assert_eq!(names(&hierarchy, hierarchy.bases(bottom)), vec!["Left", "Right"]);
        assert_eq!(names(&hierarchy, hierarchy.derived(root)), vec!["Left", "Right"]);
        assert_eq!(
            names(&hierarchy, &hierarchy.ancestors(bottom)),
            vec!["Left", "Root", "Right"]
        );
    }

    #[test]
    fn test_duplicate_class_is_an_input_error() {
        let err = Hierarchy::new(vec![
            ClassNode::new("A"),
            ClassNode::new("B").with_base("Missing"),
            ClassNode::new("A"),
        ])
        .unwrap_err();

        // B comes first in declaration order
        assert_eq!(
            err,
            HierarchyError::UnknownBase {
                class: "B".to_string(),
                base: "Missing".to_string(),
                span: None,
            }
        );

        let err = Hierarchy::new(vec![ClassNode::new("A"), ClassNode::new("A")]).unwrap_err();
        assert_eq!(err.to_string(), "class 'A' is declared more than once");
        assert_eq!(err.to_diagnostic().code.as_deref(), Some("E1001"));
    }

    #[test]
    fn test_nearest_declarers_apply_dominance() {
        let hierarchy = Hierarchy::new(vec![
            ClassNode::new("Root").with_method(MethodDeclaration::virtual_method("f")),
            ClassNode::new("Left")
                .with_base("Root")
                .with_method(MethodDeclaration::virtual_method("f").with_override()),
            ClassNode::new("Right").with_base("Root"),
            ClassNode::new("Bottom").with_base("Left").with_base("Right"),
        ])
        .unwrap();

        let bottom = hierarchy.id("Bottom").unwrap();
        assert_eq!(
            names(&hierarchy, &hierarchy.nearest_declarers(bottom, "f")),
            vec!["Left"]
        );
    }
}
