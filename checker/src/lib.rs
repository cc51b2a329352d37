//! Override and finality checking for class hierarchies
//!
//! A [`Hierarchy`] is built from [`ClassNode`]s, either by hand, from a TOML or
//! JSON description, or by lowering parsed class declarations. [`validate`]
//! then reports every override/final rule the hierarchy breaks.
//!
//! ```
//! use checker::{validate, ClassNode, Hierarchy, MethodDeclaration};
//!
//! let hierarchy = Hierarchy::new(vec![
//!     ClassNode::new("Base").with_method(MethodDeclaration::virtual_method("foo").with_final()),
//!     ClassNode::new("Derived")
//!         .with_base("Base")
//!         .with_method(MethodDeclaration::virtual_method("foo").with_override()),
//! ])
//! .unwrap();
//!
//! let violations = validate(&hierarchy);
//! assert_eq!(violations[0].to_string(), "Derived::foo: override-of-final");
//! ```

pub mod config;
pub mod description;
pub mod hierarchy;
pub mod inheritance_graph;
pub mod logging;
pub mod lower;
pub mod pipeline;
pub mod report;
pub mod validate;

pub use diagnostics::error_codes;

pub use config::CheckerConfig;
pub use description::{DescriptionError, DescriptionFormat, HierarchyDescription};
pub use hierarchy::{BaseRef, ClassId, ClassNode, Hierarchy, HierarchyError, MethodDeclaration, Virtuality};
pub use inheritance_graph::InheritanceGraph;
pub use pipeline::{check_source, CheckFailure, CheckReport, InputError, SourceKind};
pub use validate::{
    validate, validate_all, validate_all_with, validate_classes, validate_with, Violation,
    ViolationKind,
};
