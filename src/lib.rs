//! Overcheck: override and finality checking for class hierarchies
//!
//! This crate re-exports the workspace members under one name:
//!
//! - [`parser`] reads class declarations from a C++ header subset
//! - [`checker`] builds hierarchies and validates them
//! - [`diagnostics`] renders what the checker finds
//!
//! ```
//! use overcheck::{check_source, CheckerConfig};
//!
//! let header = "class Base { virtual void run() final; };\nclass Job : Base { void run() override; };\n";
//! let report = check_source("jobs.hpp", header, &CheckerConfig::default()).unwrap();
//! assert_eq!(report.violations[0].to_string(), "Job::run: override-of-final");
//! ```

pub use checker;
pub use diagnostics;
pub use parser;

pub use checker::{
    check_source, validate, validate_all, validate_with, CheckFailure, CheckReport, CheckerConfig,
    ClassNode, Hierarchy, HierarchyError, MethodDeclaration, Violation, ViolationKind, Virtuality,
};
