//! Error code registry
//!
//! Every diagnostic built in [`crate::hierarchy`] takes its code and its help
//! line from here. Codes are grouped
//! by range so that a code alone tells which phase produced it.
//!
//! # Error Code Ranges
//!
//! - E0001-E0999: Declaration parser errors
//! - E1000-E1999: Hierarchy input errors (descriptions, lowering, resolution)
//! - E2000-E2999: Override and finality rule violations
//!
//! Within E1000-E1999 the hundreds digit gives the subcategory:
//! - 0: Class resolution
//! - 1: Serialized descriptions
//! - 2: Lowering from parsed declarations

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// A registered code with its human-readable description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// The numeric error code (e.g., 2002)
    pub code: u16,
    pub category: &'static str,
    pub description: &'static str,
    /// Suggestion shown with the diagnostic
    pub help: Option<&'static str>,
}

impl ErrorCode {
    pub const fn new(
        code: u16,
        category: &'static str,
        description: &'static str,
        help: Option<&'static str>,
    ) -> Self {
        Self {
            code,
            category,
            description,
            help,
        }
    }

    /// Format the code as "E{code:04}" (e.g., "E2002")
    pub fn format_code(&self) -> String {
        format_error_code(self.code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.format_code(),
            self.category,
            self.description
        )
    }
}

const CODES: &[ErrorCode] = &[
    // ===== PARSER (E0001-E0999) =====
    ErrorCode::new(
        1,
        "Parser",
        "Unexpected token",
        Some("Check for missing punctuation or keywords"),
    ),
    ErrorCode::new(
        2,
        "Parser",
        "Unclosed delimiter",
        Some("Ensure all brackets, braces, and parentheses are closed"),
    ),
    ErrorCode::new(
        3,
        "Parser",
        "Unexpected end of input",
        Some("The declaration is incomplete"),
    ),
    // ===== HIERARCHY INPUT (E1000-E1999) =====
    ErrorCode::new(
        1001,
        "Hierarchy",
        "Duplicate class",
        Some("Each class name may be declared once"),
    ),
    ErrorCode::new(
        1002,
        "Hierarchy",
        "Unknown base class",
        Some("Declare the base class or remove it from the base list"),
    ),
    ErrorCode::new(
        1101,
        "Description",
        "Invalid hierarchy description",
        Some("Check the description against the expected TOML or JSON layout"),
    ),
    ErrorCode::new(
        1201,
        "Lowering",
        "Definition for an undeclared class",
        None,
    ),
    ErrorCode::new(
        1202,
        "Lowering",
        "Definition for an undeclared method",
        None,
    ),
    ErrorCode::new(
        1203,
        "Lowering",
        "Declaration outside the supported subset",
        Some("Rewrite the declaration so it can be checked, or ignore this warning"),
    ),
    ErrorCode::new(
        1204,
        "Lowering",
        "Base template not declared in this file",
        Some("Declare the template in the checked file to include it in the hierarchy"),
    ),
    // ===== OVERRIDE / FINAL RULES (E2000-E2999) =====
    ErrorCode::new(
        2001,
        "Override",
        "Override without a virtual base method",
        Some("Remove 'override' or match the name of a virtual method in a base class"),
    ),
    ErrorCode::new(
        2002,
        "Override",
        "Redeclaration of a final method",
        Some("A method marked final cannot be redeclared in any derived class"),
    ),
    ErrorCode::new(
        2003,
        "Final",
        "Inheritance from a final class",
        Some("A class marked final cannot be used as a base"),
    ),
    ErrorCode::new(
        2004,
        "Abstract",
        "Unresolved pure virtual method",
        Some("Implement the method before instantiating the class"),
    ),
    ErrorCode::new(
        2005,
        "Hierarchy",
        "Cyclic inheritance",
        Some("A class cannot be its own ancestor"),
    ),
    ErrorCode::new(
        2006,
        "Override",
        "Ambiguous override resolution",
        Some("Declare the method in the class to pick a single final overrider"),
    ),
];

/// Registry containing all defined error codes
pub struct ErrorCodeRegistry {
    codes: HashMap<u16, ErrorCode>,
}

impl ErrorCodeRegistry {
    pub fn new() -> Self {
        Self {
            codes: CODES.iter().map(|c| (c.code, c.clone())).collect(),
        }
    }

    pub fn get(&self, code: u16) -> Option<&ErrorCode> {
        self.codes.get(&code)
    }

    /// Look up a formatted code such as "E2002"
    pub fn get_by_string(&self, code_str: &str) -> Option<&ErrorCode> {
        parse_error_code(code_str).and_then(|code| self.get(code))
    }

    /// All codes in `start..=end`, ascending
    pub fn get_range(&self, start: u16, end: u16) -> Vec<&ErrorCode> {
        let mut codes: Vec<&ErrorCode> = self
            .codes
            .values()
            .filter(|code| code.code >= start && code.code <= end)
            .collect();
        codes.sort_by_key(|code| code.code);
        codes
    }

    pub fn get_parser_errors(&self) -> Vec<&ErrorCode> {
        self.get_range(1, 999)
    }

    pub fn get_input_errors(&self) -> Vec<&ErrorCode> {
        self.get_range(1000, 1999)
    }

    pub fn get_rule_violations(&self) -> Vec<&ErrorCode> {
        self.get_range(2000, 2999)
    }

    pub fn is_valid_code(&self, code: u16) -> bool {
        self.codes.contains_key(&code)
    }
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: OnceLock<ErrorCodeRegistry> = OnceLock::new();

/// The global registry
pub fn error_registry() -> &'static ErrorCodeRegistry {
    REGISTRY.get_or_init(ErrorCodeRegistry::new)
}

pub fn get_error_code(code: u16) -> Option<&'static ErrorCode> {
    error_registry().get(code)
}

/// 2002 -> "E2002"
pub fn format_error_code(code: u16) -> String {
    format!("E{:04}", code)
}

/// "E2002" -> Some(2002)
pub fn parse_error_code(code_str: &str) -> Option<u16> {
    code_str.strip_prefix('E')?.parse::<u16>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_parse() {
        assert_eq!(format_error_code(1), "E0001");
        assert_eq!(format_error_code(2002), "E2002");
        assert_eq!(parse_error_code("E1202"), Some(1202));
        assert_eq!(parse_error_code("1202"), None);
        assert_eq!(parse_error_code("Exyz"), None);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ErrorCodeRegistry::new();

        let code = registry.get_by_string("E2003").unwrap();
        assert_eq!(code.description, "Inheritance from a final class");
        assert_eq!(
            code.to_string(),
            "E2003 [Final]: Inheritance from a final class"
        );
        assert!(registry.get(65535).is_none());
        assert!(registry.get_by_string("INVALID").is_none());
    }

    #[test]
    fn test_ranges() {
        let registry = error_registry();
        assert_eq!(registry.get_parser_errors().len(), 3);
        assert_eq!(registry.get_input_errors().len(), 7);
        assert!(registry
            .get_rule_violations()
            .iter()
            .all(|e| (2000..=2999).contains(&e.code)));
    }

    #[test]
    fn test_registered_help() {
        assert_eq!(
            get_error_code(2003).and_then(|c| c.help),
            Some("A class marked final cannot be used as a base")
        );
        assert!(get_error_code(1201).unwrap().help.is_none());
    }

    #[test]
    fn test_global_registry_is_shared() {
        assert!(std::ptr::eq(error_registry(), error_registry()));
    }
}
