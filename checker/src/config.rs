//! Checker configuration
//!
//! Configuration is a plain struct; callers either build it in code or
//! deserialize it from TOML:
//!
//! ```toml
//! check-ambiguous-overrides = true
//! check-unresolved-pure-virtuals = false
//! colored-diagnostics = false
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CheckerConfig {
    /// Report classes that inherit more than one overrider of a method
    pub check_ambiguous_overrides: bool,

    /// Report instantiated classes that are still abstract
    pub check_unresolved_pure_virtuals: bool,

    /// Render diagnostics with ANSI colors
    pub colored_diagnostics: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            check_ambiguous_overrides: true,
            check_unresolved_pure_virtuals: true,
            colored_diagnostics: false,
        }
    }
}

impl CheckerConfig {
    /// Parse a configuration; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn with_colored_diagnostics(mut self, enabled: bool) -> Self {
        self.colored_diagnostics = enabled;
        self
    }
}
