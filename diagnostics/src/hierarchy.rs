//! Builders for the diagnostics the hierarchy checker emits
//!
//! Each function takes plain names and optional spans so that callers with or
//! without source positions can share the wording. Codes and help lines come
//! from [`crate::error_codes`].

use crate::error_codes::{format_error_code, get_error_code};
use crate::{Diagnostic, DiagnosticBuilder, SourceSpan};

/// Provides the override/final diagnostics
pub struct HierarchyDiagnostics;

/// Attach a registered code and its help line
fn coded(builder: DiagnosticBuilder, code: u16) -> DiagnosticBuilder {
    let builder = builder.code(format_error_code(code));
    match get_error_code(code).and_then(|registered| registered.help) {
        Some(help) => builder.help(help),
        None => builder,
    }
}

impl HierarchyDiagnostics {
    pub fn unexpected_token(span: Option<SourceSpan>, found: &str, expected: &str) -> Diagnostic {
        let found = if found.is_empty() {
            "end of input".to_string()
        } else {
            format!("'{}'", found)
        };
        coded(DiagnosticBuilder::error(format!("unexpected {}", found)), 1)
            .at(span, format!("expected {}", expected))
            .build()
    }

    pub fn unclosed_delimiter(span: Option<SourceSpan>, delimiter: char) -> Diagnostic {
        let closing = match delimiter {
            '(' => ')',
            '[' => ']',
            '{' => '}',
            other => other,
        };
        coded(DiagnosticBuilder::error(format!("unclosed '{}'", delimiter)), 2)
            .at(span, format!("this '{}' is never closed", delimiter))
            .with_note(format!("the matching '{}' is missing", closing))
            .build()
    }

    pub fn unexpected_eof(span: Option<SourceSpan>, expected: &str) -> Diagnostic {
        coded(DiagnosticBuilder::error("unexpected end of input"), 3)
            .at(span, format!("expected {}", expected))
            .build()
    }

    pub fn duplicate_class(
        name: &str,
        span: Option<SourceSpan>,
        first: Option<SourceSpan>,
    ) -> Diagnostic {
        coded(
            DiagnosticBuilder::error(format!("class '{}' is declared more than once", name)),
            1001,
        )
        .at(span, "redeclared here")
            .secondary_label(first, format!("'{}' first declared here", name))
            .build()
    }

    pub fn unknown_base(class: &str, base: &str, span: Option<SourceSpan>) -> Diagnostic {
        coded(
            DiagnosticBuilder::error(format!(
                "class '{}' derives from '{}', which is not declared",
                class, base
            )),
            1002,
        )
        .at(span, format!("unknown base '{}'", base))
        .build()
    }

    pub fn invalid_description(format: &str, message: &str) -> Diagnostic {
        coded(
            DiagnosticBuilder::error(format!("invalid {} hierarchy description", format)),
            1101,
        )
        .with_note(message.to_string())
        .build()
    }

    pub fn definition_for_unknown_class(
        class: &str,
        method: &str,
        span: Option<SourceSpan>,
    ) -> Diagnostic {
        coded(
            DiagnosticBuilder::warning(format!(
                "definition of '{}::{}' refers to an undeclared class",
                class, method
            )),
            1201,
        )
        .at(span, "definition ignored")
        .build()
    }

    pub fn definition_for_unknown_method(
        class: &str,
        method: &str,
        span: Option<SourceSpan>,
    ) -> Diagnostic {
        coded(
            DiagnosticBuilder::warning(format!(
                "'{}' does not declare a method named '{}'",
                class, method
            )),
            1202,
        )
        .at(span, "definition ignored")
        .build()
    }

    /// A class or an overriding method the declaration parser could not read
    pub fn skipped_declaration(what: &str, name: &str, span: Option<SourceSpan>) -> Diagnostic {
        coded(
            DiagnosticBuilder::warning(format!(
                "{} '{}' is not in the supported declaration subset and is not checked",
                what, name
            )),
            1203,
        )
        .at(span, "skipped")
        .build()
    }

    pub fn undeclared_template_base(class: &str, base: &str, span: Option<SourceSpan>) -> Diagnostic {
        coded(
            DiagnosticBuilder::warning(format!(
                "base '{}' of '{}' is a template that is not declared here; it is left out of the hierarchy",
                base, class
            )),
            1204,
        )
        .at(span, "base ignored")
        .build()
    }

    pub fn override_without_base(
        class: &str,
        method: &str,
        span: Option<SourceSpan>,
    ) -> Diagnostic {
        coded(
            DiagnosticBuilder::error(format!(
                "'{}::{}' is marked 'override' but overrides nothing",
                class, method
            )),
            2001,
        )
        .at(span, "no virtual method with this name in any base")
        .build()
    }

    pub fn override_of_final(
        class: &str,
        method: &str,
        span: Option<SourceSpan>,
        final_owner: Option<&str>,
        final_span: Option<SourceSpan>,
    ) -> Diagnostic {
        let mut builder = coded(
            DiagnosticBuilder::error(format!(
                "'{}::{}' redeclares a method that is final in a base class",
                class, method
            )),
            2002,
        )
        .at(span, "cannot override a final method");

        if let Some(owner) = final_owner {
            builder = builder
                .secondary_label(final_span, format!("'{}::{}' declared final here", owner, method))
                .with_note(format!(
                    "'{}' marks '{}' final; no class derived from it may redeclare it",
                    owner, method
                ));
        }
        builder.build()
    }

    pub fn inherit_from_final(
        class: &str,
        base: Option<&str>,
        span: Option<SourceSpan>,
        base_span: Option<SourceSpan>,
    ) -> Diagnostic {
        let base = base.unwrap_or("a final class");
        coded(
            DiagnosticBuilder::error(format!("'{}' cannot derive from final class '{}'", class, base)),
            2003,
        )
        .at(span, "derives from a final class")
        .secondary_label(base_span, format!("'{}' declared final here", base))
        .build()
    }

    pub fn unresolved_pure_virtual(
        class: &str,
        method: &str,
        span: Option<SourceSpan>,
        declared_span: Option<SourceSpan>,
    ) -> Diagnostic {
        coded(
            DiagnosticBuilder::error(format!(
                "'{}' is instantiated but '{}' is still pure virtual",
                class, method
            )),
            2004,
        )
        .at(span, "instantiated class is abstract")
        .secondary_label(declared_span, format!("'{}' declared pure here", method))
        .build()
    }

    pub fn cyclic_inheritance(class: &str, cycle: &[String], span: Option<SourceSpan>) -> Diagnostic {
        let mut builder = coded(
            DiagnosticBuilder::error(format!("'{}' inherits from itself", class)),
            2005,
        )
        .at(span, "inheritance cycle");
        if !cycle.is_empty() {
            builder = builder.with_note(format!("cycle: {}", cycle.join(" -> ")));
        }
        builder.build()
    }

    pub fn ambiguous_override(
        class: &str,
        method: &str,
        span: Option<SourceSpan>,
        candidates: &[String],
    ) -> Diagnostic {
        coded(
            DiagnosticBuilder::error(format!(
                "'{}' inherits more than one overrider of '{}'",
                class, method
            )),
            2006,
        )
        .at(span, "no unique final overrider")
        .with_note(format!("candidates: {}", candidates.join(", ")))
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_codes::error_registry;
    use crate::SourceMap;

    #[test]
    fn test_override_of_final_mentions_owner() {
        let mut source_map = SourceMap::new();
        let file_id = source_map.add_file("d.hpp", "virtual void foo() final {}\n");
        let final_span = source_map.span_from_offsets(file_id, 13, 16);

        let diagnostic =
            HierarchyDiagnostics::override_of_final("Derived4", "foo", None, Some("Derived2"), final_span);

        assert_eq!(diagnostic.code.as_deref(), Some("E2002"));
        assert_eq!(diagnostic.labels.len(), 1);
        assert!(diagnostic.notes[0].contains("Derived2"));
        assert!(diagnostic.message.contains("Derived4::foo"));
    }

    #[test]
    fn test_unexpected_token_at_end_of_input() {
        let diagnostic = HierarchyDiagnostics::unexpected_token(None, "", "'}'");
        assert_eq!(diagnostic.message, "unexpected end of input");
        assert_eq!(diagnostic.code.as_deref(), Some("E0001"));
    }

    #[test]
    fn test_help_comes_from_the_registry() {
        let diagnostic = HierarchyDiagnostics::inherit_from_final("B", Some("A"), None, None);
        let registered = get_error_code(2003).unwrap();

        assert_eq!(diagnostic.code, Some(registered.format_code()));
        assert_eq!(diagnostic.help, vec![registered.help.unwrap().to_string()]);

        let warning = HierarchyDiagnostics::definition_for_unknown_class("X", "f", None);
        assert!(warning.help.is_empty());
    }

    #[test]
    fn test_every_builder_uses_a_registered_code() {
        let built = [
            HierarchyDiagnostics::unexpected_token(None, "x", "';'"),
            HierarchyDiagnostics::unclosed_delimiter(None, '{'),
            HierarchyDiagnostics::unexpected_eof(None, "'}'"),
            HierarchyDiagnostics::duplicate_class("A", None, None),
            HierarchyDiagnostics::unknown_base("A", "B", None),
            HierarchyDiagnostics::invalid_description("TOML", "bad"),
            HierarchyDiagnostics::definition_for_unknown_class("A", "f", None),
            HierarchyDiagnostics::definition_for_unknown_method("A", "f", None),
            HierarchyDiagnostics::skipped_declaration("class", "A", None),
            HierarchyDiagnostics::undeclared_template_base("A", "Mixin<int>", None),
            HierarchyDiagnostics::override_without_base("A", "f", None),
            HierarchyDiagnostics::override_of_final("A", "f", None, None, None),
            HierarchyDiagnostics::inherit_from_final("A", None, None, None),
            HierarchyDiagnostics::unresolved_pure_virtual("A", "f", None, None),
            HierarchyDiagnostics::cyclic_inheritance("A", &[], None),
            HierarchyDiagnostics::ambiguous_override("A", "f", None, &[]),
        ];

        let registry = error_registry();
        for diagnostic in &built {
            let code = diagnostic.code.as_deref().unwrap();
            let registered = registry
                .get_by_string(code)
                .unwrap_or_else(|| panic!("{} is not registered", code));
            let expected_help: Vec<String> = registered.help.iter().map(|h| h.to_string()).collect();
            assert_eq!(diagnostic.help, expected_help, "{}", code);
        }
        assert_eq!(built.len(), registry.get_range(1, 2999).len());
    }

    #[test]
    fn test_cycle_note() {
        let cycle = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        let diagnostic = HierarchyDiagnostics::cyclic_inheritance("A", &cycle, None);
        assert_eq!(diagnostic.notes, vec!["cycle: A -> B -> A".to_string()]);
    }
}
