//! Parser for class declarations written in a C++ header subset
//!
//! The subset covers what matters to override/final checking: class and
//! struct declarations (templated or not) with `final`, base lists and
//! attributes, and member function declarations with `virtual`, `override`,
//! `final` and `= 0`. Other constructs (free functions, enums, aliases,
//! variables, lambdas) are recognised only well enough to be skipped; the
//! ones that look like classes or overriding methods are listed in
//! [`DeclFile::skipped`].

use std::fmt;

pub mod ast;
pub mod custom_error;
pub mod decl_parser;

pub use ast::*;
pub use diagnostics::hierarchy::HierarchyDiagnostics;
pub use diagnostics::{Diagnostic, Diagnostics, FileId, SourceMap};

use custom_error::DeclError;

/// A fatal parse error
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    /// Byte offset of the offending input
    pub offset: usize,
    /// The token found there, empty at end of input
    pub found: String,
    /// What the grammar expected, if known
    pub expected: Option<&'static str>,
    /// Opening delimiter that is never closed
    pub unclosed: Option<char>,
}

impl ParseFailure {
    fn from_error(full: &str, error: &DeclError<'_>) -> Self {
        Self {
            offset: decl_parser::position(full, error.input),
            found: leading_token(error.input).to_string(),
            expected: error.expected(),
            unclosed: error.unclosed,
        }
    }

    pub fn to_diagnostic(&self, file_id: FileId, source_map: &SourceMap) -> Diagnostic {
        let width = self.found.len().max(1);
        let span = source_map.span_from_offsets(file_id, self.offset, self.offset + width);
        let expected = self.expected.unwrap_or("a declaration");

        match self.unclosed {
            Some(delimiter) => HierarchyDiagnostics::unclosed_delimiter(span, delimiter),
            None if self.found.is_empty() => HierarchyDiagnostics::unexpected_eof(span, expected),
            None => HierarchyDiagnostics::unexpected_token(span, &self.found, expected),
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(delimiter) = self.unclosed {
            return write!(f, "unclosed '{}' at byte {}", delimiter, self.offset);
        }
        let found = if self.found.is_empty() {
            "end of input".to_string()
        } else {
            format!("'{}'", self.found)
        };
        write!(
            f,
            "unexpected {} at byte {}, expected {}",
            found,
            self.offset,
            self.expected.unwrap_or("a declaration")
        )
    }
}

impl std::error::Error for ParseFailure {}

/// The identifier or single character at the start of `input`
fn leading_token(input: &str) -> &str {
    let ident_len = input
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    if ident_len > 0 {
        return &input[..ident_len];
    }
    input
        .chars()
        .next()
        .map(|c| &input[..c.len_utf8()])
        .unwrap_or("")
}

/// Parse a header into its declarations
pub fn parse_declarations(file_name: &str, input: &str) -> Result<DeclFile, ParseFailure> {
    match decl_parser::decl_file(file_name, input) {
        Ok((_, file)) => Ok(file),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(ParseFailure::from_error(input, &e))
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseFailure {
            offset: input.len(),
            found: String::new(),
            expected: None,
            unclosed: None,
        }),
    }
}

/// Result of parsing with the input registered in a fresh source map
#[derive(Debug)]
pub struct ParseResult {
    pub file: Option<DeclFile>,
    pub diagnostics: Diagnostics,
    pub source_map: SourceMap,
    pub file_id: FileId,
}

/// Parse a header and report failures as diagnostics
pub fn parse_declarations_with_diagnostics(file_name: &str, input: &str) -> ParseResult {
    let mut source_map = SourceMap::new();
    let file_id = source_map.add_file(file_name, input);
    let mut diagnostics = Diagnostics::new();

    let file = match parse_declarations(file_name, input) {
        Ok(file) => Some(file),
        Err(failure) => {
            diagnostics.push(failure.to_diagnostic(file_id, &source_map));
            None
        }
    };

    ParseResult {
        file,
        diagnostics,
        source_map,
        file_id,
    }
}
