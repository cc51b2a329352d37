//! Error type that keeps the `context()` strings nom attaches while unwinding

use nom::error::{ContextError, ErrorKind, ParseError};

/// A parse error positioned at the remaining input
#[derive(Debug, Clone, PartialEq)]
pub struct DeclError<'a> {
    pub input: &'a str,
    pub kind: ErrorKind,
    /// Innermost context first
    pub contexts: Vec<&'static str>,
    /// Set when a bracket group never closes
    pub unclosed: Option<char>,
}

impl<'a> DeclError<'a> {
    pub fn unclosed(input: &'a str, delimiter: char) -> Self {
        Self {
            input,
            kind: ErrorKind::Char,
            contexts: Vec::new(),
            unclosed: Some(delimiter),
        }
    }

    pub fn expected(&self) -> Option<&'static str> {
        self.contexts.first().copied()
    }
}

impl<'a> ParseError<&'a str> for DeclError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self {
            input,
            kind,
            contexts: Vec::new(),
            unclosed: None,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    // Between alternatives, report the one that got furthest into the input
    fn or(self, other: Self) -> Self {
        if other.input.len() < self.input.len() {
            other
        } else {
            self
        }
    }
}

impl<'a> ContextError<&'a str> for DeclError<'a> {
    fn add_context(_input: &'a str, context: &'static str, mut other: Self) -> Self {
        other.contexts.push(context);
        other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_prefers_deeper_error() {
        let full = "class A : {";
        let shallow = DeclError::from_error_kind(full, ErrorKind::Tag);
        let deep = DeclError::from_error_kind(&full[10..], ErrorKind::Tag);

        assert_eq!(shallow.clone().or(deep.clone()), deep);
        assert_eq!(deep.clone().or(shallow), deep);
    }

    #[test]
    fn test_contexts_innermost_first() {
        let err = DeclError::from_error_kind("}", ErrorKind::Tag);
        let err = DeclError::add_context("}", "base class name", err);
        let err = DeclError::add_context("}", "class declaration", err);

        assert_eq!(err.expected(), Some("base class name"));
        assert_eq!(err.contexts.len(), 2);
    }
}
