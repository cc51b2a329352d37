//! AST for the class-declaration subset
//!
//! Only the shape the hierarchy checker needs is modelled: classes, their
//! bases and attributes, and method declarations with their virt-specifiers.
//! Everything else in a header is kept as an opaque [`Item::Other`] span.

use diagnostics::{FileId, SourceMap, SourceSpan};

/// Byte range into the parsed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn to_source_span(&self, file_id: FileId, source_map: &SourceMap) -> Option<SourceSpan> {
        source_map.span_from_offsets(file_id, self.start, self.end)
    }
}

#[derive(Debug, Clone)]
pub struct DeclFile {
    pub filename: String,
    pub items: Vec<Item>,
    /// Skipped constructs that look like class definitions or overriding
    /// methods
    pub skipped: Vec<SkippedDecl>,
    pub span: Span,
}

impl DeclFile {
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(function) => Some(function),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkippedKind {
    Class,
    Method,
}

impl SkippedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SkippedKind::Class => "class",
            SkippedKind::Method => "method",
        }
    }
}

/// A declaration the grammar could not read; `span` covers its name
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDecl {
    pub kind: SkippedKind,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Item {
    Class(ClassDecl),
    Function(FunctionDecl),
    /// Anything the checker does not model (enums, aliases, variables, ...)
    Other(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKey {
    Class,
    Struct,
}

impl ClassKey {
    pub fn default_access(self) -> Access {
        match self {
            ClassKey::Class => Access::Private,
            ClassKey::Struct => Access::Public,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Private,
}

/// `[[name]]` or `[[name(args)]]` on a class or a method
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseSpecifier {
    pub name: String,
    /// `<...>` when the base is a template instantiation
    pub template_args: Option<String>,
    pub access: Option<Access>,
    pub is_virtual: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub key: ClassKey,
    pub name: String,
    pub name_span: Span,
    /// Declared after a `template <...>` header
    pub is_template: bool,
    pub is_final: bool,
    pub attributes: Vec<Attribute>,
    pub bases: Vec<BaseSpecifier>,
    pub members: Vec<Member>,
    pub span: Span,
}

impl ClassDecl {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Methods paired with the access in effect at their declaration
    pub fn methods(&self) -> impl Iterator<Item = (Access, &MethodDecl)> {
        let mut access = self.key.default_access();
        self.members.iter().filter_map(move |member| match member {
            Member::Access(a) => {
                access = *a;
                None
            }
            Member::Method(method) => Some((access, method)),
            Member::Other(_) => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods().map(|(_, m)| m).find(|m| m.name == name)
    }
}

#[derive(Debug, Clone)]
pub enum Member {
    Access(Access),
    Method(MethodDecl),
    Other(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclSpecifier {
    Virtual,
    Static,
    Inline,
    Explicit,
    Constexpr,
}

/// Specifiers after the parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Const,
    Volatile,
    /// `&`
    LValueRef,
    /// `&&`
    RValueRef,
    Noexcept,
    Override,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodBody {
    /// `= 0;`
    Pure,
    /// `= default;`
    Defaulted,
    /// `= delete;`
    Deleted,
    /// `;`
    Declared,
    /// `{ ... }`
    Defined,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub name_span: Span,
    pub attributes: Vec<Attribute>,
    pub specifiers: Vec<DeclSpecifier>,
    pub qualifiers: Vec<Qualifier>,
    pub body: MethodBody,
    pub span: Span,
}

impl MethodDecl {
    pub fn is_virtual(&self) -> bool {
        self.specifiers.contains(&DeclSpecifier::Virtual)
    }

    pub fn is_override(&self) -> bool {
        self.qualifiers.contains(&Qualifier::Override)
    }

    pub fn is_final(&self) -> bool {
        self.qualifiers.contains(&Qualifier::Final)
    }

    pub fn is_pure(&self) -> bool {
        self.body == MethodBody::Pure
    }

    pub fn is_destructor(&self) -> bool {
        self.name.starts_with('~')
    }
}

/// A function at file scope; `owner` is set for out-of-line member
/// definitions such as `void Base::foobar() {}`
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub owner: Option<String>,
    pub name: String,
    pub decl: MethodDecl,
}
