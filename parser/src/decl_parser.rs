//! nom grammar for class declarations
//!
//! Parsers take the full input alongside the remaining input so that spans
//! can be computed as byte offsets (`position(full, current)`).
//!
//! Constructs outside the modelled subset are skipped by [`skip_construct`],
//! which consumes balanced text up to the next `;` at the current nesting
//! level or through a function body. A skipped construct that still reads
//! like a class definition or an overriding method is recorded in
//! [`DeclFile::skipped`].

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, multispace1},
    combinator::{cut, map, opt, recognize, value, verify},
    error::{context, ErrorKind, ParseError},
    multi::{many0, many1, separated_list1},
    sequence::{pair, preceded, terminated},
    IResult, Parser,
};

use crate::ast::*;
use crate::custom_error::DeclError;

pub type PResult<'a, T> = IResult<&'a str, T, DeclError<'a>>;

/// Byte offset of `current` inside `full`
pub fn position(full: &str, current: &str) -> usize {
    full.len() - current.len()
}

fn span_from(full: &str, start: usize, current: &str) -> Span {
    Span::new(start, position(full, current))
}

fn fail<'a, T>(input: &'a str, kind: ErrorKind) -> PResult<'a, T> {
    Err(nom::Err::Error(DeclError::from_error_kind(input, kind)))
}

fn literal<'a>(input: &'a str, lit: &'static str) -> PResult<'a, &'a str> {
    tag(lit).parse(input)
}

fn one_char(input: &str, c: char) -> PResult<'_, char> {
    char(c).parse(input)
}

// =============================================================================
// File
// =============================================================================

/// Parse a whole header
pub fn decl_file<'a>(file_name: &str, full: &'a str) -> PResult<'a, DeclFile> {
    let mut items = Vec::new();
    let mut input = full;

    loop {
        let (rest, _) = ws(input)?;
        if rest.is_empty() {
            input = rest;
            break;
        }
        let (rest, item) = item(full, rest)?;
        items.push(item);
        input = rest;
    }

    let skipped = skipped_declarations(full, &items);
    Ok((
        input,
        DeclFile {
            filename: file_name.to_string(),
            items,
            skipped,
            span: Span::new(0, full.len()),
        },
    ))
}

fn item<'a>(full: &'a str, input: &'a str) -> PResult<'a, Item> {
    alt((
        map(|i| class_decl(full, i), Item::Class),
        map(|i| function_item(full, i), Item::Function),
        map(|i| other(full, i), Item::Other),
    ))
    .parse(input)
}

// =============================================================================
// Whitespace, comments, preprocessor lines
// =============================================================================

pub fn ws(input: &str) -> PResult<'_, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), line_comment),
            value((), block_comment),
            value((), preprocessor_line),
        ))),
    )
    .parse(input)
}

fn line_comment(input: &str) -> PResult<'_, &str> {
    recognize(pair(tag("//"), take_while(|c| c != '\n'))).parse(input)
}

fn block_comment(input: &str) -> PResult<'_, &str> {
    recognize(pair(tag("/*"), pair(take_until("*/"), tag("*/")))).parse(input)
}

fn preprocessor_line(input: &str) -> PResult<'_, &str> {
    recognize(pair(char('#'), take_while(|c| c != '\n'))).parse(input)
}

// =============================================================================
// Tokens
// =============================================================================

fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "class"
            | "struct"
            | "virtual"
            | "override"
            | "final"
            | "public"
            | "protected"
            | "private"
            | "const"
            | "volatile"
            | "noexcept"
            | "static"
            | "inline"
            | "explicit"
            | "constexpr"
            | "default"
            | "delete"
            | "operator"
            | "template"
    )
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input| {
        let (input, _) = ws(input)?;
        let (rest, word) = literal(input, kw)?;
        if rest.starts_with(is_ident_char) {
            return fail(input, ErrorKind::Tag);
        }
        Ok((rest, word))
    }
}

pub fn symbol<'a>(sym: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input| {
        let (input, _) = ws(input)?;
        tag(sym).parse(input)
    }
}

fn raw_identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))
    .parse(input)
}

pub fn identifier(input: &str) -> PResult<'_, String> {
    let (input, _) = ws(input)?;
    let (input, id) = verify(raw_identifier, |s: &str| !is_keyword(s)).parse(input)?;
    Ok((input, id.to_string()))
}

/// `a::b::c`
pub fn qualified_name(input: &str) -> PResult<'_, String> {
    let (input, first) = identifier(input)?;
    let (input, rest) = many0(preceded(symbol("::"), identifier)).parse(input)?;

    let mut name = first;
    for part in rest {
        name.push_str("::");
        name.push_str(&part);
    }
    Ok((input, name))
}

fn access(input: &str) -> PResult<'_, Access> {
    alt((
        value(Access::Public, keyword("public")),
        value(Access::Protected, keyword("protected")),
        value(Access::Private, keyword("private")),
    ))
    .parse(input)
}

// =============================================================================
// Balanced text
// =============================================================================

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Length of a comment or literal at the start of `s`
fn trivia_or_literal_len(s: &str) -> Option<usize> {
    if s.starts_with("//") {
        return Some(s.find('\n').unwrap_or(s.len()));
    }
    if let Some(body) = s.strip_prefix("/*") {
        return Some(body.find("*/").map(|i| i + 4).unwrap_or(s.len()));
    }

    let quote = s.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(i + 1);
        }
    }
    Some(s.len())
}

/// Offset of the delimiter closing `open` in `s` (which starts just after it)
fn matching_close(s: &str, open: char) -> Option<usize> {
    let mut expected = vec![closer(open)];
    let mut i = 0;

    while let Some(c) = s[i..].chars().next() {
        if let Some(len) = trivia_or_literal_len(&s[i..]) {
            i += len;
            continue;
        }
        match c {
            '(' | '[' | '{' => expected.push(closer(c)),
            ')' | ']' | '}' => {
                if expected.pop() != Some(c) {
                    return None;
                }
                if expected.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += c.len_utf8();
    }
    None
}

/// A bracketed group opened by `open`; yields the text between the delimiters
pub fn balanced<'a>(open: char) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input| {
        let (input, _) = ws(input)?;
        let (inner, _) = one_char(input, open)?;
        match matching_close(inner, open) {
            Some(end) => Ok((&inner[end + 1..], &inner[..end])),
            None => Err(nom::Err::Failure(DeclError::unclosed(input, open))),
        }
    }
}

/// `<...>` template arguments, counting nested angle brackets
fn angle_group(input: &str) -> PResult<'_, &str> {
    let (input, _) = ws(input)?;
    if !input.starts_with('<') {
        return fail(input, ErrorKind::Char);
    }

    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], &input[..i + 1]));
                }
            }
            ';' | '{' | '}' => break,
            _ => {}
        }
    }
    fail(input, ErrorKind::Char)
}

/// `template <...>` ahead of a class or member declaration
fn template_header(input: &str) -> PResult<'_, &str> {
    preceded(keyword("template"), angle_group).parse(input)
}

/// Skip a construct that is not modelled.
///
/// Stops after a `;` at nesting level zero, after a `{...}` body that follows
/// a parenthesised group, or just before a `}` closing the enclosing scope.
pub fn skip_construct(input: &str) -> PResult<'_, &str> {
    let (input, _) = ws(input)?;
    let mut i = 0;
    let mut after_parens = false;

    while let Some(c) = input[i..].chars().next() {
        if let Some(len) = trivia_or_literal_len(&input[i..]) {
            i += len;
            continue;
        }
        match c {
            ';' => return Ok((&input[i + 1..], &input[..i + 1])),
            ')' | ']' | '}' => {
                if i == 0 {
                    return fail(input, ErrorKind::Char);
                }
                return Ok((&input[i..], &input[..i]));
            }
            '(' | '[' | '{' => {
                let Some(end) = matching_close(&input[i + 1..], c) else {
                    return Err(nom::Err::Failure(DeclError::unclosed(&input[i..], c)));
                };
                let after = i + 1 + end + 1;
                if c == '{' && after_parens {
                    return Ok((&input[after..], &input[..after]));
                }
                after_parens = c == '(';
                i = after;
                continue;
            }
            c if c.is_whitespace() => {}
            // Trailing specifiers and return types keep a following `{` a body
            _ => {
                after_parens = after_parens
                    && (is_ident_char(c) || matches!(c, '-' | '>' | '<' | '&' | '*' | ':' | ','))
            }
        }
        i += c.len_utf8();
    }

    if i == 0 {
        return fail(input, ErrorKind::Eof);
    }
    Ok((&input[i..], input))
}

fn other<'a>(full: &'a str, input: &'a str) -> PResult<'a, Span> {
    let (input, _) = ws(input)?;
    let start = position(full, input);
    let (input, _) = skip_construct(input)?;
    Ok((input, span_from(full, start, input)))
}

fn skipped_declarations(full: &str, items: &[Item]) -> Vec<SkippedDecl> {
    let mut spans = Vec::new();
    for item in items {
        match item {
            Item::Other(span) => spans.push(*span),
            Item::Class(class) => spans.extend(class.members.iter().filter_map(|m| match m {
                Member::Other(span) => Some(*span),
                _ => None,
            })),
            Item::Function(_) => {}
        }
    }
    spans
        .into_iter()
        .filter_map(|span| skipped_declaration(full, span))
        .collect()
}

/// Classify a skipped span as a class definition or an overriding method
fn skipped_declaration(full: &str, span: Span) -> Option<SkippedDecl> {
    let text = &full[span.start..span.end];
    let head = &text[..text.find('{').unwrap_or(text.len())];

    let class_key = preceded(
        opt(template_header),
        alt((keyword("class"), keyword("struct"))),
    )
    .parse(head);

    // The name is the last word of `region`, which starts at `region_start`
    let (kind, region_start, region) = match class_key {
        Ok((rest, _)) => {
            // Without a body this is a forward declaration
            if head.len() == text.len() {
                return None;
            }
            let end = rest
                .char_indices()
                .find(|&(i, c)| c == '<' || (c == ':' && !is_scope_colon(rest, i)))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let region = rest[..end].trim_end();
            let region = region
                .strip_suffix("final")
                .filter(|r| !r.ends_with(is_ident_char))
                .unwrap_or(region)
                .trim_end();
            (SkippedKind::Class, position(head, rest), region)
        }
        Err(_) => {
            let params = head.find('(')?;
            let qualifiers = &head[params..];
            if !contains_word(qualifiers, "override") && !contains_word(qualifiers, "final") {
                return None;
            }
            (SkippedKind::Method, 0, head[..params].trim_end())
        }
    };

    let name_start = region
        .char_indices()
        .rev()
        .find(|&(_, c)| match kind {
            SkippedKind::Class => !is_ident_char(c),
            SkippedKind::Method => c.is_whitespace() || matches!(c, '*' | '&' | ']'),
        })
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let name = &region[name_start..];
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let start = span.start + region_start + name_start;
    Some(SkippedDecl {
        kind,
        name: name.to_string(),
        span: Span::new(start, start + name.len()),
    })
}

fn is_scope_colon(s: &str, i: usize) -> bool {
    s[..i].ends_with(':') || s[i + 1..].starts_with(':')
}

fn contains_word(s: &str, word: &str) -> bool {
    s.match_indices(word).any(|(i, _)| {
        !s[..i].ends_with(is_ident_char) && !s[i + word.len()..].starts_with(is_ident_char)
    })
}

// =============================================================================
// Classes
// =============================================================================

/// `template <...> class Name [[attrs]] final : bases { members };`
pub fn class_decl<'a>(full: &'a str, input: &'a str) -> PResult<'a, ClassDecl> {
    let (input, _) = ws(input)?;
    let start = position(full, input);

    let (input, template) = opt(template_header).parse(input)?;
    let (input, key) = alt((
        value(ClassKey::Class, keyword("class")),
        value(ClassKey::Struct, keyword("struct")),
    ))
    .parse(input)?;
    let (input, attributes) = opt(|i| attribute_list(full, i)).parse(input)?;

    let (input, _) = ws(input)?;
    let name_start = position(full, input);
    let (input, name) = identifier(input)?;
    let name_span = span_from(full, name_start, input);

    let (input, is_final) = opt(keyword("final")).parse(input)?;
    let (input, bases) = opt(preceded(
        symbol(":"),
        cut(context(
            "a base class name",
            separated_list1(symbol(","), |i| base_specifier(full, i)),
        )),
    ))
    .parse(input)?;
    let (input, _) = symbol("{").parse(input)?;

    let (input, members) = cut(|i| class_body(full, i)).parse(input)?;
    let (input, _) = cut(context("'}' closing the class body", symbol("}"))).parse(input)?;
    let (input, _) = cut(context("';' after the class declaration", symbol(";"))).parse(input)?;

    Ok((
        input,
        ClassDecl {
            key,
            name,
            name_span,
            is_template: template.is_some(),
            is_final: is_final.is_some(),
            attributes: attributes.unwrap_or_default(),
            bases: bases.unwrap_or_default(),
            members,
            span: span_from(full, start, input),
        },
    ))
}

fn attribute_list<'a>(full: &'a str, input: &'a str) -> PResult<'a, Vec<Attribute>> {
    let (input, _) = symbol("[[").parse(input)?;
    let (input, attributes) = cut(context(
        "an attribute name",
        separated_list1(symbol(","), |i| attribute(full, i)),
    ))
    .parse(input)?;
    let (input, _) = cut(context("']]' closing the attribute list", symbol("]]"))).parse(input)?;
    Ok((input, attributes))
}

fn attribute<'a>(full: &'a str, input: &'a str) -> PResult<'a, Attribute> {
    let (input, _) = ws(input)?;
    let start = position(full, input);
    let (input, name) = qualified_name(input)?;
    let (input, _) = opt(balanced('(')).parse(input)?;
    Ok((
        input,
        Attribute {
            name,
            span: span_from(full, start, input),
        },
    ))
}

#[derive(Clone)]
enum BaseModifier {
    Access(Access),
    Virtual,
}

fn base_specifier<'a>(full: &'a str, input: &'a str) -> PResult<'a, BaseSpecifier> {
    let (input, _) = ws(input)?;
    let start = position(full, input);

    let (input, modifiers) = many0(alt((
        map(access, BaseModifier::Access),
        value(BaseModifier::Virtual, keyword("virtual")),
    )))
    .parse(input)?;
    let (input, name) = qualified_name(input)?;
    let (input, template_args) = opt(angle_group).parse(input)?;

    let mut base = BaseSpecifier {
        name,
        template_args: template_args.map(str::to_string),
        access: None,
        is_virtual: false,
        span: span_from(full, start, input),
    };
    for modifier in modifiers {
        match modifier {
            BaseModifier::Access(access) => base.access = Some(access),
            BaseModifier::Virtual => base.is_virtual = true,
        }
    }
    Ok((input, base))
}

fn class_body<'a>(full: &'a str, input: &'a str) -> PResult<'a, Vec<Member>> {
    many0(|i| member(full, i)).parse(input)
}

fn member<'a>(full: &'a str, input: &'a str) -> PResult<'a, Member> {
    alt((
        map(terminated(access, symbol(":")), Member::Access),
        map(|i| method_decl(full, i), Member::Method),
        map(|i| other(full, i), Member::Other),
    ))
    .parse(input)
}

// =============================================================================
// Methods
// =============================================================================

enum Word {
    Name(String, Span),
    Punct,
}

fn operator_symbol(input: &str) -> PResult<'_, &str> {
    alt((
        alt((tag("<=>"), tag("<<="), tag(">>="), tag("->*"))),
        alt((
            tag("->"),
            tag("=="),
            tag("!="),
            tag("<="),
            tag(">="),
            tag("&&"),
            tag("||"),
            tag("++"),
            tag("--"),
            tag("<<"),
            tag(">>"),
            tag("+="),
            tag("-="),
            tag("*="),
            tag("/="),
            tag("%="),
            tag("&="),
            tag("|="),
            tag("^="),
        )),
        alt((
            tag("+"),
            tag("-"),
            tag("*"),
            tag("/"),
            tag("%"),
            tag("^"),
            tag("&"),
            tag("|"),
            tag("~"),
            tag("!"),
            tag("="),
            tag("<"),
            tag(">"),
            tag(","),
        )),
    ))
    .parse(input)
}

/// `operator==`, `operator()`, `operator new[]`, `operator bool`
fn operator_name(input: &str) -> PResult<'_, String> {
    let (input, _) = keyword("operator").parse(input)?;
    let (input, _) = ws(input)?;
    let (input, op) = alt((
        map(pair(char('('), symbol(")")), |_| "()".to_string()),
        map(pair(char('['), symbol("]")), |_| "[]".to_string()),
        map(
            pair(
                alt((keyword("new"), keyword("delete"))),
                opt(pair(symbol("["), symbol("]"))),
            ),
            |(word, array)| match array {
                Some(_) => format!(" {}[]", word),
                None => format!(" {}", word),
            },
        ),
        map(operator_symbol, str::to_string),
        // Conversion to a single-word type
        map(raw_identifier, |ty| format!(" {}", ty)),
    ))
    .parse(input)?;
    Ok((input, format!("operator{}", op)))
}

/// One token of a declarator: a (possibly qualified or `~`) name, an
/// operator name, template arguments, `*`, `&` or a cv-qualifier
fn declarator_word<'a>(full: &'a str, input: &'a str) -> PResult<'a, Word> {
    let (input, _) = ws(input)?;
    let start = position(full, input);

    if let Ok((rest, _)) = alt((
        keyword("const"),
        keyword("volatile"),
        tag("*"),
        tag("&"),
        angle_group,
    ))
    .parse(input)
    {
        return Ok((rest, Word::Punct));
    }

    let (input, tilde) = opt(|i| one_char(i, '~')).parse(input)?;
    let (input, name) = alt((operator_name, qualified_name)).parse(input)?;
    // `Base::~Base` or `Base::operator==` in an out-of-line definition
    let (input, member) = opt(preceded(
        symbol("::"),
        alt((
            map(preceded(|i| one_char(i, '~'), identifier), |class| {
                format!("~{}", class)
            }),
            operator_name,
        )),
    ))
    .parse(input)?;
    let name = match (tilde, member) {
        (Some(_), _) => format!("~{}", name),
        (None, Some(member)) => format!("{}::{}", name, member),
        (None, None) => name,
    };
    Ok((input, Word::Name(name, span_from(full, start, input))))
}

fn ctor_initializers<'a>(input: &'a str) -> PResult<'a, ()> {
    value(
        (),
        preceded(
            symbol(":"),
            separated_list1(
                symbol(","),
                pair(qualified_name, alt((balanced('('), balanced('{')))),
            ),
        ),
    )
    .parse(input)
}

/// A cv-, ref- or virt-specifier, or `noexcept`, after the parameter list
fn qualifier(input: &str) -> PResult<'_, Qualifier> {
    alt((
        value(Qualifier::Const, keyword("const")),
        value(Qualifier::Volatile, keyword("volatile")),
        value(Qualifier::RValueRef, symbol("&&")),
        value(Qualifier::LValueRef, symbol("&")),
        value(
            Qualifier::Noexcept,
            terminated(keyword("noexcept"), opt(balanced('('))),
        ),
        value(Qualifier::Override, keyword("override")),
        value(Qualifier::Final, keyword("final")),
    ))
    .parse(input)
}

/// `-> type` after the parameter list
fn trailing_return<'a>(full: &'a str, input: &'a str) -> PResult<'a, ()> {
    value(
        (),
        preceded(
            symbol("->"),
            many1(alt((
                value((), |i| declarator_word(full, i)),
                value((), balanced('(')),
            ))),
        ),
    )
    .parse(input)
}

fn method_tail(input: &str) -> PResult<'_, MethodBody> {
    alt((
        value(
            MethodBody::Pure,
            preceded(symbol("="), terminated(symbol("0"), symbol(";"))),
        ),
        value(
            MethodBody::Defaulted,
            preceded(symbol("="), terminated(keyword("default"), symbol(";"))),
        ),
        value(
            MethodBody::Deleted,
            preceded(symbol("="), terminated(keyword("delete"), symbol(";"))),
        ),
        value(MethodBody::Declared, symbol(";")),
        value(
            MethodBody::Defined,
            preceded(
                opt(ctor_initializers),
                terminated(balanced('{'), opt(symbol(";"))),
            ),
        ),
    ))
    .parse(input)
}

/// `virtual void foo() const override = 0;` and friends
pub fn method_decl<'a>(full: &'a str, input: &'a str) -> PResult<'a, MethodDecl> {
    let (input, _) = ws(input)?;
    let start = position(full, input);

    let (input, _) = opt(template_header).parse(input)?;
    let (input, attributes) = opt(|i| attribute_list(full, i)).parse(input)?;
    let (input, specifiers) = many0(alt((
        value(DeclSpecifier::Virtual, keyword("virtual")),
        value(DeclSpecifier::Static, keyword("static")),
        value(DeclSpecifier::Inline, keyword("inline")),
        value(DeclSpecifier::Explicit, keyword("explicit")),
        value(DeclSpecifier::Constexpr, keyword("constexpr")),
    )))
    .parse(input)?;

    let after_specifiers = input;
    let (input, mut words) = many1(|i| declarator_word(full, i)).parse(input)?;
    let Some(Word::Name(name, name_span)) = words.pop() else {
        return fail(after_specifiers, ErrorKind::Verify);
    };

    let (input, _) = balanced('(').parse(input)?;
    let (input, mut qualifiers) = many0(qualifier).parse(input)?;
    let (input, _) = opt(|i| trailing_return(full, i)).parse(input)?;
    let (input, virt_specifiers) = many0(qualifier).parse(input)?;
    qualifiers.extend(virt_specifiers);
    let (input, body) = method_tail(input)?;

    Ok((
        input,
        MethodDecl {
            name,
            name_span,
            attributes: attributes.unwrap_or_default(),
            specifiers,
            qualifiers,
            body,
            span: span_from(full, start, input),
        },
    ))
}

/// A function at file scope, including out-of-line member definitions
fn function_item<'a>(full: &'a str, input: &'a str) -> PResult<'a, FunctionDecl> {
    let (input, decl) = method_decl(full, input)?;

    let (owner, name) = match decl.name.rsplit_once("::") {
        Some((owner, name)) => (Some(owner.to_string()), name.to_string()),
        None => (None, decl.name.clone()),
    };
    Ok((input, FunctionDecl { owner, name, decl }))
}
