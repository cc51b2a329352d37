//! Parsing tests for whole headers

use parser::{
    parse_declarations, parse_declarations_with_diagnostics, ClassKey, Item, MethodBody,
    SkippedKind,
};

const TOUR: &str = r#"
#pragma once

#include <map>
#include <vector>

void deduce_everything() {
  auto i{4};
  auto v = {1, 2, 3};
  auto p = std::make_unique<int>(10);
  auto add = [](auto const a, auto const b) { return a + b; };
}

auto ladd = [](auto const a, auto const b) { return a + b; };

struct {
  template <typename T, typename U>
  auto operator()(T const a, U const b) const {
    return a + b;
  }
} L;

void make_aliases() {
  using byte = unsigned char;
  using fn = void(byte, double);
}

struct Control {
  const int DefaultHeight = 14;
  int TextFont = 10;
  std::string text;

  Control(const std::string& text) : text(text) {}
  Control(const int h, const std::string& text)
      : DefaultHeight(h), text(text) {}
};

enum class Status { Unk, Created, Connected };
enum class StatusUnsInt : unsigned int { Unk, Created, Connected };

void use_status(Status const s) {
  // switch (s) {
}

class Base {
  virtual void foo() = 0; // pure virtual
  virtual void bar() {};
  virtual void foobar() = 0;
};
void Base::foobar() {}

class Derived1 : Base {
  virtual void foo() override = 0;
  virtual void bar() override {};
  virtual void foobar() override {};
};

class Derived2 : Derived1 {
  virtual void foo() final {}
};

class Derived3 final : Derived1 {
  virtual void foo() override {}
  virtual void foobar() override {}
};

class Derived4 final : Derived2 {
  // virtual void foo() override {}
};
"#;

#[test]
fn test_empty_file() {
    match parse_declarations("empty.hpp", "") {
        Ok(file) => {
            assert!(file.items.is_empty());
            assert_eq!(file.span.start, 0);
            assert_eq!(file.span.end, 0);
        }
        Err(e) => panic!("empty file should parse, got: {}", e),
    }
}

#[test]
fn test_tour_header_classes() {
    let file = match parse_declarations("tour.hpp", TOUR) {
        Ok(file) => file,
        Err(e) => panic!("tour header should parse, got: {}", e),
    };

    let names: Vec<_> = file.classes().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Control", "Base", "Derived1", "Derived2", "Derived3", "Derived4"]
    );

    let control = file.classes().next().unwrap();
    assert_eq!(control.key, ClassKey::Struct);
    let ctors: Vec<_> = control.methods().map(|(_, m)| m.name.as_str()).collect();
    assert_eq!(ctors, vec!["Control", "Control"]);

    let base = file.classes().find(|c| c.name == "Base").unwrap();
    assert!(base.bases.is_empty());
    assert!(base.method("foo").unwrap().is_pure());
    assert_eq!(base.method("bar").unwrap().body, MethodBody::Defined);
    assert!(base.method("foobar").unwrap().is_virtual());

    let derived2 = file.classes().find(|c| c.name == "Derived2").unwrap();
    assert_eq!(derived2.bases[0].name, "Derived1");
    assert!(derived2.method("foo").unwrap().is_final());
    assert!(!derived2.method("foo").unwrap().is_override());

    let derived3 = file.classes().find(|c| c.name == "Derived3").unwrap();
    assert!(derived3.is_final);

    let derived4 = file.classes().find(|c| c.name == "Derived4").unwrap();
    assert!(derived4.is_final);
    assert_eq!(derived4.methods().count(), 0);
}

#[test]
fn test_tour_header_functions() {
    let file = parse_declarations("tour.hpp", TOUR).unwrap();

    let functions: Vec<_> = file
        .functions()
        .map(|f| (f.owner.as_deref(), f.name.as_str()))
        .collect();
    assert_eq!(
        functions,
        vec![
            (None, "deduce_everything"),
            (None, "make_aliases"),
            (None, "use_status"),
            (Some("Base"), "foobar"),
        ]
    );

    let skipped = file
        .items
        .iter()
        .filter(|item| matches!(item, Item::Other(_)))
        .count();
    // the lambda, its trailing ';', the anonymous struct and both enums
    assert_eq!(skipped, 5);
}

#[test]
fn test_spans_point_at_names() {
    let src = "class Widget final : Base {\n  virtual int size() const override;\n};\n";
    let file = parse_declarations("widget.hpp", src).unwrap();
    let widget = file.classes().next().unwrap();

    assert_eq!(&src[widget.name_span.start..widget.name_span.end], "Widget");
    let size = widget.method("size").unwrap();
    assert_eq!(&src[size.name_span.start..size.name_span.end], "size");
    assert_eq!(size.body, MethodBody::Declared);
    assert_eq!(widget.span.start, 0);
    assert_eq!(widget.span.end, src.trim_end().len());
}

#[test]
fn test_missing_closing_brace() {
    let src = "class A {\n  virtual void f();\n";
    let failure = parse_declarations("a.hpp", src).unwrap_err();

    assert!(failure.found.is_empty());
    assert_eq!(failure.expected, Some("'}' closing the class body"));
    assert_eq!(
        failure.to_string(),
        format!(
            "unexpected end of input at byte {}, expected '}}' closing the class body",
            src.len()
        )
    );
}

#[test]
fn test_unclosed_body_reports_opening_brace() {
    let src = "class A { void f() { ;";
    let failure = parse_declarations("a.hpp", src).unwrap_err();

    assert_eq!(failure.unclosed, Some('{'));
    assert_eq!(failure.offset, 19);
}

#[test]
fn test_failures_become_diagnostics() {
    let result = parse_declarations_with_diagnostics("bad.hpp", "class A : {};");

    assert!(result.file.is_none());
    assert!(result.diagnostics.has_errors());
    let diagnostic = result.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.code.as_deref(), Some("E0001"));
    assert_eq!(diagnostic.message, "unexpected '{'");
    assert_eq!(
        diagnostic.primary_label().map(|l| l.message.as_str()),
        Some("expected a base class name")
    );
    assert_eq!(diagnostic.span.as_ref().unwrap().start.column, 11);
}

#[test]
fn test_stray_closing_brace_is_an_error() {
    let failure = parse_declarations("stray.hpp", "class A {};\n}").unwrap_err();
    assert_eq!(failure.found, "}");
    assert_eq!(failure.offset, 12);
}

const MODERN: &str = r#"
template <typename Derived>
class Comparable {
public:
  [[nodiscard]] virtual bool operator==(const Derived& other) const noexcept(true) = 0;
  virtual auto hash() const -> std::size_t = 0;
};

class Key final : public Comparable<Key>, private std::enable_shared_from_this<Key> {
public:
  bool operator==(const Key& other) const noexcept(true) override;
  auto hash() const -> std::size_t override { return 0; }
  std::string take() && final;
};
"#;

#[test]
fn test_modern_header() {
    let file = parse_declarations("modern.hpp", MODERN).unwrap();
    assert!(file.skipped.is_empty(), "{:?}", file.skipped);

    let comparable = file.classes().next().unwrap();
    assert!(comparable.is_template);
    let eq = comparable.method("operator==").unwrap();
    assert!(eq.is_pure());
    assert_eq!(eq.attributes[0].name, "nodiscard");

    let key = file.classes().find(|c| c.name == "Key").unwrap();
    let bases: Vec<_> = key
        .bases
        .iter()
        .map(|b| (b.name.as_str(), b.template_args.as_deref()))
        .collect();
    assert_eq!(
        bases,
        vec![
            ("Comparable", Some("<Key>")),
            ("std::enable_shared_from_this", Some("<Key>")),
        ]
    );

    let methods: Vec<_> = key
        .methods()
        .map(|(_, m)| (m.name.as_str(), m.is_override(), m.is_final()))
        .collect();
    assert_eq!(
        methods,
        vec![
            ("operator==", true, false),
            ("hash", true, false),
            ("take", false, true),
        ]
    );
}

#[test]
fn test_skipped_class_is_recorded() {
    let src = "class alignas(8) Packet : Base {\n  void f() override;\n};\n";
    let file = parse_declarations("packet.hpp", src).unwrap();

    assert_eq!(file.classes().count(), 0);
    assert_eq!(file.skipped.len(), 1);
    assert_eq!(file.skipped[0].kind, SkippedKind::Class);
    assert_eq!(file.skipped[0].name, "Packet");
}
