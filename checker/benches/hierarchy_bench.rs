//! Benchmarks for hierarchy validation and the declaration pipeline

use checker::{check_source, validate, validate_all, CheckerConfig, ClassNode, Hierarchy, MethodDeclaration};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_deep_chain(depth: usize) -> Vec<ClassNode> {
    let mut classes = Vec::with_capacity(depth);

    // Each level overrides the root method and adds one of its own
    for i in 0..depth {
        let mut class = ClassNode::new(format!("Level{}", i)).with_instantiated();
        if i == 0 {
            class = class.with_method(MethodDeclaration::pure_virtual("run"));
        } else {
            class = class
                .with_base(format!("Level{}", i - 1).as_str())
                .with_method(MethodDeclaration::virtual_method("run").with_override());
        }
        class = class.with_method(MethodDeclaration::virtual_method(format!("method{}", i)));
        classes.push(class);
    }

    classes
}

fn generate_diamonds(count: usize) -> Vec<ClassNode> {
    let mut classes = Vec::with_capacity(count * 4);

    // Independent diamonds; every other bottom class leaves `f` ambiguous
    for i in 0..count {
        let root = format!("Root{}", i);
        let left = format!("Left{}", i);
        let right = format!("Right{}", i);
        classes.push(ClassNode::new(root.as_str()).with_method(MethodDeclaration::virtual_method("f")));
        classes.push(
            ClassNode::new(left.as_str())
                .with_base(root.as_str())
                .with_method(MethodDeclaration::virtual_method("f").with_override()),
        );
        classes.push(
            ClassNode::new(right.as_str())
                .with_base(root.as_str())
                .with_method(MethodDeclaration::virtual_method("f").with_override()),
        );
        let mut bottom = ClassNode::new(format!("Bottom{}", i))
            .with_base(left.as_str())
            .with_base(right.as_str());
        if i % 2 == 0 {
            bottom = bottom.with_method(MethodDeclaration::virtual_method("f").with_override());
        }
        classes.push(bottom);
    }

    classes
}

fn generate_header(depth: usize) -> String {
    let mut code = String::new();

    code.push_str("class Level0 {\n  virtual void run() = 0;\n};\n\n");
    for i in 1..depth {
        code.push_str(&format!(
            "class [[instantiated]] Level{} : public Level{} {{\n",
            i,
            i - 1
        ));
        code.push_str("  void run() override {}\n");
        code.push_str(&format!("  virtual int method{}() const {{ return {}; }}\n", i, i));
        code.push_str("};\n\n");
    }

    code
}

fn benchmark_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_chain");

    for depth in [10, 50, 100, 500].iter() {
        let hierarchy = match Hierarchy::new(generate_deep_chain(*depth)) {
            Ok(hierarchy) => hierarchy,
            Err(e) => panic!("generated chain is invalid input: {}", e),
        };

        group.bench_with_input(BenchmarkId::from_parameter(depth), &hierarchy, |b, hierarchy| {
            b.iter(|| {
                let violations = validate(black_box(hierarchy));
                black_box(violations);
            });
        });
    }

    group.finish();
}

fn benchmark_diamonds(c: &mut Criterion) {
    let mut group = c.benchmark_group("diamonds");

    for count in [10, 100, 1000].iter() {
        let hierarchy = match Hierarchy::new(generate_diamonds(*count)) {
            Ok(hierarchy) => hierarchy,
            Err(e) => panic!("generated diamonds are invalid input: {}", e),
        };

        group.bench_with_input(BenchmarkId::from_parameter(count), &hierarchy, |b, hierarchy| {
            b.iter(|| {
                let violations = validate(black_box(hierarchy));
                black_box(violations);
            });
        });
    }

    group.finish();
}

fn benchmark_validate_all(c: &mut Criterion) {
    let hierarchies: Vec<Hierarchy> = (0..64)
        .filter_map(|_| Hierarchy::new(generate_diamonds(50)).ok())
        .collect();

    c.bench_function("validate_all_64x50", |b| {
        b.iter(|| {
            let results = validate_all(black_box(&hierarchies));
            black_box(results);
        });
    });
}

fn benchmark_declaration_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("declaration_pipeline");
    let config = CheckerConfig::default();

    for depth in [10, 100].iter() {
        let code = generate_header(*depth);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &code, |b, code| {
            b.iter(|| {
                let result = check_source("bench.hpp", black_box(code), &config);
                black_box(result.is_ok());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_deep_chain,
    benchmark_diamonds,
    benchmark_validate_all,
    benchmark_declaration_pipeline
);
criterion_main!(benches);
