//! Integration tests for the ModelBuilder API
//!
//! These tests verify that the public API works and is usable.

use classmap::{
    ClassmapError, ModelBuilder, SourceUnit,
    config::{AppConfig, ExtractConfig, RenderConfig},
    model::Entity,
    policy::DefaultValuePolicy,
};

fn builder_without_merge() -> ModelBuilder {
    ModelBuilder::new(AppConfig::new(
        ExtractConfig::default().with_merge(false),
        RenderConfig::default(),
    ))
}

#[test]
fn test_builder_api_exists() {
    // Just verify the API compiles and can be constructed
    let _builder = ModelBuilder::default();
}

#[test]
fn test_parse_simple_unit() {
    let source = r#"
        namespace App {
            class Foo {
                private int x;
                public string Name() { return "foo"; }
            }
        }
    "#;

    let builder = ModelBuilder::default();
    let result = builder.parse(source);
    assert!(result.is_ok(), "Should parse valid unit: {:?}", result.err());
}

#[test]
fn test_render_simple_unit() {
    let source = "namespace App { enum Color { Red, Green, Blue } }";

    let builder = ModelBuilder::default();
    let model = builder.parse(source).expect("Failed to parse unit");
    let text = builder.render_text(&model).expect("Failed to render");

    assert!(text.contains("<<enumeration>>"));
    assert!(text.contains("App.Color"));
    assert!(text.contains("| Green"));
}

#[test]
fn test_parse_invalid_syntax_returns_error() {
    let invalid_source = "this is not valid C# for classmap!!!";

    let builder = ModelBuilder::default();
    match builder.parse(invalid_source) {
        Err(ClassmapError::Parse { err, src }) => {
            assert!(!err.diagnostics().is_empty());
            assert_eq!(src, invalid_source);
        }
        other => panic!("Should return a parse error, got {other:?}"),
    }
}

#[test]
fn test_parse_error_source_has_no_bom() {
    let source = "\u{feff}namespace App { int x; }";

    match ModelBuilder::default().parse(source) {
        Err(ClassmapError::Parse { src, .. }) => assert_eq!(src, "namespace App { int x; }"),
        other => panic!("Should return a parse error, got {other:?}"),
    }
}

#[test]
fn test_parse_merges_partials_by_default() {
    let source = r#"
        namespace App {
            partial class Foo { int x; }
            partial class Foo { int y; void Run() { } }
        }
    "#;

    let merged = ModelBuilder::default().parse(source).unwrap();
    assert_eq!(merged.len(), 1);
    let foo = merged.entities()[0].as_class().unwrap();
    let attrs: Vec<_> = foo.attributes().iter().map(|a| a.name()).collect();
    assert_eq!(attrs, ["x", "y"]);
    assert_eq!(foo.methods().len(), 1);

    let unmerged = builder_without_merge().parse(source).unwrap();
    assert_eq!(unmerged.len(), 2);
}

#[test]
fn test_two_units_merge_attributes() {
    let units = [
        SourceUnit::new("a.cs", "namespace App { class Foo { int x; } }"),
        SourceUnit::new("b.cs", "namespace App { class Foo { int y; } }"),
    ];

    let output = ModelBuilder::default()
        .extract_units(&units)
        .expect("Failed to extract units");
    assert!(output.is_complete());

    let model = output.into_result().unwrap();
    assert_eq!(model.len(), 1);
    let foo = model.find("App", "Foo").and_then(Entity::as_class).unwrap();
    let attrs: Vec<_> = foo.attributes().iter().map(|a| a.name()).collect();
    assert_eq!(attrs, ["x", "y"]);
}

#[test]
fn test_batch_without_merge_keeps_every_entity() {
    let units = [
        SourceUnit::new("a.cs", "namespace App { class Foo { int x; } }"),
        SourceUnit::new("b.cs", "namespace App { class Foo { int y; } }"),
    ];

    let output = builder_without_merge().extract_units(&units).unwrap();
    let keys: Vec<_> = output.model().iter().map(Entity::key).collect();
    assert_eq!(keys, [("App", "Foo"), ("App", "Foo")]);
}

#[test]
fn test_batch_with_failed_unit() {
    let units = [
        SourceUnit::new("good.cs", "namespace App { class Foo { } }"),
        SourceUnit::new("bad.cs", "namespace App { class Foo { int x } }"),
    ];

    let builder = ModelBuilder::default();
    let output = builder.extract_units(&units).unwrap();
    assert_eq!(output.model().len(), 1);
    assert_eq!(output.failures().len(), 1);
    assert_eq!(output.failures()[0].name(), "bad.cs");

    // Strict callers turn the failure into an error
    let output = builder.extract_units(&units).unwrap();
    match output.into_result() {
        Err(err @ ClassmapError::Batch { .. }) => {
            assert_eq!(err.to_string(), "1 of 2 units failed to parse");
        }
        other => panic!("Should return a batch error, got {other:?}"),
    }
}

#[test]
fn test_builder_with_config() {
    let source = "namespace App { class C { public void M(double d = 0.5) { } } }";
    let config = AppConfig::new(
        ExtractConfig::new(true, DefaultValuePolicy::Keep, Some(2)),
        RenderConfig::new(3),
    );

    let builder = ModelBuilder::new(config);
    let model = builder.parse(source).unwrap();
    let param = &model.classes().next().unwrap().methods()[0].parameters()[0];
    assert_eq!(param.default(), Some("0.5"));

    let text = builder.render_text(&model).unwrap();
    assert!(text.contains("|   + M(in d: double = 0.5)   |"));
}

#[test]
fn test_builder_reusability() {
    let builder = ModelBuilder::default();

    let model1 = builder
        .parse("namespace A { class One { } }")
        .expect("Failed to parse unit1");
    let model2 = builder
        .parse("namespace B { enum Two { X } }")
        .expect("Failed to parse unit2");

    let text1 = builder.render_text(&model1).unwrap();
    let text2 = builder.render_text(&model2).unwrap();
    assert!(text1.contains("A.One"));
    assert!(text2.contains("B.Two"));
}

#[test]
fn test_merge_is_explicit_too() {
    let builder = builder_without_merge();
    let model = builder
        .parse("namespace App { enum E { A } enum E { B, A } }")
        .unwrap();
    assert_eq!(model.len(), 2);

    let merged = builder.merge(model);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.entities()[0].as_enum().unwrap().values(), ["A", "B"]);
}
