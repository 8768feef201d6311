//! Splitting grouped declarations through the project.

use rstest::rstest;
use stubtree::hir::{ConstValue, PrimitiveType, TypeDescriptor};
use stubtree::model::EditError;

use crate::helpers::project_helpers::*;

/// name, type, initializer text, constant value
type FieldFacts = (String, Option<String>, Option<String>, Option<ConstValue>);

fn facts(project: &stubtree::Project, file: stubtree::FileId) -> Vec<FieldFacts> {
    let analysis = project.read();
    let mut facts: Vec<_> = analysis
        .fields(file)
        .map(|f| {
            (
                f.name().to_string(),
                f.ty().map(|t| t.to_string()),
                f.initializer().map(|i| i.text()),
                f.compute_constant_value(),
            )
        })
        .collect();
    facts.sort_by(|a, b| a.0.cmp(&b.0));
    facts
}

#[rstest]
#[case("class A { int a = 1, b = 2; }", "class A { int a = 1; int b = 2; }")]
#[case(
    "class A { static final long x = 1, y, z = x + 1; }",
    "class A { static final long x = 1; static final long y; static final long z = x + 1; }"
)]
#[case("class A { int[] a, b[]; }", "class A { int[] a; int[][] b; }")]
#[case(
    "class A { /** doc */ @Deprecated String s = \"a\", t = s + \"b\"; }",
    "class A { /** doc */ @Deprecated String s = \"a\"; @Deprecated String t = s + \"b\"; }"
)]
fn test_normalized_text(#[case] source: &str, #[case] expected: &str) {
    let (project, file) = project_with(source);
    let first = project.read().fields(file).next().unwrap().id();
    assert!(project.write().normalize_declaration(first).unwrap());
    assert_eq!(file_text(&project, file), expected);
}

#[rstest]
#[case("class A { static final int a = 1, b = a + 2; }")]
#[case("class A { final String s = \"x\", t = s + s, u; }")]
#[case("class A { int[] a, b[], c[][] = null; }")]
fn test_normalization_preserves_field_facts(#[case] source: &str) {
    let (project, file) = project_with(source);
    let before = facts(&project, file);

    let ids: Vec<_> = project.read().fields(file).map(|f| f.id()).collect();
    let middle = ids[1];
    assert!(project.write().normalize_declaration(middle).unwrap());

    assert_eq!(facts(&project, file), before);
    let after: Vec<_> = project.read().fields(file).map(|f| f.id()).collect();
    assert_eq!(after, ids);
}

#[test]
fn test_array_brackets_follow_declarator() {
    let (project, file) = project_with("class A { int[] a, b[]; }");
    let a = field_id(&project, file, "a");
    let b = field_id(&project, file, "b");
    project.write().normalize_declaration(b).unwrap();

    let analysis = project.read();
    let int = TypeDescriptor::primitive(PrimitiveType::Int);
    assert_eq!(analysis.field(a).unwrap().ty(), Some(int.clone().with_extra_dims(1)));
    assert_eq!(analysis.field(b).unwrap().ty(), Some(int.with_extra_dims(2)));
    assert_eq!(analysis.field(b).unwrap().type_element().unwrap().text(), "int[][]");
}

#[test]
fn test_split_fields_get_own_modifier_lists() {
    let (project, file) = project_with("class A { static final int a = 1, b = 2; }");
    let b = field_id(&project, file, "b");
    project.write().normalize_declaration(b).unwrap();

    let analysis = project.read();
    let a = analysis.find_field(file, "a").unwrap();
    let b = analysis.field(b).unwrap();
    assert_ne!(a.type_element().unwrap().node(), b.type_element().unwrap().node());
    assert_eq!(b.compute_constant_value(), Some(ConstValue::Int(2)));
    assert_eq!(b.text().unwrap(), "static final int b = 2;");
}

#[test]
fn test_single_declarator_is_untouched() {
    let source = "class A { int a = 1; }";
    let (project, file) = project_with(source);
    let a = field_id(&project, file, "a");
    let count = project.read().modification_count();

    assert!(!project.write().normalize_declaration(a).unwrap());
    assert_eq!(file_text(&project, file), source);
    assert_eq!(project.read().modification_count(), count);
    assert!(project.read().file(file).unwrap().stubs().is_some());
}

#[test]
fn test_normalization_is_idempotent() {
    let (project, file) = project_with("class A { int a, b; }");
    let a = field_id(&project, file, "a");
    assert!(project.write().normalize_declaration(a).unwrap());
    let once = file_text(&project, file);

    let b = field_id(&project, file, "b");
    assert!(!project.write().normalize_declaration(a).unwrap());
    assert!(!project.write().normalize_declaration(b).unwrap());
    assert_eq!(file_text(&project, file), once);
}

#[test]
fn test_read_only_file_is_not_normalized() {
    let source = "class A {\n  int a = 1, b = 2;\n}";
    let (project, file) = project_with(source);
    let b = field_id(&project, file, "b");
    project.write().set_writable(file, false).unwrap();
    let count = project.read().modification_count();

    let err = project.write().normalize_declaration(b).unwrap_err();
    match &err {
        EditError::ReadOnly { path, position } => {
            assert_eq!(path, "Test.java");
            assert_eq!(position.line, 1);
        }
        other => panic!("expected a read-only error, got {other}"),
    }
    assert!(err.to_string().contains("read-only"));
    assert_eq!(file_text(&project, file), source);
    assert_eq!(project.read().modification_count(), count);
    assert!(project.read().file(file).unwrap().stubs().is_some());
}
