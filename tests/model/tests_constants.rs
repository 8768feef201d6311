//! Constant evaluation through the field façade.

use rstest::rstest;
use stubtree::hir::ConstValue;
use stubtree::model::{Backing, Project, ProjectConfig};

use crate::helpers::project_helpers::*;

fn constant_of(source: &str, name: &str) -> Option<ConstValue> {
    let (project, file) = project_with(source);
    let analysis = project.read();
    analysis.find_field(file, name).unwrap().compute_constant_value()
}

#[rstest]
#[case("final int X = 2 + 3;", Some(ConstValue::Int(5)))]
#[case("final String X = \"a\" + \"b\";", Some(ConstValue::string("ab")))]
#[case("int X = 2 + 3;", None)]
#[case("static int X = 2 + 3;", None)]
#[case("final long X = 1 << 40;", Some(ConstValue::Long(256)))]
#[case("final long X = 1L << 40;", Some(ConstValue::Long(1 << 40)))]
#[case("final double X = 1 / 2;", Some(ConstValue::Double(0.0)))]
#[case("final char X = 'a' + 1;", Some(ConstValue::Char(98)))]
#[case("final String X = \"n=\" + 1.0;", Some(ConstValue::string("n=1.0")))]
#[case("final Object X = 1;", None)]
#[case("final int[] X = {1, 2};", None)]
#[case("final String X = null;", None)]
#[case("final int X = compute();", None)]
#[case("final int X = 1 / 0;", None)]
#[case("final int X;", None)]
fn test_constant_value(#[case] source: &str, #[case] expected: Option<ConstValue>) {
    assert_eq!(constant_of(source, "X"), expected);
}

#[test]
fn test_references_within_class() {
    let source = "class A { static final int X = Y * 2; static final int Y = 21; }";
    assert_eq!(constant_of(source, "X"), Some(ConstValue::Int(42)));
}

#[test]
fn test_qualified_reference_across_files() {
    let project = Project::default();
    let a = {
        let mut write = project.write();
        write.add_file("B.java", "class B { static final int N = 7; }");
        write.add_file("A.java", "class A { static final String S = \"v\" + B.N; }")
    };
    let analysis = project.read();
    let s = analysis.find_field(a, "S").unwrap();
    assert_eq!(s.compute_constant_value(), Some(ConstValue::string("v7")));
}

#[test]
fn test_reference_to_non_final_field_is_not_constant() {
    let source = "class A { static final int X = Y + 1; static int Y = 1; }";
    assert_eq!(constant_of(source, "X"), None);
}

#[test]
fn test_mutual_reference_is_not_constant() {
    let (project, file) = project_with("class A { static final int A1 = B1 + 1; static final int B1 = A1 + 1; }");
    let analysis = project.read();
    let a = analysis.find_field(file, "A1").unwrap();
    let b = analysis.find_field(file, "B1").unwrap();
    assert_eq!(a.compute_constant_value(), None);
    assert_eq!(b.compute_constant_value(), None);
}

#[test]
fn test_self_reference_is_not_constant() {
    assert_eq!(constant_of("class A { static final int X = X + 1; }", "X"), None);
}

#[test]
fn test_cycle_does_not_poison_unrelated_constants() {
    let source = "class A { static final int P = Q; static final int Q = P; static final int R = 3; }";
    let (project, file) = project_with(source);
    let analysis = project.read();
    assert_eq!(analysis.find_field(file, "P").unwrap().compute_constant_value(), None);
    assert_eq!(
        analysis.find_field(file, "R").unwrap().compute_constant_value(),
        Some(ConstValue::Int(3))
    );
}

#[test]
fn test_stub_backed_evaluation_does_not_materialize() {
    let (project, file) = project_with("class A { static final int X = 40 + 2; }");
    let analysis = project.read();
    let x = analysis.find_field(file, "X").unwrap();
    assert!(matches!(x.backing(), Some(Backing::Stub(_))));
    assert_eq!(x.compute_constant_value(), Some(ConstValue::Int(42)));
    assert!(!analysis.file(file).unwrap().is_materialized());
}

#[test]
fn test_too_long_initializer_is_read_from_tree() {
    let config = ProjectConfig::default().with_max_initializer_len(4);
    let (project, file) = project_with_config("class A { static final int X = 1000 + 2000; }", config);
    let analysis = project.read();
    let x = analysis.find_field(file, "X").unwrap();
    assert!(x.has_initializer());
    assert!(!analysis.file(file).unwrap().is_materialized());

    assert_eq!(x.compute_constant_value(), Some(ConstValue::Int(3000)));
    assert!(analysis.file(file).unwrap().is_materialized());
}

#[test]
fn test_repeated_queries_agree() {
    let (project, file) = project_with("final String X = \"a\" + 'b' + 1;");
    let analysis = project.read();
    let x = analysis.find_field(file, "X").unwrap();
    let first = x.compute_constant_value();
    assert_eq!(first, Some(ConstValue::string("ab1")));
    assert_eq!(x.compute_constant_value(), first);
}

#[test]
fn test_reclaiming_caches_keeps_results() {
    let source = "class A { static final long X = Y + 1; static final int Y = 41; }";
    let (project, file) = project_with(source);
    let x = field_id(&project, file, "X");
    let before = project.read().field(x).unwrap().compute_constant_value();

    project.write().reclaim_soft_caches();

    let analysis = project.read();
    assert_eq!(analysis.field(x).unwrap().compute_constant_value(), before);
    assert_eq!(before, Some(ConstValue::Long(42)));
}

#[rstest]
#[case(
    "class Outer { static final int X = 1; class Inner { final int Y = X + 1; } }",
    Some(ConstValue::Int(2))
)]
#[case(
    "class Outer { static final int X = 1; class Mid { class Inner { final int Y = X * 10; } } }",
    Some(ConstValue::Int(10))
)]
#[case(
    "class Outer { static final int X = 1; class Inner { static final int X = 5; final int Y = X + 1; } }",
    Some(ConstValue::Int(6))
)]
#[case(
    "class Outer { class Inner { final int Y = X + 1; } } class Other { static final int X = 1; }",
    None
)]
fn test_simple_names_resolve_through_enclosing_classes(
    #[case] source: &str,
    #[case] expected: Option<ConstValue>,
) {
    assert_eq!(constant_of(source, "Y"), expected);
}

#[test]
fn test_enclosing_class_lookup_from_edited_tree() {
    let source = "class Outer { static final int X = 1; class Inner { final int Y = X + 1; } }";
    let (project, file) = project_with(source);
    let x = field_id(&project, file, "X");
    project.write().set_initializer(x, Some("20")).unwrap();

    let analysis = project.read();
    assert!(analysis.file(file).unwrap().stubs().is_none());
    let y = analysis.find_field(file, "Y").unwrap();
    assert_eq!(y.enclosing_classes(), ["Inner", "Outer"]);
    assert_eq!(y.compute_constant_value(), Some(ConstValue::Int(21)));
}
