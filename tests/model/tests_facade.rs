//! Field façade queries over stubs, trees and both.

use stubtree::hir::{PrimitiveType, TypeDescriptor};
use stubtree::model::Backing;
use stubtree::parser::SyntaxKind;
use stubtree::syntax::Modifiers;

use crate::helpers::project_helpers::*;

const SOURCE: &str = r#"
class Outer {
    /** Shared doc.
     * @deprecated use something else
     */
    public static final int[] a = {1}, b[], c = null;

    @Deprecated
    protected java.util.List<String> names;

    class Inner {
        private String label = "x";
    }
}
"#;

type Summary = (
    stubtree::Name,
    Option<TypeDescriptor>,
    Option<stubtree::syntax::ModifierSet>,
    bool,
    bool,
    Option<stubtree::Name>,
);

fn summaries(project: &stubtree::Project, file: stubtree::FileId) -> Vec<Summary> {
    let analysis = project.read();
    analysis
        .fields(file)
        .map(|f| {
            (
                f.name(),
                f.ty(),
                f.modifier_list(),
                f.has_initializer(),
                f.is_deprecated(),
                f.containing_class(),
            )
        })
        .collect()
}

#[test]
fn test_stub_queries_match_tree_queries() {
    let (project, file) = project_with(SOURCE);
    let from_stubs = summaries(&project, file);
    assert_eq!(from_stubs.len(), 5);
    assert!(!project.read().file(file).unwrap().is_materialized());

    {
        let analysis = project.read();
        for field in analysis.fields(file) {
            assert!(field.syntax().is_some());
            assert!(matches!(field.backing(), Some(Backing::Both(_, _))));
        }
    }

    // Any edit makes the tree the only representation.
    {
        let mut write = project.write();
        let mut editor = write.editor(file).unwrap();
        let root = editor.root();
        let space = editor.create_leaf(SyntaxKind::WHITESPACE, "\n");
        editor.append_child(root, space).unwrap();
        write.reclaim_soft_caches();
    }
    {
        let analysis = project.read();
        assert!(analysis.file(file).unwrap().stubs().is_none());
        for field in analysis.fields(file) {
            assert!(matches!(field.backing(), Some(Backing::Tree(_))));
        }
    }

    assert_eq!(summaries(&project, file), from_stubs);
}

#[test]
fn test_grouped_declarators_share_type_and_modifiers() {
    let (project, file) = project_with(SOURCE);
    let analysis = project.read();
    let int = TypeDescriptor::primitive(PrimitiveType::Int);

    let a = analysis.find_field(file, "a").unwrap();
    let b = analysis.find_field(file, "b").unwrap();
    let c = analysis.find_field(file, "c").unwrap();
    assert_eq!(a.ty(), Some(int.clone().with_extra_dims(1)));
    assert_eq!(b.ty(), Some(int.clone().with_extra_dims(2)));
    assert_eq!(c.ty(), Some(int.with_extra_dims(1)));

    for field in [a, b, c] {
        assert!(field.has_modifier(Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL));
        assert!(field.is_deprecated());
    }
    assert!(a.has_initializer());
    assert!(!b.has_initializer());
    assert!(c.has_initializer());

    let shared = a.type_element().unwrap();
    assert_eq!(shared.kind(), SyntaxKind::TYPE);
    assert_eq!(shared.text(), "int[]");
    assert_eq!(c.type_element().unwrap().node(), shared.node());
}

#[test]
fn test_doc_comment_is_inherited_by_later_declarators() {
    let (project, file) = project_with(SOURCE);
    let analysis = project.read();
    let doc = analysis.find_field(file, "c").unwrap().doc_comment().unwrap();
    assert!(doc.starts_with("/** Shared doc."));
    assert!(analysis.find_field(file, "names").unwrap().doc_comment().is_none());
}

#[test]
fn test_annotation_marks_deprecated() {
    let (project, file) = project_with(SOURCE);
    let analysis = project.read();
    let names = analysis.find_field(file, "names").unwrap();
    assert!(names.is_deprecated());
    assert!(names.modifier_list().unwrap().has_annotation("Deprecated"));
    assert_eq!(names.ty().unwrap().to_string(), "java.util.List<String>");
}

#[test]
fn test_nested_class_membership() {
    let (project, file) = project_with(SOURCE);
    let analysis = project.read();
    let label = analysis.find_field(file, "label").unwrap();
    assert_eq!(label.containing_class().as_deref(), Some("Inner"));
    assert!(label.ty().unwrap().is_string());
    assert!(label.has_modifier(Modifiers::PRIVATE));
    assert!(!label.is_deprecated());
    assert_eq!(label.initializer().unwrap().text(), "\"x\"");
    assert_eq!(label.text().unwrap(), "private String label = \"x\";");

    let outer = analysis.find_field(file, "a").unwrap();
    assert_eq!(outer.containing_class().as_deref(), Some("Outer"));
    assert_eq!(analysis.find_field_in_class(file, None, "label").map(|f| f.id()), None);
}

#[test]
fn test_initializer_of_grouped_declarator() {
    let (project, file) = project_with(SOURCE);
    let analysis = project.read();
    let a = analysis.find_field(file, "a").unwrap();
    let init = a.initializer().unwrap();
    assert_eq!(init.kind(), SyntaxKind::ARRAY_INITIALIZER);
    assert_eq!(init.text(), "{1}");
    assert!(analysis.find_field(file, "b").unwrap().initializer().is_none());
}

#[test]
fn test_unknown_field_lookups() {
    let (project, file) = project_with(SOURCE);
    let analysis = project.read();
    assert!(analysis.find_field(file, "missing").is_none());
    assert!(analysis.find_class_field("Nope", "a").is_none());
    assert_eq!(
        analysis.find_class_field("Inner", "label").map(|f| f.name()),
        Some("label".into())
    );
}

#[test]
fn test_commented_fields_are_indexed() {
    let source = "class A { /** Doc. @deprecated */ static final int X = 2 + 3; /* plain */ int Y; }";
    let (project, file) = project_with(source);
    let analysis = project.read();
    let names: Vec<_> = analysis.fields(file).map(|f| f.name().to_string()).collect();
    assert_eq!(names, ["X", "Y"]);

    let x = analysis.find_field(file, "X").unwrap();
    assert!(x.is_deprecated());
    assert_eq!(x.compute_constant_value(), Some(stubtree::hir::ConstValue::Int(5)));
    assert!(!analysis.find_field(file, "Y").unwrap().is_deprecated());
}
