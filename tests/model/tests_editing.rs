//! Structural edits: cache coherence, stub lifecycle, error reporting.

use stubtree::hir::{ConstValue, PrimitiveType, TypeDescriptor};
use stubtree::model::EditError;
use stubtree::parser::{SyntaxKind, parse_file, parse_type};
use stubtree::syntax::TreeError;

use crate::helpers::project_helpers::*;

#[test]
fn test_type_query_after_type_replacement() {
    let (project, file) = project_with("class A { static final int X = 7; }");
    let x = field_id(&project, file, "X");
    let type_node = {
        let analysis = project.read();
        let field = analysis.field(x).unwrap();
        assert_eq!(field.ty(), Some(TypeDescriptor::primitive(PrimitiveType::Int)));
        assert_eq!(field.compute_constant_value(), Some(ConstValue::Int(7)));
        field.type_element().unwrap().node()
    };

    {
        let mut write = project.write();
        let mut editor = write.editor(file).unwrap();
        let fragment = parse_type("long").unwrap();
        let long = editor.import_subtree(&fragment.tree, fragment.node);
        editor.replace(type_node, long).unwrap();
    }

    let analysis = project.read();
    let field = analysis.field(x).unwrap();
    assert_eq!(field.ty(), Some(TypeDescriptor::primitive(PrimitiveType::Long)));
    assert_eq!(field.compute_constant_value(), Some(ConstValue::Long(7)));
}

#[test]
fn test_constant_follows_initializer_edits() {
    let source = "class A { static final int X = Y + 1; static final int Y = 1; }";
    let (project, file) = project_with(source);
    let x = field_id(&project, file, "X");
    let y = field_id(&project, file, "Y");
    assert_eq!(project.read().field(x).unwrap().compute_constant_value(), Some(ConstValue::Int(2)));

    project.write().set_initializer(y, Some("10 * 10")).unwrap();
    assert_eq!(project.read().field(x).unwrap().compute_constant_value(), Some(ConstValue::Int(101)));
    assert_eq!(
        file_text(&project, file),
        "class A { static final int X = Y + 1; static final int Y = 10 * 10; }"
    );

    project.write().set_initializer(y, None).unwrap();
    {
        let analysis = project.read();
        let y_field = analysis.field(y).unwrap();
        assert!(!y_field.has_initializer());
        assert_eq!(y_field.compute_constant_value(), None);
        assert_eq!(analysis.field(x).unwrap().compute_constant_value(), None);
    }
    assert_eq!(
        file_text(&project, file),
        "class A { static final int X = Y + 1; static final int Y; }"
    );

    project.write().set_initializer(y, Some("5")).unwrap();
    assert_eq!(project.read().field(x).unwrap().compute_constant_value(), Some(ConstValue::Int(6)));
}

#[test]
fn test_invalid_initializer_is_rejected_without_mutation() {
    let (project, file) = project_with("final int X = 1;");
    let x = field_id(&project, file, "X");
    let count = project.read().modification_count();

    let err = project.write().set_initializer(x, Some("1 +")).unwrap_err();
    assert!(matches!(err, EditError::InvalidInitializer(_)));
    assert_eq!(project.read().modification_count(), count);
    assert_eq!(file_text(&project, file), "final int X = 1;");
}

#[test]
fn test_rename_and_commit_stubs() {
    let (project, file) = project_with("class A { static final int OLD = 3; }");
    let id = field_id(&project, file, "OLD");
    let timestamp = project.read().file(file).unwrap().timestamp();

    project.write().set_field_name(id, "NEW").unwrap();
    {
        let analysis = project.read();
        let source = analysis.file(file).unwrap();
        assert!(source.stubs().is_none());
        assert_eq!(analysis.field(id).unwrap().name(), "NEW");
        assert!(analysis.find_field(file, "OLD").is_none());
        assert_eq!(&*source.text(), "class A { static final int NEW = 3; }");
    }

    project.write().commit_stubs(file).unwrap();
    let analysis = project.read();
    let source = analysis.file(file).unwrap();
    let stubs = source.stubs().unwrap();
    assert!(source.timestamp() > timestamp);
    assert_eq!(stubs.source_timestamp, source.timestamp());
    assert_eq!(stubs.fields().next().unwrap().1.name, "NEW");

    let field = analysis.field(id).unwrap();
    assert!(field.backing().is_some_and(|b| !matches!(b, stubtree::model::Backing::Tree(_))));
    assert_eq!(field.compute_constant_value(), Some(ConstValue::Int(3)));
}

#[test]
fn test_invalid_identifier_is_rejected() {
    let (project, file) = project_with("int a;");
    let a = field_id(&project, file, "a");
    for bad in ["", "1a", "two words", "class", "a-b"] {
        let err = project.write().set_field_name(a, bad).unwrap_err();
        assert!(matches!(err, EditError::InvalidIdentifier(_)), "{bad:?}");
    }
    assert!(project.read().file(file).unwrap().stubs().is_some());
}

#[test]
fn test_removed_field_dies_and_new_field_is_indexed() {
    let (project, file) = project_with("class A { int a; int b; }");
    let a = field_id(&project, file, "a");
    let b = field_id(&project, file, "b");

    {
        let mut write = project.write();
        let mut editor = write.editor(file).unwrap();
        let node = editor.field_node(a).unwrap();
        let class = editor.remove(node).unwrap();
        assert_eq!(editor.syntax().tree().kind(class), SyntaxKind::CLASS);
    }
    {
        let analysis = project.read();
        assert!(analysis.field(a).is_none());
        assert_eq!(analysis.field(b).unwrap().name(), "b");
        assert_eq!(analysis.fields(file).count(), 1);
    }

    project.write().set_file_text(file, "class A { long c = 1; }").unwrap();
    let analysis = project.read();
    assert!(analysis.field(b).is_none());
    let c = analysis.find_field(file, "c").unwrap();
    assert_ne!(c.id(), a);
    assert_ne!(c.id(), b);
    assert_eq!(c.ty(), Some(TypeDescriptor::primitive(PrimitiveType::Long)));
}

#[test]
fn test_dead_field_cannot_be_edited() {
    let (project, file) = project_with("int a;");
    let a = field_id(&project, file, "a");
    project.write().set_file_text(file, "int b;").unwrap();
    let err = project.write().set_field_name(a, "z").unwrap_err();
    assert!(matches!(err, EditError::UnknownField(id) if id == a));
}

#[test]
fn test_read_only_file_rejects_edits() {
    let (project, file) = project_with("class A {\n    int a;\n}");
    let a = field_id(&project, file, "a");
    project.write().set_writable(file, false).unwrap();
    let count = project.read().modification_count();

    let err = project.write().set_field_name(a, "b").unwrap_err();
    match err {
        EditError::ReadOnly { path, position } => {
            assert_eq!(path, "Test.java");
            assert_eq!((position.line, position.column), (1, 4));
        }
        other => panic!("expected a read-only error, got {other}"),
    }
    assert!(matches!(
        project.write().set_file_text(file, ""),
        Err(EditError::ReadOnly { .. })
    ));
    assert_eq!(project.read().modification_count(), count);
    assert_eq!(file_text(&project, file), "class A {\n    int a;\n}");
}

#[test]
fn test_misplaced_node_reports_tree_error() {
    let (project, file) = project_with("int a;");
    let a = field_id(&project, file, "a");
    let mut write = project.write();
    let mut editor = write.editor(file).unwrap();
    let node = editor.field_node(a).unwrap();
    let root = editor.root();

    // Still attached: must be detached (or copied) first.
    let err = editor.append_child(root, node).unwrap_err();
    assert!(matches!(
        err,
        EditError::Tree {
            source: TreeError::StillAttached(_),
            ..
        }
    ));

    let copy = editor.deep_copy(node);
    editor.append_child(root, copy).unwrap();
    drop(write);

    let analysis = project.read();
    assert_eq!(&*analysis.file(file).unwrap().text(), "int a;int a;");
    let ids: Vec<_> = analysis.fields(file).map(|f| f.id()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a));
}

#[test]
fn test_reclaim_keeps_uncommitted_edits() {
    let (project, file) = project_with("final int X = 1;");
    let x = field_id(&project, file, "X");
    project.write().set_initializer(x, Some("2")).unwrap();
    project.write().reclaim_soft_caches();

    let analysis = project.read();
    assert_eq!(analysis.field(x).unwrap().compute_constant_value(), Some(ConstValue::Int(2)));
    assert_eq!(&*analysis.file(file).unwrap().text(), "final int X = 2;");
}

#[test]
fn test_unedited_file_drops_tree_on_reclaim() {
    let (project, file) = project_with("final int X = 1;");
    {
        let analysis = project.read();
        analysis.find_field(file, "X").unwrap().syntax().unwrap();
        assert!(analysis.file(file).unwrap().is_materialized());
    }
    project.write().reclaim_soft_caches();
    assert!(!project.read().file(file).unwrap().is_materialized());
}

#[test]
fn test_declaring_a_shadowing_class_refreshes_field_types() {
    let (project, file) = project_with("class A { final String S = \"x\"; }");
    let s = field_id(&project, file, "S");
    {
        let analysis = project.read();
        let field = analysis.field(s).unwrap();
        assert!(field.ty().unwrap().is_string());
        assert_eq!(field.compute_constant_value(), Some(ConstValue::string("x")));
    }

    {
        let mut write = project.write();
        let mut editor = write.editor(file).unwrap();
        let fragment = parse_file(" class String {}");
        let class = fragment
            .tree
            .descendants(fragment.root)
            .find(|&n| fragment.tree.kind(n) == SyntaxKind::CLASS)
            .unwrap();
        let class = editor.import_subtree(&fragment.tree, class);
        let root = editor.root();
        editor.append_child(root, class).unwrap();
    }

    let edited = {
        let analysis = project.read();
        let field = analysis.field(s).unwrap();
        (field.ty(), field.compute_constant_value())
    };
    assert!(!edited.0.as_ref().unwrap().is_string());
    assert_eq!(edited.1, None);

    project.write().reclaim_soft_caches();
    let analysis = project.read();
    let field = analysis.field(s).unwrap();
    assert_eq!((field.ty(), field.compute_constant_value()), edited);
}

#[test]
fn test_copied_field_starts_with_empty_caches() {
    let (project, file) = project_with("class A { static final int X = 7; }");
    let x = field_id(&project, file, "X");
    {
        let analysis = project.read();
        let field = analysis.field(x).unwrap();
        assert_eq!(field.ty(), Some(TypeDescriptor::primitive(PrimitiveType::Int)));
        assert_eq!(field.compute_constant_value(), Some(ConstValue::Int(7)));
    }

    {
        let mut write = project.write();
        let mut editor = write.editor(file).unwrap();
        let node = editor.field_node(x).unwrap();
        let class = editor.syntax().tree().parent(node).unwrap();
        let copy = editor.deep_copy(node);
        editor.append_child(class, copy).unwrap();
    }
    let copy = {
        let analysis = project.read();
        let ids: Vec<_> = analysis.fields(file).map(|f| f.id()).collect();
        assert_eq!(ids.len(), 2);
        let copy = ids.into_iter().find(|&id| id != x).unwrap();
        let field = analysis.field(copy).unwrap();
        assert_eq!(field.name(), "X");
        assert_eq!(field.compute_constant_value(), Some(ConstValue::Int(7)));
        copy
    };

    project.write().set_initializer(copy, Some("40 + 2")).unwrap();
    let analysis = project.read();
    assert_eq!(analysis.field(copy).unwrap().compute_constant_value(), Some(ConstValue::Int(42)));
    assert_eq!(analysis.field(x).unwrap().compute_constant_value(), Some(ConstValue::Int(7)));
    assert_eq!(
        analysis.field(copy).unwrap().ty(),
        Some(TypeDescriptor::primitive(PrimitiveType::Int))
    );
}
