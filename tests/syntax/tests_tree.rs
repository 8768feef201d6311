//! Lossless parsing and arena tree surgery.

use rstest::rstest;
use stubtree::parser::{SyntaxKind, parse_file, parse_standalone_expression};
use stubtree::syntax::{ChildRole, Tree, TreeError};

#[rstest]
#[case("")]
#[case("int a;")]
#[case("class A {\n  // note\n  public static final int X = 1 << 2, Y;\n}\n")]
#[case("class A { int m(int x) { return x; } long[] v = {1, 2}; }")]
#[case("@Deprecated /* odd */ java.util.Map<String, List<Integer>> m = new HashMap<>();")]
#[case("int a = ;; garbage ) here")]
fn test_parse_is_lossless(#[case] source: &str) {
    let parse = parse_file(source);
    assert_eq!(parse.tree.text(parse.root), source);
}

fn first_field(tree: &Tree, root: stubtree::syntax::NodeId) -> stubtree::syntax::NodeId {
    tree.descendants(root)
        .find(|&n| tree.kind(n) == SyntaxKind::FIELD)
        .unwrap()
}

#[test]
fn test_text_ranges_are_absolute() {
    let source = "class A { int value = 10; }";
    let parse = parse_file(source);
    let tree = &parse.tree;
    let field = first_field(tree, parse.root);
    let name = tree.find_child_by_role(field, ChildRole::Name).unwrap();
    let range = tree.text_range(name);
    assert_eq!(&source[range], "value");
    assert_eq!(u32::from(tree.text_len(field)), "int value = 10;".len() as u32);
}

#[test]
fn test_deep_copy_is_detached_and_independent() {
    let parse = parse_file("int a = 1;");
    let mut tree = parse.tree;
    let field = first_field(&tree, parse.root);

    let copy = tree.deep_copy(field);
    assert_eq!(tree.parent(copy), None);
    assert_eq!(tree.text(copy), "int a = 1;");

    let name = tree.find_child_by_role(copy, ChildRole::Name).unwrap();
    let renamed = tree.alloc_leaf(SyntaxKind::IDENT, "b");
    tree.replace(name, renamed).unwrap();
    assert_eq!(tree.text(copy), "int b = 1;");
    assert_eq!(tree.text(field), "int a = 1;");

    tree.append_child(parse.root, copy).unwrap();
    assert_eq!(tree.text(parse.root), "int a = 1;int b = 1;");
}

#[test]
fn test_import_subtree_from_fragment() {
    let parse = parse_file("int a = 1;");
    let mut tree = parse.tree;
    let field = first_field(&tree, parse.root);
    let old = tree.find_child_by_role(field, ChildRole::Initializer).unwrap();

    let fragment = parse_standalone_expression("(2 + 3) * 4").unwrap();
    assert_eq!(fragment.tree.parent(fragment.holder), None);
    let new = tree.import_subtree(&fragment.tree, fragment.node);
    tree.replace(old, new).unwrap();

    assert_eq!(tree.text(parse.root), "int a = (2 + 3) * 4;");
    assert_eq!(tree.find_child_by_role(field, ChildRole::Initializer), Some(new));
    assert_eq!(tree.parent(old), None);
}

#[test]
fn test_insert_before_and_after_anchor() {
    let parse = parse_file("int a;");
    let mut tree = parse.tree;
    let field = first_field(&tree, parse.root);
    let name = tree.find_child_by_role(field, ChildRole::Name).unwrap();

    let before = tree.alloc_leaf(SyntaxKind::BLOCK_COMMENT, "/*x*/");
    tree.insert_before(field, before, Some(name)).unwrap();
    let after = tree.alloc_leaf(SyntaxKind::BLOCK_COMMENT, "/*y*/");
    tree.insert_after(field, after, Some(name)).unwrap();
    assert_eq!(tree.text(field), "int /*x*/a/*y*/;");
    assert_eq!(tree.skip_trivia_forward(tree.tree_next(name)), tree.find_child_by_role(field, ChildRole::Semicolon));
}

#[test]
fn test_invalid_surgery_is_rejected_without_change() {
    let parse = parse_file("int a = 1;");
    let mut tree = parse.tree;
    let field = first_field(&tree, parse.root);
    let name = tree.find_child_by_role(field, ChildRole::Name).unwrap();
    let before = tree.text(parse.root);

    assert_eq!(tree.append_child(parse.root, field), Err(TreeError::StillAttached(field)));

    let leaf = tree.alloc_leaf(SyntaxKind::WHITESPACE, " ");
    assert_eq!(tree.append_child(name, leaf), Err(TreeError::LeafParent(name)));

    let detached = tree.alloc_node(SyntaxKind::FIELD);
    assert!(matches!(
        tree.insert_before(parse.root, detached, Some(name)),
        Err(TreeError::AnchorNotChild { .. })
    ));
    assert_eq!(tree.detach(detached), Err(TreeError::Detached(detached)));

    let ty = tree.find_child_by_role(field, ChildRole::Type).unwrap();
    tree.detach(field).unwrap();
    assert_eq!(
        tree.append_child(ty, field),
        Err(TreeError::WouldCycle {
            parent: ty,
            child: field
        })
    );

    tree.append_child(parse.root, field).unwrap();
    assert_eq!(tree.text(parse.root), before);
}
