//! Type text resolution and the cast applied to a field's folded value.

use rstest::rstest;
use stubtree::Name;
use stubtree::hir::{
    ConstValue, NoReferences, PrimitiveType, TypeBase, TypeContext, TypeDescriptor,
    compute_cast_to, evaluate, lower_expression, parse_type_from_text,
};
use stubtree::parser::parse_standalone_expression;

fn ty(text: &str) -> TypeDescriptor {
    parse_type_from_text(text, &TypeContext::default()).unwrap()
}

#[rstest]
#[case("int", "int")]
#[case("long[]", "long[]")]
#[case("String", "java.lang.String")]
#[case("java.util.Map<String, Integer>", "java.util.Map<String,Integer>")]
#[case("Object [] []", "java.lang.Object[][]")]
fn test_type_text_is_canonicalized(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(ty(text).to_string(), expected);
}

#[rstest]
#[case("")]
#[case("1")]
#[case("int int")]
#[case("List<")]
fn test_unparseable_type_text(#[case] text: &str) {
    assert!(parse_type_from_text(text, &TypeContext::default()).is_err());
}

#[test]
fn test_equals_to_text_resolves_both_sides() {
    let context = TypeContext::default();
    assert!(ty("java.lang.String").equals_to_text("String", &context));
    assert!(!ty("int").equals_to_text("long", &context));

    let shadowed = TypeContext::new([Name::from("String")]);
    let local = parse_type_from_text("String", &shadowed).unwrap();
    assert_eq!(
        local.base,
        TypeBase::Class {
            name: Name::from("String"),
            args: Vec::new()
        }
    );
    assert!(!local.is_string());
}

fn folded(text: &str, target: &str) -> Option<ConstValue> {
    let fragment = parse_standalone_expression(text).unwrap();
    let expr = lower_expression(&fragment.tree, fragment.node);
    compute_cast_to(evaluate(&expr, &mut NoReferences)?, &ty(target))
}

#[rstest]
#[case("2 + 3", "long", Some(ConstValue::Long(5)))]
#[case("'a'", "int", Some(ConstValue::Int(97)))]
#[case("1", "double", Some(ConstValue::Double(1.0)))]
#[case("200", "byte", Some(ConstValue::Byte(-56)))]
#[case("\"a\" + 1", "String", Some(ConstValue::string("a1")))]
#[case("1", "String", None)]
#[case("\"1\"", "int", None)]
#[case("1", "Integer", None)]
#[case("1", "int[]", None)]
#[case("true", "boolean", Some(ConstValue::Boolean(true)))]
fn test_cast_to_declared_type(
    #[case] text: &str,
    #[case] target: &str,
    #[case] expected: Option<ConstValue>,
) {
    assert_eq!(folded(text, target), expected);
}

#[test]
fn test_primitive_descriptor_helpers() {
    let int = TypeDescriptor::primitive(PrimitiveType::Int);
    assert!(int.is_primitive());
    assert!(!int.is_array());
    let matrix = int.clone().with_extra_dims(2);
    assert!(matrix.is_array());
    assert_eq!(matrix.as_primitive(), None);
    assert_eq!(matrix, ty("int[][]"));
}
