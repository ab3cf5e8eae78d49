use super::types::*;

#[test]
fn numeric_promotion() {
    assert_eq!(numeric_result(&Ty::Integer, &Ty::Integer), Some(Ty::Integer));
    assert_eq!(numeric_result(&Ty::Integer, &Ty::Float), Some(Ty::Float));
    assert_eq!(numeric_result(&Ty::Float, &Ty::Integer), Some(Ty::Float));
    assert_eq!(numeric_result(&Ty::String, &Ty::Integer), None);
    assert_eq!(numeric_result(&Ty::Boolean, &Ty::Boolean), None);
}

#[test]
fn equality_comparability() {
    assert!(are_eq_comparable(&Ty::String, &Ty::String));
    assert!(are_eq_comparable(&Ty::Integer, &Ty::Float));
    assert!(!are_eq_comparable(&Ty::String, &Ty::Integer));
    assert!(are_eq_comparable(
        &Ty::array(Ty::Integer),
        &Ty::array(Ty::Integer)
    ));
}

#[test]
fn order_comparability_is_numeric_only() {
    assert!(are_order_comparable(&Ty::Integer, &Ty::Float));
    assert!(!are_order_comparable(&Ty::String, &Ty::String));
    assert!(!are_order_comparable(&Ty::Boolean, &Ty::Integer));
}

#[test]
fn plus_concatenates_with_any_string_operand() {
    assert!(can_concat_with_plus(&Ty::String, &Ty::Integer));
    assert!(can_concat_with_plus(&Ty::Integer, &Ty::String));
    assert!(!can_concat_with_plus(&Ty::Integer, &Ty::Integer));
}

#[test]
fn unknown_is_permissive_at_top_level() {
    assert!(is_assignable(&Ty::Integer, &Ty::Unknown));
    assert!(is_assignable(&Ty::Unknown, &Ty::String));
}

#[test]
fn no_implicit_numeric_conversion() {
    assert!(!is_assignable(&Ty::Integer, &Ty::Float));
    assert!(!is_assignable(&Ty::Float, &Ty::Integer));
    assert!(is_assignable(&Ty::Float, &Ty::Float));
}

#[test]
fn null_flows_into_references_only() {
    assert!(is_assignable(&Ty::array(Ty::Integer), &Ty::Null));
    assert!(is_assignable(&Ty::Class("A".into()), &Ty::Null));
    assert!(!is_assignable(&Ty::Integer, &Ty::Null));
    assert!(!is_assignable(&Ty::Boolean, &Ty::Null));
}

#[test]
fn array_covariance() {
    assert!(is_assignable(
        &Ty::array(Ty::Integer),
        &Ty::array(Ty::Integer)
    ));
    assert!(!is_assignable(
        &Ty::array(Ty::Integer),
        &Ty::array(Ty::String)
    ));
}

#[test]
fn unknown_element_array_needs_unknown_target() {
    // The strict rule: [] (array of unknown) does not flow into integer[].
    assert!(!is_assignable(
        &Ty::array(Ty::Integer),
        &Ty::array(Ty::Unknown)
    ));
    assert!(is_assignable(
        &Ty::array(Ty::Unknown),
        &Ty::array(Ty::Unknown)
    ));
}

#[test]
fn sizes() {
    assert_eq!(Ty::Integer.size(), 4);
    assert_eq!(Ty::Boolean.size(), 1);
    assert_eq!(Ty::Float.size(), 8);
    assert_eq!(Ty::String.size(), 8);
    assert_eq!(Ty::array(Ty::Integer).size(), 8);
    assert_eq!(Ty::Class("A".into()).size(), 8);
}

#[test]
fn display_forms() {
    assert_eq!(Ty::Integer.to_string(), "integer");
    assert_eq!(Ty::array(Ty::array(Ty::String)).to_string(), "string[][]");
    assert_eq!(Ty::Unknown.to_string(), "<unknown>");
    assert_eq!(Ty::Class("Dog".into()).to_string(), "Dog");
}

#[test]
fn annotation_names_resolve() {
    assert_eq!(Ty::from_name("integer"), Ty::Integer);
    assert_eq!(Ty::from_name("void"), Ty::Void);
    assert_eq!(Ty::from_name("Animal"), Ty::Class("Animal".into()));
}
