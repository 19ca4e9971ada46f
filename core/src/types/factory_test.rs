use pretty_assertions::assert_eq;

use crate::types::{TypeFactory, TypeKind};

#[test]
fn primitives_are_interned_once() {
    let tf = TypeFactory::new();

    assert_eq!(tf.integer(), tf.integer());
    assert_eq!(tf.void_type(), tf.void_type());
    assert_eq!(tf.value_type(), tf.value_type());
    assert_ne!(tf.integer(), tf.real());
}

#[test]
fn composites_are_interned_structurally() {
    let tf = TypeFactory::new();

    let a = tf.tuple([tf.integer(), tf.string()]);
    let b = tf.tuple([tf.integer(), tf.string()]);
    assert_eq!(a, b);

    let c = tf.list(tf.set(tf.integer()));
    let d = tf.list(tf.set(tf.integer()));
    assert_eq!(c, d);

    assert_ne!(tf.list(tf.integer()), tf.set(tf.integer()));
}

#[test]
fn labelled_and_unlabelled_tuples_are_distinct() {
    let tf = TypeFactory::new();

    let plain = tf.tuple([tf.integer(), tf.integer()]);
    let labelled = tf.tuple_labelled([("from", tf.integer()), ("to", tf.integer())]);

    assert_ne!(plain, labelled);
    assert!(labelled.has_field_names());
    assert_eq!(labelled.field_name(0).unwrap(), "from");
    assert_eq!(labelled.field_index("to").unwrap(), 1);
    assert!(!plain.has_field_names());
}

#[test]
fn relation_is_a_set_of_tuples() {
    let tf = TypeFactory::new();

    let rel = tf.relation([tf.integer(), tf.string()]);
    assert_eq!(rel, tf.set(tf.tuple([tf.integer(), tf.string()])));
    assert!(rel.is_relation());
    assert!(!tf.set(tf.integer()).is_relation());
    assert!(tf.list_relation([tf.integer(), tf.integer()]).is_list_relation());
}

#[test]
fn constructor_carries_its_fields_as_a_tuple() {
    let tf = TypeFactory::new();

    let expr = tf.abstract_data("Expr", []);
    let add = tf.constructor_labelled(
        expr.clone(),
        "add",
        [("lhs", expr.clone()), ("rhs", expr.clone())],
    );

    assert_eq!(add.arity().unwrap(), 2);
    assert_eq!(add.field_type(0).unwrap(), expr);
    assert_eq!(add.field_type_by_name("rhs").unwrap(), expr);
    assert_eq!(add.get_abstract_data_type().unwrap(), expr);
    assert!(matches!(add.kind(), TypeKind::Constructor { fields, .. }
        if matches!(fields.kind(), TypeKind::Tuple { .. })));
}

#[test]
fn accessors_reject_unsupported_variants() {
    let tf = TypeFactory::new();

    assert!(tf.integer().arity().is_err());
    assert!(tf.bool_type().element_type().is_err());
    assert!(tf.tuple([tf.integer()]).key_type().is_err());
    assert!(tf.integer().name().is_err());
}
