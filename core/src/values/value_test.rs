use pretty_assertions::assert_eq;

use crate::values::ValueFactory;

#[test]
fn equal_values_are_the_same_canonical_object() {
    let vf = ValueFactory::new();

    assert_eq!(vf.integer(42), vf.integer(42));
    assert_ne!(vf.integer(42), vf.integer(43));
    assert_eq!(vf.string("abc"), vf.string("abc"));
    assert_eq!(vf.bool_value(true), vf.bool_value(true));
    assert_ne!(vf.bool_value(true), vf.bool_value(false));

    let a = vf.tuple([vf.integer(1), vf.string("x")]);
    let b = vf.tuple([vf.integer(1), vf.string("x")]);
    assert_eq!(a, b);

    let n1 = vf.node("add", [vf.integer(1), vf.integer(2)]);
    let n2 = vf.node("add", [vf.integer(1), vf.integer(2)]);
    assert_eq!(n1, n2);
    assert_ne!(n1, vf.node("mul", [vf.integer(1), vf.integer(2)]));
}

#[test]
fn sets_are_canonical_regardless_of_construction_order() {
    let vf = ValueFactory::new();

    let forwards = vf.set([vf.integer(1), vf.integer(2), vf.integer(3)]);
    let backwards = vf.set([vf.integer(3), vf.integer(2), vf.integer(1)]);
    let with_duplicates = vf.set([vf.integer(1), vf.integer(2), vf.integer(2), vf.integer(3)]);

    assert_eq!(forwards, backwards);
    assert_eq!(forwards, with_duplicates);
    assert_eq!(forwards.len().unwrap(), 3);

    let m1 = vf.map([(vf.string("a"), vf.integer(1)), (vf.string("b"), vf.integer(2))]);
    let m2 = vf.map([(vf.string("b"), vf.integer(2)), (vf.string("a"), vf.integer(1))]);
    assert_eq!(m1, m2);
}

#[test]
fn reals_intern_bitwise_including_nan() {
    let vf = ValueFactory::new();

    assert_eq!(vf.real(1.5), vf.real(1.5));
    assert_eq!(vf.real(f64::NAN), vf.real(f64::NAN));
    assert_ne!(vf.real(0.0), vf.real(-0.0));
}

#[test]
fn rationals_normalize_before_interning() {
    let vf = ValueFactory::new();

    assert_eq!(vf.rational(2, 4).unwrap(), vf.rational(1, 2).unwrap());
    assert_eq!(vf.rational(1, -2).unwrap(), vf.rational(-1, 2).unwrap());
    assert_eq!(vf.rational(0, 7).unwrap(), vf.rational(0, 3).unwrap());
    assert!(vf.rational(1, 0).is_err());
}

#[test]
fn values_know_their_structural_type() {
    let vf = ValueFactory::new();
    let tf = vf.types();

    assert_eq!(vf.integer(1).type_of(tf), tf.integer());
    assert_eq!(vf.string("s").type_of(tf), tf.string());
    assert_eq!(
        vf.tuple([vf.integer(1), vf.string("s")]).type_of(tf),
        tf.tuple([tf.integer(), tf.string()])
    );

    // Collections take the lub of their member types.
    let homogeneous = vf.set([vf.integer(1), vf.integer(2)]);
    assert_eq!(homogeneous.type_of(tf), tf.set(tf.integer()));

    let numeric = vf.set([vf.integer(1), vf.real(2.0)]);
    assert_eq!(numeric.type_of(tf), tf.set(tf.number()));

    let mixed = vf.list([vf.integer(1), vf.string("s")]);
    assert_eq!(mixed.type_of(tf), tf.list(tf.value_type()));

    // Empty collections have the bottom element type.
    assert_eq!(vf.empty_set().type_of(tf), tf.set(tf.void_type()));

    let rel = vf.set([vf.pair(vf.integer(1), vf.integer(2))]);
    assert!(rel.type_of(tf).is_relation());
}

#[test]
fn accessors_reject_the_wrong_variant() {
    let vf = ValueFactory::new();

    assert!(vf.integer(1).as_bool().is_err());
    assert!(vf.string("x").as_set().is_err());
    assert_eq!(vf.integer(1).as_integer().unwrap(), 1);
    assert_eq!(vf.tuple([vf.integer(9)]).get(0).unwrap(), vf.integer(9));
    assert!(vf.tuple([vf.integer(9)]).get(1).is_err());
}

#[test]
fn display_is_stable_for_scalars() {
    let vf = ValueFactory::new();

    assert_eq!(vf.integer(-7).to_string(), "-7");
    assert_eq!(vf.real(2.0).to_string(), "2.");
    assert_eq!(vf.rational(1, 2).unwrap().to_string(), "1r2");
    assert_eq!(vf.string("a\"b").to_string(), "\"a\\\"b\"");
    assert_eq!(vf.bool_value(true).to_string(), "true");
    assert_eq!(
        vf.tuple([vf.integer(1), vf.integer(2)]).to_string(),
        "<1, 2>"
    );
    assert_eq!(vf.node("lit", [vf.integer(3)]).to_string(), "lit(3)");
}
