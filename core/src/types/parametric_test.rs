use crate::types::{Bindings, TypeFactory};

#[test]
fn instantiate_substitutes_bound_parameters() {
    let tf = TypeFactory::new();
    let t = tf.parameter("T", tf.value_type());

    let mut bindings = Bindings::new();
    bindings.insert(t.clone(), tf.integer());

    let shape = tf.map(tf.string(), tf.list(t.clone()));
    assert_eq!(
        shape.instantiate(&bindings, &tf),
        tf.map(tf.string(), tf.list(tf.integer()))
    );

    // Unbound parameters pass through untouched.
    let u = tf.parameter("U", tf.value_type());
    assert_eq!(tf.list(u.clone()).instantiate(&bindings, &tf), tf.list(u));

    // Closed types are untouched (and not even rebuilt).
    assert_eq!(tf.list(tf.integer()).instantiate(&bindings, &tf), tf.list(tf.integer()));
}

#[test]
fn instantiate_reaches_into_data_types_and_aliases() {
    let tf = TypeFactory::new();
    let t = tf.parameter("T", tf.value_type());

    let mut bindings = Bindings::new();
    bindings.insert(t.clone(), tf.string());

    let open_adt = tf.abstract_data("Wrap", [t.clone()]);
    assert_eq!(
        open_adt.instantiate(&bindings, &tf),
        tf.abstract_data("Wrap", [tf.string()])
    );

    let open_alias = tf.alias("Bag", tf.set(t.clone()), [t.clone()]);
    assert_eq!(
        open_alias.instantiate(&bindings, &tf),
        tf.alias("Bag", tf.set(tf.string()), [tf.string()])
    );

    let cons = tf.constructor(open_adt.clone(), "wrap", [t.clone()]);
    let instantiated = cons.instantiate(&bindings, &tf);
    assert_eq!(instantiated.field_type(0).unwrap(), tf.string());
    assert_eq!(
        instantiated.get_abstract_data_type().unwrap(),
        tf.abstract_data("Wrap", [tf.string()])
    );
}

#[test]
fn match_binds_parameters_through_structure() {
    let tf = TypeFactory::new();
    let t = tf.parameter("T", tf.value_type());

    let pattern = tf.list(t.clone());
    let mut bindings = Bindings::new();
    assert!(pattern.match_bindings(&tf.list(tf.integer()), &mut bindings));
    assert_eq!(bindings.get(&t), Some(&tf.integer()));

    // The bindings round-trip through instantiate.
    assert_eq!(pattern.instantiate(&bindings, &tf), tf.list(tf.integer()));
}

#[test]
fn match_enforces_the_parameter_bound() {
    let tf = TypeFactory::new();
    let t = tf.parameter("T", tf.number());

    let mut bindings = Bindings::new();
    assert!(t.match_bindings(&tf.integer(), &mut bindings));
    assert_eq!(bindings.get(&t), Some(&tf.integer()));

    let mut bindings = Bindings::new();
    assert!(!t.match_bindings(&tf.string(), &mut bindings));
    assert!(bindings.is_empty());
}

#[test]
fn conflicting_rebinding_rejects_unless_equivalent() {
    let tf = TypeFactory::new();
    let t = tf.parameter("T", tf.value_type());
    let pattern = tf.tuple([t.clone(), t.clone()]);

    let mut bindings = Bindings::new();
    assert!(!pattern.match_bindings(&tf.tuple([tf.integer(), tf.string()]), &mut bindings));

    let mut bindings = Bindings::new();
    assert!(pattern.match_bindings(&tf.tuple([tf.integer(), tf.integer()]), &mut bindings));

    // An equivalent (but not identical) rebinding is accepted.
    let age = tf.alias("Age", tf.integer(), []);
    let mut bindings = Bindings::new();
    assert!(pattern.match_bindings(&tf.tuple([tf.integer(), age]), &mut bindings));
    assert_eq!(bindings.get(&t), Some(&tf.integer()));
}

#[test]
fn match_falls_back_to_subtyping_for_closed_patterns() {
    let tf = TypeFactory::new();

    let mut bindings = Bindings::new();
    assert!(tf.number().match_bindings(&tf.integer(), &mut bindings));
    assert!(!tf.integer().match_bindings(&tf.number(), &mut bindings));
    assert!(bindings.is_empty());

    // Void matches any pattern.
    assert!(tf
        .list(tf.integer())
        .match_bindings(&tf.void_type(), &mut bindings));
}

#[test]
fn match_through_parameterized_data_types() {
    let tf = TypeFactory::new();
    let t = tf.parameter("T", tf.value_type());

    let pattern = tf.abstract_data("Wrap", [t.clone()]);
    let candidate = tf.abstract_data("Wrap", [tf.bool_type()]);

    let mut bindings = Bindings::new();
    assert!(pattern.match_bindings(&candidate, &mut bindings));
    assert_eq!(bindings.get(&t), Some(&tf.bool_type()));
    assert_eq!(pattern.instantiate(&bindings, &tf), candidate);

    let mut bindings = Bindings::new();
    assert!(!pattern.match_bindings(&tf.abstract_data("Other", [tf.bool_type()]), &mut bindings));
}
