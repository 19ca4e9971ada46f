use hashbrown::HashSet;

use crate::errors::Error;
use crate::types::reify::{from_symbol, productions_for, tag, ReifyEnv};
use crate::types::{Type, TypeFactory, TypeStore};
use crate::values::{Value, ValueFactory};

fn round_trip(ty: &Type, vf: &ValueFactory, store: &TypeStore) -> Type {
    let mut grammar = im::HashSet::new();
    let mut done = HashSet::new();
    let symbol = ty.as_symbol(vf, store, &mut grammar, &mut done);

    // Reconstruct into a fresh store: the emitted grammar must be
    // self-contained.
    let fresh = TypeStore::new();
    let lookup = move |adt_symbol: &Value| productions_for(&grammar, adt_symbol);
    let env = ReifyEnv {
        vf,
        store: &fresh,
        grammar: &lookup,
    };
    from_symbol(&symbol, &env).unwrap()
}

#[test]
fn every_plain_type_round_trips() {
    let vf = ValueFactory::new();
    let tf = vf.types();
    let store = TypeStore::new();

    let samples = [
        tf.void_type(),
        tf.value_type(),
        tf.bool_type(),
        tf.integer(),
        tf.real(),
        tf.rational(),
        tf.number(),
        tf.string(),
        tf.source_location(),
        tf.date_time(),
        tf.node(),
        tf.tuple([tf.integer(), tf.string()]),
        tf.tuple_labelled([("from", tf.integer()), ("to", tf.integer())]),
        tf.list(tf.integer()),
        tf.set(tf.tuple([tf.integer(), tf.integer()])),
        tf.map(tf.string(), tf.list(tf.bool_type())),
        tf.parameter("T", tf.number()),
    ];

    for ty in samples {
        assert_eq!(round_trip(&ty, &vf, &store), ty, "round trip of {ty}");
    }
}

#[test]
fn data_types_round_trip_with_their_grammar() {
    let vf = ValueFactory::new();
    let tf = vf.types();
    let store = TypeStore::new();

    // A self-referential data type exercises the recursion guard.
    let expr = tf.abstract_data("Expr", []);
    store.declare_abstract_data_type(&expr).unwrap();
    let lit = tf.constructor_labelled(expr.clone(), "lit", [("val", tf.integer())]);
    let add = tf.constructor_labelled(
        expr.clone(),
        "add",
        [("lhs", expr.clone()), ("rhs", expr.clone())],
    );
    store.declare_constructor(&lit).unwrap();
    store.declare_constructor(&add).unwrap();

    let mut grammar = im::HashSet::new();
    let mut done = HashSet::new();
    let symbol = expr.as_symbol(&vf, &store, &mut grammar, &mut done);

    // One production per constructor.
    assert_eq!(grammar.len(), 2);

    let fresh = TypeStore::new();
    let lookup = |adt_symbol: &Value| productions_for(&grammar, adt_symbol);
    let env = ReifyEnv {
        vf: &vf,
        store: &fresh,
        grammar: &lookup,
    };
    let rebuilt = from_symbol(&symbol, &env).unwrap();

    assert_eq!(rebuilt, expr);
    // The grammar side effect re-declared the constructors.
    assert_eq!(fresh.constructors_of(&expr).len(), 2);
    assert_eq!(fresh.lookup_constructor(&expr, "lit"), Some(lit));
    assert_eq!(fresh.lookup_constructor(&expr, "add"), Some(add));
}

#[test]
fn constructor_symbols_round_trip() {
    let vf = ValueFactory::new();
    let tf = vf.types();
    let store = TypeStore::new();

    let expr = tf.abstract_data("Expr", []);
    store.declare_abstract_data_type(&expr).unwrap();
    let lit = tf.constructor_labelled(expr.clone(), "lit", [("val", tf.integer())]);
    store.declare_constructor(&lit).unwrap();

    assert_eq!(round_trip(&lit, &vf, &store), lit);
}

#[test]
fn alias_symbols_reconstruct_an_alias_not_the_aliased_type() {
    let vf = ValueFactory::new();
    let tf = vf.types();
    let store = TypeStore::new();

    let age = tf.alias("Age", tf.integer(), []);
    let rebuilt = round_trip(&age, &vf, &store);

    assert_eq!(rebuilt, age);
    assert!(rebuilt.is_aliased());
    assert_ne!(rebuilt, tf.integer());
    assert!(rebuilt.equivalent(&tf.integer()));
}

#[test]
fn partially_labelled_sequences_reconstruct_unlabelled() {
    let vf = ValueFactory::new();
    let tf = vf.types();
    let store = TypeStore::new();

    let int_symbol = tf.integer().as_symbol(
        &vf,
        &store,
        &mut im::HashSet::new(),
        &mut HashSet::new(),
    );
    let str_symbol = tf.string().as_symbol(
        &vf,
        &store,
        &mut im::HashSet::new(),
        &mut HashSet::new(),
    );
    let labelled = vf.node(tag::LABEL, [vf.string("id"), int_symbol]);
    let symbol = vf.node(tag::TUPLE, [labelled, str_symbol]);

    let lookup = |_: &Value| im::HashSet::new();
    let env = ReifyEnv {
        vf: &vf,
        store: &store,
        grammar: &lookup,
    };
    let rebuilt = from_symbol(&symbol, &env).unwrap();

    assert_eq!(rebuilt, tf.tuple([tf.integer(), tf.string()]));
    assert!(!rebuilt.has_field_names());
}

#[test]
fn unregistered_tags_are_fatal_to_the_call() {
    let vf = ValueFactory::new();
    let store = TypeStore::new();

    let lookup = |_: &Value| im::HashSet::new();
    let env = ReifyEnv {
        vf: &vf,
        store: &store,
        grammar: &lookup,
    };

    let bogus = vf.node("wibble", []);
    assert!(matches!(
        from_symbol(&bogus, &env),
        Err(Error::Reification { .. })
    ));

    // A non-node value is not a symbol at all.
    assert!(matches!(
        from_symbol(&vf.integer(7), &env),
        Err(Error::Reification { .. })
    ));

    // Malformed payloads fail the reconstruction, not the process.
    let truncated = vf.node(tag::MAP, [vf.node(tag::INT, [])]);
    assert!(matches!(
        from_symbol(&truncated, &env),
        Err(Error::Reification { .. })
    ));
}
