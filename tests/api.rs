//! Smoke test for the public facade: everything a host embedding the
//! model needs should be reachable from the `tern` crate root.

use std::sync::Arc;

use tern::{Bindings, SetRelation, TypeFactory, TypeStore, ValueFactory};

#[test]
fn the_facade_covers_an_end_to_end_flow() {
    let tf = Arc::new(TypeFactory::new());
    let vf = ValueFactory::with_types(tf.clone());
    let store = TypeStore::new();

    // Lattice.
    assert!(tf.integer().is_subtype_of(&tf.number()));
    assert_eq!(tf.integer().lub(&tf.real(), &tf), tf.number());

    // Parametric matching.
    let t = tf.parameter("T", tf.value_type());
    let mut bindings = Bindings::new();
    assert!(tf.list(t.clone()).match_bindings(&tf.list(tf.string()), &mut bindings));
    assert_eq!(bindings.get(&t), Some(&tf.string()));

    // Declarations.
    let expr = tf.abstract_data("Expr", []);
    store.declare_abstract_data_type(&expr).unwrap();
    store
        .declare_constructor(&tf.constructor(expr.clone(), "lit", [tf.integer()]))
        .unwrap();
    assert_eq!(store.constructors_of(&expr).len(), 1);

    // Relations over canonical values.
    let edges = vf.set([
        vf.pair(vf.integer(1), vf.integer(2)),
        vf.pair(vf.integer(2), vf.integer(3)),
    ]);
    let closure = SetRelation::new(&vf, edges).unwrap().closure().unwrap();
    assert!(closure
        .set_contains(&vf.pair(vf.integer(1), vf.integer(3)))
        .unwrap());
}
