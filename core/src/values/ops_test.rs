use crate::values::{Value, ValueFactory};

fn ints(vf: &ValueFactory, xs: &[i64]) -> Value {
    vf.set(xs.iter().map(|&x| vf.integer(x)))
}

#[test]
fn set_algebra() {
    let vf = ValueFactory::new();

    let a = ints(&vf, &[1, 2, 3]);
    let b = ints(&vf, &[2, 3, 4]);

    assert_eq!(a.union(&b, &vf).unwrap(), ints(&vf, &[1, 2, 3, 4]));
    assert_eq!(a.intersect(&b, &vf).unwrap(), ints(&vf, &[2, 3]));
    assert_eq!(a.subtract(&b, &vf).unwrap(), ints(&vf, &[1]));
    assert_eq!(b.subtract(&a, &vf).unwrap(), ints(&vf, &[4]));

    assert!(ints(&vf, &[2, 3]).is_subset_of(&a).unwrap());
    assert!(!a.is_subset_of(&b).unwrap());
    assert!(a.set_contains(&vf.integer(2)).unwrap());
    assert!(!a.set_contains(&vf.integer(9)).unwrap());
}

#[test]
fn set_insert_deduplicates_canonically() {
    let vf = ValueFactory::new();

    let s = ints(&vf, &[1, 2]);
    let same = s.set_insert(vf.integer(2), &vf).unwrap();
    assert_eq!(same, s);
    assert_eq!(s.set_insert(vf.integer(3), &vf).unwrap(), ints(&vf, &[1, 2, 3]));
}

#[test]
fn product_pairs_every_combination() {
    let vf = ValueFactory::new();

    let left = ints(&vf, &[1, 2]);
    let right = vf.set([vf.string("a")]);
    let product = left.product(&right, &vf).unwrap();

    let expected = vf.set([
        vf.pair(vf.integer(1), vf.string("a")),
        vf.pair(vf.integer(2), vf.string("a")),
    ]);
    assert_eq!(product, expected);
    assert!(product.type_of(vf.types()).is_relation());

    let empty = vf.empty_set();
    assert_eq!(left.product(&empty, &vf).unwrap(), empty);
}

#[test]
fn union_laws_on_small_sets() {
    let vf = ValueFactory::new();

    let a = ints(&vf, &[1, 2]);
    let b = ints(&vf, &[2, 3]);
    let empty = vf.empty_set();

    assert_eq!(a.union(&a, &vf).unwrap(), a);
    assert_eq!(a.union(&empty, &vf).unwrap(), a);
    assert_eq!(
        a.union(&b, &vf).unwrap(),
        b.union(&a, &vf).unwrap()
    );
    assert_eq!(a.intersect(&empty, &vf).unwrap(), empty);
    assert_eq!(a.subtract(&empty, &vf).unwrap(), a);
}

#[test]
fn list_operations() {
    let vf = ValueFactory::new();

    let list = vf.list([vf.integer(1), vf.integer(2)]);
    let longer = list.append(vf.integer(3), &vf).unwrap();

    assert_eq!(longer, vf.list([vf.integer(1), vf.integer(2), vf.integer(3)]));
    assert_eq!(longer.len().unwrap(), 3);
    assert_eq!(longer.list_get(2).unwrap(), vf.integer(3));
    assert!(longer.list_get(3).is_err());

    let doubled = list.concat(&list, &vf).unwrap();
    assert_eq!(
        doubled,
        vf.list([vf.integer(1), vf.integer(2), vf.integer(1), vf.integer(2)])
    );

    // Lists keep duplicates; sets collapse them.
    assert_eq!(doubled.len().unwrap(), 4);
}

#[test]
fn string_concat_is_canonical() {
    let vf = ValueFactory::new();

    let hello = vf.string("hello ").str_concat(&vf.string("world"), &vf).unwrap();
    assert_eq!(hello, vf.string("hello world"));
    assert_eq!(hello.len().unwrap(), 11);
    assert!(vf.integer(1).str_concat(&vf.string("x"), &vf).is_err());
}

#[test]
fn map_operations() {
    let vf = ValueFactory::new();

    let map = vf.map([(vf.string("a"), vf.integer(1))]);
    let bigger = map.map_put(vf.string("b"), vf.integer(2), &vf).unwrap();

    assert_eq!(bigger.map_get(&vf.string("a")).unwrap(), Some(vf.integer(1)));
    assert_eq!(bigger.map_get(&vf.string("b")).unwrap(), Some(vf.integer(2)));
    assert_eq!(bigger.map_get(&vf.string("c")).unwrap(), None);
    assert_eq!(bigger.len().unwrap(), 2);

    // Overwriting a key re-interns to the updated canonical map.
    let updated = bigger.map_put(vf.string("a"), vf.integer(9), &vf).unwrap();
    assert_eq!(updated.map_get(&vf.string("a")).unwrap(), Some(vf.integer(9)));
}
