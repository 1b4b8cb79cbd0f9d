use arbor_di::{Container, Key, Registration, Resolver, StrategyKind};
use proptest::prelude::*;
use std::sync::Arc;

fn values(container: &Container, key: &Key) -> Vec<u32> {
    container
        .get_all_as::<u32>(key)
        .unwrap()
        .iter()
        .map(|value| **value)
        .collect()
}

#[test]
fn test_second_registration_promotes_to_multi() {
    let container = Container::new();
    let key = Key::name("plugin");

    container
        .register([Registration::instance(key.clone(), 1u32)])
        .unwrap();
    assert_eq!(container.get_resolver(&key, false).unwrap().unwrap().kind(), StrategyKind::Instance);

    container
        .register([Registration::instance(key.clone(), 2u32)])
        .unwrap();
    let resolver = container.get_resolver(&key, false).unwrap().unwrap();
    assert_eq!(resolver.kind(), StrategyKind::Multi);
    assert_eq!(resolver.entries().len(), 2);

    container
        .register([Registration::instance(key.clone(), 3u32)])
        .unwrap();
    let appended = container.get_resolver(&key, false).unwrap().unwrap();
    assert!(Arc::ptr_eq(&resolver, &appended));
    assert_eq!(appended.entries().len(), 3);

    assert_eq!(values(&container, &key), vec![1, 2, 3]);
}

#[test]
fn test_single_get_returns_first_entry() {
    let container = Container::new();
    let key = Key::name("handler");
    container
        .register([
            Registration::instance(key.clone(), 10u32),
            Registration::instance(key.clone(), 20u32),
        ])
        .unwrap();

    assert_eq!(*container.get_as::<u32>(&key).unwrap(), 10);
}

#[test]
fn test_get_all_stops_at_first_level_with_a_binding() {
    let root = Container::new();
    let key = Key::name("middleware");
    root.register([
        Registration::instance(key.clone(), 1u32),
        Registration::instance(key.clone(), 2u32),
    ])
    .unwrap();

    let child = root.create_child();
    child
        .register([Registration::instance(key.clone(), 3u32)])
        .unwrap();
    let grandchild = child.create_child();

    assert_eq!(values(&grandchild, &key), vec![3]);
    assert_eq!(values(&root, &key), vec![1, 2]);

    let aggregated: Vec<u32> = grandchild
        .resolve_all_in_ancestors(&key)
        .unwrap()
        .into_iter()
        .map(|value| *value.downcast::<u32>().unwrap())
        .collect();
    assert_eq!(aggregated, vec![3, 1, 2]);
}

#[test]
fn test_get_all_of_unbound_key_is_empty() {
    let container = Container::new();
    assert!(container.resolve_all_any(&Key::name("nothing")).unwrap().is_empty());
    assert!(!container.has(&Key::name("nothing"), true).unwrap());
}

#[test]
fn test_get_all_of_single_binding_has_one_value() {
    let container = Container::new();
    let key = Key::name("single");
    container
        .register([Registration::instance(key.clone(), 7u32)])
        .unwrap();

    assert_eq!(values(&container, &key), vec![7]);
}

#[test]
fn test_register_resolver_onto_explicit_multi_appends() {
    let container = Container::new();
    let key = Key::name("explicit");
    let multi = Arc::new(Resolver::multi(key.clone(), Vec::new()));
    container.register_resolver(key.clone(), multi.clone(), false).unwrap();

    container
        .register_resolver(
            key.clone(),
            Arc::new(Resolver::instance(key.clone(), Arc::new(5u32))),
            false,
        )
        .unwrap();

    assert_eq!(multi.entries().len(), 1);
    assert_eq!(values(&container, &key), vec![5]);
}

proptest! {
    #[test]
    fn multi_binding_preserves_registration_order(items in prop::collection::vec(any::<u32>(), 1..24)) {
        let container = Container::new();
        let key = Key::name("ordered");
        for item in &items {
            container.register([Registration::instance(key.clone(), *item)]).unwrap();
        }

        prop_assert_eq!(values(&container, &key), items.clone());
        prop_assert_eq!(*container.get_as::<u32>(&key).unwrap(), items[0]);
    }
}
