/// Unit tests for Key construction, equality and classification

use arbor_di::{Args, Class, DiResult, Injectable, Interface, Key};
use std::collections::HashSet;

struct Widget;

impl Injectable for Widget {
    fn construct(_args: Args) -> DiResult<Self> {
        Ok(Widget)
    }
}

#[test]
fn test_type_and_class_keys_are_interchangeable() {
    assert_eq!(Key::of::<Widget>(), Key::class::<Widget>());
    assert_eq!(Key::from(Class::of::<Widget>()), Key::class::<Widget>());
    assert_ne!(Key::of::<Widget>(), Key::of::<String>());
    assert_ne!(Key::of::<Widget>(), Key::name(std::any::type_name::<Widget>()));

    let mut set = HashSet::new();
    set.insert(Key::of::<Widget>());
    assert!(set.contains(&Key::class::<Widget>()));
}

#[test]
fn test_only_class_keys_carry_a_constructor() {
    assert!(Key::class::<Widget>().as_class().is_some());
    assert!(Key::of::<Widget>().as_class().is_none());
    assert!(Key::name("widget").as_class().is_none());
}

#[test]
fn test_interfaces_compare_by_identity() {
    let first = Interface::new("IWidget");
    let second = Interface::new("IWidget");

    assert_eq!(first.key(), first.clone().key());
    assert_ne!(first.key(), second.key());
    assert_eq!(first.key().display_name(), "IWidget");
}

#[test]
fn test_resource_keys_need_a_kind() {
    assert!(Key::name("element:nav").is_resource());
    assert!(Key::resource("attribute", "href").is_resource());
    assert!(!Key::name(":nav").is_resource());
    assert!(!Key::name("nav").is_resource());
    assert!(!Key::of::<Widget>().is_resource());
    assert_eq!(Key::resource("element", "nav"), Key::name("element:nav"));
}

#[test]
fn test_display_and_debug() {
    assert_eq!(Key::name("config").to_string(), "config");
    assert_eq!(format!("{:?}", Key::name("config")), "Name(config)");
    assert_eq!(
        format!("{:?}", Key::of::<u32>()),
        "Type(u32)"
    );
    assert!(Key::class::<Widget>().to_string().ends_with("Widget"));
}
