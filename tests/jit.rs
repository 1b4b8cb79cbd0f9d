use arbor_di::{
    Args, ConfigurationError, Container, ContainerConfig, DefaultResolver, DiError, DiResult,
    Injectable, Interface, Key, Registrable, Resolver, ResourceDefinition,
};
use std::sync::Arc;

struct Plain;

struct SelfRegistering {
    origin: &'static str,
}

impl Injectable for SelfRegistering {
    fn construct(_args: Args) -> DiResult<Self> {
        Ok(SelfRegistering { origin: "constructor" })
    }

    fn registry() -> Option<Arc<dyn Registrable>> {
        Some(Arc::new(|container: &Container| -> DiResult<Option<Arc<Resolver>>> {
            let key = Key::class::<SelfRegistering>();
            let value = Arc::new(SelfRegistering { origin: "registry" });
            container
                .register_resolver(key.clone(), Arc::new(Resolver::instance(key, value)), false)
                .map(|_| None)
        }))
    }
}

struct Forgetful;

impl Injectable for Forgetful {
    fn construct(_args: Args) -> DiResult<Self> {
        Ok(Forgetful)
    }

    fn registry() -> Option<Arc<dyn Registrable>> {
        Some(Arc::new(
            |_container: &Container| -> DiResult<Option<Arc<Resolver>>> { Ok(None) },
        ))
    }
}

struct Published;

impl Injectable for Published {
    fn construct(_args: Args) -> DiResult<Self> {
        Ok(Published)
    }

    fn resources() -> Vec<Arc<dyn Registrable>> {
        let definition = ResourceDefinition::new::<Published>("value-converter", "published");
        vec![Arc::new(definition) as Arc<dyn Registrable>]
    }
}

struct Tool;

impl Injectable for Tool {
    fn construct(_args: Args) -> DiResult<Self> {
        Ok(Tool)
    }
}

mod shadow {
    use arbor_di::{Args, DiResult, Injectable};

    pub struct Duration;

    impl Injectable for Duration {
        fn construct(_args: Args) -> DiResult<Self> {
            Ok(Duration)
        }
    }
}

#[test]
fn test_non_constructible_keys_fail() {
    let container = Container::new();

    for key in [Key::name("unbound"), Key::of::<Plain>()] {
        match container.resolve_any(&key) {
            Err(DiError::Configuration(ConfigurationError::NotConstructible { key: name })) => {
                assert_eq!(name, key.to_string());
            }
            other => panic!("expected NotConstructible, got {:?}", other.map(|_| ())),
        }
    }
}

#[test]
fn test_intrinsic_types_are_never_auto_registered() {
    let container = Container::new();
    let err = container.get::<shadow::Duration>().err().unwrap();

    assert!(matches!(
        err,
        DiError::Configuration(ConfigurationError::IntrinsicType { ref type_name }) if type_name.ends_with("Duration")
    ));
    assert!(!container.has(&Key::class::<shadow::Duration>(), true).unwrap());
}

#[test]
fn test_interface_without_default_fails_with_its_name() {
    let container = Container::new();
    let marker = Interface::new("IPaymentGateway");

    match container.resolve_any(&marker.key()) {
        Err(DiError::Configuration(ConfigurationError::NoDefault { interface })) => {
            assert_eq!(interface, "IPaymentGateway");
        }
        other => panic!("expected NoDefault, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_interface_default_registers_in_root() {
    let marker = Interface::with_default("IClock", |builder| builder.instance(1_700_000_000u64));
    let root = Container::new();
    let child = root.create_child();

    assert_eq!(*child.get_as::<u64>(&marker.key()).unwrap(), 1_700_000_000);
    assert!(root.has(&marker.key(), false).unwrap());
    assert!(!child.has(&marker.key(), false).unwrap());
}

#[test]
fn test_registry_capability_is_used_and_read_back() {
    let container = Container::new();
    let value = container.get::<SelfRegistering>().unwrap();

    assert_eq!(value.origin, "registry");
    assert!(Arc::ptr_eq(&value, &container.get::<SelfRegistering>().unwrap()));
}

#[test]
fn test_registry_that_installs_nothing_is_a_protocol_error() {
    let container = Container::new();
    let err = container.get::<Forgetful>().err().unwrap();

    assert!(matches!(err, DiError::Protocol { ref key } if key.ends_with("Forgetful")));
}

#[test]
fn test_resource_definitions_are_registered_in_order() {
    let container = Container::new();
    let value = container.get::<Published>().unwrap();

    let by_resource = container
        .get_as::<Published>(&Key::resource("value-converter", "published"))
        .unwrap();
    assert!(Arc::ptr_eq(&value, &by_resource));
}

#[test]
fn test_default_resolver_none_refuses() {
    let container = Container::with_config(ContainerConfig::new().default_resolver(DefaultResolver::None));

    match container.get::<Tool>() {
        Err(DiError::Configuration(ConfigurationError::NoRegistration { key })) => {
            assert!(key.ends_with("Tool"));
        }
        other => panic!("expected NoRegistration, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_requestor_policy_applies_when_binding_lands_in_root() {
    let root = Container::new();
    let strict = root.create_child_with(ContainerConfig::new().default_resolver(DefaultResolver::None));
    let relaxed = root.create_child_with(ContainerConfig::new().default_resolver(DefaultResolver::Transient));

    assert!(matches!(
        strict.get::<Tool>(),
        Err(DiError::Configuration(ConfigurationError::NoRegistration { .. }))
    ));
    assert!(!root.has(&Key::class::<Tool>(), false).unwrap());

    let a = relaxed.get::<Tool>().unwrap();
    let b = relaxed.get::<Tool>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(root.has(&Key::class::<Tool>(), false).unwrap());

    // Once bound in the root, every requestor finds the binding.
    assert!(strict.get::<Tool>().is_ok());
}

#[test]
fn test_default_resolver_transient() {
    let container = Container::with_config(ContainerConfig::new().default_resolver(DefaultResolver::Transient));

    let a = container.get::<Tool>().unwrap();
    let b = container.get::<Tool>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_default_resolver_custom() {
    let policy = DefaultResolver::custom(|key, _handler| {
        Ok(Arc::new(Resolver::instance(key.clone(), Arc::new(Tool))))
    });
    let container = Container::with_config(ContainerConfig::new().default_resolver(policy));

    let a = container.get::<Tool>().unwrap();
    let b = container.get::<Tool>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_get_resolver_only_registers_when_asked() {
    let container = Container::new();
    let key = Key::class::<Tool>();

    assert!(container.get_resolver(&key, false).unwrap().is_none());
    assert!(!container.has(&key, false).unwrap());

    let resolver = container.get_resolver(&key, true).unwrap().unwrap();
    assert_eq!(resolver.key(), &key);
    assert!(container.has(&key, false).unwrap());
}
