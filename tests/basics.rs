use arbor_di::{
    Args, ConfigurationError, Container, DependencyList, DiError, DiResult, Injectable, Key,
    Metadata, Registrant, Registration, Resolver,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Config {
    port: u16,
}

impl Injectable for Config {
    fn construct(_args: Args) -> DiResult<Self> {
        Ok(Config { port: 8080 })
    }
}

struct Server {
    config: Arc<Config>,
    name: Arc<String>,
}

impl Injectable for Server {
    fn metadata() -> Metadata {
        Metadata::new().inject([Key::class::<Config>(), Key::name("server.name")])
    }

    fn construct(mut args: Args) -> DiResult<Self> {
        Ok(Server {
            config: args.next()?,
            name: args.next()?,
        })
    }
}

#[test]
fn test_singleton_memoization() {
    let container = Container::new();

    let first = container.get::<Config>().unwrap();
    let second = container.get::<Config>().unwrap();

    assert_eq!(first.port, 8080);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_factory_with_dependencies() {
    let container = Container::new();
    container
        .register([Registration::instance(Key::name("server.name"), String::from("edge"))])
        .unwrap();

    let server = container.get::<Server>().unwrap();

    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name.as_str(), "edge");
    assert!(Arc::ptr_eq(&server.config, &container.get::<Config>().unwrap()));
}

#[test]
fn test_transient_creates_new_instances() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);

    struct Counted(usize);

    impl Injectable for Counted {
        fn construct(_args: Args) -> DiResult<Self> {
            Ok(Counted(BUILT.fetch_add(1, Ordering::SeqCst)))
        }
    }

    let container = Container::new();
    container
        .register([Registration::transient::<Counted>(Key::class::<Counted>())])
        .unwrap();

    let a = container.get::<Counted>().unwrap();
    let b = container.get::<Counted>().unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_ne!(a.0, b.0);
    assert_eq!(BUILT.load(Ordering::SeqCst), 2);
}

#[test]
fn test_instance_and_alias_share_the_value() {
    let container = Container::new();
    container
        .register([
            Registration::instance(Key::name("db.url"), String::from("postgres://localhost")),
            Registration::alias(Key::name("db.url"), Key::name("database-url")),
        ])
        .unwrap();

    let direct = container.get_as::<String>(&Key::name("db.url")).unwrap();
    let aliased = container.get_as::<String>(&Key::name("database-url")).unwrap();

    assert!(Arc::ptr_eq(&direct, &aliased));
}

#[test]
fn test_callback_receives_handler_and_requestor() {
    let root = Container::new();
    root.register([Registration::callback(
        Key::name("scope.ids"),
        |handler, requestor, _resolver| Ok(Arc::new((handler.id(), requestor.id()))),
    )])
    .unwrap();

    let child = root.create_child();
    let ids = child
        .get_as::<(arbor_di::ContainerId, arbor_di::ContainerId)>(&Key::name("scope.ids"))
        .unwrap();

    assert_eq!(ids.0, root.id());
    assert_eq!(ids.1, child.id());
}

#[test]
fn test_trait_objects_round_trip() {
    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    let container = Container::new();
    container
        .register([Registration::instance_dyn(
            Key::name("greeter"),
            Arc::new(English) as Arc<dyn Greeter>,
        )])
        .unwrap();

    let greeter = container.get_dyn::<dyn Greeter>(&Key::name("greeter")).unwrap();
    assert_eq!(greeter.greet(), "hello");
}

#[test]
fn test_invoke_appends_dynamic_arguments() {
    struct Greeting {
        prefix: Arc<String>,
        name: Arc<String>,
    }

    impl Injectable for Greeting {
        fn metadata() -> Metadata {
            Metadata::new().inject([Key::name("prefix")])
        }

        fn construct(args: Args) -> DiResult<Self> {
            Ok(Greeting {
                prefix: args.get(0)?,
                name: args.get(1)?,
            })
        }
    }

    let container = Container::new();
    container
        .register([Registration::instance(Key::name("prefix"), String::from("hi"))])
        .unwrap();

    let greeting = container
        .invoke::<Greeting>(vec![Arc::new(String::from("world"))])
        .unwrap();

    assert_eq!(format!("{} {}", greeting.prefix, greeting.name), "hi world");
    assert!(!container.has(&Key::class::<Greeting>(), true).unwrap());
}

#[test]
fn test_type_mismatch_is_reported() {
    let container = Container::new();
    container
        .register([Registration::instance(Key::name("answer"), String::from("42"))])
        .unwrap();

    let result = container.get_as::<u32>(&Key::name("answer"));
    assert!(matches!(result, Err(DiError::TypeMismatch(name)) if name == "u32"));
}

#[test]
fn test_empty_name_is_rejected_everywhere() {
    let container = Container::new();
    let empty = Key::name("");

    let invalid = |result: DiError| {
        matches!(result, DiError::Configuration(ConfigurationError::InvalidKey))
    };

    assert!(invalid(container.resolve_any(&empty).unwrap_err()));
    assert!(invalid(container.resolve_all_any(&empty).unwrap_err()));
    assert!(invalid(container.has(&empty, true).unwrap_err()));
    assert!(invalid(container.get_resolver(&empty, true).unwrap_err()));
    assert!(invalid(
        container
            .register_resolver(empty.clone(), Arc::new(Resolver::instance(empty, Arc::new(1u8))), false)
            .unwrap_err()
    ));
}

#[test]
fn test_missing_dependency_names_its_index() {
    struct Holey;

    impl Injectable for Holey {
        fn metadata() -> Metadata {
            Metadata::new().inject_list(DependencyList::new().with_key(Key::name("present")).with_hole())
        }

        fn construct(_args: Args) -> DiResult<Self> {
            Ok(Holey)
        }
    }

    let container = Container::new();
    container
        .register([Registration::instance(Key::name("present"), 1u8)])
        .unwrap();

    match container.get::<Holey>() {
        Err(DiError::Configuration(ConfigurationError::MissingDependency { type_name, index })) => {
            assert!(type_name.ends_with("Holey"));
            assert_eq!(index, 1);
        }
        other => panic!("expected a missing dependency, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_failed_singleton_can_be_retried() {
    static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

    struct Flaky;

    impl Injectable for Flaky {
        fn construct(_args: Args) -> DiResult<Self> {
            if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DiError::construction("Flaky", "connection refused"))
            } else {
                Ok(Flaky)
            }
        }
    }

    let container = Container::new();

    let first = container.get::<Flaky>();
    assert!(matches!(first, Err(DiError::Construction { ref message, .. }) if message == "connection refused"));

    let second = container.get::<Flaky>().unwrap();
    let third = container.get::<Flaky>().unwrap();
    assert!(Arc::ptr_eq(&second, &third));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 2);
}

#[test]
fn test_register_returns_self_for_chaining() {
    let container = Container::new();
    container
        .register([Registrant::from(Registration::instance(Key::name("a"), 1u8))])
        .unwrap()
        .register([Registrant::from(Registration::instance(Key::name("b"), 2u8))])
        .unwrap();

    assert!(container.has(&Key::name("a"), false).unwrap());
    assert!(container.has(&Key::name("b"), false).unwrap());
}
