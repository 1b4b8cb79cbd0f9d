/// Full application integration tests
///
/// These tests wire a small web-style application with arbor-di: a root container for
/// application services and one child container per request.

use arbor_di::{
    all, optional, All, Args, Container, DiResult, Dispose, Injectable, Interface, Key, Metadata,
    Optional, Registrable, Registrant, Registration, Resolver, ResourceDefinition,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;

// ===== Application Domain Models =====

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/testdb".to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

// ===== Logging Infrastructure =====

pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn lines(&self) -> Vec<String>;
}

#[derive(Default)]
pub struct InMemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl Logger for InMemoryLogger {
    fn log(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

static LOGGER: Lazy<Interface> = Lazy::new(|| {
    Interface::with_default("ILogger", |builder| {
        builder.instance(Arc::new(InMemoryLogger::default()) as Arc<dyn Logger>)
    })
});

fn logger(container: &Container) -> Arc<dyn Logger> {
    container.get_dyn::<dyn Logger>(&LOGGER.key()).unwrap()
}

// ===== Data Layer =====

pub struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Injectable for Database {
    fn metadata() -> Metadata {
        Metadata::new().inject([Key::of::<AppConfig>(), LOGGER.key()])
    }

    fn construct(args: Args) -> DiResult<Self> {
        let config = args.get::<AppConfig>(0)?;
        let logger = args.get_dyn::<dyn Logger>(1)?;
        logger.log(&format!("connecting to {}", config.database_url));
        Ok(Database {
            url: config.database_url.clone(),
            logger,
        })
    }
}

impl Dispose for Database {
    fn dispose(&self) {
        self.logger.log(&format!("closing {}", self.url));
    }
}

pub struct UserRepository {
    database: Arc<Database>,
}

impl Injectable for UserRepository {
    fn metadata() -> Metadata {
        Metadata::new().inject([Key::class::<Database>()])
    }

    fn construct(args: Args) -> DiResult<Self> {
        Ok(UserRepository {
            database: args.get(0)?,
        })
    }
}

// ===== Request Layer =====

pub struct RequestContext {
    path: String,
}

pub struct UserController {
    repository: Arc<UserRepository>,
    request: Arc<RequestContext>,
    middleware: Vec<Arc<String>>,
    audit: Option<Arc<String>>,
}

impl Injectable for UserController {
    fn metadata() -> Metadata {
        Metadata::new().inject([
            Key::class::<UserRepository>(),
            Key::of::<RequestContext>(),
            all(Key::name("middleware")),
            optional(Key::name("audit")),
        ])
    }

    fn construct(args: Args) -> DiResult<Self> {
        Ok(UserController {
            repository: args.get(0)?,
            request: args.get(1)?,
            middleware: args.get::<All>(2)?.typed::<String>()?,
            audit: args.get::<Optional>(3)?.typed::<String>()?,
        })
    }
}

fn application_module() -> Vec<Registrant> {
    let database: Arc<dyn Registrable> = Arc::new(|container: &Container| -> DiResult<Option<Arc<Resolver>>> {
        let key = Key::class::<Database>();
        let resolver = Resolver::singleton(key.clone(), arbor_di::Class::of::<Database>())
            .on_dispose::<Database>();
        container
            .register_resolver(key, Arc::new(resolver), true)
            .map(Some)
    });

    vec![
        Registrant::from(Registration::instance(Key::of::<AppConfig>(), AppConfig::default())),
        Registrant::from(database),
        Registrant::from(Registration::instance(Key::name("middleware"), String::from("auth"))),
        Registrant::from(Registration::instance(Key::name("middleware"), String::from("cors"))),
        Registrant::from(ResourceDefinition::new::<UserController>("controller", "users")),
    ]
}

fn handle(root: &Container, path: &str) -> Arc<UserController> {
    let request = root.create_child();
    request
        .register([Registration::instance(
            Key::of::<RequestContext>(),
            RequestContext {
                path: path.to_string(),
            },
        )])
        .unwrap();
    request
        .register([Registration::transient::<UserController>(Key::class::<UserController>())])
        .unwrap();
    request.get::<UserController>().unwrap()
}

// ===== Tests =====

#[test]
fn test_requests_share_application_services() {
    let root = Container::new();
    root.register(application_module()).unwrap();

    let first = handle(&root, "/users/1");
    let second = handle(&root, "/users/2");

    assert_eq!(first.request.path, "/users/1");
    assert_eq!(second.request.path, "/users/2");
    assert!(Arc::ptr_eq(&first.repository, &second.repository));
    assert!(Arc::ptr_eq(&first.repository.database, &second.repository.database));
    assert_eq!(first.repository.database.url, "postgres://localhost/testdb");

    let middleware: Vec<&str> = first.middleware.iter().map(|name| name.as_str()).collect();
    assert_eq!(middleware, vec!["auth", "cors"]);
    assert!(first.audit.is_none());
}

#[test]
fn test_request_scope_can_override_optional_services() {
    let root = Container::new();
    root.register(application_module()).unwrap();

    let request = root.create_child();
    request
        .register([
            Registration::instance(Key::of::<RequestContext>(), RequestContext { path: "/admin".into() }),
            Registration::instance(Key::name("audit"), String::from("enabled")),
            Registration::instance(Key::name("middleware"), String::from("admin-only")),
        ])
        .unwrap();
    request
        .register([Registration::transient::<UserController>(Key::class::<UserController>())])
        .unwrap();

    let controller = request.get::<UserController>().unwrap();
    assert_eq!(controller.audit.as_deref().map(String::as_str), Some("enabled"));
    assert_eq!(controller.middleware.len(), 1);
}

#[test]
fn test_resource_lookup_from_a_request() {
    let root = Container::new();
    root.register(application_module()).unwrap();

    let request = root.create_child();
    request
        .register([Registration::instance(
            Key::of::<RequestContext>(),
            RequestContext { path: "/resource".into() },
        )])
        .unwrap();

    assert!(request.find_resource("controller:users").is_some());
    let controller = request
        .get_as::<UserController>(&Key::resource("controller", "users"))
        .unwrap();
    assert_eq!(controller.request.path, "/resource");
}

#[test]
fn test_shutdown_disposes_application_services() {
    let root = Container::new();
    root.register(application_module()).unwrap();
    let _ = handle(&root, "/users/1");

    root.dispose_resolvers();

    let lines = logger(&root).lines();
    assert!(lines.contains(&"connecting to postgres://localhost/testdb".to_string()));
    assert_eq!(
        lines.iter().filter(|line| line.starts_with("closing")).count(),
        1
    );
}
