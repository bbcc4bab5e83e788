use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

use rcontainer::{
    Component, ContainerError, ErrorKind, Implementation, Lifestyle, ObjectContainer, TypeInfo,
};

trait Logger: Send + Sync {
    fn target(&self) -> String;
}

#[derive(Component)]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn target(&self) -> String {
        "console".into()
    }
}

#[derive(Component)]
struct FileLogger {
    path: String,
}

impl Logger for FileLogger {
    fn target(&self) -> String {
        format!("file:{}", self.path)
    }
}

rcontainer::provides!(ConsoleLogger => dyn Logger);
rcontainer::provides!(FileLogger => dyn Logger);

trait Missing: Send + Sync {}

#[test]
fn test_resolve_returns_registered_implementer() {
    let container = ObjectContainer::new();
    container
        .register_type_as(
            TypeInfo::of::<dyn Logger>(),
            Implementation::<FileLogger>::component().provides_service::<dyn Logger>(),
            None,
            None,
        )
        .unwrap();

    let instance = container.resolve_type(TypeInfo::of::<dyn Logger>()).unwrap();
    assert_eq!(instance.implementation(), TypeInfo::of::<FileLogger>());
    assert_eq!(instance.service(), TypeInfo::of::<dyn Logger>());
    assert_eq!(instance.downcast::<dyn Logger>().unwrap().target(), "file:");
}

#[test]
fn test_named_registrations_and_default() {
    let container = ObjectContainer::new();
    container
        .register::<dyn Logger, ConsoleLogger>(Some("console"), None)
        .unwrap();
    container
        .register::<dyn Logger, FileLogger>(Some("file"), None)
        .unwrap();

    // Only named registrations so far: no default.
    assert!(container.try_resolve::<dyn Logger>().is_none());

    container.register::<dyn Logger, FileLogger>(None, None).unwrap();
    container.register::<dyn Logger, ConsoleLogger>(None, None).unwrap();

    assert_eq!(container.resolve_named::<dyn Logger>("console").unwrap().target(), "console");
    assert_eq!(container.resolve_named::<dyn Logger>("file").unwrap().target(), "file:");
    assert_eq!(container.resolve::<dyn Logger>().unwrap().target(), "console");
}

#[test]
fn test_previous_default_stays_reachable_by_auto_name() {
    let container = ObjectContainer::new();
    container.register::<dyn Logger, FileLogger>(None, None).unwrap();
    container.register::<dyn Logger, ConsoleLogger>(None, None).unwrap();

    let auto_name = std::any::type_name::<FileLogger>();
    assert!(container.is_registered_named::<dyn Logger>(auto_name));
    assert_eq!(container.resolve_named::<dyn Logger>(auto_name).unwrap().target(), "file:");
}

#[test]
fn test_duplicate_name_is_a_registration_error() {
    let container = ObjectContainer::new();
    container
        .register::<dyn Logger, ConsoleLogger>(Some("main"), None)
        .unwrap();
    let err = container
        .register::<dyn Logger, FileLogger>(Some("main"), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Registration);
    assert_eq!(container.resolve_named::<dyn Logger>("main").unwrap().target(), "console");
}

#[test]
fn test_scenario_singleton_logger() {
    let container = ObjectContainer::new();
    container
        .register::<dyn Logger, ConsoleLogger>(None, Some(Lifestyle::Singleton))
        .unwrap();

    let a = container.resolve::<dyn Logger>().unwrap();
    let b = container.resolve::<dyn Logger>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_scenario_named_transient_logger() {
    let container = ObjectContainer::new();
    container
        .register::<dyn Logger, FileLogger>(Some("file"), Some(Lifestyle::Transient))
        .unwrap();

    let a = container.resolve_named_type("file", TypeInfo::of::<dyn Logger>()).unwrap();
    let b = container.resolve_named_type("file", TypeInfo::of::<dyn Logger>()).unwrap();
    assert!(!a.ptr_eq(&b));

    assert!(container
        .try_resolve_named_type("file", TypeInfo::of::<dyn Logger>())
        .is_some());
    assert!(container
        .try_resolve_named_type("console", TypeInfo::of::<dyn Logger>())
        .is_none());
}

#[test]
fn test_scenario_try_resolve_missing() {
    let container = ObjectContainer::new();
    let missing: Option<Arc<dyn Missing>> = container.try_resolve::<dyn Missing>();
    assert!(missing.is_none());
}

#[test]
fn test_construction_failure_is_strict_and_lenient() {
    let container = ObjectContainer::new();
    container
        .register_type(
            Implementation::<ConsoleLogger>::from_fn(|_| Err(anyhow::anyhow!("disk full"))),
            None,
            Some(Lifestyle::Transient),
        )
        .unwrap();

    let err = container.resolve::<ConsoleLogger>().err().expect("resolution should fail");
    assert!(matches!(err, ContainerError::Construction { .. }));
    assert!(err.to_string().contains("disk full"));
    assert!(container.try_resolve::<ConsoleLogger>().is_none());
}

#[test]
fn test_panicking_constructor_never_escapes_try_resolve() {
    let container = ObjectContainer::new();
    container
        .register_type(
            Implementation::<FileLogger>::from_fn(|_| panic!("boom")),
            None,
            None,
        )
        .unwrap();

    assert!(container.try_resolve::<FileLogger>().is_none());
    assert_eq!(
        container.resolve::<FileLogger>().err().expect("resolution should fail").kind(),
        ErrorKind::Construction
    );
}

struct Chicken;
struct Egg;

impl Component for Chicken {
    fn construct(container: &ObjectContainer) -> anyhow::Result<Self> {
        container.resolve::<Egg>()?;
        Ok(Chicken)
    }
}

impl Component for Egg {
    fn construct(container: &ObjectContainer) -> anyhow::Result<Self> {
        container.resolve::<Chicken>()?;
        Ok(Egg)
    }
}

#[test]
fn test_circular_dependency_is_a_construction_failure() {
    let container = ObjectContainer::new();
    container.register::<Chicken, Chicken>(None, None).unwrap();
    container
        .register::<Egg, Egg>(None, Some(Lifestyle::Transient))
        .unwrap();

    let err = container.resolve::<Chicken>().err().expect("resolution should fail");
    assert_eq!(err.kind(), ErrorKind::Construction);
    assert!(container.try_resolve::<Egg>().is_none());
}

struct Left;
struct Right;

impl Component for Left {
    fn construct(container: &ObjectContainer) -> anyhow::Result<Self> {
        container.resolve::<Barrier>()?.wait();
        container.resolve::<Right>()?;
        Ok(Left)
    }
}

impl Component for Right {
    fn construct(container: &ObjectContainer) -> anyhow::Result<Self> {
        container.resolve::<Barrier>()?.wait();
        container.resolve::<Left>()?;
        Ok(Right)
    }
}

#[test]
fn test_circular_singletons_on_two_threads_fail_instead_of_blocking() {
    let container = ObjectContainer::new();
    container
        .register_instance::<Barrier, Barrier>(Barrier::new(2), None)
        .unwrap();
    container.register::<Left, Left>(None, None).unwrap();
    container.register::<Right, Right>(None, None).unwrap();

    let (sender, receiver) = mpsc::channel();
    {
        let container = container.clone();
        let sender = sender.clone();
        thread::spawn(move || sender.send(container.resolve::<Left>().map(|_| ())));
    }
    {
        let container = container.clone();
        thread::spawn(move || sender.send(container.resolve::<Right>().map(|_| ())));
    }

    let results: Vec<_> = (0..2)
        .map(|_| {
            receiver
                .recv_timeout(Duration::from_secs(5))
                .expect("resolution blocked")
        })
        .collect();
    assert!(results.iter().all(|result| result.is_err()));
    assert!(results
        .iter()
        .any(|result| result.as_ref().err().map(ContainerError::kind) == Some(ErrorKind::Construction)));
}

#[test]
fn test_dependencies_share_singletons() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);

    struct Service {
        logger: Arc<dyn Logger>,
    }

    let container = ObjectContainer::new();
    container
        .register_type_as(
            TypeInfo::of::<dyn Logger>(),
            Implementation::<ConsoleLogger>::from_fn(|_| {
                BUILT.fetch_add(1, Ordering::SeqCst);
                Ok(ConsoleLogger)
            })
            .provides::<dyn Logger>(|it| it),
            None,
            Some(Lifestyle::Singleton),
        )
        .unwrap();
    container
        .register_type(
            Implementation::<Service>::from_fn(|c| {
                Ok(Service {
                    logger: c.resolve::<dyn Logger>()?,
                })
            }),
            None,
            Some(Lifestyle::Transient),
        )
        .unwrap();

    let first = container.resolve::<Service>().unwrap();
    let second = container.resolve::<Service>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.logger, &second.logger));
    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_resolution_through_clones() {
    let container = ObjectContainer::new();
    container.register::<dyn Logger, ConsoleLogger>(None, None).unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let container = container.clone();
            std::thread::spawn(move || container.resolve::<dyn Logger>().unwrap())
        })
        .collect();
    let loggers: Vec<Arc<dyn Logger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(loggers.iter().all(|logger| Arc::ptr_eq(logger, &loggers[0])));
}
