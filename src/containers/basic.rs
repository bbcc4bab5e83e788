use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use anyhow::anyhow;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::error::{ContainerError, Result};
use crate::implementation::{Activator, Factory, Object, Registration};
use crate::instance::Instance;
use crate::interfaces::container::Container;
use crate::key::{ServiceKey, TypeInfo};
use crate::lifestyle::Lifestyle;
use crate::ObjectContainer;

thread_local! {
    // Components currently under construction on this thread.
    static RESOLVING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

struct ResolutionGuard(usize);

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|id| *id == self.0) {
                stack.remove(pos);
            }
        });
    }
}

/// Singletons being built, by thread, and the singleton each blocked thread waits for.
#[derive(Default)]
struct WaitGraph {
    builders: HashMap<usize, ThreadId>,
    waiting: HashMap<ThreadId, usize>,
}

impl WaitGraph {
    /// Whether `thread` waiting on a singleton built by `builder` closes a cycle.
    fn closes_cycle(&self, builder: ThreadId, thread: ThreadId) -> bool {
        let mut current = builder;
        for _ in 0..=self.waiting.len() {
            if current == thread {
                return true;
            }
            match self
                .waiting
                .get(&current)
                .and_then(|id| self.builders.get(id))
            {
                Some(next) => current = *next,
                None => return false,
            }
        }
        false
    }
}

static WAIT_GRAPH: Lazy<Mutex<WaitGraph>> = Lazy::new(Default::default);
static BUILT: Condvar = Condvar::new();

struct ComponentEntry {
    registration: Registration,
    name: String,
    instance: OnceCell<Object>,
    failures: AtomicUsize,
}

impl ComponentEntry {
    fn new(registration: Registration, name: String) -> Self {
        ComponentEntry {
            registration,
            name,
            instance: OnceCell::new(),
            failures: AtomicUsize::new(0),
        }
    }

    fn id(&self) -> usize {
        self as *const ComponentEntry as usize
    }

    fn activate(&self, owner: &ObjectContainer) -> Result<Object> {
        let factory = match self.registration.activator() {
            Activator::Instance(object) => return Ok(Arc::clone(object)),
            Activator::Factory(factory) => factory,
        };

        match self.registration.lifestyle() {
            Lifestyle::Transient => {
                let _guard = self.enter()?;
                self.construct(factory, owner)
            }
            Lifestyle::Singleton => {
                if let Some(object) = self.instance.get() {
                    return Ok(Arc::clone(object));
                }
                let _guard = self.enter()?;
                self.build_once(factory, owner)
            }
        }
    }

    fn enter(&self) -> Result<ResolutionGuard> {
        let id = self.id();
        let cyclic = RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&id) {
                true
            } else {
                stack.push(id);
                false
            }
        });

        if cyclic {
            return Err(self.circular());
        }
        Ok(ResolutionGuard(id))
    }

    /// Builds the singleton on exactly one thread; other threads wait for it.
    ///
    /// A thread never blocks on a builder that is itself, directly or through
    /// other builders, waiting on this thread. That wait fails instead.
    fn build_once(&self, factory: &Factory, owner: &ObjectContainer) -> Result<Object> {
        let id = self.id();
        let thread = thread::current().id();

        let mut graph = WAIT_GRAPH.lock();
        let failures = self.failures.load(Ordering::Relaxed);
        loop {
            if let Some(object) = self.instance.get() {
                return Ok(Arc::clone(object));
            }
            if self.failures.load(Ordering::Relaxed) != failures {
                return Err(ContainerError::construction(
                    self.registration.implementation(),
                    anyhow!("concurrent construction of component `{}` failed", self.name),
                ));
            }
            match graph.builders.get(&id).copied() {
                None => {
                    graph.builders.insert(id, thread);
                    break;
                }
                Some(builder) => {
                    if graph.closes_cycle(builder, thread) {
                        debug!(component = %self.name, "circular wait between threads");
                        return Err(self.circular());
                    }
                    graph.waiting.insert(thread, id);
                    BUILT.wait(&mut graph);
                    graph.waiting.remove(&thread);
                }
            }
        }
        drop(graph);

        let result = self.construct(factory, owner);

        let mut graph = WAIT_GRAPH.lock();
        graph.builders.remove(&id);
        match &result {
            Ok(object) => {
                let _ = self.instance.set(Arc::clone(object));
            }
            Err(_) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        drop(graph);
        BUILT.notify_all();

        result
    }

    fn circular(&self) -> ContainerError {
        ContainerError::construction(
            self.registration.implementation(),
            anyhow!("circular dependency through component `{}`", self.name),
        )
    }

    /// Runs the factory, turning a panic into a construction error.
    ///
    /// The process panic hook still runs before the panic is caught.
    fn construct(&self, factory: &Factory, owner: &ObjectContainer) -> Result<Object> {
        let implementation = self.registration.implementation();
        match panic::catch_unwind(AssertUnwindSafe(|| factory(owner))) {
            Ok(Ok(object)) => {
                debug!(component = %self.name, lifestyle = ?self.registration.lifestyle(), "component constructed");
                Ok(object)
            }
            Ok(Err(err)) => {
                debug!(component = %self.name, error = %err, "component construction failed");
                Err(ContainerError::construction(implementation, err))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(component = %self.name, panic = %message, "component constructor panicked");
                Err(ContainerError::construction(
                    implementation,
                    anyhow!("constructor panicked: {message}"),
                ))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Default engine: a concurrent, append-only registration table.
///
/// Every registration is stored under a name. Unnamed registrations get an
/// automatic one derived from the implementer type (`path::Type`, then
/// `path::Type#2`, ...) and become the default of their service.
pub struct BasicContainer {
    components: DashMap<ServiceKey, Arc<ComponentEntry>>,
    defaults: DashMap<TypeInfo, Arc<ComponentEntry>>,
}

impl BasicContainer {
    pub fn new() -> Self {
        BasicContainer {
            components: DashMap::new(),
            defaults: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn lookup(&self, key: &ServiceKey) -> Option<Arc<ComponentEntry>> {
        // Guards are released before returning so factories can re-enter the map.
        match key.name() {
            Some(_) => self.components.get(key).map(|entry| Arc::clone(entry.value())),
            None => self
                .defaults
                .get(&key.service())
                .map(|entry| Arc::clone(entry.value())),
        }
    }
}

impl Container for BasicContainer {
    fn register(&self, registration: Registration) -> Result<()> {
        let service = registration.key().service();
        let is_default = registration.key().name().is_none();
        let base = match registration.key().name() {
            Some(name) => name.to_string(),
            None => registration.implementation().name().to_string(),
        };

        // Picking a free auto name and claiming it happen under one shard lock.
        let mut index = 1;
        let entry = loop {
            let name = match index {
                1 => base.clone(),
                _ => format!("{base}#{index}"),
            };
            match self.components.entry(ServiceKey::new(service, Some(&name))) {
                Entry::Occupied(_) if is_default => index += 1,
                Entry::Occupied(_) => return Err(ContainerError::DuplicateName { service, name }),
                Entry::Vacant(vacant) => {
                    let entry = Arc::new(ComponentEntry::new(registration, name));
                    vacant.insert(Arc::clone(&entry));
                    break entry;
                }
            }
        };

        debug!(
            service = %service,
            component = %entry.name,
            implementation = %entry.registration.implementation(),
            lifestyle = ?entry.registration.lifestyle(),
            default = is_default,
            "component registered"
        );

        if is_default {
            self.defaults.insert(service, entry);
        }
        Ok(())
    }

    fn resolve(&self, key: &ServiceKey, owner: &ObjectContainer) -> Result<Instance> {
        let entry = self
            .lookup(key)
            .ok_or_else(|| ContainerError::NotRegistered { key: key.clone() })?;

        let implementation = entry.registration.implementation();
        let object = entry.activate(owner)?;
        let view = entry.registration.view(Arc::clone(&object)).ok_or_else(|| {
            ContainerError::construction(
                implementation,
                anyhow!("component does not expose service `{}`", key.service()),
            )
        })?;

        Ok(Instance::new(key.service(), implementation, object, view))
    }

    fn contains(&self, key: &ServiceKey) -> bool {
        match key.name() {
            Some(_) => self.components.contains_key(key),
            None => self.defaults.contains_key(&key.service()),
        }
    }
}

impl Default for BasicContainer {
    fn default() -> Self {
        Self::new()
    }
}
