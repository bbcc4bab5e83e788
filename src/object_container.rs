use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::ContainerSettings;
use crate::containers::basic::BasicContainer;
use crate::error::{ContainerError, Result};
use crate::implementation::{ImplementationType, Registration};
use crate::instance::Instance;
use crate::interfaces::component::{Component, Provides};
use crate::interfaces::container::Container;
use crate::key::{ServiceKey, TypeInfo};
use crate::lifestyle::Lifestyle;
use crate::Implementation;

/// Registration and resolution façade over a [`Container`] engine.
///
/// Strict lookups (`resolve*`) return a [`ContainerError`] describing why the
/// service is unavailable. Lenient lookups (`try_resolve*`) swallow every
/// failure and return `None`.
///
/// Cloning is cheap; clones share the same registrations and singletons.
#[derive(Clone)]
pub struct ObjectContainer {
    engine: Arc<dyn Container>,
    settings: Arc<ContainerSettings>,
}

impl ObjectContainer {
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    pub fn with_settings(settings: ContainerSettings) -> Self {
        Self::with_engine(BasicContainer::new(), settings)
    }

    pub fn with_engine<C: Container + 'static>(engine: C, settings: ContainerSettings) -> Self {
        ObjectContainer {
            engine: Arc::new(engine),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    fn lifestyle(&self, life: Option<Lifestyle>) -> Lifestyle {
        life.unwrap_or(self.settings.default_lifestyle)
    }

    /// Registers `implementation` as a service of its own type.
    pub fn register_type(
        &self,
        implementation: impl Into<ImplementationType>,
        name: Option<&str>,
        life: Option<Lifestyle>,
    ) -> Result<()> {
        let implementation = implementation.into();
        self.register_type_as(implementation.info(), implementation, name, life)
    }

    /// Registers `implementation` as a provider of `service`.
    ///
    /// Fails with [`ContainerError::TypeMismatch`] if the implementation was
    /// not declared to provide `service`.
    pub fn register_type_as(
        &self,
        service: TypeInfo,
        implementation: impl Into<ImplementationType>,
        name: Option<&str>,
        life: Option<Lifestyle>,
    ) -> Result<()> {
        let key = ServiceKey::new(service, name);
        let registration = Registration::for_type(key, implementation.into(), self.lifestyle(life))?;
        self.engine.register(registration)
    }

    pub fn register<S, I>(&self, name: Option<&str>, life: Option<Lifestyle>) -> Result<()>
    where
        S: ?Sized + Send + Sync + 'static,
        I: Component + Provides<S>,
    {
        self.register_type_as(
            TypeInfo::of::<S>(),
            Implementation::<I>::component().provides_service::<S>(),
            name,
            life,
        )
    }

    /// Binds an already built instance to `S`. The very same instance is
    /// returned on every resolution.
    pub fn register_instance<S, I>(&self, instance: impl Into<Arc<I>>, name: Option<&str>) -> Result<()>
    where
        S: ?Sized + Send + Sync + 'static,
        I: Provides<S>,
    {
        let key = ServiceKey::new(TypeInfo::of::<S>(), name);
        self.engine
            .register(Registration::for_instance::<S, I>(key, instance.into()))
    }

    pub fn resolve<S: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<S>> {
        self.resolve_key(&ServiceKey::of::<S>())
    }

    pub fn resolve_type(&self, service: TypeInfo) -> Result<Instance> {
        self.resolve_instance(&ServiceKey::new(service, None))
    }

    pub fn try_resolve<S: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<S>> {
        lenient(self.resolve::<S>())
    }

    pub fn try_resolve_type(&self, service: TypeInfo) -> Option<Instance> {
        lenient(self.resolve_type(service))
    }

    pub fn resolve_named<S: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<S>> {
        self.resolve_key(&ServiceKey::named::<S>(name))
    }

    pub fn resolve_named_type(&self, name: &str, service: TypeInfo) -> Result<Instance> {
        self.resolve_instance(&ServiceKey::new(service, Some(name)))
    }

    pub fn try_resolve_named<S: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<S>> {
        lenient(self.resolve_named::<S>(name))
    }

    pub fn try_resolve_named_type(&self, name: &str, service: TypeInfo) -> Option<Instance> {
        lenient(self.resolve_named_type(name, service))
    }

    pub fn is_registered<S: ?Sized + 'static>(&self) -> bool {
        self.contains(&ServiceKey::of::<S>())
    }

    pub fn is_registered_named<S: ?Sized + 'static>(&self, name: &str) -> bool {
        self.contains(&ServiceKey::named::<S>(name))
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.engine.contains(key)
    }

    fn resolve_key<S: ?Sized + Send + Sync + 'static>(&self, key: &ServiceKey) -> Result<Arc<S>> {
        let instance = self.resolve_instance(key)?;
        instance.downcast::<S>().ok_or_else(|| {
            ContainerError::construction(
                instance.implementation(),
                anyhow::anyhow!("resolved instance is not a `{}`", key.service()),
            )
        })
    }

    fn resolve_instance(&self, key: &ServiceKey) -> Result<Instance> {
        let instance = self.engine.resolve(key, self)?;
        if self.settings.log_resolutions {
            trace!(key = %key, implementation = %instance.implementation(), "service resolved");
        }
        Ok(instance)
    }
}

fn lenient<T>(result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "lenient resolution failed");
            None
        }
    }
}

impl Default for ObjectContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectContainer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
