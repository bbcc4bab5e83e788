use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::interfaces::component::{Component, Provides};
use crate::key::{ServiceKey, TypeInfo};
use crate::lifestyle::Lifestyle;
use crate::ObjectContainer;

/// A type-erased component, always an `Arc` of the implementer.
pub type Object = Arc<dyn Any + Send + Sync>;

pub type Factory = Arc<dyn Fn(&ObjectContainer) -> anyhow::Result<Object> + Send + Sync>;

/// Turns the concrete object into an erased `Arc<S>` for one service `S`.
type Caster = Arc<dyn Fn(Object) -> Option<Object> + Send + Sync>;

fn caster<I, S>(upcast: fn(Arc<I>) -> Arc<S>) -> Caster
where
    I: Any + Send + Sync,
    S: ?Sized + Send + Sync + 'static,
{
    Arc::new(move |object: Object| {
        let concrete = object.downcast::<I>().ok()?;
        let view: Arc<S> = upcast(concrete);
        Some(Arc::new(view) as Object)
    })
}

/// Runtime descriptor of an implementer: how to build it and which services it provides.
#[derive(Clone)]
pub struct ImplementationType {
    info: TypeInfo,
    factory: Factory,
    casters: HashMap<TypeId, Caster>,
}

impl ImplementationType {
    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn provides(&self, service: TypeInfo) -> bool {
        self.casters.contains_key(&service.id())
    }
}

impl fmt::Debug for ImplementationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationType")
            .field("info", &self.info)
            .field("services", &self.casters.len())
            .finish()
    }
}

/// Typed builder of an [`ImplementationType`].
///
/// ```rust
/// use std::sync::Arc;
/// use rcontainer::{Implementation, ObjectContainer, TypeInfo};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// let container = ObjectContainer::new();
/// container
///     .register_type_as(
///         TypeInfo::of::<dyn Greeter>(),
///         Implementation::<English>::from_fn(|_| Ok(English)).provides::<dyn Greeter>(|it| it),
///         None,
///         None,
///     )
///     .unwrap();
///
/// let greeter: Arc<dyn Greeter> = container.resolve::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub struct Implementation<I> {
    inner: ImplementationType,
    _marker: PhantomData<fn() -> I>,
}

impl<I: Any + Send + Sync> Implementation<I> {
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(&ObjectContainer) -> anyhow::Result<I> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |container: &ObjectContainer| {
            let object = factory(container)?;
            Ok(Arc::new(object) as Object)
        });

        let mut casters = HashMap::new();
        casters.insert(TypeId::of::<I>(), caster::<I, I>(|it| it));

        Implementation {
            inner: ImplementationType {
                info: TypeInfo::of::<I>(),
                factory,
                casters,
            },
            _marker: PhantomData,
        }
    }

    pub fn provides<S>(mut self, upcast: fn(Arc<I>) -> Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.inner
            .casters
            .insert(TypeId::of::<S>(), caster::<I, S>(upcast));
        self
    }

    /// Same as [`Implementation::provides`], using the [`Provides`] impl of `I`.
    pub fn provides_service<S>(self) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Provides<S>,
    {
        self.provides::<S>(<I as Provides<S>>::upcast)
    }

    pub fn build(self) -> ImplementationType {
        self.inner
    }
}

impl<I: Component> Implementation<I> {
    pub fn component() -> Self {
        Self::from_fn(I::construct)
    }
}

impl<I> From<Implementation<I>> for ImplementationType {
    fn from(implementation: Implementation<I>) -> Self {
        implementation.inner
    }
}

/// How a registration produces its component.
#[derive(Clone)]
pub enum Activator {
    Factory(Factory),
    Instance(Object),
}

/// One entry of the registration table.
#[derive(Clone)]
pub struct Registration {
    key: ServiceKey,
    implementation: TypeInfo,
    activator: Activator,
    caster: Caster,
    lifestyle: Lifestyle,
}

impl Registration {
    pub(crate) fn for_type(
        key: ServiceKey,
        implementation: ImplementationType,
        lifestyle: Lifestyle,
    ) -> crate::Result<Self> {
        let service = key.service();
        let caster = implementation
            .casters
            .get(&service.id())
            .cloned()
            .ok_or(crate::ContainerError::TypeMismatch {
                service,
                implementation: implementation.info,
            })?;

        Ok(Registration {
            key,
            implementation: implementation.info,
            activator: Activator::Factory(implementation.factory),
            caster,
            lifestyle,
        })
    }

    pub(crate) fn for_instance<S, I>(key: ServiceKey, instance: Arc<I>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Provides<S>,
    {
        Registration {
            key,
            implementation: TypeInfo::of::<I>(),
            activator: Activator::Instance(instance as Object),
            caster: caster::<I, S>(<I as Provides<S>>::upcast),
            lifestyle: Lifestyle::Transient,
        }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn implementation(&self) -> TypeInfo {
        self.implementation
    }

    pub fn lifestyle(&self) -> Lifestyle {
        self.lifestyle
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.activator, Activator::Instance(_))
    }

    pub fn activator(&self) -> &Activator {
        &self.activator
    }

    /// Erased `Arc<S>` view of `object` for the registered service `S`.
    pub fn view(&self, object: Object) -> Option<Object> {
        (self.caster)(object)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("implementation", &self.implementation)
            .field("lifestyle", &self.lifestyle)
            .field("instance", &self.is_instance())
            .finish()
    }
}
