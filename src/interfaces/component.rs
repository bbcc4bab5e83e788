use std::any::Any;
use std::sync::Arc;

use crate::ObjectContainer;

/// An implementer the container knows how to build.
///
/// Dependencies are pulled from the container passed to [`Component::construct`];
/// a failure there surfaces as a construction error of this component.
///
/// A panic in `construct` is caught and reported as a construction error, so
/// `try_resolve*` still returns `None`. The process panic hook runs before the
/// panic is caught, and the default hook prints the message to stderr. Install
/// a quiet hook with [`std::panic::set_hook`] if lenient lookups must stay
/// silent.
///
/// ```rust
/// use std::sync::Arc;
/// use rcontainer::{Component, Lifestyle, ObjectContainer};
///
/// struct Clock;
///
/// impl Component for Clock {
///     fn construct(_: &ObjectContainer) -> anyhow::Result<Self> {
///         Ok(Clock)
///     }
/// }
///
/// struct Scheduler {
///     clock: Arc<Clock>,
/// }
///
/// impl Component for Scheduler {
///     fn construct(container: &ObjectContainer) -> anyhow::Result<Self> {
///         Ok(Scheduler { clock: container.resolve::<Clock>()? })
///     }
/// }
///
/// let container = ObjectContainer::new();
/// container.register::<Clock, Clock>(None, None).unwrap();
/// container.register::<Scheduler, Scheduler>(None, Some(Lifestyle::Transient)).unwrap();
///
/// let scheduler = container.resolve::<Scheduler>().unwrap();
/// assert!(Arc::ptr_eq(&scheduler.clock, &container.resolve::<Clock>().unwrap()));
/// ```
pub trait Component: Any + Send + Sync + Sized {
    fn construct(container: &ObjectContainer) -> anyhow::Result<Self>;
}

/// Views an implementer as the service abstraction `S`.
///
/// Every type provides itself. Trait objects are declared with
/// [`provides!`](crate::provides).
pub trait Provides<S: ?Sized>: Any + Send + Sync {
    fn upcast(self: Arc<Self>) -> Arc<S>;
}

impl<T: Any + Send + Sync> Provides<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declares that an implementer provides one or more trait-object services.
///
/// ```rust
/// trait Logger: Send + Sync {}
/// trait Sink: Send + Sync {}
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {}
/// impl Sink for ConsoleLogger {}
///
/// rcontainer::provides!(ConsoleLogger => dyn Logger, dyn Sink);
/// ```
#[macro_export]
macro_rules! provides {
    ($implementer:ty => $($service:ty),+ $(,)?) => {
        $(
            impl $crate::Provides<$service> for $implementer {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$service> {
                    self
                }
            }
        )+
    };
}
