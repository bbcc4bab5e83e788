use std::sync::Arc;

use crate::ObjectContainer;

/// A field value that can be pulled out of a container.
///
/// Used by `#[derive(Component)]`: `Arc<S>` is a mandatory dependency,
/// `Option<Arc<S>>` an optional one.
pub trait Inject: Sized {
    fn inject(container: &ObjectContainer, name: Option<&str>) -> anyhow::Result<Self>;
}

impl<S: ?Sized + Send + Sync + 'static> Inject for Arc<S> {
    fn inject(container: &ObjectContainer, name: Option<&str>) -> anyhow::Result<Self> {
        let service = match name {
            Some(name) => container.resolve_named::<S>(name)?,
            None => container.resolve::<S>()?,
        };
        Ok(service)
    }
}

impl<S: ?Sized + Send + Sync + 'static> Inject for Option<Arc<S>> {
    fn inject(container: &ObjectContainer, name: Option<&str>) -> anyhow::Result<Self> {
        Ok(match name {
            Some(name) => container.try_resolve_named::<S>(name),
            None => container.try_resolve::<S>(),
        })
    }
}
