use crate::error::Result;
use crate::implementation::Registration;
use crate::instance::Instance;
use crate::key::ServiceKey;
use crate::ObjectContainer;

/// Backing engine behind an [`ObjectContainer`].
///
/// An unnamed key resolves to the default registration of its service, a
/// named key to the registration with exactly that name. A missing entry is
/// reported as [`ContainerError::NotRegistered`](crate::ContainerError::NotRegistered).
pub trait Container: Send + Sync {
    fn register(&self, registration: Registration) -> Result<()>;

    /// `owner` is handed to factories so they can resolve their own dependencies.
    fn resolve(&self, key: &ServiceKey, owner: &ObjectContainer) -> Result<Instance>;

    fn contains(&self, key: &ServiceKey) -> bool;
}
