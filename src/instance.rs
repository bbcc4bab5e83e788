use std::fmt;
use std::sync::Arc;

use crate::implementation::Object;
use crate::key::TypeInfo;

/// A resolved component, erased to its service.
///
/// Returned by the runtime-descriptor lookups; typed lookups unwrap it with
/// [`Instance::downcast`].
#[derive(Clone)]
pub struct Instance {
    service: TypeInfo,
    implementation: TypeInfo,
    object: Object,
    view: Object,
}

impl Instance {
    pub fn new(service: TypeInfo, implementation: TypeInfo, object: Object, view: Object) -> Self {
        Instance {
            service,
            implementation,
            object,
            view,
        }
    }

    pub fn service(&self) -> TypeInfo {
        self.service
    }

    /// Runtime type of the component behind the service.
    pub fn implementation(&self) -> TypeInfo {
        self.implementation
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.implementation.is::<T>()
    }

    pub fn downcast<S: ?Sized + 'static>(&self) -> Option<Arc<S>> {
        self.view.downcast_ref::<Arc<S>>().cloned()
    }

    /// Whether both instances are the same object.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("service", &self.service)
            .field("implementation", &self.implementation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_to_service_view() {
        let object: Object = Arc::new(7u32);
        let view: Object = Arc::new(Arc::new(7u32));
        let instance = Instance::new(TypeInfo::of::<u32>(), TypeInfo::of::<u32>(), object, view);

        assert_eq!(instance.downcast::<u32>().as_deref(), Some(&7));
        assert!(instance.downcast::<String>().is_none());
        assert!(instance.is::<u32>());
        assert!(instance.ptr_eq(&instance.clone()));
    }
}
