use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime descriptor of a service abstraction or an implementer.
///
/// Two descriptors are equal when they describe the same type; the name is
/// only carried for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeInfo").field(&self.name).finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a registration: a service type, optionally qualified by a name.
///
/// An unnamed key never matches a named one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    service: TypeInfo,
    name: Option<String>,
}

impl ServiceKey {
    pub fn new(service: TypeInfo, name: Option<&str>) -> Self {
        ServiceKey {
            service,
            name: name.map(str::to_owned),
        }
    }

    pub fn of<S: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<S>(), None)
    }

    pub fn named<S: ?Sized + 'static>(name: &str) -> Self {
        Self::new(TypeInfo::of::<S>(), Some(name))
    }

    pub fn service(&self) -> TypeInfo {
        self.service
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "`{}` named `{}`", self.service, name),
            None => write!(f, "`{}`", self.service),
        }
    }
}
