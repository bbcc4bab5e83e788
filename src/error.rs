use thiserror::Error;

use crate::key::{ServiceKey, TypeInfo};

pub type Result<T, E = ContainerError> = std::result::Result<T, E>;

/// Coarse classification of a [`ContainerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised while registering: type mismatch, name conflict, double init.
    Registration,
    /// No registration exists for the requested key.
    NotRegistered,
    /// The implementer could not be constructed.
    Construction,
}

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("`{implementation}` does not provide service `{service}`")]
    TypeMismatch {
        service: TypeInfo,
        implementation: TypeInfo,
    },

    #[error("service `{service}` already has a component named `{name}`")]
    DuplicateName { service: TypeInfo, name: String },

    #[error("no component registered for {key}")]
    NotRegistered { key: ServiceKey },

    #[error("failed to construct `{implementation}`: {source}")]
    Construction {
        implementation: TypeInfo,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("object container already initialized")]
    AlreadyInitialized,
}

impl ContainerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContainerError::TypeMismatch { .. }
            | ContainerError::DuplicateName { .. }
            | ContainerError::AlreadyInitialized => ErrorKind::Registration,
            ContainerError::NotRegistered { .. } => ErrorKind::NotRegistered,
            ContainerError::Construction { .. } => ErrorKind::Construction,
        }
    }

    pub(crate) fn construction(implementation: TypeInfo, source: anyhow::Error) -> Self {
        ContainerError::Construction {
            implementation,
            source: source.into(),
        }
    }
}
