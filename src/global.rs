//! Process-wide container, installed once at startup.

use once_cell::sync::OnceCell;
use tracing::info;

use crate::error::{ContainerError, Result};
use crate::ObjectContainer;

static CONTAINER: OnceCell<ObjectContainer> = OnceCell::new();

/// Installs the process-wide container. Only the first call succeeds.
pub fn set_container(container: ObjectContainer) -> Result<()> {
    CONTAINER
        .set(container)
        .map_err(|_| ContainerError::AlreadyInitialized)?;
    info!("object container installed");
    Ok(())
}

/// The process-wide container, if one was installed.
pub fn container() -> Option<&'static ObjectContainer> {
    CONTAINER.get()
}
