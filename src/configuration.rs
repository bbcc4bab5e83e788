use std::path::Path;

use crate::config::ContainerSettings;
use crate::containers::basic::BasicContainer;
use crate::error::Result;
use crate::global;
use crate::interfaces::container::Container;
use crate::ObjectContainer;

/// Startup wiring: picks the engine and installs the process-wide container.
///
/// ```no_run
/// use rcontainer::Configuration;
///
/// Configuration::load(&["/etc/app/container.toml", "./container.toml"])
///     .unwrap()
///     .use_basic_container()
///     .unwrap();
///
/// let container = rcontainer::global::container().unwrap();
/// assert!(!container.is_registered::<String>());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    settings: ContainerSettings,
}

impl Configuration {
    pub fn new(settings: ContainerSettings) -> Self {
        Configuration { settings }
    }

    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, anyhow::Error> {
        Ok(Self::new(ContainerSettings::load_layered(paths)?))
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    pub fn use_basic_container(self) -> Result<Self> {
        self.use_container(BasicContainer::new())
    }

    pub fn use_container<C: Container + 'static>(self, engine: C) -> Result<Self> {
        global::set_container(ObjectContainer::with_engine(engine, self.settings.clone()))?;
        Ok(self)
    }
}
