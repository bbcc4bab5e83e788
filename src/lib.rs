//! Object container with singleton and transient lifestyles.
//!
//! Services are identified by a type, optionally qualified by a name, and
//! resolved either strictly (`resolve*`, returning a [`ContainerError`]) or
//! leniently (`try_resolve*`, returning `None` on any failure).
//!
//! ```rust
//! use std::sync::Arc;
//! use rcontainer::{Component, Lifestyle, ObjectContainer};
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! #[derive(Component)]
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("console: {message}")
//!     }
//! }
//!
//! rcontainer::provides!(ConsoleLogger => dyn Logger);
//!
//! #[derive(Component)]
//! struct Greeter {
//!     #[inject]
//!     logger: Arc<dyn Logger>,
//! }
//!
//! let container = ObjectContainer::new();
//! container.register::<dyn Logger, ConsoleLogger>(None, None).unwrap();
//! container.register::<Greeter, Greeter>(None, Some(Lifestyle::Transient)).unwrap();
//!
//! let greeter = container.resolve::<Greeter>().unwrap();
//! assert_eq!(greeter.logger.log("hi"), "console: hi");
//! assert!(container.try_resolve::<String>().is_none());
//! ```

extern crate self as rcontainer;

pub mod config;
pub mod configuration;
pub mod containers;
pub mod error;
pub mod global;
pub mod implementation;
pub mod inject;
pub mod instance;
pub mod interfaces;
pub mod key;
pub mod lifestyle;
pub mod object_container;

pub use config::ContainerSettings;
pub use configuration::Configuration;
pub use containers::basic::BasicContainer;
pub use error::{ContainerError, ErrorKind, Result};
pub use implementation::{Implementation, ImplementationType, Registration};
pub use inject::Inject;
pub use instance::Instance;
pub use interfaces::component::{Component, Provides};
pub use interfaces::container::Container;
pub use key::{ServiceKey, TypeInfo};
pub use lifestyle::Lifestyle;
pub use object_container::ObjectContainer;

pub use derives::Component;

#[doc(hidden)]
pub use anyhow;
