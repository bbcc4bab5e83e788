use serde::{Deserialize, Serialize};

/// Instance reuse policy of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifestyle {
    /// Constructed at most once; every resolution returns the cached instance.
    #[default]
    Singleton,
    /// Constructed again on every resolution.
    Transient,
}
