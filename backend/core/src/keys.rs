//! Well-known dependency registry coordinates.
//!
//! Every singleton the bootstrap registers lives at one of these
//! `(namespace, key)` pairs; downstream consumers resolve against the same
//! constants rather than spelling strings inline.

/// Namespace for server-scoped singletons.
pub const NS_SERVER: &str = "casd";
/// Namespace for library-level collaborators.
pub const NS_LIB: &str = "lib";

pub const CONFIG: &str = "config";
pub const TELEMETRY: &str = "telemetry";
pub const LOGGER: &str = "logger";
pub const DATA_SOURCES: &str = "dataSources";
pub const PLUGINS: &str = "plugins";
pub const HOOKS: &str = "hooks";
pub const SERVER: &str = "server";
pub const XML: &str = "xml";
