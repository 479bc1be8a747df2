pub mod builtin;
pub mod catalog;
pub mod orchestrator;
pub mod plugin;

pub use builtin::{AttributeResolverPlugin, AuditLogPlugin};
pub use catalog::PluginCatalog;
pub use orchestrator::{PluginInstances, PluginOrchestrator};
pub use plugin::{CasPlugin, PluginInstance};
