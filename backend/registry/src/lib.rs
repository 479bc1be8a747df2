pub mod store;

pub use store::{DependencyRegistry, RegistryError};
