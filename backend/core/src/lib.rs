pub mod error;
pub mod keys;
pub mod stores;
pub mod traits;

pub use error::{report_fatal, CasError};
pub use stores::{
    MemoryAttributeStore, MemoryServiceRegistry, MemoryTicketStore, RegisteredService,
    ServiceTicket,
};
pub use traits::{
    DataSourceLoader, DataSources, ProcessManager, ReadinessNotifier, ServerBuilder, ServerHandle,
};
