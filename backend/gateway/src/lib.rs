//! HTTP gateway: router construction, the listening server handle, and the
//! CAS protocol XML renderer.

pub mod routes;
pub mod server;
pub mod xml;

pub use routes::GatewayState;
pub use server::{GatewayBuilder, GatewayServer};
pub use xml::XmlRenderer;
