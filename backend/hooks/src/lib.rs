pub mod registry;
pub mod types;

pub use registry::{HookError, HookHandler, HookRegistry};
pub use types::{AttributePayload, HookOutcome, HookPayload, PreAuthPayload, PRE_AUTH, USER_ATTRIBUTES};
