//! Hook categories, payloads, and outcomes.
//!
//! Categories are fixed when the registry is constructed; request-time
//! collaborators outside the bootstrap core consume the handler chains.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Attribute-enrichment category: handlers contribute user attributes
/// rendered into protocol responses.
pub const USER_ATTRIBUTES: &str = "userAttributes";
/// Pre-authentication category: handlers observe or veto authentication
/// attempts before credentials are checked.
pub const PRE_AUTH: &str = "preAuth";

/// Payload passed to attribute-enrichment handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributePayload {
    pub username: String,
    /// Attributes contributed by earlier handlers in the chain.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

/// Payload passed to pre-authentication handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreAuthPayload {
    pub username: String,
    pub service: String,
}

/// Union payload type passed to all handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum HookPayload {
    UserAttributes(AttributePayload),
    PreAuth(PreAuthPayload),
}

/// Result returned by a handler.
#[derive(Debug, Clone, Default)]
pub struct HookOutcome {
    /// Attributes contributed by the handler, merged across the chain.
    pub attributes: HashMap<String, serde_json::Value>,
    /// If true, halt the chain (e.g. veto an authentication attempt).
    pub abort: bool,
    /// Optional human-readable reason for abortion.
    pub reason: Option<String>,
}

impl HookOutcome {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn abort(reason: impl Into<String>) -> Self {
        Self {
            abort: true,
            reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn with_attributes(attributes: HashMap<String, serde_json::Value>) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }
}
