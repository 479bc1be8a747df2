/// Hook trait and registry.
///
/// The registry is created empty with a fixed set of categories and handed
/// out by reference before any handler exists; plugins append handlers during
/// phase two, request-time consumers read the live chains afterwards.
/// Registration is additive-only; there is no removal.
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;
use async_trait::async_trait;
use casd_core::CasError;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{HookOutcome, HookPayload, PRE_AUTH, USER_ATTRIBUTES};

/// A handler appended to one hook category.
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Run the handler. Return `HookOutcome::pass()` to continue normally.
    async fn run(&self, payload: &HookPayload) -> Result<HookOutcome>;
}

/// Contract violation: the category was not predeclared at construction.
#[derive(Debug, Error)]
#[error("unknown hook category '{0}'")]
pub struct HookError(pub String);

impl From<HookError> for CasError {
    fn from(err: HookError) -> Self {
        CasError::Other(err.into())
    }
}

type HandlerChain = Vec<Arc<dyn HookHandler>>;
type CategoryMap = HashMap<String, HandlerChain>;

/// Shared hook registry. Cloning yields another handle to the same chains, so
/// a reference obtained before any registration observes handlers added
/// afterwards.
#[derive(Clone)]
pub struct HookRegistry {
    categories: Arc<RwLock<CategoryMap>>,
}

impl HookRegistry {
    /// Construct a registry with the standard category set.
    pub fn standard() -> Self {
        Self::with_categories(&[USER_ATTRIBUTES, PRE_AUTH])
    }

    /// Construct a registry with a fixed set of category names.
    pub fn with_categories(names: &[&str]) -> Self {
        let map = names
            .iter()
            .map(|n| (n.to_string(), Vec::new()))
            .collect();
        Self {
            categories: Arc::new(RwLock::new(map)),
        }
    }

    /// Append a handler to a predeclared category.
    pub fn on(&self, category: &str, handler: Arc<dyn HookHandler>) -> Result<(), HookError> {
        let mut map = self
            .categories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let chain = map
            .get_mut(category)
            .ok_or_else(|| HookError(category.to_string()))?;
        debug!(category, handler = handler.name(), "hook registered");
        chain.push(handler);
        Ok(())
    }

    /// The current ordered chain for a category. Reads are live: each call
    /// observes handlers registered since the registry handle was obtained.
    pub fn for_category(&self, category: &str) -> Result<HandlerChain, HookError> {
        let map = self
            .categories
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        map.get(category)
            .cloned()
            .ok_or_else(|| HookError(category.to_string()))
    }

    /// Run a category's chain in registration order and merge the outcomes.
    ///
    /// Handler errors are non-fatal: they are logged and the chain continues.
    /// The first handler to return `abort: true` halts the chain.
    pub async fn run(&self, category: &str, payload: &HookPayload) -> Result<HookOutcome, HookError> {
        let chain = self.for_category(category)?;

        let mut merged = HookOutcome::pass();
        for handler in &chain {
            debug!(category, handler = handler.name(), "running hook");
            match handler.run(payload).await {
                Ok(outcome) => {
                    merged.attributes.extend(outcome.attributes);
                    if outcome.abort {
                        merged.abort = true;
                        merged.reason = outcome.reason;
                        return Ok(merged);
                    }
                }
                Err(e) => {
                    warn!(category, handler = handler.name(), "hook returned error: {e}");
                }
            }
        }
        Ok(merged)
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePayload;
    use serde_json::json;

    struct StaticHandler {
        name: &'static str,
        outcome: fn() -> Result<HookOutcome>,
    }

    #[async_trait]
    impl HookHandler for StaticHandler {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, _payload: &HookPayload) -> Result<HookOutcome> {
            (self.outcome)()
        }
    }

    fn payload() -> HookPayload {
        HookPayload::UserAttributes(AttributePayload {
            username: "alice".into(),
            attributes: Default::default(),
        })
    }

    #[test]
    fn on_then_for_category_includes_handler() {
        let hooks = HookRegistry::standard();
        hooks
            .on(USER_ATTRIBUTES, Arc::new(StaticHandler { name: "h", outcome: || Ok(HookOutcome::pass()) }))
            .unwrap();
        let chain = hooks.for_category(USER_ATTRIBUTES).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name(), "h");
    }

    #[test]
    fn unknown_category_rejected() {
        let hooks = HookRegistry::standard();
        let err = hooks
            .on("postAuth", Arc::new(StaticHandler { name: "h", outcome: || Ok(HookOutcome::pass()) }))
            .unwrap_err();
        assert_eq!(err.0, "postAuth");
        assert!(hooks.for_category("postAuth").is_err());
    }

    #[test]
    fn early_reference_observes_later_registration() {
        let hooks = HookRegistry::standard();
        // consumer obtains its reference before any handler exists
        let consumer = hooks.clone();
        assert!(consumer.for_category(PRE_AUTH).unwrap().is_empty());

        hooks
            .on(PRE_AUTH, Arc::new(StaticHandler { name: "late", outcome: || Ok(HookOutcome::pass()) }))
            .unwrap();
        assert_eq!(consumer.for_category(PRE_AUTH).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_merges_attributes_in_order() {
        let hooks = HookRegistry::standard();
        hooks
            .on(
                USER_ATTRIBUTES,
                Arc::new(StaticHandler {
                    name: "first",
                    outcome: || {
                        Ok(HookOutcome::with_attributes(
                            [("mail".to_string(), json!("a@example.com"))].into(),
                        ))
                    },
                }),
            )
            .unwrap();
        hooks
            .on(
                USER_ATTRIBUTES,
                Arc::new(StaticHandler {
                    name: "second",
                    outcome: || {
                        Ok(HookOutcome::with_attributes(
                            [("mail".to_string(), json!("b@example.com"))].into(),
                        ))
                    },
                }),
            )
            .unwrap();

        let outcome = hooks.run(USER_ATTRIBUTES, &payload()).await.unwrap();
        // later handlers win on key conflict
        assert_eq!(outcome.attributes["mail"], json!("b@example.com"));
    }

    #[tokio::test]
    async fn handler_error_does_not_stop_chain() {
        let hooks = HookRegistry::standard();
        hooks
            .on(
                USER_ATTRIBUTES,
                Arc::new(StaticHandler {
                    name: "broken",
                    outcome: || Err(anyhow::anyhow!("boom")),
                }),
            )
            .unwrap();
        hooks
            .on(
                USER_ATTRIBUTES,
                Arc::new(StaticHandler {
                    name: "after",
                    outcome: || {
                        Ok(HookOutcome::with_attributes(
                            [("ok".to_string(), json!(true))].into(),
                        ))
                    },
                }),
            )
            .unwrap();

        let outcome = hooks.run(USER_ATTRIBUTES, &payload()).await.unwrap();
        assert_eq!(outcome.attributes["ok"], json!(true));
        assert!(!outcome.abort);
    }

    #[tokio::test]
    async fn abort_halts_chain() {
        let hooks = HookRegistry::standard();
        hooks
            .on(
                PRE_AUTH,
                Arc::new(StaticHandler {
                    name: "veto",
                    outcome: || Ok(HookOutcome::abort("blocked")),
                }),
            )
            .unwrap();
        hooks
            .on(
                PRE_AUTH,
                Arc::new(StaticHandler {
                    name: "never",
                    outcome: || {
                        Ok(HookOutcome::with_attributes(
                            [("ran".to_string(), json!(true))].into(),
                        ))
                    },
                }),
            )
            .unwrap();

        let outcome = hooks
            .run(
                PRE_AUTH,
                &HookPayload::PreAuth(crate::types::PreAuthPayload {
                    username: "alice".into(),
                    service: "https://app.example.com/".into(),
                }),
            )
            .await
            .unwrap();
        assert!(outcome.abort);
        assert_eq!(outcome.reason.as_deref(), Some("blocked"));
        assert!(outcome.attributes.is_empty());
    }
}
