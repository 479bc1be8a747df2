//! Router construction and the protocol endpoints the bootstrap core owns.
//!
//! The full request-handling pipeline (login flows, ticket granting) lives
//! in downstream collaborators; the gateway exposes health plus ticket
//! validation, which exercises the hook registry and the XML renderer.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use casd_core::stores::{MemoryServiceRegistry, MemoryTicketStore, SERVICE_REGISTRY, TICKET_REGISTRY};
use casd_core::{keys, DataSources};
use casd_hooks::{AttributePayload, HookPayload, HookRegistry, USER_ATTRIBUTES};
use casd_registry::DependencyRegistry;

use crate::xml::XmlRenderer;

/// State shared across routes. The hook registry reference is handed out
/// here before any handler is registered; reads stay live.
#[derive(Clone)]
pub struct GatewayState {
    pub registry: DependencyRegistry,
    pub hooks: HookRegistry,
    pub renderer: Arc<XmlRenderer>,
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/serviceValidate", get(service_validate))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct ValidateParams {
    ticket: String,
    service: String,
}

async fn service_validate(
    State(state): State<GatewayState>,
    Query(params): Query<ValidateParams>,
) -> impl IntoResponse {
    debug!(ticket = %params.ticket, service = %params.service, "validating service ticket");
    let body = match validate_ticket(&state, &params).await {
        Ok(body) => body,
        Err(failure) => failure,
    };
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        body,
    )
}

async fn validate_ticket(state: &GatewayState, params: &ValidateParams) -> Result<String, String> {
    let sources: Arc<DataSources> = state
        .registry
        .resolve(keys::NS_SERVER, keys::DATA_SOURCES)
        .map_err(|_| {
            state
                .renderer
                .validate_failure("INTERNAL_ERROR", "datasources unavailable")
        })?;

    let services = sources
        .get(SERVICE_REGISTRY)
        .cloned()
        .and_then(|v| v.downcast::<MemoryServiceRegistry>().ok())
        .ok_or_else(|| {
            state
                .renderer
                .validate_failure("INTERNAL_ERROR", "service registry unavailable")
        })?;
    if services.find(&params.service).is_none() {
        return Err(state
            .renderer
            .validate_failure("INVALID_SERVICE", "service is not registered"));
    }

    let tickets = sources
        .get(TICKET_REGISTRY)
        .cloned()
        .and_then(|v| v.downcast::<MemoryTicketStore>().ok())
        .ok_or_else(|| {
            state
                .renderer
                .validate_failure("INTERNAL_ERROR", "ticket registry unavailable")
        })?;

    let Some(ticket) = tickets.validate(&params.ticket, &params.service) else {
        return Err(state
            .renderer
            .validate_failure("INVALID_TICKET", "ticket not recognized"));
    };

    // enrich with whatever handlers have registered by now
    let payload = HookPayload::UserAttributes(AttributePayload {
        username: ticket.user.clone(),
        attributes: Default::default(),
    });
    let attributes = match state.hooks.run(USER_ATTRIBUTES, &payload).await {
        Ok(outcome) => outcome.attributes,
        Err(_) => Default::default(),
    };

    Ok(state.renderer.validate_success(&ticket.user, &attributes))
}
