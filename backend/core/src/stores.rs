//! In-memory data-source stores.
//!
//! The service registry and ticket store back the CAS protocol surface; the
//! attribute store feeds the attribute-enrichment hook. All three are built by
//! the data-source loading collaborator during bootstrap and shared through
//! the dependency registry for the process lifetime.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Data-source map key for the service registry.
pub const SERVICE_REGISTRY: &str = "serviceRegistry";
/// Data-source map key for the ticket store.
pub const TICKET_REGISTRY: &str = "ticketRegistry";
/// Data-source map key for the attribute store.
pub const ATTRIBUTES: &str = "attributes";

/// A service authorized to validate tickets.
#[derive(Debug, Clone)]
pub struct RegisteredService {
    pub name: String,
    pub url_prefix: String,
}

/// Read-only set of services known to the server.
#[derive(Debug, Default)]
pub struct MemoryServiceRegistry {
    services: Vec<RegisteredService>,
}

impl MemoryServiceRegistry {
    pub fn new(services: Vec<RegisteredService>) -> Self {
        Self { services }
    }

    /// Match a callback URL against the registered prefixes.
    pub fn find(&self, service_url: &str) -> Option<&RegisteredService> {
        self.services
            .iter()
            .find(|s| service_url.starts_with(&s.url_prefix))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// A granted service ticket.
#[derive(Debug, Clone)]
pub struct ServiceTicket {
    pub id: String,
    pub user: String,
    pub service: String,
    pub issued_at: DateTime<Utc>,
}

/// Ticket store with time-based expiry. Tickets are single use.
#[derive(Debug)]
pub struct MemoryTicketStore {
    ttl: Duration,
    tickets: RwLock<HashMap<String, ServiceTicket>>,
}

impl MemoryTicketStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            tickets: RwLock::new(HashMap::new()),
        }
    }

    /// Grant a ticket for `user` bound to `service`.
    ///
    /// Expired tickets from abandoned flows are swept here, so the map stays
    /// bounded by the grants of one ttl window.
    pub fn issue(&self, user: &str, service: &str) -> ServiceTicket {
        let ticket = ServiceTicket {
            id: format!("ST-{}", Uuid::new_v4().simple()),
            user: user.to_string(),
            service: service.to_string(),
            issued_at: Utc::now(),
        };
        let mut map = self
            .tickets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        map.retain(|_, t| now - t.issued_at <= self.ttl);
        map.insert(ticket.id.clone(), ticket.clone());
        ticket
    }

    pub fn len(&self) -> usize {
        self.tickets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate and consume a ticket. Returns `None` when the ticket is
    /// unknown, bound to a different service, or past its expiry.
    pub fn validate(&self, id: &str, service: &str) -> Option<ServiceTicket> {
        let mut map = self
            .tickets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let ticket = map.remove(id)?;
        if ticket.service != service {
            return None;
        }
        if Utc::now() - ticket.issued_at > self.ttl {
            return None;
        }
        Some(ticket)
    }
}

/// Static per-user attribute sets seeded from configuration.
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    attributes: HashMap<String, HashMap<String, serde_json::Value>>,
}

impl MemoryAttributeStore {
    pub fn new(attributes: HashMap<String, HashMap<String, serde_json::Value>>) -> Self {
        Self { attributes }
    }

    pub fn attributes_for(&self, user: &str) -> HashMap<String, serde_json::Value> {
        self.attributes.get(user).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ticket_roundtrip_is_single_use() {
        let store = MemoryTicketStore::new(300);
        let ticket = store.issue("alice", "https://app.example.com/");
        let validated = store.validate(&ticket.id, "https://app.example.com/");
        assert_eq!(validated.map(|t| t.user), Some("alice".to_string()));
        // consumed on first validation
        assert!(store.validate(&ticket.id, "https://app.example.com/").is_none());
    }

    #[test]
    fn expired_ticket_rejected() {
        let store = MemoryTicketStore::new(0);
        let ticket = store.issue("alice", "https://app.example.com/");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(store.validate(&ticket.id, "https://app.example.com/").is_none());
    }

    #[test]
    fn expired_tickets_swept_on_issue() {
        let store = MemoryTicketStore::new(0);
        for _ in 0..10 {
            store.issue("alice", "https://app.example.com/");
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
        // abandoned grants are purged by the next issue
        store.issue("alice", "https://app.example.com/");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ticket_bound_to_service() {
        let store = MemoryTicketStore::new(300);
        let ticket = store.issue("alice", "https://app.example.com/");
        assert!(store.validate(&ticket.id, "https://other.example.com/").is_none());
    }

    #[test]
    fn service_registry_prefix_match() {
        let registry = MemoryServiceRegistry::new(vec![RegisteredService {
            name: "app".into(),
            url_prefix: "https://app.example.com/".into(),
        }]);
        assert!(registry.find("https://app.example.com/login").is_some());
        assert!(registry.find("https://evil.example.com/").is_none());
    }

    #[test]
    fn attributes_default_empty() {
        let store = MemoryAttributeStore::new(HashMap::from([(
            "alice".to_string(),
            HashMap::from([("mail".to_string(), json!("alice@example.com"))]),
        )]));
        assert_eq!(store.attributes_for("alice").len(), 1);
        assert!(store.attributes_for("bob").is_empty());
    }
}
