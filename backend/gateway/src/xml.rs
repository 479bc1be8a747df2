//! CAS protocol XML fragments.
//!
//! The renderer is registered in the dependency registry for downstream
//! consumers; the bootstrap core never inspects what it produces.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

/// Renders the protocol artifacts: validation success/failure responses and
/// single-logout SAML requests.
#[derive(Debug, Default)]
pub struct XmlRenderer;

impl XmlRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Successful `/serviceValidate` response, with enriched attributes.
    pub fn validate_success(
        &self,
        user: &str,
        attributes: &HashMap<String, serde_json::Value>,
    ) -> String {
        let mut body = String::new();
        body.push_str("<cas:serviceResponse xmlns:cas=\"http://www.yale.edu/tp/cas\">\n");
        body.push_str("  <cas:authenticationSuccess>\n");
        body.push_str(&format!("    <cas:user>{}</cas:user>\n", escape(user)));
        if !attributes.is_empty() {
            body.push_str("    <cas:attributes>\n");
            let mut keys: Vec<&String> = attributes.keys().collect();
            keys.sort();
            for key in keys {
                let value = match &attributes[key] {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                body.push_str(&format!(
                    "      <cas:{k}>{v}</cas:{k}>\n",
                    k = escape(key),
                    v = escape(&value)
                ));
            }
            body.push_str("    </cas:attributes>\n");
        }
        body.push_str("  </cas:authenticationSuccess>\n");
        body.push_str("</cas:serviceResponse>\n");
        body
    }

    /// Failed `/serviceValidate` response.
    pub fn validate_failure(&self, code: &str, message: &str) -> String {
        format!(
            concat!(
                "<cas:serviceResponse xmlns:cas=\"http://www.yale.edu/tp/cas\">\n",
                "  <cas:authenticationFailure code=\"{code}\">{message}</cas:authenticationFailure>\n",
                "</cas:serviceResponse>\n"
            ),
            code = escape(code),
            message = escape(message)
        )
    }

    /// SAML single-logout request for a granted session.
    pub fn slo_request(&self, session_index: &str) -> String {
        format!(
            concat!(
                "<samlp:LogoutRequest xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\" ",
                "ID=\"{id}\" Version=\"2.0\" IssueInstant=\"{instant}\">\n",
                "  <samlp:SessionIndex>{session}</samlp:SessionIndex>\n",
                "</samlp:LogoutRequest>\n"
            ),
            id = Uuid::new_v4().simple(),
            instant = Utc::now().to_rfc3339(),
            session = escape(session_index)
        )
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
