//! Error-reporting client activation.
//!
//! Activation is best effort: missing or broken settings degrade to an
//! inactive client rather than blocking bootstrap.

use anyhow::{bail, Context, Result};
use casd_config::TelemetrySettings;
use tracing::{info, warn};

#[derive(Debug)]
pub struct TelemetryClient {
    active: bool,
    app_name: Option<String>,
}

impl TelemetryClient {
    /// Activate the client from optional settings.
    pub fn start(settings: Option<&TelemetrySettings>) -> Self {
        let client = match settings {
            Some(s) if s.active => match Self::activate(s) {
                Ok(client) => client,
                Err(e) => {
                    warn!("telemetry activation failed: {e}; continuing without error reporting");
                    Self::inactive()
                }
            },
            _ => Self::inactive(),
        };
        info!("telemetry client activated: {}", client.active);
        client
    }

    pub fn inactive() -> Self {
        Self {
            active: false,
            app_name: None,
        }
    }

    fn activate(settings: &TelemetrySettings) -> Result<Self> {
        let endpoint = settings
            .endpoint
            .as_deref()
            .context("telemetry endpoint missing")?;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!("telemetry endpoint must be http(s): {endpoint}");
        }
        if settings.token.as_deref().is_none_or(str::is_empty) {
            bail!("telemetry token missing");
        }
        Ok(Self {
            active: true,
            app_name: settings.app_name.clone(),
        })
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(endpoint: &str, token: &str) -> TelemetrySettings {
        TelemetrySettings {
            active: true,
            endpoint: Some(endpoint.to_string()),
            token: Some(token.to_string()),
            app_name: Some("casd".to_string()),
        }
    }

    #[test]
    fn absent_settings_stay_inactive() {
        assert!(!TelemetryClient::start(None).active());
    }

    #[test]
    fn broken_settings_degrade_instead_of_failing() {
        let client = TelemetryClient::start(Some(&settings("ftp://apm.example.com", "tok")));
        assert!(!client.active());
        let client = TelemetryClient::start(Some(&settings("https://apm.example.com", "")));
        assert!(!client.active());
    }

    #[test]
    fn valid_settings_activate() {
        let client = TelemetryClient::start(Some(&settings("https://apm.example.com", "tok")));
        assert!(client.active());
        assert_eq!(client.app_name(), Some("casd"));
    }

    #[test]
    fn explicitly_disabled_stays_inactive() {
        let mut s = settings("https://apm.example.com", "tok");
        s.active = false;
        assert!(!TelemetryClient::start(Some(&s)).active());
    }
}
