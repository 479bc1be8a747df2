//! Deep config validation, aggregated into one report.

use anyhow::{anyhow, Result};

use crate::schema::CasdConfig;

const KNOWN_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Aggregated validation failures.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(anyhow!(self.errors.join("; ")))
        }
    }
}

/// Validate the whole config, collecting every failure rather than stopping
/// at the first.
pub fn validate(config: &CasdConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.server.port == 0 {
        report.errors.push("server.port must be non-zero".to_string());
    }

    if !KNOWN_LEVELS.contains(&config.logging.level.as_str()) {
        report.errors.push(format!(
            "logging.level '{}' is not one of {:?}",
            config.logging.level, KNOWN_LEVELS
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for name in &config.plugins {
        if name.trim().is_empty() {
            report.errors.push("plugins entries must be non-empty".to_string());
        } else if !seen.insert(name.as_str()) {
            report
                .errors
                .push(format!("plugin '{name}' is declared more than once"));
        }
    }

    for service in &config.services {
        if service.url_prefix.is_empty() {
            report.errors.push(format!(
                "service '{}' has an empty urlPrefix",
                service.name
            ));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ServiceEntry;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&CasdConfig::default()).is_ok());
    }

    #[test]
    fn failures_are_aggregated() {
        let mut config = CasdConfig::default();
        config.server.port = 0;
        config.logging.level = "loud".to_string();
        config.plugins = vec!["a".to_string(), "a".to_string()];
        config.services.push(ServiceEntry {
            name: "app".to_string(),
            url_prefix: String::new(),
        });

        let report = validate(&config);
        assert_eq!(report.errors.len(), 4);
        let joined = report.into_result().unwrap_err().to_string();
        assert!(joined.contains("server.port"));
        assert!(joined.contains("declared more than once"));
    }
}
