//! Config file loading.
//!
//! Loading happens before the logger exists, so this module reports failures
//! through `anyhow` context and leaves the printing to the caller.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::schema::CasdConfig;
use crate::validation;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the config file path.
/// Priority: explicit path > `CASD_CONFIG` env > `~/.casd/config.yaml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("CASD_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".casd")
        .join(CONFIG_FILE_NAME)
}

/// Load, parse, and validate the config file.
///
/// A missing file is an error: the server refuses to start without explicit
/// configuration.
pub fn load(explicit: Option<&Path>) -> Result<CasdConfig> {
    let path = config_path(explicit);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: CasdConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config YAML at: {}", path.display()))?;
    validation::validate(&config)
        .into_result()
        .with_context(|| format!("invalid configuration at: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_minimal_config() {
        let file = write_config("server:\n  port: 8443\n");
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8443);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/casd.yaml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn parse_error_is_reported_with_path() {
        let file = write_config("server: [not, a, mapping\n");
        let err = load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("failed to parse config YAML"));
    }

    #[test]
    fn explicit_path_wins_over_env() {
        // both precedence checks share one test so the env var is only
        // touched from a single thread
        let env_file = write_config("plugins:\n  - attribute-resolver\n");
        let explicit = write_config("plugins:\n  - audit-log\n");
        std::env::set_var("CASD_CONFIG", env_file.path());

        let config = load(Some(explicit.path())).unwrap();
        assert_eq!(config.plugins, ["audit-log"]);

        let config = load(None).unwrap();
        assert_eq!(config.plugins, ["attribute-resolver"]);

        std::env::remove_var("CASD_CONFIG");
    }
}
