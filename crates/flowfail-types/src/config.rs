use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{FlowfailError, Result};

/// Construction toggles for a [`StructuredFailure`](crate::StructuredFailure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureOptions {
    pub enable_suppression: bool,
    pub capture_trace: bool,
}

impl Default for FailureOptions {
    fn default() -> Self {
        Self {
            enable_suppression: true,
            capture_trace: true,
        }
    }
}

impl FailureOptions {
    /// No suppression tracking and no stack capture, for hot paths.
    pub fn lightweight() -> Self {
        Self {
            enable_suppression: false,
            capture_trace: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub max_chain_depth: usize,
    pub include_backtrace: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: 16,
            include_backtrace: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    pub log_level: String,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowfailConfig {
    pub defaults: FailureOptions,
    pub report: ReportConfig,
    pub ops: OpsConfig,
}

impl FlowfailConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            FlowfailError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        Self::from_toml_str(&contents).map_err(|err| match err {
            FlowfailError::Configuration(msg) => FlowfailError::Configuration(format!(
                "{msg} (in {})",
                path_ref.display()
            )),
            other => other,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|err| FlowfailError::Configuration(format!("failed to parse config: {err}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.report.max_chain_depth == 0 {
            return Err(FlowfailError::Configuration(
                "report.max_chain_depth must be greater than zero".into(),
            ));
        }
        if self.ops.log_level.trim().is_empty() {
            return Err(FlowfailError::Configuration(
                "ops.log_level must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = FlowfailConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config, FlowfailConfig::default());
        assert!(config.defaults.capture_trace);
        assert!(config.defaults.enable_suppression);
        assert_eq!(config.report.max_chain_depth, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_flowfail_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        write!(
            file,
            r#"
[defaults]
capture_trace = false

[report]
max_chain_depth = 4
include_backtrace = true

[ops]
log_level = "flowfail=debug"
"#
        )
        .expect("write temp config");

        let loaded = FlowfailConfig::from_file(file.path()).expect("load config");
        assert_eq!(
            loaded.defaults,
            FailureOptions {
                enable_suppression: true,
                capture_trace: false,
            }
        );
        assert_eq!(loaded.report.max_chain_depth, 4);
        assert!(loaded.report.include_backtrace);
        assert_eq!(loaded.ops.log_level, "flowfail=debug");
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = FlowfailConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, FlowfailError::Configuration(msg) if msg.contains("unable to read")));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = FlowfailConfig::from_toml_str("[report]\nmax_chain_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, FlowfailError::Configuration(_)));
    }

    #[test]
    fn validate_configuration_rules() {
        let mut config = FlowfailConfig::default();
        config.report.max_chain_depth = 0;
        assert!(config.validate().is_err());
        config.report.max_chain_depth = 1;
        config.ops.log_level = "  ".into();
        assert!(config.validate().is_err());
        config.ops.log_level = "warn".into();
        assert!(config.validate().is_ok());
    }
}
