use crate::domain::model::SendPolicy;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_port, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub registry: Option<RegistrySection>,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub ports: Vec<PortPreset>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySection {
    pub send_policy: Option<SendPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

/// A port created when the registry is built from this config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortPreset {
    pub port: i64,
    pub protocol: String,
    pub open: Option<bool>,
}

impl RegistryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RegistryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RegistryError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(logging) = &self.logging {
            if let Some(level) = &logging.level {
                validate_one_of("logging.level", level, &LOG_LEVELS)?;
            }
            if let Some(format) = &logging.format {
                validate_one_of("logging.format", format, &LOG_FORMATS)?;
            }
        }

        let mut seen = HashSet::new();
        for preset in &self.ports {
            let port = validate_port("ports.port", preset.port).map_err(|_| {
                RegistryError::InvalidConfigValueError {
                    field: "ports.port".to_string(),
                    value: preset.port.to_string(),
                    reason: "Port must be a non-negative integer".to_string(),
                }
            })?;
            validate_non_empty_string("ports.protocol", &preset.protocol)?;

            if !seen.insert(port) {
                return Err(RegistryError::InvalidConfigValueError {
                    field: "ports.port".to_string(),
                    value: port.to_string(),
                    reason: "Port is declared more than once".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn send_policy(&self) -> SendPolicy {
        self.registry
            .as_ref()
            .and_then(|r| r.send_policy)
            .unwrap_or_default()
    }

    pub fn set_send_policy(&mut self, policy: SendPolicy) {
        self.registry
            .get_or_insert_with(RegistrySection::default)
            .send_policy = Some(policy);
    }

    pub fn presets(&self) -> &[PortPreset] {
        &self.ports
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }
}

impl Validate for RegistryConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
