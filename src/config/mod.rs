pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "port-registry")]
#[command(about = "Run command scripts against an in-memory port registry")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Script file with one command per line (reads stdin when omitted)
    #[arg(short, long)]
    pub script: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Stop at the first rejected command")]
    pub fail_fast: bool,

    #[arg(long, help = "Let send fill an empty data slot")]
    pub allow_first_send: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        if let Some(script) = &self.script {
            validate_path("script", script)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_flags() {
        let config = CliConfig::parse_from([
            "port-registry",
            "--config",
            "registry.toml",
            "--script",
            "ops.txt",
            "--fail-fast",
            "--allow-first-send",
        ]);

        assert_eq!(config.config.as_deref(), Some("registry.toml"));
        assert_eq!(config.script.as_deref(), Some("ops.txt"));
        assert!(config.fail_fast);
        assert!(config.allow_first_send);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_script_path_is_invalid() {
        let config = CliConfig::parse_from(["port-registry", "--script", ""]);
        assert!(config.validate().is_err());
    }
}
