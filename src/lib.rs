pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::toml_config::RegistryConfig;
pub use crate::core::{
    command::Command,
    engine::{CommandEngine, Outcome, RunSummary},
    registry::PortRegistry,
};
pub use crate::domain::model::{Payload, PortRecord, SendPolicy};
pub use crate::utils::error::{RegistryError, Result};
