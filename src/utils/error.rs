use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Port {port} already exists")]
    AlreadyExists { port: u64 },

    #[error("Port {port} not found")]
    NotFound { port: u64 },

    #[error("Port {port} is not open")]
    NotOpen { port: u64 },

    #[error("Port {port} is in an invalid state: {reason}")]
    InvalidState { port: u64, reason: String },

    #[error("Command parse error on line {line}: {message}")]
    CommandParseError { line: usize, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Domain,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl RegistryError {
    pub fn invalid_argument(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyExists { .. }
            | Self::NotFound { .. }
            | Self::NotOpen { .. }
            | Self::InvalidState { .. } => ErrorCategory::Domain,
            Self::InvalidArgument { .. } | Self::CommandParseError { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Domain => ErrorSeverity::Medium,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidArgument { field, .. } => {
                format!("Check the value passed for '{}'", field)
            }
            Self::AlreadyExists { port } => {
                format!("Delete port {} first or pick an unused port number", port)
            }
            Self::NotFound { port } => format!("Create port {} before using it", port),
            Self::NotOpen { port } => format!("Open port {} with `open {} true`", port, port),
            Self::InvalidState { port, .. } => format!(
                "Port {} has no pending data; set send_policy = \"allow_first_write\" to permit a first send",
                port
            ),
            Self::CommandParseError { .. } => {
                "Commands are: create, delete, open, send, receive, list".to_string()
            }
            Self::IoError(_) => "Check that the file exists and is readable".to_string(),
            Self::ConfigError { .. } | Self::ConfigValidationError { .. } => {
                "Check the TOML configuration file syntax".to_string()
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration file", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Domain => format!("Operation rejected: {}", self),
            ErrorCategory::Input => format!("Bad input: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
