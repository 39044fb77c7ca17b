use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

/// Usage errors raised before any request is sent.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {message}")]
    NotFound {
        status: Option<u16>,
        endpoint: String,
        message: String,
    },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Authentication failed: HTTP {status} {server_message}")]
    Unauthorized {
        status: u16,
        endpoint: String,
        server_message: String,
    },
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("Transport error: {message}")]
    Transport { endpoint: String, message: String },
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

/// Coarse classification of a failure, independent of the variant detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Api,
    Client,
}

impl ApiError {
    /// HTTP status the server answered with, when there was an answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { status, .. } => *status,
            ApiError::Http { status, .. } | ApiError::Unauthorized { status, .. } => Some(*status),
            ApiError::Timeout { .. } | ApiError::Transport { .. } | ApiError::Decode { .. } => {
                None
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Api,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::NotFound { endpoint, .. }
            | ApiError::Http { endpoint, .. }
            | ApiError::Unauthorized { endpoint, .. }
            | ApiError::Timeout { endpoint, .. }
            | ApiError::Transport { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => endpoint,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Unknown configuration field '{field}'")]
    UnknownField { field: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "critical",
            ErrorSeverity::High => "error",
            ErrorSeverity::Medium => "warning",
            ErrorSeverity::Low => "info",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Api(api_error) => api_error.kind(),
            AppError::Cli(_) | AppError::Config(_) | AppError::Storage(_) => ErrorKind::Client,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(api_error) => match api_error {
                ApiError::Unauthorized { .. } => ErrorSeverity::High,
                ApiError::Timeout { .. } | ApiError::Transport { .. } => ErrorSeverity::Medium,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                ApiError::Decode { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
        }
    }

    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Api(ApiError::NotFound { message, .. }) => message.clone(),
            AppError::Api(ApiError::Http {
                status, message, ..
            }) => format!("Treeherder returned HTTP {}: {}", status, message),
            AppError::Cli(CliError::InvalidArguments(message)) => message.clone(),
            _ => format!("{}", self),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Api(ApiError::Timeout { .. } | ApiError::Transport { .. }) => Some(
                "Check your network connection or the --server / TREEHERDER_URL setting"
                    .to_string(),
            ),
            AppError::Api(ApiError::Unauthorized { .. }) => {
                Some("Check the TREEHERDER_API_KEY environment variable".to_string())
            }
            AppError::Api(ApiError::Http { status, .. }) if *status >= 500 => {
                Some("Treeherder may be having trouble; try again later".to_string())
            }
            AppError::Storage(StorageError::ConfigParseError { .. }) => {
                Some("Fix or remove ~/.config/lumberjack/config.toml".to_string())
            }
            AppError::Config(ConfigError::UnknownField { .. }) => {
                Some("Known fields: server_url, page_size, timeout_secs".to_string())
            }
            _ => None,
        }
    }
}
